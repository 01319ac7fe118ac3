use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{
    debug,
    error,
};

use crate::{
    core::error::{
        InvalidStateError,
        InvocationError,
    },
    peer::invocation::{
        Invocation,
        RpcYield,
    },
};

/// A procedure that can be invoked by callers through the router.
#[async_trait]
pub trait Procedure: Send + Sync {
    /// Invokes the procedure, producing its final result.
    ///
    /// Progressive results may be sent through the invocation before returning. Handlers are
    /// expected to watch for [`Invocation::wait_for_interrupt`] if they run for long.
    async fn invoke(&self, invocation: Arc<Invocation>) -> Result<RpcYield>;
}

/// Runs a procedure for an invocation and sends its outcome.
///
/// An error from the procedure is converted to an [`InvocationError`]. Nothing is sent if the
/// invocation finished on its own, which happens when the handler already responded or when a
/// kill-no-wait interrupt arrived.
pub async fn run_procedure(procedure: Arc<dyn Procedure>, invocation: Arc<Invocation>) {
    let request_id = invocation.request_id();
    let uri = invocation.procedure().clone();
    let result = procedure.invoke(invocation.clone()).await;
    if invocation.done() {
        debug!("Procedure invocation {request_id} of {uri} already finished, discarding outcome");
        return;
    }
    let sent = match result {
        Ok(result) => invocation.send_result(result).await,
        Err(err) => {
            let err = InvocationError::from_error(&err);
            debug!("Procedure invocation {request_id} of {uri} failed: {err}");
            invocation.send_error(err).await
        }
    };
    match sent {
        Ok(()) => (),
        Err(err) if err.downcast_ref::<InvalidStateError>().is_some() => {
            debug!("Procedure invocation {request_id} of {uri} finished concurrently: {err}");
        }
        Err(err) => {
            error!("Failed to respond to procedure invocation {request_id} of {uri}: {err}");
        }
    }
}
