use std::{
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    time::Duration,
};

use anyhow::{
    Error,
    Result,
};
use log::{
    debug,
    info,
    warn,
};
use tokio::{
    sync::{
        Mutex,
        watch,
    },
    time::Instant,
};
use wamp_engine_uri::Uri;
use wamp_engine_values::{
    Dictionary,
    Integer,
    List,
    Value,
    WampDeserialize,
};

use crate::{
    core::{
        cancel::CallCancelMode,
        error::{
            InvalidStateError,
            InvocationError,
        },
        hash::HashMap,
        id::Id,
    },
    message::{
        common::error_for_invocation,
        message::{
            InvocationMessage,
            Message,
            YieldMessage,
        },
    },
    peer::{
        interrupt::Interrupt,
        session::Session,
    },
};

/// The arguments of a YIELD sent for an invocation, either as progress or as the final result.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RpcYield {
    pub arguments: List,
    pub arguments_keyword: Dictionary,
    pub options: Dictionary,
}

impl RpcYield {
    pub fn new(arguments: List) -> Self {
        Self {
            arguments,
            ..Default::default()
        }
    }

    pub fn with_arguments_keyword(mut self, arguments_keyword: Dictionary) -> Self {
        self.arguments_keyword = arguments_keyword;
        self
    }

    pub fn with_options(mut self, options: Dictionary) -> Self {
        self.options = options;
        self
    }
}

fn timeout_from_details(request_id: Id, details: &Dictionary) -> Duration {
    let millis = match details.get("timeout").and_then(|timeout| timeout.float()) {
        Some(millis) if millis.is_finite() && millis > 0.0 => millis,
        _ => return Duration::ZERO,
    };
    match Duration::try_from_secs_f64(millis / 1000.0) {
        Ok(timeout) => timeout,
        Err(err) => {
            warn!(
                "Invocation {request_id} has unrepresentable timeout {millis}ms, ignoring: {err}"
            );
            Duration::ZERO
        }
    }
}

fn deadline_from_timeout(request_id: Id, timeout: Duration) -> Option<Instant> {
    if timeout.is_zero() {
        return None;
    }
    let deadline = Instant::now().checked_add(timeout);
    if deadline.is_none() {
        warn!("Invocation {request_id} has timeout {timeout:?} beyond the clock range, ignoring");
    }
    deadline
}

/// A single procedure call being handled by the callee.
///
/// The invocation starts active. Sending a result or an error finishes it, after which nothing
/// else may be sent. An interrupt from the router is recorded and remains observable, but only
/// interrupts in kill-no-wait mode finish the invocation on their own.
pub struct Invocation {
    session: Arc<dyn Session>,
    request_id: Id,
    registration: Id,
    registered_procedure: Uri,
    procedure: Uri,
    arguments: List,
    arguments_keyword: Dictionary,
    details: Dictionary,
    timeout: Duration,
    deadline: Option<Instant>,
    done: AtomicBool,
    interrupt_tx: watch::Sender<Option<Interrupt>>,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("request_id", &self.request_id)
            .field("registration", &self.registration)
            .field("procedure", &self.procedure)
            .field("arguments", &self.arguments)
            .field("arguments_keyword", &self.arguments_keyword)
            .field("details", &self.details)
            .field("timeout", &self.timeout)
            .field("deadline", &self.deadline)
            .field("done", &self.done())
            .field("interrupt", &self.interrupt())
            .finish_non_exhaustive()
    }
}

impl Invocation {
    /// Creates a new invocation from an INVOCATION message for a procedure registered under
    /// `registered_procedure`.
    pub fn new(
        session: Arc<dyn Session>,
        message: InvocationMessage,
        registered_procedure: Uri,
    ) -> Self {
        let procedure = match message.details.get("procedure") {
            Some(Value::String(procedure)) => match Uri::try_from(procedure.as_str()) {
                Ok(procedure) => procedure,
                Err(err) => {
                    warn!(
                        "Invocation {} has invalid procedure in details, \
                         falling back to {registered_procedure}: {err}",
                        message.request
                    );
                    registered_procedure.clone()
                }
            },
            _ => registered_procedure.clone(),
        };
        let timeout = timeout_from_details(message.request, &message.details);
        let deadline = deadline_from_timeout(message.request, timeout);
        let (interrupt_tx, _) = watch::channel(None);
        Self {
            session,
            request_id: message.request,
            registration: message.registered_registration,
            registered_procedure,
            procedure,
            arguments: message.call_arguments,
            arguments_keyword: message.call_arguments_keyword,
            details: message.details,
            timeout,
            deadline,
            done: AtomicBool::new(false),
            interrupt_tx,
        }
    }

    pub fn request_id(&self) -> Id {
        self.request_id
    }

    pub fn registration(&self) -> Id {
        self.registration
    }

    /// The procedure URI as it was registered, which may be a pattern.
    pub fn registered_procedure(&self) -> &Uri {
        &self.registered_procedure
    }

    /// The concrete procedure URI that was called.
    pub fn procedure(&self) -> &Uri {
        &self.procedure
    }

    pub fn arguments(&self) -> &List {
        &self.arguments
    }

    pub fn arguments_keyword(&self) -> &Dictionary {
        &self.arguments_keyword
    }

    pub fn details(&self) -> &Dictionary {
        &self.details
    }

    /// The timeout requested by the caller. Zero means unbounded.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The point in time after which the call should be canceled, if bounded.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Checks if the deadline has passed at the given point in time.
    pub fn is_overdue(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// The pending interrupt, if one has been received.
    pub fn interrupt(&self) -> Option<Interrupt> {
        self.interrupt_tx.borrow().clone()
    }

    /// Checks if the caller asked for progressive results.
    pub fn may_send_progress(&self) -> bool {
        self.details
            .get("receive_progress")
            .is_some_and(|value| value.is_truthy())
    }

    /// The session ID of the caller, if disclosed.
    pub fn caller_id(&self) -> Option<Id> {
        self.details
            .get("caller")
            .and_then(|caller| caller.integer())
            .and_then(|caller| Id::try_from(caller).ok())
    }

    /// The trust level assigned to the call by the router, if disclosed.
    pub fn trust_level(&self) -> Option<Integer> {
        self.details
            .get("trustlevel")
            .and_then(|trust_level| trust_level.integer())
    }

    /// Reads a positional argument.
    pub fn argument(&self, index: usize) -> Result<&Value> {
        self.arguments.get(index).ok_or_else(|| {
            InvocationError::invalid_argument(
                format!(
                    "expected {} arguments, got {}",
                    index + 1,
                    self.arguments.len()
                ),
                index as Integer,
            )
            .into()
        })
    }

    /// Reads a keyword argument.
    pub fn keyword_argument(&self, key: &str) -> Result<&Value> {
        self.arguments_keyword.get(key).ok_or_else(|| {
            InvocationError::invalid_argument(format!("missing keyword argument {key}"), key)
                .into()
        })
    }

    /// Reads and deserializes a positional argument.
    pub fn argument_as<T>(&self, index: usize) -> Result<T>
    where
        T: WampDeserialize,
    {
        T::wamp_deserialize(self.argument(index)?.clone()).map_err(|err| {
            InvocationError::invalid_argument(
                format!("invalid argument {index}: {err}"),
                index as Integer,
            )
            .into()
        })
    }

    /// Reads and deserializes a keyword argument.
    pub fn keyword_argument_as<T>(&self, key: &str) -> Result<T>
    where
        T: WampDeserialize,
    {
        T::wamp_deserialize(self.keyword_argument(key)?.clone()).map_err(|err| {
            InvocationError::invalid_argument(format!("invalid keyword argument {key}: {err}"), key)
                .into()
        })
    }

    fn ensure_active(&self) -> Result<()> {
        if self.done() {
            return Err(InvalidStateError::InvocationDone(self.request_id).into());
        }
        Ok(())
    }

    fn mark_done(&self) -> Result<()> {
        if self.done.swap(true, Ordering::AcqRel) {
            return Err(InvalidStateError::InvocationDone(self.request_id).into());
        }
        Ok(())
    }

    fn yield_message(&self, rpc_yield: RpcYield) -> Message {
        Message::Yield(YieldMessage {
            invocation_request: self.request_id,
            options: rpc_yield.options,
            arguments: rpc_yield.arguments,
            arguments_keyword: rpc_yield.arguments_keyword,
        })
    }

    /// Sends a progressive result.
    ///
    /// Fails if the invocation is done, if the caller did not ask for progress, or with the
    /// pending [`Interrupt`] if the invocation was interrupted.
    pub async fn send_progress(&self, mut progress: RpcYield) -> Result<()> {
        self.ensure_active()?;
        if !self.may_send_progress() {
            return Err(InvalidStateError::ProgressNotRequested(self.request_id).into());
        }
        if let Some(interrupt) = self.interrupt() {
            return Err(interrupt.into());
        }
        progress
            .options
            .insert("progress".to_owned(), Value::Bool(true));
        self.session.send(self.yield_message(progress)).await
    }

    /// Sends the final result, finishing the invocation.
    pub async fn send_result(&self, mut result: RpcYield) -> Result<()> {
        self.mark_done()?;
        result.options.remove("progress");
        debug!(
            "Sending result for invocation {} of {}",
            self.request_id, self.procedure
        );
        self.session.send(self.yield_message(result)).await
    }

    /// Sends an error, finishing the invocation.
    pub async fn send_error(&self, error: InvocationError) -> Result<()> {
        self.mark_done()?;
        debug!(
            "Sending error for invocation {} of {}: {error}",
            self.request_id, self.procedure
        );
        self.session
            .send(error_for_invocation(self.request_id, &error))
            .await
    }

    /// Records an interrupt from the router.
    ///
    /// A kill-no-wait interrupt finishes the invocation immediately, since the caller will not
    /// accept any more messages for it.
    pub fn receive_interrupt(&self, interrupt: Interrupt) {
        debug!(
            "Invocation {} of {} received interrupt in {} mode",
            self.request_id,
            self.procedure,
            interrupt.mode()
        );
        if interrupt.mode() == CallCancelMode::KillNoWait {
            self.done.store(true, Ordering::Release);
        }
        self.interrupt_tx.send_replace(Some(interrupt));
    }

    /// Waits until an interrupt is received.
    ///
    /// Resolves immediately if one was already received.
    pub async fn wait_for_interrupt(&self) -> Result<Interrupt> {
        let mut interrupt_rx = self.interrupt_tx.subscribe();
        let interrupt = interrupt_rx
            .wait_for(|interrupt| interrupt.is_some())
            .await
            .map_err(Error::new)?
            .clone();
        interrupt.ok_or_else(|| Error::msg("interrupt channel yielded no interrupt"))
    }
}

/// The active invocations of a callee, keyed by request ID.
#[derive(Debug, Default)]
pub struct InvocationTable {
    invocations: Mutex<HashMap<Id, Arc<Invocation>>>,
}

impl InvocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, invocation: Arc<Invocation>) {
        self.invocations
            .lock()
            .await
            .insert(invocation.request_id(), invocation);
    }

    pub async fn get(&self, request_id: Id) -> Option<Arc<Invocation>> {
        self.invocations.lock().await.get(&request_id).cloned()
    }

    pub async fn remove(&self, request_id: Id) -> Option<Arc<Invocation>> {
        self.invocations.lock().await.remove(&request_id)
    }

    pub async fn len(&self) -> usize {
        self.invocations.lock().await.len()
    }

    /// Delivers an interrupt to its invocation.
    ///
    /// Interrupts for unknown or finished invocations are dropped, since they race with
    /// completion. Returns whether the interrupt was delivered.
    pub async fn deliver_interrupt(&self, interrupt: Interrupt) -> bool {
        let invocation = match self.get(interrupt.request_id()).await {
            Some(invocation) if !invocation.done() => invocation,
            _ => {
                info!(
                    "Dropping interrupt for unknown or finished invocation {}",
                    interrupt.request_id()
                );
                return false;
            }
        };
        invocation.receive_interrupt(interrupt);
        true
    }

    /// Drops every finished invocation from the table.
    ///
    /// Returns the number of entries removed.
    pub async fn prune_finished(&self) -> usize {
        let mut invocations = self.invocations.lock().await;
        let before = invocations.len();
        invocations.retain(|_, invocation| !invocation.done());
        let pruned = before - invocations.len();
        if pruned > 0 {
            debug!("Pruned {pruned} finished invocations");
        }
        pruned
    }

    /// Interrupts every active invocation whose deadline has passed at the given point in time.
    ///
    /// Finished invocations still in the table are dropped along the way, so a dispatcher that
    /// calls this periodically never accumulates entries it forgot to [`Self::remove`].
    ///
    /// Returns the request IDs of the interrupted invocations.
    pub async fn interrupt_overdue(&self, now: Instant) -> Vec<Id> {
        let overdue = {
            let mut invocations = self.invocations.lock().await;
            invocations.retain(|_, invocation| !invocation.done());
            invocations
                .values()
                .filter(|invocation| {
                    invocation.interrupt().is_none() && invocation.is_overdue(now)
                })
                .cloned()
                .collect::<Vec<_>>()
        };
        overdue
            .into_iter()
            .map(|invocation| {
                warn!(
                    "Invocation {} of {} timed out after {:?}",
                    invocation.request_id(),
                    invocation.procedure(),
                    invocation.timeout()
                );
                invocation.receive_interrupt(Interrupt::timeout(invocation.request_id()));
                invocation.request_id()
            })
            .collect()
    }
}
