use anyhow::Result;
use async_trait::async_trait;
use wamp_engine_uri::Uri;

/// The subscriber-facing operations of a WAMP client that owns subscriptions.
#[async_trait]
pub trait Client: Send + Sync {
    /// Removes the subscription for the given topic, as it was subscribed.
    async fn unsubscribe(&self, topic: &Uri) -> Result<()>;
}
