use std::sync::Arc;

use anyhow::Result;
use wamp_engine_uri::Uri;
use wamp_engine_values::{
    Dictionary,
    Integer,
    List,
    Value,
};

use crate::{
    core::{
        error::InvocationError,
        id::Id,
    },
    message::message::EventMessage,
    peer::client::Client,
};

/// A single event delivered to a subscriber.
pub struct SubscriptionEvent {
    client: Arc<dyn Client>,
    subscribed_topic: Uri,
    topic: Uri,
    subscription: Id,
    publication: Id,
    arguments: List,
    arguments_keyword: Dictionary,
    details: Dictionary,
}

impl std::fmt::Debug for SubscriptionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionEvent")
            .field("subscribed_topic", &self.subscribed_topic)
            .field("topic", &self.topic)
            .field("subscription", &self.subscription)
            .field("publication", &self.publication)
            .field("arguments", &self.arguments)
            .field("arguments_keyword", &self.arguments_keyword)
            .field("details", &self.details)
            .finish_non_exhaustive()
    }
}

impl SubscriptionEvent {
    /// Creates a new event from an EVENT message for a subscription made to `subscribed_topic`.
    pub fn new(client: Arc<dyn Client>, message: EventMessage, subscribed_topic: Uri) -> Self {
        let topic = message
            .details
            .get("topic")
            .and_then(|topic| topic.string())
            .and_then(|topic| Uri::try_from(topic).ok())
            .unwrap_or_else(|| subscribed_topic.clone());
        Self {
            client,
            subscribed_topic,
            topic,
            subscription: message.subscribed_subscription,
            publication: message.published_publication,
            arguments: message.publish_arguments,
            arguments_keyword: message.publish_arguments_keyword,
            details: message.details,
        }
    }

    /// The topic as it was subscribed to, which may be a pattern.
    pub fn subscribed_topic(&self) -> &Uri {
        &self.subscribed_topic
    }

    /// The concrete topic the event was published to.
    pub fn topic(&self) -> &Uri {
        &self.topic
    }

    pub fn subscription(&self) -> Id {
        self.subscription
    }

    pub fn publication(&self) -> Id {
        self.publication
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

    /// The session ID of the publisher, if disclosed.
    pub fn publisher_id(&self) -> Option<Id> {
        self.details
            .get("publisher")
            .and_then(|publisher| publisher.integer())
            .and_then(|publisher| Id::try_from(publisher).ok())
    }

    /// The trust level assigned to the event by the router, if disclosed.
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

    /// Unsubscribes from the subscribed topic.
    ///
    /// This removes the whole subscription, not just the concrete topic of this event.
    pub async fn unsubscribe(&self) -> Result<()> {
        self.client.unsubscribe(&self.subscribed_topic).await
    }
}
