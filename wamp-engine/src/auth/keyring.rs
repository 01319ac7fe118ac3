use anyhow::Result;
use indexmap::IndexMap;
use log::{
    debug,
    error,
};
use wamp_engine_values::{
    Dictionary,
    List,
    Value,
};

use crate::{
    auth::auth_method::AuthMethod,
    core::error::{
        ConfigurationError,
        NotFoundError,
    },
    message::{
        common::abort_message_for_authentication_failure,
        message::{
            ChallengeMessage,
            HelloMessage,
            Message,
            WelcomeMessage,
        },
    },
};

/// An immutable collection of [`AuthMethod`]s, keyed by method name.
///
/// Methods keep the order they were given in, which is the order of preference announced to the
/// router.
#[derive(Debug)]
pub struct AuthKeyring {
    methods: IndexMap<String, Box<dyn AuthMethod>>,
    auth_id: Option<String>,
    auth_extra: Option<Dictionary>,
}

impl AuthKeyring {
    /// Creates a new keyring.
    ///
    /// Fails if a method name repeats, if a method requires an auth ID and none is given, or if
    /// two methods export different values for the same auth extra key.
    pub fn new<I>(methods: I, auth_id: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = Box<dyn AuthMethod>>,
    {
        let mut keyring = IndexMap::new();
        let mut auth_extra: Option<Dictionary> = None;
        for method in methods {
            let name = method.method_name();
            if keyring.contains_key(name) {
                return Err(ConfigurationError::DuplicateAuthMethod(name.to_owned()).into());
            }
            if method.requires_auth_id() && auth_id.is_none() {
                return Err(ConfigurationError::MissingAuthId(name.to_owned()).into());
            }
            if let Some(extra) = method.auth_extra() {
                let merged = auth_extra.get_or_insert_default();
                for (key, value) in extra {
                    match merged.get(key) {
                        Some(existing) if existing != value => {
                            return Err(
                                ConfigurationError::ConflictingAuthExtra(key.clone()).into()
                            );
                        }
                        Some(_) => (),
                        None => {
                            merged.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            keyring.insert(name.to_owned(), method);
        }
        Ok(Self {
            methods: keyring,
            auth_id,
            auth_extra,
        })
    }

    /// Looks up a method by name.
    pub fn get(&self, name: &str) -> Result<&dyn AuthMethod> {
        self.methods
            .get(name)
            .map(|method| &**method)
            .ok_or_else(|| NotFoundError::AuthMethod(name.to_owned()).into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in order of preference.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn auth_id(&self) -> Option<&str> {
        self.auth_id.as_deref()
    }

    /// The union of every method's auth extra, if any method exports one.
    pub fn auth_extra(&self) -> Option<&Dictionary> {
        self.auth_extra.as_ref()
    }

    /// Announces the keyring in the details of a HELLO message.
    pub fn embed_into_hello(&self, hello: &mut HelloMessage) {
        if self.is_empty() {
            return;
        }
        hello.details.insert(
            "authmethods".to_owned(),
            Value::List(List::from_iter(self.method_names().map(Value::from))),
        );
        if let Some(auth_id) = &self.auth_id {
            hello
                .details
                .insert("authid".to_owned(), Value::String(auth_id.clone()));
        }
        if let Some(auth_extra) = &self.auth_extra {
            hello
                .details
                .insert("authextra".to_owned(), Value::Dictionary(auth_extra.clone()));
        }
    }

    /// Produces the response to a router's CHALLENGE.
    ///
    /// Any failure, including a challenge for a method not in the keyring, results in an ABORT.
    pub async fn respond_to_challenge(&self, challenge: &ChallengeMessage) -> Message {
        debug!(
            "Responding to {} authentication challenge",
            challenge.auth_method
        );
        let response = match self.get(&challenge.auth_method) {
            Ok(method) => method.authenticate(challenge).await,
            Err(err) => Err(err),
        };
        match response {
            Ok(response) => response.into(),
            Err(err) => {
                error!(
                    "Failed to respond to {} authentication challenge: {err}",
                    challenge.auth_method
                );
                Message::Abort(abort_message_for_authentication_failure(&err))
            }
        }
    }

    /// Verifies the router's WELCOME with the method it authenticated with.
    pub async fn check_welcome(&self, welcome: &WelcomeMessage) -> Result<()> {
        let method = match welcome.details.get("authmethod").and_then(|method| method.string()) {
            Some(method) => method,
            None => return Ok(()),
        };
        match self.methods.get(method) {
            Some(method) => method.check_welcome(welcome).await,
            None => Ok(()),
        }
    }
}
