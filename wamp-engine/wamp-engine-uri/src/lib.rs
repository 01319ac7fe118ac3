use std::{
    fmt::Display,
    hash::Hash,
    sync::LazyLock,
};

use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
    de::{
        Unexpected,
        Visitor,
    },
};
use thiserror::Error;

/// Error for an invalid URI.
#[derive(Debug, Error)]
#[error("invalid URI: {0}")]
pub struct InvalidUri(String);

/// Error for an invalid match policy.
#[derive(Debug, Error)]
#[error("invalid match policy: {0}")]
pub struct InvalidMatchPolicy(String);

/// Validates a URI where components may contain any character except whitespace, `.`, and `#`.
pub fn validate_loose_uri<S>(uri: S) -> Result<(), InvalidUri>
where
    S: AsRef<str>,
{
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([^\s\.#]+\.)*([^\s\.#]+)$").unwrap());
    if !RE.is_match(uri.as_ref()) {
        return Err(InvalidUri(uri.as_ref().to_owned()));
    }
    Ok(())
}

/// Validates a loose URI with wildcards, which are represented as empty components.
pub fn validate_wildcard_uri<S>(uri: S) -> Result<(), InvalidUri>
where
    S: AsRef<str>,
{
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([^\s\.#]*\.)*([^\s\.#]*)$").unwrap());
    if !RE.is_match(uri.as_ref()) {
        return Err(InvalidUri(uri.as_ref().to_owned()));
    }
    Ok(())
}

/// How a URI should be matched against concrete URIs by the router, negotiated when subscribing to
/// a topic or registering a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchPolicy {
    /// The URI matches only itself.
    Exact,
    /// The URI matches every URI it is a prefix of.
    Prefix,
    /// Empty components of the URI match any single component.
    Wildcard,
}

impl TryFrom<&str> for MatchPolicy {
    type Error = InvalidMatchPolicy;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "exact" => Ok(Self::Exact),
            "prefix" => Ok(Self::Prefix),
            "wildcard" => Ok(Self::Wildcard),
            _ => Err(InvalidMatchPolicy(value.to_owned())),
        }
    }
}

impl Into<&'static str> for MatchPolicy {
    fn into(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Wildcard => "wildcard",
        }
    }
}

impl Into<String> for MatchPolicy {
    fn into(self) -> String {
        Into::<&'static str>::into(self).to_owned()
    }
}

impl Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(*self))
    }
}

/// A uniform resource identifier, used in many aspects of WAMP messaging for identifying resources,
/// such as realms, topics, and procedures.
///
/// A URI optionally carries the [`MatchPolicy`] it was subscribed or registered with. Two URIs with
/// the same string but different match policies are not equal, but they do hash identically.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Uri {
    uri: String,
    match_policy: Option<MatchPolicy>,
}

impl Uri {
    /// Constructs a URI directly from a value known to be valid, skipping validation.
    pub fn from_known<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            uri: value.into(),
            match_policy: None,
        }
    }

    /// Constructs a URI with a match policy.
    ///
    /// Wildcard URIs may contain empty components.
    pub fn with_match_policy<S>(value: S, match_policy: MatchPolicy) -> Result<Self, InvalidUri>
    where
        S: Into<String>,
    {
        let uri = value.into();
        match match_policy {
            MatchPolicy::Wildcard => validate_wildcard_uri(&uri)?,
            _ => validate_loose_uri(&uri)?,
        }
        Ok(Self {
            uri,
            match_policy: Some(match_policy),
        })
    }

    /// The match policy of the URI.
    pub fn match_policy(&self) -> Option<MatchPolicy> {
        self.match_policy
    }

    /// The same URI with no match policy.
    pub fn without_match_policy(&self) -> Self {
        Self::from_known(self.uri.clone())
    }

    /// The URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Splits the URI into its components.
    pub fn split(&self) -> impl Iterator<Item = &str> {
        self.uri.split('.')
    }
}

impl Hash for Uri {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.uri.fmt(f)
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

impl TryFrom<String> for Uri {
    type Error = InvalidUri;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_loose_uri(&value)?;
        Ok(Self::from_known(value))
    }
}

impl TryFrom<&str> for Uri {
    type Error = InvalidUri;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_loose_uri(value)?;
        Ok(Self::from_known(value))
    }
}

impl Into<String> for Uri {
    fn into(self) -> String {
        self.uri
    }
}

impl Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.uri)
    }
}

struct UriVisitor;

impl<'de> Visitor<'de> for UriVisitor {
    type Value = Uri;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "a URI")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Uri::try_from(v).map_err(|_| E::invalid_value(Unexpected::Str(&v), &self))
    }
}

impl<'de> Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(UriVisitor)
    }
}
