use std::fmt::Display;

use wamp_engine_values::Value;

/// TLS channel binding, which ties authentication to the TLS session below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBinding {
    /// RFC5929.
    TlsUnique,
    /// RFC9266.
    TlsServerEndPoint,
}

impl TryFrom<&str> for ChannelBinding {
    type Error = anyhow::Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "tls-unique" => Ok(Self::TlsUnique),
            "tls-server-end-point" => Ok(Self::TlsServerEndPoint),
            _ => Err(Self::Error::msg(format!(
                "invalid channel binding: {value}"
            ))),
        }
    }
}

impl Into<&'static str> for ChannelBinding {
    fn into(self) -> &'static str {
        match self {
            Self::TlsUnique => "tls-unique",
            Self::TlsServerEndPoint => "tls-server-end-point",
        }
    }
}

impl Display for ChannelBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(*self))
    }
}

impl From<ChannelBinding> for Value {
    fn from(value: ChannelBinding) -> Self {
        Value::from(Into::<&'static str>::into(value))
    }
}
