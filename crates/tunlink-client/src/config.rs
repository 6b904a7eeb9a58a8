//! Client connection configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ClientError;

/// Transport tag selecting how the tunnel server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnType {
    /// Stream-oriented transport.
    Tcp,
    /// KCP over UDP.
    Kcp,
    /// Websocket bridge.
    Websocket,
}

impl ConnType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Kcp => "kcp",
            Self::Websocket => "websocket",
        }
    }
}

impl fmt::Display for ConnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "kcp" => Ok(Self::Kcp),
            "websocket" => Ok(Self::Websocket),
            _ => Err(ClientError::UnknownConnType(s.to_string())),
        }
    }
}

/// Parameters for one logical client connection.
///
/// Immutable once a connect attempt is scheduled; a later `start` call on
/// a closed supervisor installs a fresh config.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Tunnel server address, `host:port`.
    pub server_addr: String,

    /// Credential presented to the server; validation is the server's
    /// business, the client only requires it to be non-empty.
    pub verify_key: String,

    /// Transport used to reach the server.
    pub conn_type: ConnType,

    /// Optional path to an extended client configuration file, handed
    /// through to the transport collaborator unparsed.
    pub config_path: Option<PathBuf>,

    /// Optional HTTP proxy to dial the server through.
    pub proxy_url: Option<String>,
}

impl ClientConfig {
    pub fn new(
        server_addr: impl Into<String>,
        verify_key: impl Into<String>,
        conn_type: ConnType,
    ) -> Self {
        Self {
            server_addr: server_addr.into(),
            verify_key: verify_key.into(),
            conn_type,
            config_path: None,
            proxy_url: None,
        }
    }

    /// Check the parameters a start call must reject synchronously.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.server_addr.is_empty() {
            return Err(ClientError::InvalidConfig("server address is empty".into()));
        }
        if self.verify_key.is_empty() {
            return Err(ClientError::InvalidConfig("verify key is empty".into()));
        }
        Ok(())
    }
}

/// Auto-reconnect policy, read and written as a pair so the wait loop
/// never observes a fresh interval against a stale enabled flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectSettings {
    /// Whether the supervisor retries after a disconnect.
    pub enabled: bool,
    /// Fixed delay between a disconnect and the next attempt.
    pub interval: Duration,
}

impl ReconnectSettings {
    /// Retry delay used until the caller overrides it.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conn_type_parses_known_tags() {
        assert_eq!("tcp".parse::<ConnType>().unwrap(), ConnType::Tcp);
        assert_eq!("KCP".parse::<ConnType>().unwrap(), ConnType::Kcp);
        assert_eq!("websocket".parse::<ConnType>().unwrap(), ConnType::Websocket);
    }

    #[test]
    fn conn_type_rejects_unknown_tag() {
        let err = "carrier-pigeon".parse::<ConnType>().unwrap_err();
        assert!(matches!(err, ClientError::UnknownConnType(_)));
    }

    #[test]
    fn conn_type_round_trips_through_display() {
        for tag in [ConnType::Tcp, ConnType::Kcp, ConnType::Websocket] {
            assert_eq!(tag.to_string().parse::<ConnType>().unwrap(), tag);
        }
    }

    #[test]
    fn validate_rejects_empty_fields() {
        let cfg = ClientConfig::new("", "vkey", ConnType::Tcp);
        assert!(cfg.validate().is_err());

        let cfg = ClientConfig::new("example.com:8024", "", ConnType::Tcp);
        assert!(cfg.validate().is_err());

        let cfg = ClientConfig::new("example.com:8024", "vkey", ConnType::Tcp);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn default_reconnect_settings() {
        let settings = ReconnectSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.interval, Duration::from_secs(5));
    }
}
