//! Transport seam between the supervisor and the wire protocol.
//!
//! The supervisor never touches sockets directly; it asks a [`Connector`]
//! to establish a session and then watches the returned [`Connection`]
//! for the drop signal. Embedders with a full protocol stack implement
//! the two traits; the bundled [`TcpConnector`] covers the plain `tcp`
//! transport tag.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::{ClientConfig, ConnType};
use crate::error::ClientError;

/// An established transport session.
#[async_trait]
pub trait Connection: Send {
    /// Resolve when the peer drops the session or the link errors out.
    async fn closed(&mut self);

    /// Release the underlying resources. Called on teardown; must not
    /// assume `closed` has resolved.
    async fn shutdown(&mut self);
}

impl std::fmt::Debug for dyn Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Connection")
    }
}

/// Dials the tunnel server described by a [`ClientConfig`].
///
/// One call corresponds to one connect attempt; the supervisor never has
/// more than one in flight.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ClientConfig) -> Result<Box<dyn Connection>, ClientError>;
}

/// Plain TCP connector.
///
/// Establishes and watches the link only; the verify-key handshake and
/// the tunnel multiplexing belong to the full protocol stack sitting
/// behind a custom [`Connector`] in embedding applications. Transport
/// tags other than `tcp` report a connect failure, which the supervisor
/// treats like any other transient failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, config: &ClientConfig) -> Result<Box<dyn Connection>, ClientError> {
        if config.conn_type != ConnType::Tcp {
            return Err(ClientError::Connect(format!(
                "transport {} is not available in this build",
                config.conn_type
            )));
        }
        let stream = TcpStream::connect(&config.server_addr)
            .await
            .map_err(|e| ClientError::Connect(format!("{}: {e}", config.server_addr)))?;
        debug!(server = %config.server_addr, "tcp link established");
        Ok(Box::new(TcpConnection { stream }))
    }
}

struct TcpConnection {
    stream: TcpStream,
}

#[async_trait]
impl Connection for TcpConnection {
    async fn closed(&mut self) {
        // Inbound bytes are opaque at this layer; drain them and treat
        // EOF or a read error as the drop signal.
        let mut buf = [0u8; 1024];
        loop {
            match self.stream.read(&mut buf).await {
                Ok(0) => {
                    debug!("peer closed the link");
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "link read failed");
                    return;
                }
            }
        }
    }

    async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn rejects_non_tcp_tags() {
        let cfg = ClientConfig::new("127.0.0.1:1", "vkey", ConnType::Kcp);
        let err = TcpConnector.connect(&cfg).await.unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)));
    }

    #[tokio::test]
    async fn reports_closed_on_peer_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let cfg = ClientConfig::new(addr.to_string(), "vkey", ConnType::Tcp);
        let mut conn = TcpConnector.connect(&cfg).await.unwrap();

        let (peer, _) = listener.accept().await.unwrap();
        drop(peer);

        tokio::time::timeout(std::time::Duration::from_secs(5), conn.closed())
            .await
            .unwrap();
        conn.shutdown().await;
    }

    #[tokio::test]
    async fn connect_to_refused_port_fails() {
        // Bind and drop a listener so the port is known to refuse.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let cfg = ClientConfig::new(addr.to_string(), "vkey", ConnType::Tcp);
        assert!(TcpConnector.connect(&cfg).await.is_err());
    }
}
