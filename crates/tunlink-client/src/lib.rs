//! Tunlink Client Library
//!
//! Embeddable connection manager for a tunlink tunnel server. A caller
//! supplies the server address, verify key and transport tag, and the
//! [`ClientSupervisor`] establishes the connection in the background and
//! keeps it alive:
//! - non-blocking start with synchronous parameter validation
//! - status polling at any time
//! - fixed-interval auto-reconnect, adjustable and stoppable at runtime
//! - idempotent teardown that also cancels an in-flight attempt or wait
//!
//! The wire protocol itself lives behind the [`Connector`] seam; the
//! bundled [`TcpConnector`] dials plain TCP, and embedders with their own
//! protocol stack plug in a custom connector.

pub mod config;
pub mod error;
pub mod state;
pub mod supervisor;
pub mod tracing_init;
pub mod transport;

pub use config::{ClientConfig, ConnType, ReconnectSettings};
pub use error::{ClientError, Result};
pub use state::ConnectionState;
pub use supervisor::ClientSupervisor;
pub use transport::{Connection, Connector, TcpConnector};

/// Static version descriptor, also reported by [`ClientSupervisor::version`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
