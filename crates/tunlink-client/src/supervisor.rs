//! Connection supervisor: owns the client lifecycle and drives reconnect.
//!
//! One [`ClientSupervisor`] manages one logical client connection. A
//! `start` call validates parameters, flips the state to `Connecting` and
//! hands the actual connect work to a background task; the caller gets an
//! accepted/rejected bool back immediately. The background task is the
//! single writer of [`ConnectionState`]: it records the connect outcome,
//! watches the live session for the drop signal, and runs the
//! fixed-interval reconnect wait. `close` cancels whatever the task is
//! doing through a watch channel, so neither a hung connect nor a long
//! reconnect interval delays teardown.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{ClientConfig, ConnType, ReconnectSettings};
use crate::state::ConnectionState;
use crate::transport::{Connector, TcpConnector};
use crate::VERSION;

/// Supervised handle to the single logical client connection.
///
/// All methods are non-blocking with respect to network activity and are
/// safe to call from any thread. `start` must run inside a tokio runtime
/// since it spawns the connection task.
pub struct ClientSupervisor {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Arc<dyn Connector>,
    state: Mutex<ConnectionState>,
    reconnect: Mutex<ReconnectSettings>,
    /// Bumped on every accepted start; a task from an older generation
    /// may not write state anymore.
    epoch: AtomicU64,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

/// Poisoning cannot leave these single-field updates half-done, so a
/// poisoned guard is safe to reuse.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ClientSupervisor {
    /// Supervisor using the bundled [`TcpConnector`].
    pub fn new() -> Self {
        Self::with_connector(Arc::new(TcpConnector))
    }

    /// Supervisor delegating connect attempts to a custom transport.
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                state: Mutex::new(ConnectionState::Idle),
                reconnect: Mutex::new(ReconnectSettings::default()),
                epoch: AtomicU64::new(0),
                shutdown: Mutex::new(None),
            }),
        }
    }

    /// Static version descriptor.
    ///
    /// Returns a `'static` borrow; a foreign-call wrapper exposing this
    /// must copy it into caller-owned memory and document the release
    /// obligation there.
    pub const fn version() -> &'static str {
        VERSION
    }

    /// Schedule a connection attempt and return whether it was accepted.
    ///
    /// Rejected (no side effects) when the config fails validation or
    /// when a connection is already being managed: only `Idle` and
    /// `Closed` accept a start, so starting twice concurrently returns
    /// `false` rather than queueing. On acceptance the state is
    /// `Connecting` before this returns, auto-reconnect is re-enabled,
    /// and the connect work runs in the background.
    pub fn start(&self, config: ClientConfig) -> bool {
        if let Err(e) = config.validate() {
            warn!(error = %e, "start rejected");
            return false;
        }

        let mut state = lock(&self.inner.state);
        if !state.accepts_start() {
            warn!(state = %*state, "start rejected, client already active");
            return false;
        }

        // Starting from Closed is the reset: a fresh cancellation channel
        // and epoch fence off whatever the previous generation still does.
        let (tx, rx) = watch::channel(false);
        if let Some(prev) = lock(&self.inner.shutdown).replace(tx) {
            let _ = prev.send(true);
        }
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.inner.reconnect).enabled = true;
        *state = ConnectionState::Connecting;
        drop(state);

        info!(
            server = %config.server_addr,
            conn_type = %config.conn_type,
            "connection scheduled"
        );
        let inner = Arc::clone(&self.inner);
        tokio::spawn(run(inner, Arc::new(config), epoch, rx));
        true
    }

    /// Convenience mirroring the embedding surface: build the config from
    /// raw strings and start. An unrecognized transport tag is rejected
    /// the same way a malformed config is.
    pub fn start_by_verify_key(
        &self,
        server_addr: &str,
        verify_key: &str,
        conn_type: &str,
        config_path: Option<&Path>,
    ) -> bool {
        let tag = match conn_type.parse::<ConnType>() {
            Ok(tag) => tag,
            Err(e) => {
                warn!(error = %e, "start rejected");
                return false;
            }
        };
        let mut config = ClientConfig::new(server_addr, verify_key, tag);
        config.config_path = config_path.map(Path::to_path_buf);
        self.start(config)
    }

    /// Health probe: `true` iff the tunnel is currently up. Never blocks;
    /// a momentarily stale read is acceptable.
    pub fn status(&self) -> bool {
        lock(&self.inner.state).is_connected()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *lock(&self.inner.state)
    }

    /// Update the reconnect interval. Rejects zero; takes effect on the
    /// next wait cycle, not one already in progress.
    pub fn set_reconnect_interval(&self, secs: u64) -> bool {
        if secs == 0 {
            warn!("reconnect interval must be at least one second");
            return false;
        }
        lock(&self.inner.reconnect).interval = Duration::from_secs(secs);
        true
    }

    /// Current reconnect interval in seconds.
    pub fn reconnect_interval(&self) -> u64 {
        lock(&self.inner.reconnect).interval.as_secs()
    }

    /// Whether a disconnect will be retried automatically.
    pub fn is_auto_reconnect_enabled(&self) -> bool {
        lock(&self.inner.reconnect).enabled
    }

    /// Disable automatic reconnection without touching the connection
    /// itself. Idempotent; a following drop stays `Disconnected`.
    pub fn stop_auto_reconnect(&self) {
        lock(&self.inner.reconnect).enabled = false;
    }

    /// Tear the client down. Idempotent and terminal: the state becomes
    /// `Closed`, auto-reconnect is disabled, and the background task is
    /// woken immediately even mid-connect or mid-wait. A later `start`
    /// call begins a new generation.
    pub fn close(&self) {
        let was_closed = {
            let mut state = lock(&self.inner.state);
            let was = *state == ConnectionState::Closed;
            *state = ConnectionState::Closed;
            was
        };
        lock(&self.inner.reconnect).enabled = false;
        if let Some(tx) = lock(&self.inner.shutdown).take() {
            let _ = tx.send(true);
        }
        if !was_closed {
            info!("client closed");
        }
    }
}

impl Default for ClientSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Single-writer state store. Refuses the write when the caller's
    /// generation is stale or the caller closed the client, so a
    /// cancelled attempt can never resurrect a closed supervisor.
    fn transition(&self, epoch: u64, next: ConnectionState) -> bool {
        let mut state = lock(&self.state);
        if self.epoch.load(Ordering::SeqCst) != epoch || *state == ConnectionState::Closed {
            return false;
        }
        *state = next;
        true
    }

    /// Snapshot of the reconnect pair; `None` when the policy is off.
    fn retry_interval(&self) -> Option<Duration> {
        let settings = lock(&self.reconnect);
        settings.enabled.then_some(settings.interval)
    }
}

/// Background connection task: connect, watch, wait, repeat.
async fn run(
    inner: Arc<Inner>,
    config: Arc<ClientConfig>,
    epoch: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let attempt = inner.connector.connect(&config);
        tokio::pin!(attempt);
        let outcome = tokio::select! {
            res = &mut attempt => res,
            _ = shutdown.changed() => {
                info!("supervisor shutting down during connect");
                return;
            }
        };

        match outcome {
            Ok(mut conn) => {
                if !inner.transition(epoch, ConnectionState::Connected) {
                    conn.shutdown().await;
                    return;
                }
                info!(server = %config.server_addr, "connected");
                tokio::select! {
                    () = conn.closed() => {
                        if !inner.transition(epoch, ConnectionState::Disconnected) {
                            return;
                        }
                        warn!(server = %config.server_addr, "connection lost");
                    }
                    _ = shutdown.changed() => {
                        conn.shutdown().await;
                        info!("supervisor shutting down");
                        return;
                    }
                }
            }
            Err(e) => {
                if !inner.transition(epoch, ConnectionState::Disconnected) {
                    return;
                }
                warn!(error = %e, server = %config.server_addr, "connect failed");
            }
        }

        // Reconnect wait. The settings pair is re-read each cycle, so an
        // interval change applies from the next cycle and disabling the
        // policy parks the client in Disconnected.
        let Some(interval) = inner.retry_interval() else {
            info!("auto reconnect disabled, staying disconnected");
            return;
        };
        tokio::select! {
            () = sleep(interval) => {}
            _ = shutdown.changed() => {
                info!("supervisor shutting down during reconnect wait");
                return;
            }
        }
        if inner.retry_interval().is_none() {
            info!("auto reconnect disabled, staying disconnected");
            return;
        }
        if !inner.transition(epoch, ConnectionState::Connecting) {
            return;
        }
        info!(server = %config.server_addr, "reconnecting");
    }
}
