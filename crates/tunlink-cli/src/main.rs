//! Tunlink exerciser
//!
//! Drives the client SDK's public surface by hand: start a connection by
//! verify key, poll its status once a second, adjust or disable the
//! auto-reconnect policy, and close on exit or Ctrl-C.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use tunlink_client::{tracing_init, ClientSupervisor};

#[derive(Parser, Debug)]
#[command(name = "tunlink")]
#[command(version, about = "Tunlink client - supervised tunnel connection")]
struct Args {
    /// Tunnel server address (host:port)
    #[arg(long, env = "TUNLINK_SERVER_ADDR")]
    server_addr: String,

    /// Verify key registered with the server
    #[arg(long, env = "TUNLINK_VERIFY_KEY")]
    verify_key: String,

    /// Connection type: tcp, kcp or websocket
    #[arg(long, default_value = "tcp", env = "TUNLINK_CONN_TYPE")]
    conn_type: String,

    /// Optional extended client configuration file
    #[arg(long, env = "TUNLINK_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Seconds between reconnect attempts after a disconnect
    #[arg(long, default_value_t = 5, env = "TUNLINK_RECONNECT_INTERVAL")]
    reconnect_interval: u64,

    /// Disable automatic reconnection after the first disconnect
    #[arg(long, env = "TUNLINK_NO_AUTO_RECONNECT")]
    no_auto_reconnect: bool,

    /// How long to watch the connection before closing; 0 = until Ctrl-C
    #[arg(long, default_value_t = 30, env = "TUNLINK_WATCH_SECS")]
    watch_secs: u64,

    /// Log level filter (e.g. "info", "debug", "warn")
    #[arg(long, default_value = "info", env = "TUNLINK_LOG_LEVEL")]
    log_level: String,

    /// Emit JSON log lines
    #[arg(long, env = "TUNLINK_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_init::init_tracing(
        &format!(
            "tunlink_client={},tunlink_cli={}",
            args.log_level, args.log_level
        ),
        args.log_json,
    );

    info!(version = ClientSupervisor::version(), "tunlink client");

    let supervisor = ClientSupervisor::new();
    anyhow::ensure!(
        supervisor.set_reconnect_interval(args.reconnect_interval),
        "reconnect interval must be at least one second"
    );

    let accepted = supervisor.start_by_verify_key(
        &args.server_addr,
        &args.verify_key,
        &args.conn_type,
        args.config_path.as_deref(),
    );
    anyhow::ensure!(
        accepted,
        "start rejected, check server address, verify key and connection type"
    );

    if args.no_auto_reconnect {
        supervisor.stop_auto_reconnect();
    }
    info!(
        interval_secs = supervisor.reconnect_interval(),
        enabled = supervisor.is_auto_reconnect_enabled(),
        "auto reconnect policy"
    );

    let deadline = if args.watch_secs == 0 {
        None
    } else {
        Some(tokio::time::Instant::now() + Duration::from_secs(args.watch_secs))
    };
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await; // Skip first immediate tick
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!(
                    connected = supervisor.status(),
                    state = %supervisor.state(),
                    "status"
                );
                if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupt received");
                break;
            }
        }
    }

    supervisor.close();
    Ok(())
}
