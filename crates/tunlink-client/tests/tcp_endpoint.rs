//! Supervisor end-to-end against real TCP endpoints.

use std::time::Duration;

use tokio::net::TcpListener;
use tunlink_client::{ClientConfig, ClientSupervisor, ConnType, ConnectionState};

async fn wait_until(timeout: Duration, mut pred: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !pred() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn connects_to_live_listener_and_reports_drop() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        socket
    });

    let sup = ClientSupervisor::new();
    assert!(sup.start(ClientConfig::new(addr.to_string(), "vkey", ConnType::Tcp)));

    wait_until(Duration::from_secs(10), || sup.status()).await;
    assert_eq!(sup.state(), ConnectionState::Connected);

    // Server side goes away; the client must notice the drop.
    let socket = accepted.await.unwrap();
    drop(socket);
    wait_until(Duration::from_secs(10), || !sup.status()).await;

    sup.close();
    assert_eq!(sup.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn refused_endpoint_goes_disconnected_without_retry_when_policy_off() {
    // Bind and drop a listener so the port is known to refuse.
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let sup = ClientSupervisor::new();
    assert!(sup.set_reconnect_interval(1));
    assert!(sup.start(ClientConfig::new(addr.to_string(), "vkey", ConnType::Tcp)));

    wait_until(Duration::from_secs(10), || {
        sup.state() == ConnectionState::Disconnected
    })
    .await;

    sup.stop_auto_reconnect();
    assert!(!sup.is_auto_reconnect_enabled());

    sup.close();
    sup.close();
    assert_eq!(sup.state(), ConnectionState::Closed);
}
