use picscrape_client::probe::ensure_protocol;
use picscrape_client::get_domain;

use crate::common::*;

#[tokio::test]
async fn bare_host_falls_back_to_http() {
    let server = TestServer::start().await;

    // The fixture server speaks plain HTTP, so the https probe fails.
    let resolved = ensure_protocol(&format!("{}/gallery", server.bare())).await;

    assert_eq!(resolved, server.url("/gallery"));
    assert_eq!(get_domain(&resolved), "127.0.0.1");
}

#[tokio::test]
async fn non_200_probes_return_input_unchanged() {
    let server = TestServer::start().await;
    let raw = format!("{}/missing", server.bare());

    assert_eq!(ensure_protocol(&raw).await, raw);
}

#[tokio::test]
async fn closed_port_returns_input_unchanged() {
    let addr = closed_port_addr().await;
    let raw = addr.to_string();

    assert_eq!(ensure_protocol(&raw).await, raw);
}
