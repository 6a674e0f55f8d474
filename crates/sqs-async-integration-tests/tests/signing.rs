//! Integration tests for request signing on the wire
//!
//! These tests verify:
//! - The signature a request carries matches one recomputed from its query
//! - `Signature` is the last query parameter and nothing follows it
//! - Alternative digests and caller overrides are signed consistently

mod common;

use common::*;
use sqs_async::{Permission, ProtocolParameters, RequestOptions, SqsClient};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<Response/>"))
        .mount(server)
        .await;
}

async fn received(server: &MockServer) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
}

#[tokio::test]
async fn test_list_queues_signature_verifies() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let client = create_test_client(&server);
    client
        .list_queues(RequestOptions::new().prefix("orders 2024/*"))
        .unwrap()
        .await
        .unwrap();

    let requests = received(&server).await;
    assert_eq!(requests.len(), 1);
    assert_signature_valid(&server, &requests[0]);

    let query = requests[0].url.query().unwrap_or_default();
    assert!(query.contains("QueueNamePrefix=orders%202024%2F%2A"));
    let last = query.rsplit('&').next().unwrap_or_default();
    assert!(last.starts_with("Signature="));
}

#[tokio::test]
async fn test_queue_url_request_signature_verifies() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let client = create_test_client(&server);
    client
        .add_permission(
            RequestOptions::new()
                .queue(queue_on(&server, "orders"))
                .permissions(vec![
                    Permission::new("first", "111122223333", "SendMessage"),
                    Permission::new("second", "444455556666", "*"),
                ]),
        )
        .unwrap()
        .await
        .unwrap();

    let requests = received(&server).await;
    assert_signature_valid(&server, &requests[0]);
    assert_eq!(requests[0].url.path(), "/123456789012/orders");
    assert_eq!(
        query_value(&requests[0], "ActionName.2").as_deref(),
        Some("*")
    );
    assert_eq!(query_value(&requests[0], "Label").as_deref(), Some("second"));
}

#[tokio::test]
async fn test_hmac_sha1_signature_verifies() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let protocol = ProtocolParameters {
        signature_method: "HmacSHA1".to_string(),
        ..ProtocolParameters::default()
    };
    let client = SqsClient::new(create_test_config(&server).with_protocol(protocol)).unwrap();
    client.list_queues(RequestOptions::new()).unwrap().await.unwrap();

    let requests = received(&server).await;
    assert_eq!(
        query_value(&requests[0], "SignatureMethod").as_deref(),
        Some("HmacSHA1")
    );
    assert_signature_valid(&server, &requests[0]);
}

#[tokio::test]
async fn test_overridden_version_is_signed() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let client = create_test_client(&server);
    client
        .list_queues(RequestOptions::new().with("Version", "2012-11-05"))
        .unwrap()
        .await
        .unwrap();

    let requests = received(&server).await;
    assert_eq!(
        query_value(&requests[0], "Version").as_deref(),
        Some("2012-11-05")
    );
    assert_signature_valid(&server, &requests[0]);
}

#[tokio::test]
async fn test_expires_is_utc_timestamp() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let client = create_test_client(&server);
    client.list_queues(RequestOptions::new()).unwrap().await.unwrap();

    let requests = received(&server).await;
    let expires = query_value(&requests[0], "Expires").expect("Expires is sent");
    assert!(expires.ends_with('Z'));
    assert_eq!(expires.len(), "2009-02-01T12:30:00Z".len());
}
