//! End-to-end request behavior against a mock backend: retry policy,
//! timeout classification, error message extraction, and session
//! clearing on rejected credentials.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use translatecloud_client::{
    session_event_channel, ApiClient, ApiClientConfig, ApiError, ErrorCategory, Payload,
    RequestDescriptor, SessionEvent, TIMEOUT_STATUS,
};
use translatecloud_session::{MemoryStorage, SessionStore};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(base_url: String) -> ApiClientConfig {
    ApiClientConfig {
        base_url,
        timeout: Duration::from_secs(5),
        max_attempts: 3,
        retry_base_delay: Duration::from_millis(10),
    }
}

fn new_store() -> Arc<SessionStore> {
    Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())))
}

#[tokio::test]
async fn exhausts_retries_on_persistent_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");

    let started = Instant::now();
    let err = client.execute(RequestDescriptor::get("/busy")).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(err.category(), ErrorCategory::Server);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    // 10ms then 20ms of backoff between the three tries.
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[tokio::test]
async fn rate_limiting_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");
    let err = client.execute(RequestDescriptor::get("/quota")).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::RateLimit);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    for status in [400_u16, 403, 404, 422] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");
        let err = client.execute(RequestDescriptor::get("/denied")).await.unwrap_err();

        assert_eq!(err.status(), Some(status));
        assert_eq!(err.category(), ErrorCategory::Client, "status {status}");
        assert_eq!(server.received_requests().await.unwrap().len(), 1, "status {status}");
    }
}

#[tokio::test]
async fn timeout_maps_to_sentinel_status_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ApiClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_millis(100),
        max_attempts: 3,
        retry_base_delay: Duration::from_millis(10),
    };
    let client = ApiClient::new(config, new_store()).expect("api client");

    let err = client.execute(RequestDescriptor::get("/slow")).await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout(_)));
    assert_eq!(err.status(), Some(TIMEOUT_STATUS));
    assert_eq!(err.category(), ErrorCategory::Timeout);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn error_message_prefers_detail_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": "source language is required",
            "field": "source_lang"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");
    let err = client
        .execute(RequestDescriptor::post("/api/translations").json_value(json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.message(), Some("source language is required"));
    assert_eq!(err.details().and_then(|d| d["field"].as_str()), Some("source_lang"));
}

#[tokio::test]
async fn error_message_falls_back_to_generic_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");
    let err = client.execute(RequestDescriptor::get("/missing")).await.unwrap_err();

    assert_eq!(err.message(), Some("HTTP 404: Not Found"));
}

#[tokio::test]
async fn unauthorized_clears_store_and_notifies_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = new_store();
    store.set("expired-tok", 3600).await.unwrap();

    let (tx, mut rx) = session_event_channel();
    let client = ApiClient::builder()
        .config(fast_config(server.uri()))
        .session(store.clone())
        .events(tx)
        .build()
        .expect("api client");

    let err = client.execute(RequestDescriptor::get("/api/users/me")).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Auth);
    assert_eq!(err.message(), Some("token expired"));
    assert!(!store.is_valid().await);
    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn query_parameters_reach_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(query_param("page", "2"))
        .and(query_param("q", "hello world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");
    let descriptor = RequestDescriptor::get("/api/projects")
        .query("page", 2)
        .query("q", "hello world")
        .query_opt("status", None::<&str>);

    let payload = client.execute(descriptor).await.expect("payload");
    assert_eq!(payload, Payload::Json(json!([])));
}

#[tokio::test]
async fn typed_request_decodes_response() {
    #[derive(serde::Deserialize)]
    struct Project {
        id: u64,
        name: String,
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "name": "docs"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");
    let project: Project = client.get("/api/projects/7").await.expect("project");

    assert_eq!(project.id, 7);
    assert_eq!(project.name, "docs");
}

#[tokio::test]
async fn health_check_reports_status_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let client = ApiClient::new(fast_config(server.uri()), new_store()).expect("api client");
    assert!(client.health_check().await.expect("health"));
}
