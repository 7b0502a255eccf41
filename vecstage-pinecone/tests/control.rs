use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vecstage_core::{CoreError, IndexControl, IndexSpec};
use vecstage_pinecone::{PineconeControl, PineconeError};

fn control(server: &MockServer) -> PineconeControl {
    PineconeControl::builder()
        .api_key("key")
        .controller_url(server.uri())
        .poll_interval(Duration::from_millis(10))
        .ready_timeout(Duration::from_millis(200))
        .build()
        .unwrap()
}

#[tokio::test]
async fn existing_index_is_not_recreated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [{
                "name": "docs",
                "dimension": 3072,
                "metric": "cosine",
                "host": server.uri(),
                "status": {"ready": true, "state": "Ready"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let index = control(&server)
        .ensure_index(&IndexSpec::new("docs", 3072))
        .await
        .unwrap();
    assert_eq!(index.name(), "docs");
    assert_eq!(index.host(), server.uri());
}

#[tokio::test]
async fn missing_index_is_created_with_serverless_spec() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexes": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .and(body_partial_json(json!({
            "name": "docs",
            "dimension": 4,
            "metric": "cosine",
            "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "docs",
            "dimension": 4,
            "status": {"ready": false, "state": "Initializing"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "docs",
            "dimension": 4,
            "host": server.uri(),
            "status": {"ready": true, "state": "Ready"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let index = control(&server)
        .ensure_index(&IndexSpec::new("docs", 4))
        .await
        .unwrap();
    assert_eq!(index.host(), server.uri());
}

#[tokio::test]
async fn conflict_on_create_is_treated_as_existing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexes": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            json!({"error": {"code": "ALREADY_EXISTS", "message": "Resource already exists"}}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "docs",
            "dimension": 4,
            "host": server.uri(),
            "status": {"ready": true}
        })))
        .mount(&server)
        .await;

    assert!(control(&server)
        .ensure(&IndexSpec::new("docs", 4))
        .await
        .is_ok());
}

#[tokio::test]
async fn index_that_never_becomes_ready_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexes": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "docs"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "docs",
            "status": {"ready": false, "state": "Initializing"}
        })))
        .mount(&server)
        .await;

    let err = control(&server)
        .ensure(&IndexSpec::new("docs", 4))
        .await
        .unwrap_err();
    assert!(matches!(err, PineconeError::NotReady { ref state, .. } if state.as_deref() == Some("Initializing")));
}

#[tokio::test]
async fn create_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexes": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"error": {"message": "quota exceeded"}})),
        )
        .mount(&server)
        .await;

    let err = control(&server)
        .ensure(&IndexSpec::new("docs", 4))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn open_binds_existing_index_without_listing_or_creating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "docs",
            "dimension": 4,
            "host": server.uri(),
            "status": {"ready": true, "state": "Ready"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let index = control(&server).open_index("docs").await.unwrap();
    assert_eq!(index.name(), "docs");
    assert_eq!(index.host(), server.uri());
}

#[tokio::test]
async fn open_reports_missing_index_without_creating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes/docs"))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            json!({"error": {"code": "NOT_FOUND", "message": "Resource docs not found"}}),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = control(&server).open_index("docs").await.unwrap_err();
    assert!(matches!(err, CoreError::IndexNotFound(ref name) if name == "docs"));
}
