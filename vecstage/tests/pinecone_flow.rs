mod common;

use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vecstage::{Settings, StagingError, VectorStore};

use common::{fallback_fixture, sized_fixture};

fn settings(server: &MockServer, parquet: std::path::PathBuf) -> Settings {
    Settings {
        parquet_path: parquet,
        index_name: "docs".to_string(),
        dimension: 3,
        batch_size: 2,
        controller_url: server.uri(),
        api_key: Some("key".to_string()),
        ..Settings::default()
    }
}

async fn mount_existing_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [{
                "name": "docs",
                "dimension": 3,
                "host": server.uri(),
                "status": {"ready": true, "state": "Ready"}
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn run_uploads_in_batches_and_validates() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    mount_existing_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vectors": [
                {"id": "doc-0"}, {"id": "doc-1"}, {"id": "doc-2"},
                {"id": "doc-3"}, {"id": "doc-4"}
            ]
        })))
        .mount(&server)
        .await;

    let settings = settings(&server, sized_fixture(dir.path(), 5));
    let control = settings.pinecone_control().unwrap();
    let mut store = VectorStore::new(control, settings).unwrap();

    let report = store.run().await.unwrap();
    assert_eq!(report.upload.batches, 3);
    assert!(report.diff.is_clean());
}

#[tokio::test]
async fn fallback_vector_is_sent_to_pinecone() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    mount_existing_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .and(body_partial_json(json!({
            "vectors": [
                {"id": "a", "values": [1.0, 0.0, 0.0], "metadata": {"title": "Alpha"}},
                {"id": "b", "values": [0.0, 0.0, 1.0], "metadata": {"title": ""}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        embedding_column: "technical_summary_embedding".to_string(),
        ..settings(&server, fallback_fixture(dir.path()))
    };
    let control = settings.pinecone_control().unwrap();
    let mut store = VectorStore::new(control, settings).unwrap();

    store.initialize_index().await.unwrap();
    let summary = store.staging_to_vector_store().await.unwrap();
    assert_eq!(summary.fallbacks, 1);
}

#[tokio::test]
async fn failed_batch_stops_the_upload() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    mount_existing_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server, sized_fixture(dir.path(), 5));
    let control = settings.pinecone_control().unwrap();
    let mut store = VectorStore::new(control, settings).unwrap();

    store.initialize_index().await.unwrap();
    let err = store.staging_to_vector_store().await.unwrap_err();
    assert!(matches!(err, StagingError::Core(_)));
    assert!(err.to_string().contains("boom"));
}
