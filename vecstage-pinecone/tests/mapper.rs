use std::collections::HashMap;

use serde_json::json;
use vecstage_core::VectorRecord;
use vecstage_pinecone::mapper::{host_to_base_url, record_to_vector};

#[test]
fn record_metadata_becomes_object() {
    let mut metadata = HashMap::new();
    metadata.insert("title".to_string(), json!("Intro"));
    let record = VectorRecord {
        id: "d1".to_string(),
        values: vec![0.5],
        metadata,
    };

    let vector = record_to_vector(&record);
    assert_eq!(vector.id, "d1");
    assert_eq!(vector.metadata, Some(json!({"title": "Intro"})));
}

#[test]
fn empty_metadata_is_omitted() {
    let record = VectorRecord {
        id: "d1".to_string(),
        values: vec![0.5],
        metadata: HashMap::new(),
    };
    let body = serde_json::to_value(record_to_vector(&record)).unwrap();
    assert!(body.get("metadata").is_none());
}

#[test]
fn host_keeps_explicit_scheme() {
    assert_eq!(host_to_base_url("http://127.0.0.1:9000"), "http://127.0.0.1:9000");
    assert_eq!(host_to_base_url("idx.pinecone.io"), "https://idx.pinecone.io");
}
