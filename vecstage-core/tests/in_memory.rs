use std::collections::HashMap;

use vecstage_core::{
    CoreError, IndexControl, IndexSpec, MemoryControl, VectorIndex, VectorRecord,
};

fn record(id: &str, values: Vec<f32>) -> VectorRecord {
    VectorRecord {
        id: id.to_string(),
        values,
        metadata: HashMap::new(),
    }
}

#[tokio::test]
async fn ensure_index_is_idempotent() {
    let control = MemoryControl::new();
    let spec = IndexSpec::new("docs", 2);

    let first = control.ensure_index(&spec).await.unwrap();
    first.upsert(&[record("a", vec![1.0, 2.0])]).await.unwrap();
    let second = control.ensure_index(&spec).await.unwrap();

    assert_eq!(control.created(), 1);
    assert_eq!(second.list_ids().await.unwrap(), vec!["a".to_string()]);
}

#[tokio::test]
async fn upsert_overwrites_and_checks_dimension() {
    let control = MemoryControl::new();
    let index = control.ensure_index(&IndexSpec::new("docs", 2)).await.unwrap();

    index.upsert(&[record("a", vec![1.0, 2.0])]).await.unwrap();
    index.upsert(&[record("a", vec![3.0, 4.0])]).await.unwrap();
    assert_eq!(index.len().await, 1);
    assert_eq!(index.get("a").await.unwrap().values, vec![3.0, 4.0]);
    assert_eq!(index.upsert_calls().await, 2);

    let err = index.upsert(&[record("b", vec![1.0])]).await.unwrap_err();
    assert!(matches!(err, CoreError::DimensionMismatch { expected: 2, got: 1, .. }));
}

#[tokio::test]
async fn open_index_never_creates() {
    let control = MemoryControl::new();

    let err = control.open_index("docs").await.unwrap_err();
    assert!(matches!(err, CoreError::IndexNotFound(ref name) if name == "docs"));
    assert_eq!(control.created(), 0);
    assert!(control.index("docs").await.is_none());

    control.ensure_index(&IndexSpec::new("docs", 2)).await.unwrap();
    let opened = control.open_index("docs").await.unwrap();
    assert_eq!(opened.dimension().await, 2);
    assert_eq!(control.created(), 1);
}
