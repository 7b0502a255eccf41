#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::{ArrayRef, RecordBatch, StringArray};
use parquet::arrow::ArrowWriter;

pub fn write_parquet(dir: &Path, name: &str, columns: Vec<(&str, ArrayRef)>) -> PathBuf {
    let batch = RecordBatch::try_from_iter(columns).unwrap();
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}

pub fn strings(values: Vec<Option<&str>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

pub fn vector_json(values: &[f32]) -> String {
    serde_json::to_string(values).unwrap()
}

/// Two rows matching the fallback example: `a` has no technical summary
/// vector, `b` has both.
pub fn fallback_fixture(dir: &Path) -> PathBuf {
    let a_page = vector_json(&[1.0, 0.0, 0.0]);
    let b_page = vector_json(&[0.0, 1.0, 0.0]);
    let b_tech = vector_json(&[0.0, 0.0, 1.0]);

    write_parquet(
        dir,
        "staging.parquet",
        vec![
            ("id", strings(vec![Some("a"), Some("b")])),
            ("title", strings(vec![Some("Alpha"), None])),
            ("content", strings(vec![Some("dup a"), Some("dup b")])),
            (
                "page_content_embedding",
                strings(vec![Some(&a_page), Some(&b_page)]),
            ),
            (
                "technical_summary_embedding",
                strings(vec![None, Some(&b_tech)]),
            ),
        ],
    )
}

/// `rows` rows of 3-dimensional page content vectors.
pub fn sized_fixture(dir: &Path, rows: usize) -> PathBuf {
    let ids: Vec<String> = (0..rows).map(|i| format!("doc-{i}")).collect();
    let vectors: Vec<String> = (0..rows)
        .map(|i| vector_json(&[i as f32, 1.0, 2.0]))
        .collect();

    write_parquet(
        dir,
        "sized.parquet",
        vec![
            ("id", strings(ids.iter().map(|s| Some(s.as_str())).collect())),
            (
                "page_content_embedding",
                strings(vectors.iter().map(|s| Some(s.as_str())).collect()),
            ),
        ],
    )
}
