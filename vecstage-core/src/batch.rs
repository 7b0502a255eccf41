//! Splitting upload records into request-sized batches.

use crate::VectorRecord;

/// Serialized JSON size of one record, the unit the upsert body is made of.
pub fn record_size(record: &VectorRecord) -> usize {
    serde_json::to_vec(record)
        .map(|bytes| bytes.len())
        .unwrap_or(0)
}

/// Groups consecutive records into batches of at most `max_records`
/// entries and, where possible, at most `max_bytes` of serialized records.
/// A record larger than `max_bytes` on its own still gets a batch so the
/// index can reject it with a proper error.
pub fn plan_batches(
    records: &[VectorRecord],
    max_records: usize,
    max_bytes: usize,
) -> Vec<&[VectorRecord]> {
    let max_records = max_records.max(1);
    let mut batches = Vec::new();
    let mut start = 0;
    let mut bytes = 0;

    for (idx, record) in records.iter().enumerate() {
        // +1 for the separating comma
        let size = record_size(record) + 1;
        let count = idx - start;
        if count > 0 && (count >= max_records || bytes + size > max_bytes) {
            batches.push(&records[start..idx]);
            start = idx;
            bytes = 0;
        }
        bytes += size;
    }

    if start < records.len() {
        batches.push(&records[start..]);
    }
    batches
}
