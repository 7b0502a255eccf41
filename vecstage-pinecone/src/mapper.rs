use serde_json::Value;
use vecstage_core::VectorRecord;

use crate::types::PineconeVector;

pub fn record_to_vector(record: &VectorRecord) -> PineconeVector {
    let metadata = if record.metadata.is_empty() {
        None
    } else {
        Some(Value::Object(serde_json::Map::from_iter(
            record
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        )))
    };

    PineconeVector {
        id: record.id.clone(),
        values: record.values.clone(),
        metadata,
    }
}

/// Index hosts come back from the control plane without a scheme.
pub fn host_to_base_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
