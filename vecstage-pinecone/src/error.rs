use thiserror::Error;
use vecstage_core::CoreError;

#[derive(Debug, Error)]
pub enum PineconeError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error(
        "pinecone api error {status}: {message} (retry_after={retry_after_seconds:?}, namespace={namespace:?}, batch_size={batch_size:?})"
    )]
    Api {
        status: u16,
        message: String,
        retry_after_seconds: Option<u64>,
        namespace: Option<String>,
        batch_size: Option<usize>,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("index '{index}' not ready after {waited_secs}s (state={state:?})")]
    NotReady {
        index: String,
        waited_secs: u64,
        state: Option<String>,
    },
}

impl PineconeError {
    pub fn status(&self) -> Option<u16> {
        match self {
            PineconeError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<PineconeError> for CoreError {
    fn from(value: PineconeError) -> Self {
        CoreError::Index(Box::new(value))
    }
}
