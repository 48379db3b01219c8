use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Payload conversion error: {0}")]
    PayloadConversionError(#[from] serde_json::Error),

    #[error("Sink publish error: {0}")]
    SinkError(#[source] anyhow::Error),

    #[error("Store error: {0}")]
    StoreError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
