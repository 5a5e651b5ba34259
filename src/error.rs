use crate::domain::payment::PaymentStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Remote store error: {0}")]
    RemoteStore(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),
    #[error("Cannot move payment from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdminError {
    /// Wraps any adapter failure so it surfaces with its original message.
    pub fn remote<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::RemoteStore(err.into())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::RemoteStore(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for AdminError {
    fn from(err: rocksdb::Error) -> Self {
        Self::RemoteStore(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
