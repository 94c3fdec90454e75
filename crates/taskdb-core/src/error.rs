use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid task identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid task field: {0}")]
    InvalidField(String),

    #[error("Invalid filter pattern: {0}")]
    InvalidFilter(String),

    #[error("Store connection failure: {0}")]
    ConnectionFailure(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Failed to decode stored task: {0}")]
    Decode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
