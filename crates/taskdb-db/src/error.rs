use mongodb::error::ErrorKind;
use thiserror::Error;

/// Server error code for a `$regex` the server cannot compile.
const INVALID_REGEX_CODE: i32 = 51091;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Document decode error: {0}")]
    Decode(String),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Driver failures that mean the server could not be reached.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Error::Connection(_) => true,
            Error::Mongo(e) => matches!(
                *e.kind,
                ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. }
            ),
            _ => false,
        }
    }

    /// The server rejected a filter pattern.
    pub fn is_invalid_pattern(&self) -> bool {
        match self {
            Error::Mongo(e) => matches!(
                &*e.kind,
                ErrorKind::Command(command) if command.code == INVALID_REGEX_CODE
            ),
            _ => false,
        }
    }
}

impl From<Error> for taskdb_core::Error {
    fn from(err: Error) -> Self {
        if err.is_unreachable() {
            return taskdb_core::Error::ConnectionFailure(err.to_string());
        }
        if err.is_invalid_pattern() {
            return taskdb_core::Error::InvalidFilter(err.to_string());
        }

        match err {
            Error::InvalidField(msg) => taskdb_core::Error::InvalidField(msg),
            Error::Decode(msg) => taskdb_core::Error::Decode(msg),
            Error::Other(e) => taskdb_core::Error::Other(e),
            other => taskdb_core::Error::Store(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
