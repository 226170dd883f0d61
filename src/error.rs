use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConciergeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("not authorized")]
    NotAuthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("no LLM provider available: {0}")]
    ProviderUnavailable(String),
    #[error("data source unavailable: {0}")]
    DataSourceUnavailable(String),
}

impl From<diesel::result::Error> for ConciergeError {
    fn from(err: diesel::result::Error) -> Self {
        ConciergeError::Storage(err.to_string())
    }
}

pub use crate::Result;
