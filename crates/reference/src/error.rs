use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataFetchError {
    #[error("reference source unreachable: {0}")]
    Unreachable(String),
    #[error("reference data is missing column `{0}`")]
    MissingColumn(&'static str),
    #[error("reference data is malformed: {0}")]
    Malformed(String),
}
