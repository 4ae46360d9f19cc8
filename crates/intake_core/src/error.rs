use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter quantity for at least one item.")]
    NoPositiveQuantity,
    #[error("Unknown database `{0}`.")]
    UnknownDatabase(String),
    #[error("PO `{po_number}` is not listed for database `{database}`.")]
    UnknownPurchaseOrder { database: String, po_number: String },
    #[error("Item `{item}` is not listed for PO `{po_number}`.")]
    UnknownItem { po_number: String, item: String },
    #[error("Quantity for `{item}` must be a whole number of at least 0, got `{value}`.")]
    InvalidQuantity { item: String, value: String },
    #[error("Unsupported photo `{0}`; only jpg, jpeg and png are accepted.")]
    UnsupportedPhoto(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Drive Error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("upload request failed: {0}")]
    Transport(String),
    #[error("upload response is not valid JSON: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppendError {
    #[error("Sheet Error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("append request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Append(#[from] AppendError),
    #[error("{0}")]
    Unexpected(String),
}

impl SubmissionError {
    /// Text shown inline on the form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Upload(err @ UploadError::Status { .. }) => err.to_string(),
            Self::Append(err @ AppendError::Status { .. }) => err.to_string(),
            other => format!("Submission failed: {other}"),
        }
    }
}
