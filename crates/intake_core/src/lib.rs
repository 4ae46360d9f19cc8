//! Submission side of the intake form: validating a selection, uploading
//! photos to the storage webhook and appending rows to the sheet webhook.

mod coordinator;
pub mod error;
mod folder;
mod selection;
mod webhook;

pub use coordinator::{
    build_records, SubmissionCoordinator, SubmitOutcome, SubmitPhase, SUCCESS_MESSAGE,
};
pub use error::{AppendError, SubmissionError, UploadError, ValidationError};
pub use folder::{
    build_folder_name, format_timestamp, jakarta_offset, Clock, SystemClock,
    JAKARTA_UTC_OFFSET_SECS, TIMESTAMP_FORMAT,
};
pub use selection::{is_valid, parse_quantity, validate, Selection};
pub use webhook::{
    append_entries, encode_images, upload_assets, AppendAck, HttpWebhookClient, WebhookClient,
    WebhookEndpoints,
};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod coordinator_tests;

#[cfg(test)]
#[path = "tests/webhook_tests.rs"]
mod webhook_tests;
