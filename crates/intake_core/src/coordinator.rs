use std::sync::Arc;

use serde::Serialize;
use shared::{
    domain::PhotoFile,
    protocol::{SubmissionRecord, SubmitResponse, SubmitStatus},
};
use tracing::{debug, error, info};

use crate::{
    error::{AppendError, SubmissionError},
    folder::{build_folder_name, format_timestamp, Clock, SystemClock},
    selection::{validate, Selection},
    webhook::{append_entries, upload_assets, AppendAck, WebhookClient},
};

pub const SUCCESS_MESSAGE: &str = "Data and photos submitted successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    Idle,
    Validating,
    Uploading,
    Appending,
    Done,
    Failed,
}

/// Result of one submit click. `phase` is always `Done` or `Failed`.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub phase: SubmitPhase,
    /// The phase that was running when the submission failed.
    pub failed_during: Option<SubmitPhase>,
    pub folder_name: Option<String>,
    pub folder_url: Option<String>,
    pub records: Vec<SubmissionRecord>,
    pub ack: Option<AppendAck>,
    pub debug: Vec<String>,
    pub error: Option<SubmissionError>,
}

impl SubmitOutcome {
    fn idle() -> Self {
        Self {
            phase: SubmitPhase::Idle,
            failed_during: None,
            folder_name: None,
            folder_url: None,
            records: Vec::new(),
            ack: None,
            debug: Vec::new(),
            error: None,
        }
    }

    /// Outcome for a failure raised outside the coordinator, such as a
    /// panicked submit task.
    pub fn unexpected(message: impl Into<String>) -> Self {
        let mut outcome = Self::idle();
        outcome.phase = SubmitPhase::Failed;
        outcome.error = Some(SubmissionError::Unexpected(message.into()));
        outcome
    }

    pub fn is_done(&self) -> bool {
        self.phase == SubmitPhase::Done
    }

    pub fn message(&self) -> String {
        match &self.error {
            Some(err) => err.user_message(),
            None => SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn to_response(&self) -> SubmitResponse {
        SubmitResponse {
            status: if self.is_done() {
                SubmitStatus::Done
            } else {
                SubmitStatus::Failed
            },
            message: self.message(),
            folder_name: self.folder_name.clone(),
            folder_url: self.folder_url.clone(),
            entries_appended: if self.is_done() { self.records.len() } else { 0 },
            debug: self.debug.clone(),
        }
    }

    fn advance(&mut self, phase: SubmitPhase) {
        debug!(from = ?self.phase, to = ?phase, "submit phase");
        self.phase = phase;
    }

    fn fail(mut self, err: impl Into<SubmissionError>) -> Self {
        let err = err.into();
        error!(phase = ?self.phase, error = %err, "submission failed");
        self.failed_during = Some(self.phase);
        self.phase = SubmitPhase::Failed;
        self.error = Some(err);
        self
    }
}

/// One record per item with a positive quantity, in selection order.
pub fn build_records(
    selection: &Selection,
    timestamp: &str,
    folder_url: &str,
) -> Vec<SubmissionRecord> {
    selection
        .received()
        .map(|(item, quantity)| SubmissionRecord {
            timestamp: timestamp.to_string(),
            database: selection.database.clone(),
            po_number: selection.po_number.clone(),
            item: item.clone(),
            quantity,
            folder_url: folder_url.to_string(),
        })
        .collect()
}

/// Runs upload then append for one submit click.
///
/// The append step only runs after a successful upload. A failed append does
/// not remove the uploaded folder.
pub struct SubmissionCoordinator {
    webhooks: Arc<dyn WebhookClient>,
    clock: Arc<dyn Clock>,
}

impl SubmissionCoordinator {
    pub fn new(webhooks: Arc<dyn WebhookClient>) -> Self {
        Self::with_clock(webhooks, Arc::new(SystemClock))
    }

    pub fn with_clock(webhooks: Arc<dyn WebhookClient>, clock: Arc<dyn Clock>) -> Self {
        Self { webhooks, clock }
    }

    pub async fn submit(&self, selection: &Selection, files: &[PhotoFile]) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::idle();

        outcome.advance(SubmitPhase::Validating);
        if let Err(err) = validate(selection) {
            return outcome.fail(err);
        }

        let timestamp = format_timestamp(self.clock.now());
        let folder_name = build_folder_name(
            selection.database.as_str(),
            selection.po_number.as_str(),
            &timestamp,
        );
        outcome.folder_name = Some(folder_name.clone());

        outcome.advance(SubmitPhase::Uploading);
        let folder_url = match upload_assets(self.webhooks.as_ref(), files, &folder_name).await {
            Ok(folder_url) => folder_url,
            Err(err) => return outcome.fail(err),
        };
        outcome
            .debug
            .push(format!("Drive upload folder URL: {folder_url}"));
        outcome.folder_url = Some(folder_url.clone());

        outcome.advance(SubmitPhase::Appending);
        let records = build_records(selection, &timestamp, &folder_url);
        outcome.records = records.clone();
        match append_entries(self.webhooks.as_ref(), records).await {
            Ok(ack) => {
                outcome.debug.extend(ack_debug_lines(ack.status, &ack.body));
                outcome.ack = Some(ack);
                outcome.advance(SubmitPhase::Done);
                info!(
                    %folder_name,
                    entries = outcome.records.len(),
                    "submission complete"
                );
                outcome
            }
            Err(err) => {
                if let AppendError::Status { status, body } = &err {
                    outcome.debug.extend(ack_debug_lines(*status, body));
                }
                outcome.fail(err)
            }
        }
    }
}

fn ack_debug_lines(status: u16, body: &str) -> [String; 2] {
    [
        format!("Sheet POST status code: {status}"),
        format!("Sheet POST response text: {body}"),
    ]
}
