use serde::{Deserialize, Serialize};

use crate::domain::{DatabaseName, ItemName, PoNumber};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub filename: String,
    /// Standard base64 of the raw file bytes.
    pub content: String,
}

/// Body sent to the file-storage webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub folder_name: String,
    pub images: Vec<ImagePayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "folderUrl", default)]
    pub folder_url: Option<String>,
}

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub timestamp: String,
    pub database: DatabaseName,
    pub po_number: PoNumber,
    pub item: ItemName,
    pub quantity: u32,
    pub folder_url: String,
}

/// Body sent to the spreadsheet-append webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendRequest {
    pub entries: Vec<SubmissionRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    Done,
    Failed,
}

/// What the form shows after a submit click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: SubmitStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_url: Option<String>,
    pub entries_appended: usize,
    #[serde(default)]
    pub debug: Vec<String>,
}
