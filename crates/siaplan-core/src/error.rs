use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("could not extract text from the document. The file may be image-based or corrupted.")]
    EmptyDocument,

    #[error("template asset {path} could not be used: {reason}")]
    TemplateAsset { path: PathBuf, reason: String },

    #[error("no team page configured for {team}")]
    MissingTeamPage { team: String },

    #[error("failed to render document: {0}")]
    Render(String),

    #[error("invalid fee schedule: {0}")]
    ScheduleInvalid(String),

    #[error("failed to load settings from {path}: {reason}")]
    SettingsLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
