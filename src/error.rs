use serde::Serialize;
use std::time::Duration;

/// Rejected user input. Never mutates state; the UI shows the message inline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid page number. Please enter a value between {pages_read} and {total_pages}.")]
    PageOutOfRange {
        page_mark: u32,
        pages_read: u32,
        total_pages: u32,
    },

    #[error("Invalid page number {input:?}. Please enter a value between {pages_read} and {total_pages}.")]
    NotANumber {
        input: String,
        pages_read: u32,
        total_pages: u32,
    },

    #[error("Book title cannot be empty")]
    EmptyTitle,

    #[error("A book titled {0:?} already exists")]
    DuplicateTitle(String),

    #[error("Total pages must be a positive whole number, got {0:?}")]
    InvalidTotalPages(String),

    #[error("No log entry on {0} for this book")]
    UnknownLogDate(String),
}

/// All errors that can occur while tracking reading progress.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Log store responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Log store did not answer within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Custom(String),
}

// Tauri requires error types to implement Serialize for IPC transport.
impl Serialize for TrackerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
