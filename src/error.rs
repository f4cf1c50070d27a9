// src/error.rs

use thiserror::Error;

/// Why a single sheet could not be turned into a table.
///
/// None of these abort a run: the sheet is logged and left out of the cache.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to fetch {sheet}: {reason}")]
    Transport { sheet: String, reason: String },

    #[error("malformed response for {sheet}: {reason}")]
    MalformedResponse { sheet: String, reason: String },

    #[error("no data found in {0}")]
    MissingTableData(String),
}

impl SheetError {
    /// Name of the sheet the error belongs to.
    pub fn sheet(&self) -> &str {
        match self {
            SheetError::Transport { sheet, .. } => sheet,
            SheetError::MalformedResponse { sheet, .. } => sheet,
            SheetError::MissingTableData(sheet) => sheet,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SheetError::Transport { .. } => "transport",
            SheetError::MalformedResponse { .. } => "malformed_response",
            SheetError::MissingTableData(_) => "missing_table_data",
        }
    }
}
