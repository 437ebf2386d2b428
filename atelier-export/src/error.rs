//! Error types for the export library

use thiserror::Error;

/// Export error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    /// Character outside the target encoding's repertoire
    #[error("Character '{character}' (U+{codepoint:04X}) cannot be encoded as {encoding}")]
    Unencodable {
        character: char,
        codepoint: u32,
        encoding: &'static str,
    },

    /// A field failed to encode; carries the column name
    #[error("Field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: Box<ExportError>,
    },

    /// Row shape does not match the layout
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

impl ExportError {
    /// The offending character, looking through field context
    pub fn unencodable_char(&self) -> Option<char> {
        match self {
            Self::Unencodable { character, .. } => Some(*character),
            Self::Field { source, .. } => source.unencodable_char(),
            Self::InvalidRow(_) => None,
        }
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
