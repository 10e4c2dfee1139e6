use std::fmt;

/// Failure while importing previously exported point data.
#[derive(Debug)]
pub enum ImportError {
    /// The payload is not the expected JSON shape.
    Parse(serde_json::Error),
    /// A record carried coordinates that cannot be placed on the grid.
    BadRecord { id: String },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Parse(e) => write!(f, "failed to parse import data: {}", e),
            ImportError::BadRecord { id } => {
                write!(f, "record {} has non-finite coordinates", id)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Parse(e) => Some(e),
            ImportError::BadRecord { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::Parse(e)
    }
}
