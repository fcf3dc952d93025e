use thiserror::Error;

/// Errors raised while converting one file or finalizing the table.
///
/// All scan errors are fatal for the file they occur in: a malformed call
/// invalidates confidence in the surrounding boundary detection, so no
/// partial recovery is attempted. Every variant that comes out of a scan
/// carries the file and (1-based) line it was detected at.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{file}:{line}: unterminated {what}")]
    UnterminatedLiteral {
        file: String,
        line: usize,
        what: &'static str,
    },

    #[error("{file}:{line}: malformed {identifier} call: {reason}")]
    MalformedCall {
        file: String,
        line: usize,
        identifier: String,
        reason: String,
    },

    #[error("{file}:{line}: invalid format specifiers in {format:?}")]
    InvalidFormat {
        file: String,
        line: usize,
        format: String,
    },

    #[error("message id space exhausted ({bits}-bit ids)")]
    TableOverflow { bits: u8 },

    #[error("{path}:{line}: malformed message table record")]
    BadTableRecord { path: String, line: usize },

    #[error("{path}: invalid config: {source}")]
    Config {
        path: String,
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
