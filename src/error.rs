//! Crate-wide error type.

use thiserror::Error;

/// Errors reported by alignment, mutation and matrix operations.
///
/// Not-found outcomes (no local hit, exhausted matcher) are never errors; they
/// surface as `Option::None` or an empty [`crate::Alignment`].
#[derive(Debug, Error)]
pub enum AlignError {
    /// Caller passed an argument that violates a documented precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Data disagrees with itself, e.g. a mutation records a letter the
    /// sequence does not have.
    #[error("inconsistent data: {0}")]
    InconsistentData(String),

    /// Malformed mutation text, BTOP string or hit record.
    #[error("parse error: {0}")]
    Parse(String),

    /// Malformed BLAST substitution matrix.
    #[error("malformed substitution matrix: {0}")]
    Matrix(String),

    /// External aligner exited abnormally or closed its stream early.
    #[error("external aligner failed: {0}")]
    Process(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("binary serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlignError>;

pub(crate) fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(AlignError::InvalidArgument(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = AlignError::InvalidArgument("range 5..2".into());
        assert_eq!(e.to_string(), "invalid argument: range 5..2");
        let e = AlignError::Matrix("row 3 has 2 values".into());
        assert!(e.to_string().contains("row 3"));
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(AlignError::Io(_))));
    }
}
