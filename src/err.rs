use std::path::PathBuf;

/// Errors raised by the interpretation engine.
///
/// Only `NotFound` on the primary variant file and `UnsupportedGene` are fatal for a
/// command; `NotFound` on reference tables means "no curated data for this gene".
#[derive(thiserror::Error, Debug)]
pub enum PgxError {
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("problem processing input: {0}")]
    Processing(String),
    #[error("unsupported gene: {0}")]
    UnsupportedGene(String),
}

impl PgxError {
    /// Wrap any displayable fault into `PgxError::Processing`.
    pub fn processing<E: std::fmt::Display>(e: E) -> Self {
        PgxError::Processing(e.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PgxError::NotFound(_))
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn processing_wraps_message() {
        let err = super::PgxError::processing("bad gzip header");
        assert_eq!(err.to_string(), "problem processing input: bad gzip header");
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_not_found() {
        let err = super::PgxError::NotFound("x.vcf".into());
        assert!(err.is_not_found());
    }
}
