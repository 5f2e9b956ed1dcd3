//! Core error types
//!
//! Collaborator calls (classification, embedding) distinguish transient
//! failures, which the coordinator may retry, from permanent ones.

use thiserror::Error;

/// Core errors
#[derive(Error, Debug)]
pub enum Error {
    /// Transient collaborator failure (network blip, overload) - retryable
    #[error("transient failure: {0}")]
    Transient(String),

    /// Permanent collaborator failure (bad credentials, unsupported input)
    #[error("permanent failure: {0}")]
    Permanent(String),

    /// Domain label not present in the configured domain set
    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    /// Invalid construction input (empty domain set, duplicate tool id, ...)
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl Error {
    /// Whether the condition is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_flag() {
        assert!(Error::Transient("overloaded".into()).is_transient());
        assert!(!Error::Permanent("bad key".into()).is_transient());
        assert!(!Error::UnknownDomain("WEATHER".into()).is_transient());
    }
}
