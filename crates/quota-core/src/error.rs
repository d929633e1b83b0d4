//! Error types for quota queries

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Validation Errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Directory Errors
    #[error("LDAP connection failed: {0}")]
    Connection(String),

    #[error("LDAP bind failed: {0}")]
    Bind(String),

    #[error("LDAP search failed: {0}")]
    Search(String),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::Configuration(_) => "ConfigurationError",
            Error::Connection(_) => "ConnectionError",
            Error::Bind(_) => "BindError",
            Error::Search(_) => "SearchError",
        }
    }

    /// Whether the error was caused by caller input rather than the directory
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::InvalidArgument("x".into()).code(),
            "InvalidArgument"
        );
        assert_eq!(Error::Bind("rc=49".into()).code(), "BindError");
        assert_eq!(Error::Connection("refused".into()).code(), "ConnectionError");
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::InvalidArgument("x".into()).is_client_error());
        assert!(!Error::Search("timeout".into()).is_client_error());
    }

    #[test]
    fn test_display() {
        let err = Error::InvalidArgument("'staff' is not a quota class".into());
        assert_eq!(
            err.to_string(),
            "Invalid argument: 'staff' is not a quota class"
        );
    }
}
