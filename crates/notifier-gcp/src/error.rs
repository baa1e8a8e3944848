//! Error types for the REST adapters.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for REST adapter operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Credentials could not be loaded or the token grant failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Reading the service account key file failed.
    #[error("Key file error: {0}")]
    KeyFile(#[from] std::io::Error),

    /// A long-running operation finished with an error.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Creates a status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code of this error, when it carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Whether the API reported the resource as already existing.
    pub fn is_already_exists(&self) -> bool {
        self.status_code() == Some(409)
    }

    /// Converts into the core error type.
    pub fn into_core(self) -> notifier_core::Error {
        notifier_core::Error::from(self)
    }
}

impl From<Error> for notifier_core::Error {
    fn from(err: Error) -> Self {
        use notifier_core::Error as Core;

        match err {
            Error::Http(e) => {
                if e.is_timeout() {
                    Core::timeout().with_message(e.to_string()).with_source(e)
                } else if e.is_connect() {
                    Core::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else {
                    Core::network_error().with_message(e.to_string()).with_source(e)
                }
            }
            Error::Status { status, ref message } => {
                let core = match status {
                    401 => Core::authentication(),
                    403 => Core::authorization(),
                    404 => Core::not_found(),
                    408 => Core::timeout(),
                    409 => Core::already_exists(),
                    _ => Core::external_error(),
                };
                core.with_message(message.clone()).with_source(err)
            }
            Error::Serde(e) => Core::serialization().with_message(e.to_string()).with_source(e),
            Error::Auth(message) => Core::authentication().with_message(message),
            Error::KeyFile(e) => Core::configuration()
                .with_message("failed to read service account key file")
                .with_source(e),
            Error::Operation(message) => Core::external_error().with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use notifier_core::ErrorKind;

    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(Error::status(404, "missing").is_not_found());
        assert!(Error::status(409, "exists").is_already_exists());
        assert!(!Error::status(500, "boom").is_not_found());
    }

    #[test]
    fn test_status_mapping_to_core() {
        let cases = [
            (401, ErrorKind::Authentication),
            (403, ErrorKind::Authorization),
            (404, ErrorKind::NotFound),
            (409, ErrorKind::AlreadyExists),
            (500, ErrorKind::ExternalError),
        ];
        for (status, expected) in cases {
            let core = Error::status(status, "msg").into_core();
            assert_eq!(core.kind, expected, "status {status}");
        }
    }

    #[test]
    fn test_auth_mapping() {
        let core = Error::Auth("bad grant".to_owned()).into_core();
        assert_eq!(core.kind, ErrorKind::Authentication);
        assert_eq!(core.message.as_deref(), Some("bad grant"));
    }
}
