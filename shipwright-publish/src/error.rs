//! Error types for artifact publication.

use std::{fmt, io};

use serde::Serialize;

/// Publish protocol steps, used to label failures and log lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStep {
    /// Open a plugin-host session with the API key.
    Authenticate,
    /// Upload the plugin file to the plugin host.
    UploadVersion,
    /// Destroy the plugin-host session.
    DestroySession,
    /// Create a release on the source host.
    CreateRelease,
    /// Upload one release asset to the source host.
    UploadAsset,
}

impl PublishStep {
    /// Human-readable step label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStep::Authenticate => "authenticate",
            PublishStep::UploadVersion => "upload_version",
            PublishStep::DestroySession => "destroy_session",
            PublishStep::CreateRelease => "create_release",
            PublishStep::UploadAsset => "upload_asset",
        }
    }
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for publish operations.
#[derive(Debug)]
pub enum PublishError {
    /// The HTTP request could not be sent or its response not read.
    Request {
        /// Step that failed.
        step: PublishStep,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The service answered with an unexpected status code.
    Status {
        /// Step that failed.
        step: PublishStep,
        /// Numeric HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Response body, if any.
        body: String,
    },
    /// The response body was missing a required field or was not JSON.
    Decode {
        /// Step that failed.
        step: PublishStep,
        /// Description of the problem.
        message: String,
    },
    /// An artifact could not be read.
    Io {
        /// Step that failed.
        step: PublishStep,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl PublishError {
    /// Step the error occurred in.
    pub fn step(&self) -> PublishStep {
        match self {
            Self::Request { step, .. }
            | Self::Status { step, .. }
            | Self::Decode { step, .. }
            | Self::Io { step, .. } => *step,
        }
    }

    /// HTTP status code, for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn request(step: PublishStep, source: reqwest::Error) -> Self {
        Self::Request { step, source }
    }

    pub(crate) fn decode(step: PublishStep, message: impl Into<String>) -> Self {
        Self::Decode {
            step,
            message: message.into(),
        }
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { step, source } => write!(f, "{step} request failed: {source}"),
            Self::Status {
                step,
                status,
                reason,
                body,
            } => {
                write!(
                    f,
                    "{step} failed: status code {status}, status phrase {reason}"
                )?;
                if !body.trim().is_empty() {
                    write!(f, ": {}", body.trim())?;
                }
                Ok(())
            }
            Self::Decode { step, message } => write!(f, "{step} response invalid: {message}"),
            Self::Io { step, source } => write!(f, "{step} io error: {source}"),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::Status { .. } | Self::Decode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_code_and_reason() {
        let error = PublishError::Status {
            step: PublishStep::UploadVersion,
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: "boom\n".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "upload_version failed: status code 500, status phrase Internal Server Error: boom"
        );
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.step(), PublishStep::UploadVersion);
    }

    #[test]
    fn status_error_omits_empty_body() {
        let error = PublishError::Status {
            step: PublishStep::Authenticate,
            status: 401,
            reason: "Unauthorized".to_string(),
            body: String::new(),
        };
        assert_eq!(
            error.to_string(),
            "authenticate failed: status code 401, status phrase Unauthorized"
        );
    }

    #[test]
    fn decode_and_io_errors_format() {
        let decode = PublishError::decode(PublishStep::CreateRelease, "missing upload_url");
        assert_eq!(
            decode.to_string(),
            "create_release response invalid: missing upload_url"
        );
        assert_eq!(decode.status(), None);

        let io = PublishError::Io {
            step: PublishStep::UploadAsset,
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.to_string(), "upload_asset io error: gone");
    }

    #[test]
    fn step_labels_are_stable() {
        assert_eq!(PublishStep::Authenticate.as_str(), "authenticate");
        assert_eq!(PublishStep::DestroySession.as_str(), "destroy_session");
        assert_eq!(PublishStep::UploadAsset.to_string(), "upload_asset");
    }
}
