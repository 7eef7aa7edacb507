//! The single failure type surfaced by the client core.
//!
//! Every resource operation either returns its typed value or an
//! [`ApiError`]. Server-side validation failures and unexpected server faults
//! arrive as the same [`ApiError::Rejected`] variant: the server is the only
//! source of semantic error detail.

use http::StatusCode;
use thiserror::Error;

use super::ports::{TokenPersistenceError, TransportError};

/// Failure returned by the dispatcher and every resource operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    ///
    /// `message` is the response body text, or the status reason phrase when
    /// the body was empty.
    #[error("{message}")]
    Rejected {
        /// Status returned by the server.
        status: StatusCode,
        /// Body text or reason phrase.
        message: String,
    },
    /// The exchange never completed.
    #[error("{message}")]
    Transport {
        /// Adapter-provided description.
        message: String,
    },
    /// Nothing answers for this call: a test double without a handler or a
    /// misconfigured base URL.
    #[error("unexpected remote call: {method} {url}")]
    UnhandledCall {
        /// HTTP method of the call.
        method: String,
        /// Absolute URL of the call.
        url: String,
    },
    /// A success body could not be decoded into the requested type.
    #[error("response could not be decoded: {message}")]
    Decode {
        /// Decoder error.
        message: String,
    },
    /// A request body could not be serialized.
    #[error("request could not be encoded: {message}")]
    Encode {
        /// Serializer error.
        message: String,
    },
    /// The request was rejected before reaching the network.
    #[error("{message}")]
    InvalidRequest {
        /// Reason for the rejection.
        message: String,
    },
    /// A session update could not be persisted.
    #[error("session could not be persisted: {message}")]
    Session {
        /// Storage error.
        message: String,
    },
}

impl ApiError {
    /// Convenience constructor for [`ApiError::Rejected`].
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`ApiError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`ApiError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`ApiError::Encode`].
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`ApiError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`ApiError::Session`].
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Human-readable message suitable for display.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Status code when the server rejected the request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalize a non-success response.
    ///
    /// # Examples
    /// ```
    /// use http::StatusCode;
    /// use precheck_client::domain::ApiError;
    ///
    /// let err = ApiError::from_status(StatusCode::NOT_FOUND, b"");
    /// assert_eq!(err.message(), "Not Found");
    ///
    /// let err = ApiError::from_status(StatusCode::BAD_REQUEST, b"bad input");
    /// assert_eq!(err.message(), "bad input");
    /// ```
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        if text.is_empty() {
            Self::rejected(status, reason_phrase(status))
        } else {
            Self::rejected(status, text.into_owned())
        }
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Unhandled { method, url } => Self::UnhandledCall { method, url },
            other => Self::transport(other.to_string()),
        }
    }
}

impl From<TokenPersistenceError> for ApiError {
    fn from(error: TokenPersistenceError) -> Self {
        Self::session(error.to_string())
    }
}

/// Result alias used throughout the client.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::body_text(StatusCode::BAD_REQUEST, b"bad input".as_slice(), "bad input")]
    #[case::empty_server_error(StatusCode::INTERNAL_SERVER_ERROR, b"".as_slice(), "Internal Server Error")]
    #[case::empty_not_found(StatusCode::NOT_FOUND, b"".as_slice(), "Not Found")]
    #[case::json_detail_kept_verbatim(
        StatusCode::UNPROCESSABLE_ENTITY,
        br#"{"detail":"Invalid status value"}"#.as_slice(),
        r#"{"detail":"Invalid status value"}"#
    )]
    fn non_success_messages_prefer_body_text(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] expected: &str,
    ) {
        let error = ApiError::from_status(status, body);
        assert_eq!(error.message(), expected);
        assert_eq!(error.status(), Some(status));
    }

    #[test]
    fn unassigned_status_without_reason_uses_code() {
        let status = StatusCode::from_u16(599).expect("valid status code");
        assert_eq!(ApiError::from_status(status, b"").message(), "HTTP 599");
    }

    #[test]
    fn unhandled_transport_calls_stay_distinct() {
        let error = ApiError::from(TransportError::unhandled("GET", "http://x/districts"));
        assert_eq!(
            error,
            ApiError::UnhandledCall {
                method: "GET".to_owned(),
                url: "http://x/districts".to_owned(),
            }
        );
    }

    #[test]
    fn other_transport_failures_collapse_to_transport() {
        let error = ApiError::from(TransportError::connection("refused"));
        assert_eq!(error, ApiError::transport("connection failed: refused"));
        assert_eq!(error.status(), None);
    }
}
