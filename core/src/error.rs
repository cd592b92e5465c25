//! Error types for the Cozi client.
//!
//! # Design
//! Every operation fails in one of two disjoint ways. `NotAuthenticated` is
//! raised locally, before any request is built, when an account-scoped call is
//! made without a stored account id. Everything that happens on the wire
//! (non-2xx statuses, connection failures, timeouts, undecodable bodies) is
//! normalized into a single `ApiError` shape: `code` is the HTTP status as a
//! string, or `UNKNOWN_ERROR` when no status exists.
//!
//! `Config` only comes out of `CoziClient::new`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code used when a failure carries no HTTP status.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Normalized transport or API failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// HTTP status (`"404"`) or [`UNKNOWN_ERROR_CODE`].
    pub code: String,

    /// Text of the underlying transport error.
    pub message: String,

    /// Response body, parsed as JSON when possible, otherwise the raw text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// A failure that never produced a response: connect errors, timeouts,
    /// broken bodies.
    pub(crate) fn from_transport(error: &reqwest::Error) -> Self {
        Self {
            code: status_code(error),
            message: error.to_string(),
            details: None,
        }
    }

    /// A non-2xx response, with whatever body the server sent back.
    ///
    /// The caller passes an empty `body` when the body could not be read, so
    /// `details` is `None` and the read error itself is dropped.
    pub(crate) fn from_status(error: &reqwest::Error, body: String) -> Self {
        Self {
            code: status_code(error),
            message: error.to_string(),
            details: details_from_body(body),
        }
    }

    /// A 2xx response whose body did not decode into the expected shape.
    pub(crate) fn undecodable(error: &serde_json::Error, body: String) -> Self {
        Self {
            code: UNKNOWN_ERROR_CODE.to_string(),
            message: format!("error decoding response body: {error}"),
            details: details_from_body(body),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.code == UNKNOWN_ERROR_CODE
    }
}

fn status_code(error: &reqwest::Error) -> String {
    error
        .status()
        .map(|status| status.as_u16().to_string())
        .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string())
}

fn details_from_body(body: String) -> Option<serde_json::Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
}

/// Errors returned by `CoziClient`.
#[derive(Debug, Error)]
pub enum CoziError {
    /// An account-scoped call was made before `authenticate` or
    /// `set_session_token` supplied an account id. No request was sent.
    #[error("Not authenticated - accountId is missing")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The client could not be constructed from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl CoziError {
    /// The normalized API error, if this is one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            CoziError::Api(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_authenticated_message_is_fixed() {
        assert_eq!(
            CoziError::NotAuthenticated.to_string(),
            "Not authenticated - accountId is missing"
        );
    }

    #[test]
    fn json_body_becomes_structured_details() {
        let details = details_from_body(r#"{"message":"nope"}"#.to_string()).unwrap();
        assert_eq!(details["message"], "nope");
    }

    #[test]
    fn plain_body_is_kept_as_string() {
        let details = details_from_body("Service Unavailable".to_string()).unwrap();
        assert_eq!(details, serde_json::Value::String("Service Unavailable".to_string()));
    }

    #[test]
    fn empty_body_has_no_details() {
        assert!(details_from_body(String::new()).is_none());
        assert!(details_from_body("  \n".to_string()).is_none());
    }

    #[test]
    fn undecodable_body_uses_unknown_code() {
        let decode_error = serde_json::from_str::<Vec<u32>>("oops").unwrap_err();
        let error = ApiError::undecodable(&decode_error, "oops".to_string());
        assert!(error.is_unknown());
        assert!(error.message.starts_with("error decoding response body"));
        assert_eq!(error.details, Some(serde_json::Value::String("oops".to_string())));
    }

    #[test]
    fn api_error_display_and_wrapping() {
        let error = ApiError {
            code: "404".to_string(),
            message: "not found".to_string(),
            details: None,
        };
        assert_eq!(error.to_string(), "404: not found");

        let wrapped = CoziError::from(error.clone());
        assert_eq!(wrapped.to_string(), "404: not found");
        assert_eq!(wrapped.api(), Some(&error));
        assert!(CoziError::NotAuthenticated.api().is_none());
    }

    #[test]
    fn api_error_serializes_without_empty_details() {
        let error = ApiError {
            code: UNKNOWN_ERROR_CODE.to_string(),
            message: "connection refused".to_string(),
            details: None,
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["code"], "UNKNOWN_ERROR");
        assert!(json.get("details").is_none());
    }
}
