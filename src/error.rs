//! Error types for the RMON provider core.

use thiserror::Error;

/// Errors that can occur when talking to RMON or implementing a provider.
///
/// The variants follow the failure taxonomy of the client: configuration
/// problems are fatal before any call is made, transport failures are
/// retryable for safe verbs, API errors carry the remote diagnostic, and
/// decode errors mean the response did not have the promised shape.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Malformed base URL or missing credentials, detected at construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network-level failure (connect, DNS, timeout) after retries exhausted.
    #[error("Transport error after {attempts} attempt(s): {source}")]
    Transport {
        /// Number of attempts made, including the first.
        attempts: u32,
        /// The underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// A non-idempotent request failed in transit with an unknown outcome.
    ///
    /// The remote entity may or may not have been created. Callers must not
    /// treat this as a definite failure.
    #[error("Request outcome unknown (transport failed mid-call): {source}")]
    Ambiguous {
        /// The underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("API error: HTTP {status}: {body}")]
    Api {
        /// The HTTP status returned by the service.
        status: reqwest::StatusCode,
        /// The raw response body, usually a JSON error envelope.
        body: String,
    },

    /// The response body was not valid JSON or lacked an expected field.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The requested entity does not exist on the remote side.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A schema or rule validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested resource type is not in the registry.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Whether the failure is a transport-level one with retries exhausted.
    ///
    /// API errors are never retried: the request reached the service and was
    /// answered. Only transport errors qualify, and the client has already
    /// retried those for safe verbs.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the outcome of the operation is unknown.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }

    /// The HTTP status carried by an API error, if any.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::Configuration("base_url is missing a host".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: base_url is missing a host"
        );

        let err = ProviderError::UnknownResource("rmon_check_icmp".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: rmon_check_icmp");

        let err = ProviderError::NotFound("42".to_string());
        assert_eq!(format!("{}", err), "Resource not found: 42");
    }

    #[test]
    fn test_api_error_carries_status_and_body() {
        let err = ProviderError::Api {
            status: reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            body: r#"{"error":"port already in use"}"#.to_string(),
        };
        assert_eq!(
            err.status(),
            Some(reqwest::StatusCode::UNPROCESSABLE_ENTITY)
        );
        let display = format!("{}", err);
        assert!(display.contains("422"));
        assert!(display.contains("port already in use"));
    }

    #[test]
    fn test_classification_helpers() {
        let err = ProviderError::Decode("missing id".to_string());
        assert!(!err.is_transport());
        assert!(!err.is_ambiguous());
        assert!(err.status().is_none());
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: ProviderError = parse_err.into();
        assert!(matches!(err, ProviderError::Serialization(_)));
    }
}
