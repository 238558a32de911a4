use thiserror::Error;

/// Everything that can go wrong between receiving an image and returning its text.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("missing API key for {provider}")]
    MissingCredentials { provider: String },

    #[error("{provider} rejected the API key: {message}")]
    InvalidCredentials { provider: String, message: String },

    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider} returned HTTP {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("malformed response from {provider}: {message}")]
    MalformedResponse { provider: String, message: String },

    #[error("image error: {0}")]
    Image(String),

    #[error("local OCR engine failed: {0}")]
    Engine(String),
}

/// The three failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Key absent or refused by the service.
    Credentials,
    /// Could not reach the service, or it answered with an error status.
    Transport,
    /// The service answered but the payload could not be used.
    Response,
}

impl RecognitionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingCredentials { .. } | Self::InvalidCredentials { .. } => {
                FailureKind::Credentials
            }
            Self::Transport { .. } | Self::Api { .. } | Self::Engine(_) => {
                FailureKind::Transport
            }
            Self::MalformedResponse { .. } | Self::Image(_) => FailureKind::Response,
        }
    }

    pub fn missing_credentials(provider: impl Into<String>) -> Self {
        Self::MissingCredentials {
            provider: provider.into(),
        }
    }

    pub fn transport(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_variants_share_a_kind() {
        assert_eq!(
            RecognitionError::missing_credentials("gemini").kind(),
            FailureKind::Credentials
        );
        let rejected = RecognitionError::InvalidCredentials {
            provider: "gemini".into(),
            message: "API key not valid".into(),
        };
        assert_eq!(rejected.kind(), FailureKind::Credentials);
    }

    #[test]
    fn api_status_is_a_transport_failure() {
        let err = RecognitionError::Api {
            provider: "vision".into(),
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.to_string(), "vision returned HTTP 503: unavailable");
    }

    #[test]
    fn malformed_payload_is_a_response_failure() {
        let err = RecognitionError::malformed("gemini", "expected object");
        assert_eq!(err.kind(), FailureKind::Response);
    }
}
