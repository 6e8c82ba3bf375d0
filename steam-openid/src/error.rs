//! Callback validation errors.

use thiserror::Error;

use crate::profile::ProfileError;

/// Errors that can occur while building or verifying an OpenID exchange.
///
/// Every variant is terminal for the validation attempt that produced it.
#[derive(Debug, Error)]
pub enum OpenIdError {
    /// The callback did not carry `openid.mode=id_res`.
    #[error("Invalid mode: expected 'id_res', got '{actual}'")]
    InvalidMode { actual: String },

    /// The echoed `openid.return_to` does not match the URL of the current request.
    #[error("Return URL mismatch: expected '{expected}', got '{actual}'")]
    ReturnUrlMismatch { expected: String, actual: String },

    /// The `openid.signed` field list is empty, malformed, or misses a required field.
    #[error("Malformed signed field list: {0}")]
    MalformedSignedList(String),

    /// The check_authentication round trip failed before a body was read.
    ///
    /// A non-2xx provider reply lands here too; its body is never parsed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with an unexpected namespace line.
    #[error("Namespace mismatch in provider response: '{actual}'")]
    NamespaceMismatch { actual: String },

    /// The provider did not confirm the assertion.
    #[error("Assertion rejected by provider")]
    AssertionInvalid,

    /// `openid.claimed_id` is not a provider identity URL.
    #[error("Malformed claimed_id: '{0}'")]
    MalformedClaimedId(String),

    /// Provider configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error returned by the profile lookup collaborator.
    #[error(transparent)]
    Downstream(#[from] ProfileError),
}

/// A convenience result type for OpenID operations.
pub type Result<T> = std::result::Result<T, OpenIdError>;

#[cfg(feature = "http")]
impl From<reqwest::Error> for OpenIdError {
    fn from(err: reqwest::Error) -> Self {
        OpenIdError::Transport(err.without_url().to_string())
    }
}
