//! Direct verification round trip to the provider.

use async_trait::async_trait;

use crate::error::Result;

/// Performs the `check_authentication` POST.
///
/// Implementations must read the reply body to completion and release the
/// connection before returning, on every path. Timeouts and retries belong
/// here, not in the validator.
#[async_trait]
pub trait VerificationTransport: Send + Sync {
    /// POST `params` form-encoded to `endpoint` and return the reply body.
    async fn check_authentication(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<String>;
}

/// [`VerificationTransport`] backed by `reqwest`.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with a total request timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl VerificationTransport for HttpTransport {
    async fn check_authentication(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<String> {
        tracing::debug!(
            endpoint,
            fields = params.len(),
            "submitting check_authentication"
        );

        let response = self
            .client
            .post(endpoint)
            .form(params)
            .send()
            .await?
            .error_for_status()?;

        // text() consumes the response, so the body is drained and the
        // connection returned to the pool before we hand the string back.
        let body = response.text().await?;
        tracing::debug!(bytes = body.len(), "check_authentication reply received");
        Ok(body)
    }
}
