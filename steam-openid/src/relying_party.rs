//! The relying party: login redirect and callback verification.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::claimed_id::SteamId;
use crate::config::{ID_RES, ProviderConfig};
use crate::context::AuthContext;
use crate::error::{OpenIdError, Result};
use crate::profile::{PlayerSummary, ProfileLookup};
use crate::request::LoginRequest;
use crate::response::CheckAuthResponse;
use crate::transport::VerificationTransport;
use crate::verify::{check_authentication_params, signed_fields};

/// Steam OpenID relying party.
///
/// Holds the process-wide provider configuration and the transport used for
/// the verification round trip. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct SteamOpenId {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn VerificationTransport>,
}

impl SteamOpenId {
    /// Create a relying party that verifies over HTTPS with `reqwest`.
    #[cfg(feature = "http")]
    pub fn new(config: impl Into<Arc<ProviderConfig>>) -> Self {
        Self::with_transport(config, Arc::new(crate::transport::HttpTransport::new()))
    }

    /// Create a relying party with a custom transport.
    pub fn with_transport(
        config: impl Into<Arc<ProviderConfig>>,
        transport: Arc<dyn VerificationTransport>,
    ) -> Self {
        Self {
            config: config.into(),
            transport,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Provider login URL for the current request.
    ///
    /// `None` or empty overrides fall back to the context's return URL and
    /// root.
    pub fn auth_url(
        &self,
        ctx: &AuthContext,
        return_url: Option<&str>,
        realm_url: Option<&str>,
    ) -> String {
        let return_to = return_url
            .filter(|s| !s.is_empty())
            .unwrap_or(ctx.return_url());
        let realm = realm_url.filter(|s| !s.is_empty()).unwrap_or(ctx.root());
        LoginRequest::new(&self.config, realm, return_to).to_url()
    }

    /// Verify the callback in `ctx` and return the authenticated SteamID.
    ///
    /// Checks run in order and stop at the first failure: mode, return URL
    /// echo, signed field list, provider round trip, reply namespace and
    /// validity, claimed_id shape.
    ///
    /// # Errors
    ///
    /// Any [`OpenIdError`] except `Config` and `Downstream`.
    pub async fn validate_and_get_id(&self, ctx: &AuthContext) -> Result<SteamId> {
        let mode = ctx.mode();
        if mode != ID_RES {
            debug!(mode, "rejecting callback: unexpected openid.mode");
            return Err(OpenIdError::InvalidMode {
                actual: mode.to_string(),
            });
        }

        let return_to = ctx.param("openid.return_to").unwrap_or_default();
        if return_to != ctx.return_url() {
            debug!(
                expected = ctx.return_url(),
                actual = return_to,
                "rejecting callback: return_to mismatch"
            );
            return Err(OpenIdError::ReturnUrlMismatch {
                expected: ctx.return_url().to_string(),
                actual: return_to.to_string(),
            });
        }

        let signed = signed_fields(
            ctx.param("openid.signed").unwrap_or_default(),
            self.config.required_signed_fields(),
        )
        .inspect_err(|e| debug!(error = %e, "rejecting callback: bad signed list"))?;

        let params = check_authentication_params(ctx, &signed);
        let body = self
            .transport
            .check_authentication(self.config.login_endpoint(), &params)
            .await
            .inspect_err(|e| debug!(error = %e, "check_authentication round trip failed"))?;

        CheckAuthResponse::parse(&body)
            .ensure_valid(self.config.namespace())
            .inspect_err(|e| debug!(error = %e, "provider did not confirm assertion"))?;

        let claimed_id = ctx.param("openid.claimed_id").unwrap_or_default();
        let steam_id = self
            .config
            .parse_claimed_id(claimed_id)
            .inspect_err(|e| debug!(error = %e, "rejecting callback: claimed_id shape"))?;

        info!(%steam_id, "openid assertion verified");
        Ok(steam_id)
    }

    /// Verify the callback, then fetch the player's profile.
    ///
    /// # Errors
    ///
    /// Validation errors as in [`validate_and_get_id`](Self::validate_and_get_id);
    /// lookup failures as [`OpenIdError::Downstream`].
    pub async fn validate_and_get_user(
        &self,
        ctx: &AuthContext,
        lookup: &dyn ProfileLookup,
        api_key: &str,
    ) -> Result<PlayerSummary> {
        let steam_id = self.validate_and_get_id(ctx).await?;
        Ok(lookup.player_summary(&steam_id, api_key).await?)
    }
}

impl fmt::Debug for SteamOpenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteamOpenId")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
