//! Steam OpenID 2.0 relying party.
//!
//! Steam acts as an OpenID 2.0 provider. Logging a user in takes two
//! requests on the same endpoint:
//!
//! 1. the user arrives without `openid.*` parameters and is redirected to
//!    [`SteamOpenId::auth_url`]
//! 2. Steam sends the user back with a signed assertion, which
//!    [`SteamOpenId::validate_and_get_id`] re-submits to Steam with
//!    `openid.mode=check_authentication` before trusting the claimed id
//!
//! # Features
//!
//! - `http` (default): [`HttpTransport`] and [`SteamWebApi`] backed by `reqwest`.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use steam_openid::{AuthContext, IncomingRequest, ProviderConfig, SteamOpenId};
//!
//! let openid = SteamOpenId::new(ProviderConfig::steam());
//!
//! let ctx = AuthContext::from_request(&IncomingRequest {
//!     method: "GET",
//!     host: "example.com",
//!     tls: true,
//!     request_uri: &uri,
//!     body: None,
//! });
//!
//! if ctx.mode().is_empty() {
//!     return redirect(openid.auth_url(&ctx, None, None));
//! }
//! let steam_id = openid.validate_and_get_id(&ctx).await?;
//! println!("User: {steam_id}");
//! ```

mod claimed_id;
mod config;
mod context;
mod error;
mod profile;
mod relying_party;
mod request;
mod response;
mod transport;
mod verify;

pub use claimed_id::SteamId;
pub use config::{
    CHECK_AUTHENTICATION, CHECKID_SETUP, ID_RES, IDENTIFIER_SELECT, OPENID_NS, ProviderConfig,
    ProviderConfigBuilder, STEAM_COMMUNITY_HOST, STEAM_LOGIN_URL,
};
pub use context::{AuthContext, IncomingRequest};
pub use error::{OpenIdError, Result};
pub use profile::{PlayerSummary, ProfileError, ProfileLookup, STEAM_WEB_API_URL};
pub use relying_party::SteamOpenId;
pub use request::LoginRequest;
pub use response::CheckAuthResponse;
pub use transport::VerificationTransport;
pub use verify::{check_authentication_params, signed_fields};

#[cfg(feature = "http")]
pub use profile::SteamWebApi;
#[cfg(feature = "http")]
pub use transport::HttpTransport;
