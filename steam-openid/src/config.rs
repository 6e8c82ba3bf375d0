//! Provider parameters shared by the request builder and the response validator.

use std::sync::LazyLock;

use regex::Regex;

use crate::claimed_id::SteamId;
use crate::error::{OpenIdError, Result};

/// Steam's OpenID 2.0 login endpoint.
pub const STEAM_LOGIN_URL: &str = "https://steamcommunity.com/openid/login";

/// OpenID 2.0 namespace URI.
pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

/// Identifier-select sentinel: lets the provider pick the identity.
pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";

/// Mode sent with the login redirect.
pub const CHECKID_SETUP: &str = "checkid_setup";

/// Mode carried by a positive assertion callback.
pub const ID_RES: &str = "id_res";

/// Mode used for the direct verification round trip.
pub const CHECK_AUTHENTICATION: &str = "check_authentication";

/// Host embedded in Steam claimed identifiers.
pub const STEAM_COMMUNITY_HOST: &str = "steamcommunity.com";

static STEAM_CLAIMED_ID: LazyLock<Regex> = LazyLock::new(|| {
    claimed_id_pattern(&[STEAM_COMMUNITY_HOST.to_string()])
        .expect("static claimed_id pattern compiles")
});

fn claimed_id_pattern(hosts: &[String]) -> std::result::Result<Regex, regex::Error> {
    let hosts = hosts
        .iter()
        .map(|h| regex::escape(h))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"^(http|https)://(?:{hosts})/openid/id/(?P<id>[0-9]{{15,25}})$"))
}

pub(crate) fn is_field_name(name: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.';
    !name.is_empty() && name.chars().all(allowed)
}

/// Immutable provider parameters.
///
/// Built once at startup and shared by reference with every
/// [`SteamOpenId`](crate::SteamOpenId). Tests point `login_endpoint` at a
/// mock provider instead of mutating globals.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    login_endpoint: String,
    namespace: String,
    identifier_select: String,
    claimed_id_hosts: Vec<String>,
    required_signed_fields: Vec<String>,
    claimed_id_pattern: Regex,
}

impl ProviderConfig {
    /// Steam Community with the permissive signed-field policy.
    pub fn steam() -> Self {
        Self {
            login_endpoint: STEAM_LOGIN_URL.into(),
            namespace: OPENID_NS.into(),
            identifier_select: IDENTIFIER_SELECT.into(),
            claimed_id_hosts: vec![STEAM_COMMUNITY_HOST.into()],
            required_signed_fields: Vec::new(),
            claimed_id_pattern: STEAM_CLAIMED_ID.clone(),
        }
    }

    /// Steam Community, additionally requiring `claimed_id` and `return_to`
    /// to be covered by the provider's signature.
    pub fn steam_strict() -> Self {
        Self {
            required_signed_fields: vec!["claimed_id".into(), "return_to".into()],
            ..Self::steam()
        }
    }

    /// Create a new builder.
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::default()
    }

    pub fn login_endpoint(&self) -> &str {
        &self.login_endpoint
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn identifier_select(&self) -> &str {
        &self.identifier_select
    }

    /// Mode sent with the login redirect. Always `checkid_setup`.
    pub fn checkid_mode(&self) -> &str {
        CHECKID_SETUP
    }

    pub fn claimed_id_hosts(&self) -> &[String] {
        &self.claimed_id_hosts
    }

    /// Field names that must appear in `openid.signed`.
    pub fn required_signed_fields(&self) -> &[String] {
        &self.required_signed_fields
    }

    /// Validate a claimed identifier against the allowed hosts and extract the SteamID.
    ///
    /// # Errors
    ///
    /// Returns [`OpenIdError::MalformedClaimedId`] when the shape does not match.
    pub fn parse_claimed_id(&self, claimed_id: &str) -> Result<SteamId> {
        SteamId::from_claimed_id(claimed_id, &self.claimed_id_pattern)
    }

    pub(crate) fn claimed_id_pattern(&self) -> &Regex {
        &self.claimed_id_pattern
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::steam()
    }
}

/// Builder for [`ProviderConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProviderConfigBuilder {
    login_endpoint: Option<String>,
    namespace: Option<String>,
    identifier_select: Option<String>,
    claimed_id_hosts: Vec<String>,
    required_signed_fields: Vec<String>,
}

impl ProviderConfigBuilder {
    /// Set the login endpoint (defaults to [`STEAM_LOGIN_URL`]).
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint = Some(endpoint.into());
        self
    }

    /// Set the namespace URI (defaults to [`OPENID_NS`]).
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the identifier-select sentinel (defaults to [`IDENTIFIER_SELECT`]).
    pub fn identifier_select(mut self, identifier: impl Into<String>) -> Self {
        self.identifier_select = Some(identifier.into());
        self
    }

    /// Allow a host in claimed identifiers. Defaults to [`STEAM_COMMUNITY_HOST`]
    /// when none is added.
    pub fn claimed_id_host(mut self, host: impl Into<String>) -> Self {
        self.claimed_id_hosts.push(host.into());
        self
    }

    /// Require a field name to be listed in `openid.signed`.
    pub fn require_signed(mut self, field: impl Into<String>) -> Self {
        self.required_signed_fields.push(field.into());
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OpenIdError::Config`] if:
    /// - the login endpoint is not an absolute `http`/`https` URL
    /// - the namespace or identifier-select sentinel is empty
    /// - a claimed_id host is empty or contains `/`
    /// - a required signed field is not a plain field name
    pub fn build(self) -> Result<ProviderConfig> {
        let login_endpoint = self.login_endpoint.unwrap_or_else(|| STEAM_LOGIN_URL.into());
        let parsed = url::Url::parse(&login_endpoint).map_err(|e| {
            OpenIdError::Config(format!("login_endpoint '{login_endpoint}' is not a URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(OpenIdError::Config(format!(
                "login_endpoint must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let namespace = self.namespace.unwrap_or_else(|| OPENID_NS.into());
        if namespace.is_empty() {
            return Err(OpenIdError::Config("namespace must not be empty".into()));
        }
        let identifier_select = self
            .identifier_select
            .unwrap_or_else(|| IDENTIFIER_SELECT.into());
        if identifier_select.is_empty() {
            return Err(OpenIdError::Config("identifier_select must not be empty".into()));
        }

        let claimed_id_hosts = if self.claimed_id_hosts.is_empty() {
            vec![STEAM_COMMUNITY_HOST.to_string()]
        } else {
            self.claimed_id_hosts
        };
        let bad_host = |h: &&String| h.is_empty() || h.contains('/');
        if let Some(bad) = claimed_id_hosts.iter().find(bad_host) {
            return Err(OpenIdError::Config(format!("invalid claimed_id host '{bad}'")));
        }

        let required = &self.required_signed_fields;
        if let Some(bad) = required.iter().find(|f| !is_field_name(f)) {
            return Err(OpenIdError::Config(format!("invalid required signed field '{bad}'")));
        }

        let claimed_id_pattern = claimed_id_pattern(&claimed_id_hosts)
            .map_err(|e| OpenIdError::Config(format!("claimed_id pattern: {e}")))?;

        Ok(ProviderConfig {
            login_endpoint,
            namespace,
            identifier_select,
            claimed_id_hosts,
            required_signed_fields: self.required_signed_fields,
            claimed_id_pattern,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steam_defaults() {
        let config = ProviderConfig::steam();
        assert_eq!(config.login_endpoint(), STEAM_LOGIN_URL);
        assert_eq!(config.namespace(), OPENID_NS);
        assert_eq!(config.identifier_select(), IDENTIFIER_SELECT);
        assert_eq!(config.checkid_mode(), "checkid_setup");
        assert_eq!(config.claimed_id_hosts(), ["steamcommunity.com"]);
        assert!(config.required_signed_fields().is_empty());
    }

    #[test]
    fn builder_matches_steam_preset() {
        let built = ProviderConfig::builder().build().unwrap();
        let preset = ProviderConfig::steam();
        assert_eq!(built.login_endpoint(), preset.login_endpoint());
        assert_eq!(built.claimed_id_hosts(), preset.claimed_id_hosts());
        assert_eq!(
            built.claimed_id_pattern().as_str(),
            preset.claimed_id_pattern().as_str()
        );
    }

    #[test]
    fn builder_rejects_bad_endpoint() {
        let err = ProviderConfig::builder()
            .login_endpoint("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, OpenIdError::Config(_)));

        let err = ProviderConfig::builder()
            .login_endpoint("ftp://steamcommunity.com/openid/login")
            .build()
            .unwrap_err();
        assert!(matches!(err, OpenIdError::Config(_)));
    }

    #[test]
    fn builder_rejects_bad_host_and_field() {
        let err = ProviderConfig::builder()
            .claimed_id_host("a/b")
            .build()
            .unwrap_err();
        assert!(matches!(err, OpenIdError::Config(_)));

        let err = ProviderConfig::builder()
            .require_signed("claimed id")
            .build()
            .unwrap_err();
        assert!(matches!(err, OpenIdError::Config(_)));
    }

    #[test]
    fn hosts_are_matched_literally() {
        let config = ProviderConfig::steam();
        let pattern = config.claimed_id_pattern();
        let path = "/openid/id/76561198000000000";
        assert!(pattern.is_match(&format!("https://steamcommunity.com{path}")));
        // '.' in the host must not act as a wildcard
        assert!(!pattern.is_match(&format!("https://steamcommunityxcom{path}")));
    }

    #[test]
    fn strict_preset_requires_identity_fields() {
        let config = ProviderConfig::steam_strict();
        assert_eq!(config.required_signed_fields(), ["claimed_id", "return_to"]);
        assert_eq!(config.login_endpoint(), STEAM_LOGIN_URL);
    }
}
