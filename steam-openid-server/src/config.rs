//! Environment-driven server configuration.

use std::env;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Steam Web API key. When set, callbacks answer with the player summary.
    pub api_key: Option<String>,
    /// Realm override sent with the login redirect.
    pub realm: Option<String>,
    /// Require `claimed_id` and `return_to` to be signed by Steam.
    pub strict: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            realm: None,
            strict: true,
        }
    }
}

impl ServerConfig {
    /// Read `STEAM_OPENID_HOST`, `STEAM_OPENID_PORT`, `STEAM_API_KEY`,
    /// `STEAM_OPENID_REALM` and `STEAM_OPENID_STRICT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let opt_out = non_empty("STEAM_OPENID_STRICT").filter(|v| is_opt_out(v));

        Self {
            host: non_empty("STEAM_OPENID_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: non_empty("STEAM_OPENID_PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            api_key: non_empty("STEAM_API_KEY"),
            realm: non_empty("STEAM_OPENID_REALM"),
            strict: opt_out.is_none(),
        }
    }
}

/// Only an explicit `0`, `false` or `no` relaxes the signed-field policy.
fn is_opt_out(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert!(config.strict);
    }

    #[test]
    fn reads_all_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STEAM_OPENID_HOST", "0.0.0.0"),
            ("STEAM_OPENID_PORT", "9000"),
            ("STEAM_API_KEY", "secret"),
            ("STEAM_OPENID_REALM", "https://example.com"),
            ("STEAM_OPENID_STRICT", "false"),
        ]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.realm.as_deref(), Some("https://example.com"));
        assert!(!config.strict);
    }

    #[test]
    fn strict_stays_on_unless_disabled() {
        for value in ["true", "1", "yes", "anything"] {
            let config = ServerConfig::from_lookup(lookup(&[("STEAM_OPENID_STRICT", value)]));
            assert!(config.strict, "{value} should keep strict mode");
        }
        for value in ["0", "no", "FALSE"] {
            let config = ServerConfig::from_lookup(lookup(&[("STEAM_OPENID_STRICT", value)]));
            assert!(!config.strict, "{value} should disable strict mode");
        }
    }

    #[test]
    fn invalid_port_and_blank_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STEAM_OPENID_PORT", "not-a-port"),
            ("STEAM_API_KEY", "  "),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.api_key, None);
    }
}
