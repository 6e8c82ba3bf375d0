//! Login redirect construction.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::config::ProviderConfig;

/// Parameters sent to the provider when redirecting a user for login.
#[derive(Debug, Clone)]
pub struct LoginRequest<'a> {
    config: &'a ProviderConfig,
    realm: &'a str,
    return_to: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub fn new(config: &'a ProviderConfig, realm: &'a str, return_to: &'a str) -> Self {
        Self {
            config,
            realm,
            return_to,
        }
    }

    /// Query parameters keyed and ordered by name.
    pub fn params(&self) -> BTreeMap<&'static str, &'a str> {
        BTreeMap::from([
            ("openid.claimed_id", self.config.identifier_select()),
            ("openid.identity", self.config.identifier_select()),
            ("openid.mode", self.config.checkid_mode()),
            ("openid.ns", self.config.namespace()),
            ("openid.realm", self.realm),
            ("openid.return_to", self.return_to),
        ])
    }

    /// Provider login URL carrying the form-encoded parameters.
    pub fn to_url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params())
            .finish();
        let endpoint = self.config.login_endpoint();
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{endpoint}{separator}{query}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::{IDENTIFIER_SELECT, OPENID_NS};

    fn decode_query(url: &str) -> HashMap<String, String> {
        let (_, query) = url.split_once('?').unwrap();
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn carries_all_protocol_params() {
        let config = ProviderConfig::steam();
        let request = LoginRequest::new(&config, "https://example.com", "https://example.com/auth");
        let url = request.to_url();

        assert!(url.starts_with("https://steamcommunity.com/openid/login?"));
        let params = decode_query(&url);
        assert_eq!(params.len(), 6);
        assert_eq!(params["openid.claimed_id"], IDENTIFIER_SELECT);
        assert_eq!(params["openid.identity"], IDENTIFIER_SELECT);
        assert_eq!(params["openid.mode"], "checkid_setup");
        assert_eq!(params["openid.ns"], OPENID_NS);
        assert_eq!(params["openid.realm"], "https://example.com");
        assert_eq!(params["openid.return_to"], "https://example.com/auth");
    }

    #[test]
    fn keys_are_serialized_in_sorted_order() {
        let config = ProviderConfig::steam();
        let request = LoginRequest::new(&config, "https://a.test", "https://a.test/cb");
        let url = request.to_url();
        let (_, query) = url.split_once('?').unwrap();
        let keys: Vec<_> = query
            .split('&')
            .map(|p| p.split('=').next().unwrap())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn return_url_with_query_stays_one_param() {
        let config = ProviderConfig::steam();
        let return_to = "https://a.test/cb?next=1&lang=en";
        let request = LoginRequest::new(&config, "https://a.test", return_to);
        let url = request.to_url();
        let params = decode_query(&url);
        assert_eq!(params["openid.return_to"], return_to);
        assert!(!params.contains_key("lang"));
    }

    #[test]
    fn endpoint_with_query_gets_ampersand() {
        let config = ProviderConfig::builder()
            .login_endpoint("http://127.0.0.1:9000/login?tenant=a")
            .build()
            .unwrap();
        let url = LoginRequest::new(&config, "r", "t").to_url();
        assert!(url.starts_with("http://127.0.0.1:9000/login?tenant=a&openid.claimed_id="));
    }
}
