//! Per-request state captured before building a redirect or verifying a callback.

use std::collections::HashMap;

use url::form_urlencoded;

/// Parts of an inbound HTTP request the relying party needs.
///
/// Supplied by whatever server hosts the login endpoint.
#[derive(Debug, Clone, Copy)]
pub struct IncomingRequest<'a> {
    /// HTTP method, e.g. `GET` or `POST`.
    pub method: &'a str,
    /// Value of the `Host` header.
    pub host: &'a str,
    /// Whether the request arrived over TLS.
    pub tls: bool,
    /// Request target: path plus optional query string.
    pub request_uri: &'a str,
    /// Form-encoded body, read only for `POST`.
    pub body: Option<&'a str>,
}

/// Request context shared by the login redirect and callback verification.
///
/// Immutable once built. `return_url` never carries `openid.*` query
/// parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    root: String,
    return_url: String,
    params: HashMap<String, String>,
}

impl AuthContext {
    /// Capture the context of an inbound request.
    ///
    /// `GET` reads parameters from the query string. `POST` reads the form
    /// body first and the query string second. Other methods carry no
    /// parameters.
    pub fn from_request(req: &IncomingRequest<'_>) -> Self {
        let scheme = if req.tls { "https://" } else { "http://" };
        let root = format!("{scheme}{}", req.host);
        let (_, query) = req.request_uri.split_once('?').unwrap_or_default();

        let params = match req.method {
            "GET" => parse_params([query]),
            "POST" => parse_params([req.body.unwrap_or_default(), query]),
            _ => HashMap::new(),
        };

        Self::new(root, req.request_uri, params)
    }

    /// Build a context from an already split request.
    ///
    /// `request_uri` is stripped of protocol parameters before it is joined
    /// to `root`.
    pub fn new(
        root: impl Into<String>,
        request_uri: &str,
        params: HashMap<String, String>,
    ) -> Self {
        let root = root.into();
        let return_url = format!("{root}{}", strip_openid_params(request_uri));
        Self {
            root,
            return_url,
            params,
        }
    }

    /// Scheme and host of the current request.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The callback URL without protocol parameters.
    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// The received `openid.mode`, or `""` on an initial visit.
    pub fn mode(&self) -> &str {
        self.param("openid.mode").unwrap_or_default()
    }
}

/// Decode form-encoded sources in order. The first value of a repeated key wins.
fn parse_params<'a>(sources: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for source in sources {
        for (key, value) in form_urlencoded::parse(source.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    params
}

/// Drop the query string from the first `openid.*` parameter onwards,
/// together with its `?` or `&` separator.
fn strip_openid_params(request_uri: &str) -> &str {
    let Some(query_start) = request_uri.find('?') else {
        return request_uri;
    };

    let mut separator = query_start;
    for pair in request_uri[query_start + 1..].split('&') {
        if pair.starts_with("openid.") {
            return &request_uri[..separator];
        }
        separator += 1 + pair.len();
    }
    request_uri
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> AuthContext {
        AuthContext::from_request(&IncomingRequest {
            method: "GET",
            host: "example.com",
            tls: true,
            request_uri: uri,
            body: None,
        })
    }

    #[test]
    fn strips_openid_suffix() {
        for (uri, expected) in [
            ("/auth", "/auth"),
            ("/auth?openid.mode=id_res&openid.ns=x", "/auth"),
            (
                "/auth?next=%2Fhome&openid.mode=id_res",
                "/auth?next=%2Fhome",
            ),
            ("/auth?next=1&lang=en", "/auth?next=1&lang=en"),
        ] {
            assert_eq!(strip_openid_params(uri), expected);
        }
    }

    #[test]
    fn openid_in_path_is_kept() {
        let uri = "/openid/callback?x=1";
        assert_eq!(strip_openid_params(uri), uri);
    }

    #[test]
    fn return_url_matches_pre_redirect_url() {
        let before = get("/auth?next=home");
        let ns = "http%3A%2F%2Fspecs.openid.net%2Fauth%2F2.0";
        let after = get(&format!("/auth?next=home&openid.ns={ns}&openid.mode=id_res"));
        assert_eq!(before.return_url(), "https://example.com/auth?next=home");
        assert_eq!(after.return_url(), before.return_url());
        assert_eq!(after.mode(), "id_res");
        assert_eq!(
            after.param("openid.ns"),
            Some("http://specs.openid.net/auth/2.0")
        );
    }

    #[test]
    fn scheme_follows_tls() {
        let ctx = AuthContext::from_request(&IncomingRequest {
            method: "GET",
            host: "localhost:8080",
            tls: false,
            request_uri: "/login",
            body: None,
        });
        assert_eq!(ctx.root(), "http://localhost:8080");
        assert_eq!(ctx.return_url(), "http://localhost:8080/login");
        assert_eq!(ctx.mode(), "");
    }

    #[test]
    fn post_reads_form_body_before_query() {
        let ctx = AuthContext::from_request(&IncomingRequest {
            method: "POST",
            host: "example.com",
            tls: true,
            request_uri: "/auth?openid.mode=from_query&extra=1",
            body: Some("openid.mode=id_res&openid.return_to=https%3A%2F%2Fexample.com%2Fauth"),
        });
        assert_eq!(ctx.mode(), "id_res");
        assert_eq!(
            ctx.param("openid.return_to"),
            Some("https://example.com/auth")
        );
        assert_eq!(ctx.param("extra"), Some("1"));
        assert_eq!(ctx.return_url(), "https://example.com/auth");
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let ctx = get("/auth?openid.mode=id_res&openid.mode=cancel");
        assert_eq!(ctx.mode(), "id_res");
    }

    #[test]
    fn other_methods_have_no_params() {
        let ctx = AuthContext::from_request(&IncomingRequest {
            method: "PUT",
            host: "example.com",
            tls: true,
            request_uri: "/auth?openid.mode=id_res",
            body: Some("openid.mode=id_res"),
        });
        assert!(ctx.params().is_empty());
        assert_eq!(ctx.return_url(), "https://example.com/auth");
    }
}
