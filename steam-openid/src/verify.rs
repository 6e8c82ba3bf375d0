//! Assembly of the `check_authentication` parameter set.

use std::collections::BTreeMap;

use crate::config::{CHECK_AUTHENTICATION, is_field_name};
use crate::context::AuthContext;
use crate::error::{OpenIdError, Result};

/// Fields copied verbatim from the callback regardless of `openid.signed`.
const ECHOED_FIELDS: [&str; 4] = ["assoc_handle", "signed", "sig", "ns"];

/// Split `openid.signed` and check it before anything is sent.
///
/// # Errors
///
/// [`OpenIdError::MalformedSignedList`] when the list is empty, an entry is
/// not a plain field name, or a field in `required` is missing.
pub fn signed_fields<'a>(raw: &'a str, required: &[String]) -> Result<Vec<&'a str>> {
    if raw.is_empty() {
        return Err(OpenIdError::MalformedSignedList("openid.signed is empty".into()));
    }

    let fields: Vec<&str> = raw.split(',').collect();
    if let Some(bad) = fields.iter().find(|f| !is_field_name(f)) {
        return Err(OpenIdError::MalformedSignedList(format!("invalid entry '{bad}' in '{raw}'")));
    }
    if let Some(missing) = required.iter().find(|r| !fields.contains(&r.as_str())) {
        return Err(OpenIdError::MalformedSignedList(format!(
            "'{missing}' is not covered by the signature"
        )));
    }

    Ok(fields)
}

/// Parameters to POST back to the provider.
///
/// Missing callback values are sent as empty strings. `openid.mode` is always
/// overwritten with `check_authentication`.
pub fn check_authentication_params(ctx: &AuthContext, signed: &[&str]) -> Vec<(String, String)> {
    let mut params = BTreeMap::new();
    for name in ECHOED_FIELDS.iter().chain(signed) {
        let key = format!("openid.{name}");
        let value = ctx.param(&key).unwrap_or_default().to_string();
        params.insert(key, value);
    }
    params.insert("openid.mode".to_string(), CHECK_AUTHENTICATION.to_string());
    params.into_iter().collect()
}
