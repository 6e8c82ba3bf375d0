//! Parsing of the provider's `check_authentication` reply.
//!
//! The reply is newline separated `key:value` text. Only two positions
//! matter: line 0 echoes the namespace and line 1 carries `is_valid`.

use crate::error::{OpenIdError, Result};

/// Structured view of a `check_authentication` reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckAuthResponse {
    /// Line 0, verbatim.
    pub namespace_line: String,
    /// Line 1 exists and does not end with `false`.
    pub is_valid: bool,
}

impl CheckAuthResponse {
    pub fn parse(body: &str) -> Self {
        let mut lines = body.split('\n');
        let namespace_line = lines.next().unwrap_or_default().to_string();
        let is_valid = lines.next().is_some_and(|line| !line.ends_with("false"));
        Self {
            namespace_line,
            is_valid,
        }
    }

    /// Check the reply against the expected namespace URI.
    ///
    /// # Errors
    ///
    /// [`OpenIdError::NamespaceMismatch`] when line 0 is not `ns:<namespace>`,
    /// then [`OpenIdError::AssertionInvalid`] when the provider did not confirm.
    pub fn ensure_valid(&self, namespace: &str) -> Result<()> {
        if self.namespace_line.strip_prefix("ns:") != Some(namespace) {
            return Err(OpenIdError::NamespaceMismatch {
                actual: self.namespace_line.clone(),
            });
        }
        if !self.is_valid {
            return Err(OpenIdError::AssertionInvalid);
        }
        Ok(())
    }
}
