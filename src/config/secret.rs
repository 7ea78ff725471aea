//! Bearer token wrapper.
//!
//! Cluster bearer tokens grant read access to every metric in the cluster,
//! so they never appear in `Debug`/`Display` output or log lines.

use std::fmt;

/// Number of leading characters shown by [`SecretString::preview`].
const PREVIEW_CHARS: usize = 8;

/// A sensitive string that redacts itself when formatted.
///
/// # Example
///
/// ```
/// use prom_window_report::config::SecretString;
///
/// let token = SecretString::new("sha256~abcdefghijklmnopqrstuvwxyz");
/// assert_eq!(format!("{:?}", token), "<REDACTED>");
/// assert_eq!(token.bearer_header(), "Bearer sha256~abcdefghijklmnopqrstuvwxyz");
/// assert_eq!(token.preview(), "sha256~a... (truncated)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the underlying secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this token.
    #[must_use]
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// A short, safe-to-print prefix for startup banners.
    #[must_use]
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(PREVIEW_CHARS).collect();
        format!("{head}... (truncated)")
    }

    /// Returns true if the secret is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the length of the secret in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
