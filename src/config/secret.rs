//! Credentials held in configuration
//!
//! The registry service key and the PostgreSQL connection string live in
//! [`SecretString`]: zeroized on drop, redacted in `Debug`, and only
//! readable through [`secrecy::ExposeSecret`].
//!
//! ```rust
//! use purgo::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("abc%2Bdef%3D%3D".to_string());
//! assert_eq!(key.expose_secret().masked(), "abc%****");
//! assert!(!format!("{key:?}").contains("abc%2B"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Credential text; wrap it in [`SecretString`] rather than using it bare
#[derive(Clone, Zeroize, Serialize, Deserialize)]
#[serde(transparent)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue({})", self.masked())
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        SecretValue(value)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }

    /// Printable form showing at most the first four characters
    pub fn masked(&self) -> String {
        if self.0.chars().count() <= 8 {
            return "****".to_string();
        }
        let visible: String = self.0.chars().take(4).collect();
        format!("{visible}****")
    }

    /// Whether the text carries characters that are reserved in a query
    /// string and so cannot be a registry key in its issued, encoded form
    pub fn has_unencoded_query_chars(&self) -> bool {
        self.0.contains(['+', '/', '=', '&', ' '])
    }
}

/// Zeroizing, redacting credential string
pub type SecretString = Secret<SecretValue>;

#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
