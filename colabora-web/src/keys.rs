//! The deployment's API key.

use serde::{Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// An opaque shared secret.
///
/// Its `Debug` output is redacted so it cannot leak through logs by accident.
/// It only serializes when handed out deliberately, by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a secret.
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self(secret.into())
    }

    /// The secret itself.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Holds the single valid API key for the lifetime of the server.
#[derive(Debug, Clone)]
pub struct KeyStore {
    /// The active key.
    key: ApiKey,
}

impl KeyStore {
    /// Create a store around `key`.
    pub fn new(key: ApiKey) -> Self {
        Self { key }
    }

    /// The active key.
    pub fn current_key(&self) -> &ApiKey {
        &self.key
    }

    /// Whether `candidate` is the active key. The comparison takes the same
    /// time wherever the first differing byte is.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.key.expose().as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiKey, KeyStore};

    #[test]
    fn test_accepts_only_current_key() {
        let store = KeyStore::new(ApiKey::new("api-key-cambiar"));
        assert!(store.accepts("api-key-cambiar"));
        assert!(!store.accepts("api-key-incorrecto"));
        assert!(!store.accepts("api-key-cambia"));
        assert!(!store.accepts(""));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("secreto");
        assert!(!format!("{:?}", key).contains("secreto"));
        assert!(!format!("{:?}", KeyStore::new(key)).contains("secreto"));
    }
}
