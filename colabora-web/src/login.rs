//! Hands out the API key to holders of the deployment's credentials.

use std::sync::Arc;

use colabora_settings::AuthSettings;
use subtle::ConstantTimeEq;

use crate::keys::{ApiKey, KeyStore};

/// The outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    /// The credentials matched. Carries the key to use for other requests.
    Granted {
        /// The current API key.
        key: ApiKey,
    },
    /// The credentials did not match.
    Denied,
}

/// Checks a username and password against the one configured pair.
#[derive(Clone)]
pub struct LoginService {
    /// The accepted user name.
    username: String,
    /// The accepted password.
    password: String,
    /// The source of the key handed out on success.
    key_store: Arc<KeyStore>,
}

impl LoginService {
    /// Create a login service from the auth settings.
    pub fn new(settings: &AuthSettings, key_store: Arc<KeyStore>) -> Self {
        Self {
            username: settings.username.clone(),
            password: settings.password.clone(),
            key_store,
        }
    }

    /// Check a login attempt.
    pub fn login(&self, username: &str, password: &str) -> LoginResult {
        // Compare both halves even if the first fails.
        let username_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let password_ok = self.password.as_bytes().ct_eq(password.as_bytes());

        if bool::from(username_ok & password_ok) {
            LoginResult::Granted {
                key: self.key_store.current_key().clone(),
            }
        } else {
            LoginResult::Denied
        }
    }
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{LoginResult, LoginService};
    use crate::keys::{ApiKey, KeyStore};
    use colabora_settings::AuthSettings;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn service() -> LoginService {
        let settings = AuthSettings {
            api_key: "api-key-cambiar".to_string(),
            username: "usuario_api".to_string(),
            password: "contrasena_api".to_string(),
        };
        let key_store = Arc::new(KeyStore::new(ApiKey::new(settings.api_key.clone())));
        LoginService::new(&settings, key_store)
    }

    #[test]
    fn test_login_granted() {
        assert_eq!(
            service().login("usuario_api", "contrasena_api"),
            LoginResult::Granted {
                key: ApiKey::new("api-key-cambiar")
            }
        );
    }

    #[test]
    fn test_login_denied() {
        let service = service();
        assert_eq!(service.login("usuario_api", "contrasena"), LoginResult::Denied);
        assert_eq!(service.login("otro", "contrasena_api"), LoginResult::Denied);
        assert_eq!(service.login("", ""), LoginResult::Denied);
    }

    #[test]
    fn test_login_denied_on_prefix_or_extension() {
        let service = service();
        assert_eq!(service.login("usuario_api", "contrasena_ap"), LoginResult::Denied);
        assert_eq!(service.login("usuario_api", "contrasena_api2"), LoginResult::Denied);
        assert_eq!(service.login("usuario_ap", "contrasena_api"), LoginResult::Denied);
    }

    #[test]
    fn test_debug_hides_password() {
        assert!(!format!("{:?}", service()).contains("contrasena_api"));
    }
}
