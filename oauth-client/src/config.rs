//! Per-client OAuth configuration.

use secrecy::SecretString;

/// Credentials and redirect settings for one provider registration.
///
/// Immutable once built; a fresh client is created from it for every login attempt.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
    pub scope: Vec<String>,
}

impl ClientConfig {
    /// Create a configuration with an empty scope list.
    pub fn new(client_id: String, client_secret: SecretString, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scope: Vec::new(),
        }
    }

    /// Set the requested scopes.
    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Scopes joined the way they travel in the `scope` query parameter.
    pub fn scope_param(&self) -> String {
        self.scope.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = ClientConfig::new(
            "client".to_string(),
            SecretString::from("hunter2".to_string()),
            "https://cms.example.com/oauth/github/callback".to_string(),
        );

        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_scope_param_is_space_delimited() {
        let config = ClientConfig::new(
            "client".to_string(),
            SecretString::from("secret".to_string()),
            "https://cms.example.com/callback".to_string(),
        )
        .with_scope(["openid", "email", "profile"]);

        assert_eq!(config.scope_param(), "openid email profile");
    }
}
