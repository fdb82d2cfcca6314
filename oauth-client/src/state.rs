//! CSRF state management for OAuth flows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::provider::ProviderKind;

/// State data stored between the authorization redirect and the callback.
#[derive(Debug, Clone, PartialEq)]
pub struct StateData {
    /// Provider the login attempt was started for.
    pub provider: ProviderKind,
    /// When this state expires.
    pub expires_at: DateTime<Utc>,
}

/// Manager for OAuth state parameters with expiration.
///
/// Generates and validates CSRF state tokens to prevent cross-site request forgery attacks.
/// Clones share the same underlying store.
#[derive(Clone)]
pub struct StateManager {
    states: Arc<Mutex<HashMap<String, StateData>>>,
    ttl: Duration,
}

impl StateManager {
    /// Create a new state manager with default TTL of 10 minutes.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(10))
    }

    /// Create a new state manager with custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Generate a new state token bound to `provider`.
    pub fn generate(&self, provider: ProviderKind) -> String {
        let state = Self::generate_token();
        let data = StateData {
            provider,
            expires_at: Utc::now()
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        self.lock().insert(state.clone(), data);
        state
    }

    /// Validate and consume a state token.
    ///
    /// Returns `None` if the token is unknown, already used or expired.
    pub fn validate(&self, state: &str) -> Option<StateData> {
        let data = self.lock().remove(state)?;
        if Utc::now() > data.expires_at {
            return None;
        }
        Some(data)
    }

    /// Validate and consume a state token that must belong to `provider`.
    pub fn validate_for(&self, state: &str, provider: ProviderKind) -> Result<StateData, Error> {
        match self.validate(state) {
            Some(data) if data.provider == provider => Ok(data),
            Some(data) => Err(oauth_error(
                OAuthErrorKind::InvalidState,
                &format!(
                    "State was issued for {} but returned to {}",
                    data.provider, provider
                ),
            )),
            None => Err(oauth_error(
                OAuthErrorKind::InvalidState,
                "Unknown or expired state",
            )),
        }
    }

    /// Clean up expired states.
    ///
    /// Should be called periodically to prevent memory leaks.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.lock().retain(|_, data| data.expires_at > now);
    }

    /// Number of outstanding states.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned map still holds valid entries; keep serving it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, StateData>> {
        self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Generate a cryptographically random state token.
    fn generate_token() -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(random_bytes)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
