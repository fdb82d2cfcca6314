//! OAuth provider trait and types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{config_error, Error};
use crate::profile::UserRecord;
use crate::providers::{github::GitHub, google::Google};

/// Known OAuth login providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "google")]
    Google,
}

impl ProviderKind {
    /// Every supported provider.
    pub const ALL: [ProviderKind; 2] = [ProviderKind::GitHub, ProviderKind::Google];

    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::Google => "google",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(ProviderKind::GitHub),
            "google" => Ok(ProviderKind::Google),
            other => Err(config_error(&format!("Unknown OAuth provider: {}", other))),
        }
    }
}

/// Where the access token goes on authenticated requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPlacement {
    /// `Authorization: <scheme> <token>`
    Header { scheme: &'static str },
    /// `?<name>=<token>`
    QueryParameter { name: &'static str },
}

/// Provider-specific half of the authorization-code flow.
///
/// Implementations are pure: fixed endpoint URLs plus the normalization of the
/// provider's profile response into a [`UserRecord`]. All network traffic goes
/// through [`crate::Client`].
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn kind(&self) -> ProviderKind;

    /// URL the user is redirected to in order to grant access.
    fn get_authorization_endpoint(&self) -> &'static str;

    /// URL the authorization code is exchanged at.
    fn get_access_token_endpoint(&self) -> &'static str;

    /// URL the user's profile is fetched from.
    fn get_user_profile_service_url(&self) -> &'static str;

    /// How the access token is attached to profile requests.
    fn token_placement(&self) -> TokenPlacement {
        TokenPlacement::Header { scheme: "Bearer" }
    }

    /// Path appended to the profile URL to list the user's emails, if the
    /// provider has such an endpoint.
    fn user_emails_path(&self) -> Option<&'static str> {
        None
    }

    /// Normalize a decoded profile body. `None` is the empty record.
    fn parse_response(&self, raw: &Value) -> Option<UserRecord> {
        UserRecord::from_profile(raw)
    }
}

// The tagged variant is resolved once, at configuration time; each arm
// forwards to the concrete adapter.
impl Provider for ProviderKind {
    fn kind(&self) -> ProviderKind {
        *self
    }

    fn get_authorization_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => GitHub.get_authorization_endpoint(),
            ProviderKind::Google => Google.get_authorization_endpoint(),
        }
    }

    fn get_access_token_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => GitHub.get_access_token_endpoint(),
            ProviderKind::Google => Google.get_access_token_endpoint(),
        }
    }

    fn get_user_profile_service_url(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => GitHub.get_user_profile_service_url(),
            ProviderKind::Google => Google.get_user_profile_service_url(),
        }
    }

    fn token_placement(&self) -> TokenPlacement {
        match self {
            ProviderKind::GitHub => GitHub.token_placement(),
            ProviderKind::Google => Google.token_placement(),
        }
    }

    fn user_emails_path(&self) -> Option<&'static str> {
        match self {
            ProviderKind::GitHub => GitHub.user_emails_path(),
            ProviderKind::Google => Google.user_emails_path(),
        }
    }

    fn parse_response(&self, raw: &Value) -> Option<UserRecord> {
        match self {
            ProviderKind::GitHub => GitHub.parse_response(raw),
            ProviderKind::Google => Google.parse_response(raw),
        }
    }
}
