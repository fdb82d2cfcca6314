//! Google OAuth provider.

use crate::provider::{Provider, ProviderKind, TokenPlacement};

/// Google OAuth provider backed by the v1 userinfo endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct Google;

impl Provider for Google {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn get_authorization_endpoint(&self) -> &'static str {
        "https://accounts.google.com/o/oauth2/auth"
    }

    fn get_access_token_endpoint(&self) -> &'static str {
        "https://accounts.google.com/o/oauth2/token"
    }

    fn get_user_profile_service_url(&self) -> &'static str {
        "https://www.googleapis.com/oauth2/v1/userinfo"
    }

    fn token_placement(&self) -> TokenPlacement {
        TokenPlacement::QueryParameter {
            name: "access_token",
        }
    }
}
