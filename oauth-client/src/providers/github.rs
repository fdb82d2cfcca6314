//! GitHub OAuth provider.

use crate::provider::{Provider, ProviderKind, TokenPlacement};

/// GitHub OAuth provider.
///
/// The `/user` endpoint omits the email when the user keeps it private, so
/// GitHub also exposes the `/user/emails` listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHub;

impl Provider for GitHub {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn get_authorization_endpoint(&self) -> &'static str {
        "https://github.com/login/oauth/authorize"
    }

    fn get_access_token_endpoint(&self) -> &'static str {
        "https://github.com/login/oauth/access_token"
    }

    fn get_user_profile_service_url(&self) -> &'static str {
        "https://api.github.com/user"
    }

    fn token_placement(&self) -> TokenPlacement {
        TokenPlacement::Header { scheme: "Bearer" }
    }

    fn user_emails_path(&self) -> Option<&'static str> {
        Some("/emails")
    }
}
