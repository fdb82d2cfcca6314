//! Controller for third-party OAuth login.
//!
//! Drives one login attempt per request pair: `authorize` issues the provider
//! redirect, `callback` validates the returned state, exchanges the code and
//! fetches the user's profile. Session creation is left to the caller of the
//! JSON outcome.

use crate::error::WebErrorKind;
use crate::{AppState, Error};

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use log::*;
use oauth_client::{LoginAttempt, ProviderKind, UserRecord};
use serde::{Deserialize, Serialize};

/// Query parameters the provider redirects back with.
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user declined.
    pub error: Option<String>,
}

/// Result of a completed login attempt.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginOutcome {
    Authenticated {
        provider: ProviderKind,
        user: UserRecord,
    },
    /// The provider did not disclose an email; the application should fall
    /// back to manual registration.
    ProfileUnavailable { provider: ProviderKind },
}

fn provider_kind(provider: &str) -> Result<ProviderKind, Error> {
    provider
        .parse::<ProviderKind>()
        .map_err(|_| Error::Web(WebErrorKind::NotFound))
}

/// GET /oauth/providers
///
/// Lists the providers a login page may offer.
pub async fn providers(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.enabled_providers())
}

/// GET /oauth/{provider}/authorize
///
/// Starts a login attempt by redirecting to the provider's authorization endpoint.
pub async fn authorize(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let kind = provider_kind(&provider)?;
    let client = app_state.client(kind)?;

    let state = app_state.state_manager.generate(kind);
    let url = LoginAttempt::new(client).start(&state)?;

    debug!("Redirecting to {kind} for authorization");
    Ok(Redirect::temporary(url.as_str()))
}

/// GET /oauth/{provider}/callback
///
/// Completes a login attempt after the provider redirects back.
pub async fn callback(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<OAuthCallback>,
) -> Result<impl IntoResponse, Error> {
    let kind = provider_kind(&provider)?;
    let client = app_state.client(kind)?;

    if let Some(error) = &params.error {
        warn!("{kind} authorization was not granted: {error}");
    }

    let state = params.state.ok_or(Error::Web(WebErrorKind::Input))?;
    app_state.state_manager.validate_for(&state, kind)?;

    let mut attempt =
        LoginAttempt::from_callback(client, params.code.as_deref().unwrap_or_default())?;
    attempt.exchange().await?;

    let outcome = match attempt.fetch_profile().await? {
        Some(user) => {
            info!("{kind} login succeeded for user id {}", user.id);
            LoginOutcome::Authenticated {
                provider: kind,
                user,
            }
        }
        None => {
            info!("{kind} login returned no email; profile unavailable");
            LoginOutcome::ProfileUnavailable { provider: kind }
        }
    };

    Ok(Json(outcome))
}
