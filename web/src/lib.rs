use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::*;
use oauth_client::http::{HttpClient, HttpClientBuilder};
use oauth_client::{Client, ClientConfig, Endpoints, ProviderKind, StateManager};
use secrecy::SecretString;
use service::config::{Config, OAuthCredentials};

pub mod controller;
pub mod error;
pub mod router;

pub use error::{Error, Result};

use error::WebErrorKind;

/// How often abandoned login attempts are swept from the state store.
const STATE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Client settings for one enabled provider.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub config: ClientConfig,
    pub endpoints: Endpoints,
}

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    providers: Arc<HashMap<ProviderKind, ProviderSettings>>,
    pub state_manager: StateManager,
    http_client: HttpClient,
}

impl AppState {
    pub fn new(http_client: HttpClient, state_manager: StateManager) -> Self {
        Self {
            providers: Arc::new(HashMap::new()),
            state_manager,
            http_client,
        }
    }

    /// Build the state from the service configuration, enabling every
    /// provider whose credentials are complete.
    pub fn from_config(config: &Config) -> core::result::Result<Self, oauth_client::Error> {
        let http_client = HttpClientBuilder::new()
            .with_timeout(Duration::from_secs(config.http_timeout_secs))
            .with_user_agent(config.http_user_agent())
            .build()?;
        let state_manager =
            StateManager::with_ttl(chrono::Duration::seconds(config.oauth_state_ttl_secs));

        let mut app_state = Self::new(http_client, state_manager);
        for (kind, credentials) in [
            (ProviderKind::GitHub, config.github_credentials()),
            (ProviderKind::Google, config.google_credentials()),
        ] {
            match credentials {
                Some(credentials) => {
                    info!("{kind} login enabled");
                    app_state = app_state.with_provider(kind, client_config(credentials));
                }
                None => info!("{kind} login disabled: credentials not configured"),
            }
        }

        Ok(app_state)
    }

    /// Enable `kind` against its own endpoints.
    pub fn with_provider(self, kind: ProviderKind, config: ClientConfig) -> Self {
        let endpoints = Endpoints::for_provider(&kind);
        self.with_provider_endpoints(kind, config, endpoints)
    }

    /// Enable `kind` against custom endpoints.
    pub fn with_provider_endpoints(
        mut self,
        kind: ProviderKind,
        config: ClientConfig,
        endpoints: Endpoints,
    ) -> Self {
        Arc::make_mut(&mut self.providers).insert(kind, ProviderSettings { config, endpoints });
        self
    }

    /// Enabled providers in a stable order.
    pub fn enabled_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// A fresh client for one login attempt against `kind`.
    pub fn client(&self, kind: ProviderKind) -> Result<Client> {
        let settings = self
            .providers
            .get(&kind)
            .ok_or(Error::Web(WebErrorKind::NotFound))?;

        Ok(
            Client::with_http_client(kind, settings.config.clone(), self.http_client.clone())
                .with_endpoints(settings.endpoints.clone()),
        )
    }
}

fn client_config(credentials: OAuthCredentials) -> ClientConfig {
    ClientConfig::new(
        credentials.client_id,
        SecretString::from(credentials.client_secret),
        credentials.redirect_uri,
    )
    .with_scope(credentials.scope)
}

pub async fn init_server(config: &Config, app_state: AppState) -> std::io::Result<()> {
    let state_manager = app_state.state_manager.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            state_manager.cleanup_expired();
        }
    });

    let server_url = format!("{}:{}", config.interface, config.port);
    let listener = tokio::net::TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(listener, router::define_routes(app_state)).await
}
