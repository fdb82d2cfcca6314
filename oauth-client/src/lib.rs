//! # oauth-client
//!
//! OAuth 2.0 authorization-code login against third-party identity providers:
//! - Generic client: authorization URL, code exchange, authenticated fetch
//! - Provider adapters (GitHub, Google): fixed endpoints and profile normalization
//! - CSRF state management and a typed login-attempt state machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_client::{Client, ClientConfig, ProviderKind};
//!
//! let mut client = Client::new(ProviderKind::GitHub, config)?;
//! let redirect = client.authorization_url(&state)?;
//! // ... provider redirects back with `code` ...
//! client.exchange_code(&code).await?;
//! let user = client.get_user_data().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod http;
pub mod profile;
pub mod provider;
pub mod providers;
pub mod state;
pub mod token;

// Re-export commonly used types
pub use client::{Client, Endpoints};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind};
pub use flow::{LoginAttempt, LoginState};
pub use profile::UserRecord;
pub use provider::{Provider, ProviderKind, TokenPlacement};
pub use state::StateManager;
pub use token::Tokens;
