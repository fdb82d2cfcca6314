//! Login attempt state machine.
//!
//! ```text
//! Unstarted -> AwaitingProviderRedirect -> CodeReceived -> TokenAcquired -> ProfileFetched
//!                        \___________________\_________________\____________-> Failed
//! ```
//!
//! Every transition is driven by the caller; a step taken out of order fails
//! with `InvalidTransition` and leaves the attempt untouched.

use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::profile::UserRecord;
use crate::provider::{Provider, ProviderKind};
use crate::token::Tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Unstarted,
    AwaitingProviderRedirect,
    CodeReceived,
    TokenAcquired,
    ProfileFetched,
    Failed,
}

/// One login attempt against one provider.
pub struct LoginAttempt<P: Provider = ProviderKind> {
    client: Client<P>,
    state: LoginState,
    csrf_state: Option<String>,
    code: Option<String>,
}

impl<P: Provider> LoginAttempt<P> {
    pub fn new(client: Client<P>) -> Self {
        Self {
            client,
            state: LoginState::Unstarted,
            csrf_state: None,
            code: None,
        }
    }

    /// Pick up an attempt whose redirect was issued earlier, e.g. by another
    /// request handler, using the state the redirect carried.
    pub fn resume(client: Client<P>, csrf_state: String) -> Self {
        Self {
            client,
            state: LoginState::AwaitingProviderRedirect,
            csrf_state: Some(csrf_state),
            code: None,
        }
    }

    /// Pick up an attempt at the callback whose returned state was already
    /// checked against the issued one, e.g. through a shared `StateManager`.
    pub fn from_callback(client: Client<P>, code: &str) -> Result<Self, Error> {
        if code.is_empty() {
            return Err(oauth_error(
                OAuthErrorKind::MissingCode,
                "Provider redirected back without a code",
            ));
        }

        Ok(Self {
            client,
            state: LoginState::CodeReceived,
            csrf_state: None,
            code: Some(code.to_string()),
        })
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn client(&self) -> &Client<P> {
        &self.client
    }

    /// Build the provider redirect for this attempt.
    pub fn start(&mut self, csrf_state: &str) -> Result<Url, Error> {
        self.ensure_state(LoginState::Unstarted)?;

        let url = match self.client.authorization_url(csrf_state) {
            Ok(url) => url,
            Err(e) => {
                self.state = LoginState::Failed;
                return Err(e);
            }
        };

        self.csrf_state = Some(csrf_state.to_string());
        self.state = LoginState::AwaitingProviderRedirect;
        Ok(url)
    }

    /// Accept the provider's callback parameters.
    pub fn receive_code(&mut self, code: &str, returned_state: &str) -> Result<(), Error> {
        self.ensure_state(LoginState::AwaitingProviderRedirect)?;

        if self.csrf_state.as_deref() != Some(returned_state) {
            self.state = LoginState::Failed;
            return Err(oauth_error(
                OAuthErrorKind::InvalidState,
                "Returned state does not match the issued state",
            ));
        }
        if code.is_empty() {
            self.state = LoginState::Failed;
            return Err(oauth_error(
                OAuthErrorKind::MissingCode,
                "Provider redirected back without a code",
            ));
        }

        self.code = Some(code.to_string());
        self.state = LoginState::CodeReceived;
        Ok(())
    }

    /// Exchange the received code for an access token.
    pub async fn exchange(&mut self) -> Result<Tokens, Error> {
        self.ensure_state(LoginState::CodeReceived)?;
        let code = self.code.take().unwrap_or_default();

        match self.client.exchange_code(&code).await {
            Ok(tokens) => {
                self.state = LoginState::TokenAcquired;
                Ok(tokens)
            }
            Err(e) => {
                self.state = LoginState::Failed;
                Err(e)
            }
        }
    }

    /// Fetch and normalize the user's profile. `Ok(None)` is the empty record.
    pub async fn fetch_profile(&mut self) -> Result<Option<UserRecord>, Error> {
        self.ensure_state(LoginState::TokenAcquired)?;

        match self.client.get_user_data().await {
            Ok(record) => {
                debug!("{} login attempt finished", self.client.provider().kind());
                self.state = LoginState::ProfileFetched;
                Ok(record)
            }
            Err(e) => {
                self.state = LoginState::Failed;
                Err(e)
            }
        }
    }

    fn ensure_state(&self, expected: LoginState) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(oauth_error(
                OAuthErrorKind::InvalidTransition,
                &format!("Expected {:?} but attempt is {:?}", expected, self.state),
            ))
        }
    }
}
