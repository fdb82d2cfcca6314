//! Provider-agnostic OAuth 2.0 authorization-code client.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{config_error, network_error, oauth_error, Error, NetworkErrorKind, OAuthErrorKind};
use crate::http::{FetchResponse, HttpClient, HttpClientBuilder};
use crate::profile::UserRecord;
use crate::provider::{Provider, ProviderKind, TokenPlacement};
use crate::token::{TokenResponse, Tokens};

/// Endpoint URLs a client talks to.
///
/// Defaults to the provider's fixed URLs; overriding them is a configuration
/// concern (e.g. pointing at a mock server in tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorization: String,
    pub access_token: String,
    pub user_profile: String,
}

impl Endpoints {
    /// The provider's own fixed endpoints.
    pub fn for_provider<P: Provider + ?Sized>(provider: &P) -> Self {
        Self {
            authorization: provider.get_authorization_endpoint().to_string(),
            access_token: provider.get_access_token_endpoint().to_string(),
            user_profile: provider.get_user_profile_service_url().to_string(),
        }
    }
}

/// OAuth 2.0 client for a single login attempt.
///
/// Holds the client configuration and, once the code has been exchanged, the
/// access token. Every network-facing method performs at most one request.
pub struct Client<P: Provider = ProviderKind> {
    provider: P,
    config: ClientConfig,
    endpoints: Endpoints,
    http_client: HttpClient,
    access_token: Option<SecretString>,
}

impl<P: Provider> Client<P> {
    /// Create a client with a default HTTP client.
    pub fn new(provider: P, config: ClientConfig) -> Result<Self, Error> {
        let http_client = HttpClientBuilder::new().build()?;
        Ok(Self::with_http_client(provider, config, http_client))
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_http_client(provider: P, config: ClientConfig, http_client: HttpClient) -> Self {
        let endpoints = Endpoints::for_provider(&provider);
        Self {
            provider,
            config,
            endpoints,
            http_client,
            access_token: None,
        }
    }

    /// Replace the provider's fixed endpoints.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get_authorization_endpoint(&self) -> &str {
        &self.endpoints.authorization
    }

    pub fn get_access_token_endpoint(&self) -> &str {
        &self.endpoints.access_token
    }

    pub fn get_user_profile_service_url(&self) -> &str {
        &self.endpoints.user_profile
    }

    /// Build the URL the user is redirected to.
    ///
    /// # Arguments
    ///
    /// * `state` - CSRF state echoed back by the provider on the callback
    pub fn authorization_url(&self, state: &str) -> Result<Url, Error> {
        let mut url = Url::parse(self.get_authorization_endpoint())?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri);
            if !self.config.scope.is_empty() {
                query.append_pair("scope", &self.config.scope_param());
            }
            query.append_pair("state", state);
        }
        Ok(url)
    }

    /// Use an access token obtained elsewhere.
    pub fn set_access_token(&mut self, access_token: SecretString) {
        self.access_token = Some(access_token);
    }

    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    /// Exchange an authorization code for an access token.
    ///
    /// On success the token is held by the client for subsequent fetches.
    pub async fn exchange_code(&mut self, code: &str) -> Result<Tokens, Error> {
        if code.is_empty() {
            return Err(oauth_error(
                OAuthErrorKind::MissingCode,
                "Authorization code is empty",
            ));
        }

        let form = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!(
            "Exchanging {} authorization code for tokens",
            self.provider.kind()
        );

        let response = self
            .http_client
            .post(self.get_access_token_endpoint())
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach {} token endpoint: {}", self.provider.kind(), e);
                Error::from(e)
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!(
                "{} token endpoint answered {}",
                self.provider.kind(),
                status
            );
            return Err(oauth_error(
                OAuthErrorKind::TokenExchangeFailed,
                &format!("Token endpoint answered {}", status),
            ));
        }

        let token_response: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!("Failed to parse {} token response: {}", self.provider.kind(), e);
            oauth_error(
                OAuthErrorKind::TokenExchangeFailed,
                "Invalid response from token endpoint",
            )
        })?;

        let tokens = token_response.into_tokens().map_err(|reason| {
            warn!("{} token exchange rejected: {}", self.provider.kind(), reason);
            oauth_error(OAuthErrorKind::TokenExchangeFailed, &reason)
        })?;

        debug!("Obtained {} access token", self.provider.kind());
        self.access_token = Some(tokens.access_token.clone());
        Ok(tokens)
    }

    /// Authenticated GET against `url`.
    ///
    /// Attaches the held access token the way the provider expects it. Only the
    /// success/failure of the status is checked; the body is returned decoded.
    pub async fn fetch(&self, url: &str, headers: Option<HeaderMap>) -> Result<FetchResponse, Error> {
        let access_token = self.access_token.as_ref().ok_or_else(|| {
            oauth_error(OAuthErrorKind::MissingToken, "No access token held by client")
        })?;

        let mut request = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/json");

        match self.provider.token_placement() {
            TokenPlacement::Header { scheme } => {
                let mut value =
                    HeaderValue::from_str(&format!("{} {}", scheme, access_token.expose_secret()))
                        .map_err(|_| config_error("Access token is not a valid header value"))?;
                value.set_sensitive(true);
                request = request.header(AUTHORIZATION, value);
            }
            TokenPlacement::QueryParameter { name } => {
                request = request.query(&[(name, access_token.expose_secret().as_str())]);
            }
        }

        if let Some(headers) = headers {
            request = request.headers(headers);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Failed to fetch {}: {}", url, e);
            Error::from(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!("{} answered {}", url, status);
            return Err(network_error(
                NetworkErrorKind::Status(status.as_u16()),
                &format!("{} answered {}", url, status),
            ));
        }

        let result = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)?
        };

        Ok(FetchResponse {
            result,
            status,
            headers,
        })
    }

    /// Normalize a decoded profile body. `None` is the empty record.
    pub fn parse_response(&self, raw: &Value) -> Option<UserRecord> {
        self.provider.parse_response(raw)
    }

    /// Fetch the profile endpoint and normalize it.
    ///
    /// `Ok(None)` means the provider did not disclose an email, so no login
    /// data is available for this user.
    pub async fn get_user_data(&self) -> Result<Option<UserRecord>, Error> {
        let response = self.fetch(self.get_user_profile_service_url(), None).await?;
        let record = self.parse_response(&response.result);

        if record.is_none() {
            debug!(
                "{} profile carried no email; returning empty record",
                self.provider.kind()
            );
        }

        Ok(record)
    }

    /// Fetch the user's email listing, returned exactly as decoded.
    ///
    /// Only providers with an email listing endpoint (GitHub) support this.
    pub async fn get_user_emails(&self) -> Result<Value, Error> {
        let path = self.provider.user_emails_path().ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::Unsupported,
                &format!("{} has no email listing endpoint", self.provider.kind()),
            )
        })?;

        let url = format!("{}{}", self.get_user_profile_service_url(), path);
        let response = self.fetch(&url, None).await?;
        Ok(response.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::providers::{GitHub, Google};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn test_config() -> ClientConfig {
        ClientConfig::new(
            "test_client_id".to_string(),
            SecretString::from("test_client_secret".to_string()),
            "https://cms.example.com/oauth/callback".to_string(),
        )
        .with_scope(["user:email"])
    }

    fn mock_endpoints(server_url: &str) -> Endpoints {
        Endpoints {
            authorization: format!("{}/login/oauth/authorize", server_url),
            access_token: format!("{}/login/oauth/access_token", server_url),
            user_profile: format!("{}/user", server_url),
        }
    }

    fn client_with_token<P: Provider>(provider: P, server_url: &str) -> Client<P> {
        let mut client = Client::new(provider, test_config())
            .unwrap()
            .with_endpoints(mock_endpoints(server_url));
        client.set_access_token(SecretString::from("test_token".to_string()));
        client
    }

    #[test]
    fn test_default_endpoints_are_the_providers() {
        let client = Client::new(GitHub, test_config()).unwrap();
        assert_eq!(
            client.get_authorization_endpoint(),
            "https://github.com/login/oauth/authorize"
        );
        assert_eq!(
            client.get_access_token_endpoint(),
            "https://github.com/login/oauth/access_token"
        );
        assert_eq!(
            client.get_user_profile_service_url(),
            "https://api.github.com/user"
        );
    }

    #[test]
    fn test_authorization_url_carries_request_parameters() {
        let client = Client::new(ProviderKind::Google, test_config()).unwrap();
        let url = client.authorization_url("state-123").unwrap();

        assert!(url
            .as_str()
            .starts_with("https://accounts.google.com/o/oauth2/auth?"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("response_type".to_string(), "code".to_string()),
                ("client_id".to_string(), "test_client_id".to_string()),
                (
                    "redirect_uri".to_string(),
                    "https://cms.example.com/oauth/callback".to_string()
                ),
                ("scope".to_string(), "user:email".to_string()),
                ("state".to_string(), "state-123".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_user_data_fetches_profile_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/user")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"id": 1, "email": "a@b.com", "name": "A"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_with_token(GitHub, &server.url());
        let record = client.get_user_data().await.unwrap().unwrap();

        assert_eq!(
            record,
            UserRecord {
                id: "1".to_string(),
                email: "a@b.com".to_string(),
                nick: "A".to_string(),
                link: String::new(),
                gender: String::new(),
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_data_without_email_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/user")
            .with_status(200)
            .with_body(json!({"id": 1, "name": "Private", "email": null}).to_string())
            .create_async()
            .await;

        let client = client_with_token(GitHub, &server.url());
        assert_eq!(client.get_user_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_google_token_travels_as_query_parameter() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/user")
            .match_query(Matcher::UrlEncoded(
                "access_token".to_string(),
                "test_token".to_string(),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "id": "2",
                    "email": "c@d.com",
                    "name": "C",
                    "link": "http://x",
                    "gender": "f"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_with_token(Google, &server.url());
        let record = client.get_user_data().await.unwrap().unwrap();

        assert_eq!(record.link, "http://x");
        assert_eq!(record.gender, "f");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        // Nothing listens on the discard port.
        let client = client_with_token(GitHub, "http://127.0.0.1:9");

        let err = client.get_user_data().await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(
            err.error_kind,
            ErrorKind::Network(NetworkErrorKind::Transport)
        );
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/user")
            .with_status(401)
            .with_body(json!({"message": "Bad credentials"}).to_string())
            .create_async()
            .await;

        let client = client_with_token(GitHub, &server.url());
        let err = client.get_user_data().await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Network(NetworkErrorKind::Status(401))
        );
    }

    #[tokio::test]
    async fn test_fetch_passes_status_and_headers_through() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/user")
            .with_status(200)
            .with_header("x-ratelimit-remaining", "4999")
            .with_body("{}")
            .create_async()
            .await;

        let client = client_with_token(GitHub, &server.url());
        let url = client.get_user_profile_service_url().to_string();
        let response = client.fetch(&url, None).await.unwrap();

        assert_eq!(response.status, reqwest::StatusCode::OK);
        assert_eq!(response.headers["x-ratelimit-remaining"], "4999");
        assert_eq!(response.result, json!({}));
    }

    #[tokio::test]
    async fn test_fetch_sends_extra_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/user")
            .match_header("x-github-api-version", "2022-11-28")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = client_with_token(GitHub, &server.url());
        let mut headers = HeaderMap::new();
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        let url = client.get_user_profile_service_url().to_string();
        client.fetch(&url, Some(headers)).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_without_token_fails_before_request() {
        let client = Client::new(GitHub, test_config())
            .unwrap()
            .with_endpoints(mock_endpoints("http://127.0.0.1:9"));

        let err = client.get_user_data().await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingToken));
    }

    #[tokio::test]
    async fn test_get_user_emails_returns_raw_result() {
        let emails = json!([
            {"email": "octocat@github.com", "verified": true, "primary": true, "visibility": "public"},
            {"email": "octo@users.noreply.github.com", "verified": true, "primary": false, "visibility": null}
        ]);

        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/user/emails")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .with_body(emails.to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_with_token(ProviderKind::GitHub, &server.url());
        assert_eq!(client.get_user_emails().await.unwrap(), emails);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_emails_unsupported_for_google() {
        let client = client_with_token(ProviderKind::Google, "http://127.0.0.1:9");
        let err = client.get_user_emails().await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::Unsupported));
    }

    #[tokio::test]
    async fn test_exchange_code_stores_access_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/login/oauth/access_token")
            .match_header("accept", "application/json")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".to_string(), "auth_code".to_string()),
                Matcher::UrlEncoded("client_id".to_string(), "test_client_id".to_string()),
                Matcher::UrlEncoded(
                    "client_secret".to_string(),
                    "test_client_secret".to_string(),
                ),
                Matcher::UrlEncoded(
                    "grant_type".to_string(),
                    "authorization_code".to_string(),
                ),
            ]))
            .with_status(200)
            .with_body(
                json!({"access_token": "gho_abc", "token_type": "bearer", "scope": "user:email"})
                    .to_string(),
            )
            .create_async()
            .await;

        let mut client = Client::new(GitHub, test_config())
            .unwrap()
            .with_endpoints(mock_endpoints(&server.url()));
        let tokens = client.exchange_code("auth_code").await.unwrap();

        assert_eq!(tokens.access_token.expose_secret(), "gho_abc");
        assert_eq!(
            client.access_token().map(|t| t.expose_secret().clone()),
            Some("gho_abc".to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_code_rejects_error_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_body(json!({"error": "bad_verification_code"}).to_string())
            .create_async()
            .await;

        let mut client = Client::new(GitHub, test_config())
            .unwrap()
            .with_endpoints(mock_endpoints(&server.url()));
        let err = client.exchange_code("stale").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert!(client.access_token().is_none());
    }

    #[tokio::test]
    async fn test_exchange_code_rejects_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login/oauth/access_token")
            .with_status(400)
            .with_body(json!({"error": "invalid_grant"}).to_string())
            .create_async()
            .await;

        let mut client = Client::new(Google, test_config())
            .unwrap()
            .with_endpoints(mock_endpoints(&server.url()));
        let err = client.exchange_code("stale").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
    }

    #[tokio::test]
    async fn test_exchange_code_requires_code() {
        let mut client = Client::new(GitHub, test_config()).unwrap();
        let err = client.exchange_code("").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingCode));
    }
}
