use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default GitHub scope: enough to read the user's email addresses.
pub const DEFAULT_GITHUB_SCOPE: &str = "user:email";
/// Default Google scopes for the userinfo endpoint.
pub const DEFAULT_GOOGLE_SCOPE: &str = "openid,email,profile";

/// Upper bound for `OAUTH_STATE_TTL_SECS`: one day.
pub const MAX_OAUTH_STATE_TTL_SECS: i64 = 86_400;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl fmt::Display for RustEnvParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected one of: development, production, staging")
    }
}

impl std::error::Error for RustEnvParseError {}

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

/// Registered OAuth application credentials for one provider.
#[derive(Clone, PartialEq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: Vec<String>,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// OAuth client ID of the registered GitHub application
    #[arg(long, env)]
    github_client_id: Option<String>,

    /// OAuth client secret of the registered GitHub application
    #[arg(long, env, hide_env_values = true)]
    github_client_secret: Option<String>,

    /// Callback URL registered with GitHub (e.g. https://cms.example.com/oauth/github/callback)
    #[arg(long, env)]
    github_redirect_uri: Option<String>,

    /// Comma separated scopes requested from GitHub
    #[arg(long, env, value_delimiter = ',', default_value = DEFAULT_GITHUB_SCOPE)]
    github_scope: Vec<String>,

    /// OAuth client ID of the registered Google application
    #[arg(long, env)]
    google_client_id: Option<String>,

    /// OAuth client secret of the registered Google application
    #[arg(long, env, hide_env_values = true)]
    google_client_secret: Option<String>,

    /// Callback URL registered with Google (e.g. https://cms.example.com/oauth/google/callback)
    #[arg(long, env)]
    google_redirect_uri: Option<String>,

    /// Comma separated scopes requested from Google
    #[arg(long, env, value_delimiter = ',', default_value = DEFAULT_GOOGLE_SCOPE)]
    google_scope: Vec<String>,

    /// Timeout in seconds for every request made to an OAuth provider
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// User-Agent sent to OAuth providers (GitHub rejects requests without one)
    #[arg(long, env)]
    http_user_agent: Option<String>,

    /// Seconds a login attempt may take between redirect and callback
    #[arg(
        long,
        env,
        default_value_t = 600,
        value_parser = clap::value_parser!(i64).range(1..=MAX_OAUTH_STATE_TTL_SECS)
    )]
    pub oauth_state_ttl_secs: i64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
    )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(short, long, env, default_value_t = RustEnv::Development)]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// GitHub credentials, if id, secret and redirect URI are all configured.
    pub fn github_credentials(&self) -> Option<OAuthCredentials> {
        credentials(
            &self.github_client_id,
            &self.github_client_secret,
            &self.github_redirect_uri,
            &self.github_scope,
        )
    }

    /// Google credentials, if id, secret and redirect URI are all configured.
    pub fn google_credentials(&self) -> Option<OAuthCredentials> {
        credentials(
            &self.google_client_id,
            &self.google_client_secret,
            &self.google_redirect_uri,
            &self.google_scope,
        )
    }

    pub fn http_user_agent(&self) -> String {
        self.http_user_agent
            .clone()
            .unwrap_or_else(|| format!("cms-auth/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

fn credentials(
    client_id: &Option<String>,
    client_secret: &Option<String>,
    redirect_uri: &Option<String>,
    scope: &[String],
) -> Option<OAuthCredentials> {
    let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

    Some(OAuthCredentials {
        client_id: present(client_id)?,
        client_secret: present(client_secret)?,
        redirect_uri: present(redirect_uri)?,
        scope: scope
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["cms_auth"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_rust_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn test_github_credentials_require_all_fields() {
        let config = parse(&[
            "--github-client-id",
            "gh-id",
            "--github-redirect-uri",
            "https://cms.example.com/oauth/github/callback",
        ]);
        assert_eq!(config.github_credentials(), None);

        let config = parse(&[
            "--github-client-id",
            "gh-id",
            "--github-client-secret",
            "gh-secret",
            "--github-redirect-uri",
            "https://cms.example.com/oauth/github/callback",
        ]);
        let credentials = config.github_credentials().unwrap();
        assert_eq!(credentials.client_id, "gh-id");
        assert_eq!(credentials.client_secret, "gh-secret");
        assert_eq!(credentials.scope, vec!["user:email"]);
    }

    #[test]
    fn test_google_scope_defaults_and_overrides() {
        let config = parse(&[
            "--google-client-id",
            "g-id",
            "--google-client-secret",
            "g-secret",
            "--google-redirect-uri",
            "https://cms.example.com/oauth/google/callback",
        ]);
        assert_eq!(
            config.google_credentials().unwrap().scope,
            vec!["openid", "email", "profile"]
        );

        let config = parse(&[
            "--google-client-id",
            "g-id",
            "--google-client-secret",
            "g-secret",
            "--google-redirect-uri",
            "https://cms.example.com/oauth/google/callback",
            "--google-scope",
            "email, profile",
        ]);
        assert_eq!(
            config.google_credentials().unwrap().scope,
            vec!["email", "profile"]
        );
    }

    #[test]
    fn test_log_level_and_runtime_env_flags() {
        let config = parse(&["--log-level-filter", "debug", "--runtime-env", "PRODUCTION"]);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert!(config.is_production());
    }

    #[test]
    fn test_oauth_state_ttl_must_be_positive_and_bounded() {
        assert_eq!(parse(&[]).oauth_state_ttl_secs, 600);
        assert_eq!(
            parse(&["--oauth-state-ttl-secs", "86400"]).oauth_state_ttl_secs,
            MAX_OAUTH_STATE_TTL_SECS
        );

        for ttl in ["0", "-5", "86401", "9223372036854775807"] {
            assert!(
                Config::try_parse_from(["cms_auth", "--oauth-state-ttl-secs", ttl]).is_err(),
                "{ttl} should be rejected"
            );
        }
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let credentials = OAuthCredentials {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
            redirect_uri: "https://cms.example.com/cb".to_string(),
            scope: vec![],
        };
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
