use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use oauth_login::config::PluginConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

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

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The Auth0 tenant domain, e.g. example.us.auth0.com
    #[arg(long, env)]
    auth0_domain: Option<String>,

    /// The client ID of the Auth0 application.
    #[arg(long, env)]
    auth0_client_id: Option<String>,

    /// The client secret of the Auth0 application.
    #[arg(long, env, hide_env_values = true)]
    auth0_client_secret: Option<String>,

    /// Space separated scopes to request. Defaults to "openid profile email".
    #[arg(long, env)]
    auth0_scope: Option<String>,

    /// Secret used to sign cookies. A random one is generated at startup when unset,
    /// which signs everybody out on every restart.
    #[arg(long, env, hide_env_values = true)]
    secret: Option<String>,

    /// Path prefix the application is served under.
    #[arg(long, env, default_value = "/")]
    base_path: String,

    /// Timeout in seconds for each call to the identity provider
    #[arg(long, env, default_value_t = 5)]
    pub upstream_timeout_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
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

    /// Settings handed to the login flows, keyed the way the Auth0 plugin expects them.
    /// Unset options are left out so the flows can name what is missing.
    pub fn plugin_config(&self) -> PluginConfig {
        [
            ("domain", &self.auth0_domain),
            ("client_id", &self.auth0_client_id),
            ("client_secret", &self.auth0_client_secret),
            ("scope", &self.auth0_scope),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), v)))
        .collect()
    }

    pub fn secret(&self) -> Option<String> {
        self.secret.clone()
    }

    pub fn set_secret(mut self, secret: String) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Mount point with a leading slash and no trailing slash, `/` for the root.
    pub fn base_path(&self) -> String {
        let trimmed = self.base_path.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", trimmed)
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
