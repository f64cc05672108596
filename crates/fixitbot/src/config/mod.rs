use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub detector: DetectorConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            detector: DetectorConfig::from_env(),
            chat: ChatConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Settings for the hosted object-detection endpoint.
///
/// `model` and `api_key` are optional on purpose: an unconfigured detector
/// degrades to the fallback heuristic instead of blocking startup.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub base_url: String,
    pub api_base: String,
    pub model: Option<String>,
    pub version: String,
    pub api_key: Option<String>,
    pub confidence: String,
    pub overlap: String,
}

impl DetectorConfig {
    fn from_env() -> Self {
        Self {
            base_url: sanitized_env("DETECTOR_BASE_URL")
                .unwrap_or_else(|| "https://detect.roboflow.com".to_string()),
            api_base: sanitized_env("DETECTOR_API_BASE")
                .unwrap_or_else(|| "https://api.roboflow.com".to_string()),
            model: sanitized_env("DETECTOR_MODEL"),
            version: sanitized_env("DETECTOR_VERSION").unwrap_or_else(|| "1".to_string()),
            api_key: sanitized_env("DETECTOR_API_KEY"),
            confidence: sanitized_env("DETECTOR_CONFIDENCE").unwrap_or_else(|| "0.25".to_string()),
            overlap: sanitized_env("DETECTOR_OVERLAP").unwrap_or_else(|| "0.45".to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some() && self.api_key.is_some()
    }
}

/// Settings for the conversational-agent backend.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub agent_url: Option<String>,
    pub access_token: Option<String>,
    pub language: String,
}

impl ChatConfig {
    fn from_env() -> Self {
        Self {
            agent_url: sanitized_env("CHAT_AGENT_URL"),
            access_token: sanitized_env("CHAT_AGENT_TOKEN"),
            language: sanitized_env("CHAT_LANGUAGE").unwrap_or_else(|| "es".to_string()),
        }
    }
}

/// Reads an env var, trimming whitespace and wrapping quotes that hosting
/// dashboards tend to paste in with the value. Empty results count as unset.
fn sanitized_env(key: &str) -> Option<String> {
    let raw = env::var(key).ok()?;
    let cleaned = raw
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
