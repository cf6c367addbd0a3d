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
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("HEALTHIQ_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("HEALTHIQ_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("HEALTHIQ_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("HEALTHIQ_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let benchmark_tolerance_pct = match env::var("HEALTHIQ_BENCHMARK_TOLERANCE") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .ok_or(ConfigError::InvalidTolerance { value: raw })?,
            Err(_) => AnalyticsConfig::DEFAULT_TOLERANCE_PCT,
        };

        let milestone_interval_days = match env::var("HEALTHIQ_MILESTONE_INTERVAL_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::InvalidMilestoneInterval { value: raw })?,
            Err(_) => AnalyticsConfig::DEFAULT_MILESTONE_INTERVAL_DAYS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            analytics: AnalyticsConfig {
                benchmark_tolerance_pct,
                milestone_interval_days,
            },
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for benchmark classification and improvement projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsConfig {
    pub benchmark_tolerance_pct: f64,
    pub milestone_interval_days: u32,
}

impl AnalyticsConfig {
    pub const DEFAULT_TOLERANCE_PCT: f64 = 10.0;
    pub const DEFAULT_MILESTONE_INTERVAL_DAYS: u32 = 30;
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            benchmark_tolerance_pct: Self::DEFAULT_TOLERANCE_PCT,
            milestone_interval_days: Self::DEFAULT_MILESTONE_INTERVAL_DAYS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTolerance { value: String },
    InvalidMilestoneInterval { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "HEALTHIQ_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "HEALTHIQ_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTolerance { value } => write!(
                f,
                "HEALTHIQ_BENCHMARK_TOLERANCE must be a non-negative percentage, got '{value}'"
            ),
            ConfigError::InvalidMilestoneInterval { value } => write!(
                f,
                "HEALTHIQ_MILESTONE_INTERVAL_DAYS must be a positive day count, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTolerance { .. }
            | ConfigError::InvalidMilestoneInterval { .. } => None,
        }
    }
}
