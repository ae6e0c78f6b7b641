//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - HS256 secret used to verify bearer tokens (min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 0.0.0.0)
//! - `API_PORT` / `API_SERVER_PORT` / `BACKEND_PORT` - Listen port, first set wins (default: 3001)
//! - `APP_ENV` / `NODE_ENV` - Environment name (default: development)
//! - `CORS_ORIGINS` - Comma separated list of allowed origins
//! - `RATE_LIMIT_WINDOW_MS` - Rate limit window in milliseconds (default: 900000)
//! - `RATE_LIMIT_MAX_REQUESTS` - Requests per client per window (default: 100)
//! - `MAX_BODY_SIZE` / `MAX_FILE_SIZE` - Request body limit, e.g. `10mb` (default: 10mb)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: the app environment)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "https://myngo.0o0.my",
    "https://api-myngo.0o0.my",
];

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment name (`development`, `production`, ...)
    pub environment: String,
    /// Secret used to verify bearer tokens
    pub jwt_secret: SecretString,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Per-client request rate limit
    pub rate_limit: RateLimitConfig,
    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Per-client rate limit: at most `max_requests` per `window`.
///
/// Both fields are guaranteed non-zero once constructed through
/// [`RateLimitConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    window: Duration,
    max_requests: u32,
}

/// Sentry settings. Error tracking is disabled when `dsn` is `None`.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ApiConfig::from_env`].
    pub fn from_lookup<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get_first_of(&env, &["API_DATABASE_URL", "DATABASE_URL"])
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("API_DATABASE_URL".to_string()))?;

        let host = get_env_or_default(&env, "API_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;

        let port = get_first_of(&env, &["API_PORT", "API_SERVER_PORT", "BACKEND_PORT"])
            .unwrap_or_else(|| "3001".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;

        let environment = get_first_of(&env, &["APP_ENV", "NODE_ENV"])
            .unwrap_or_else(|| "development".to_string());

        let jwt_secret = get_validated_secret(&env, "JWT_SECRET")?;

        let cors_origins = env("CORS_ORIGINS").map_or_else(
            || DEFAULT_CORS_ORIGINS.iter().map(|s| (*s).to_string()).collect(),
            |raw| parse_origins(&raw),
        );

        let window_ms = parse_number::<_, u64>(&env, "RATE_LIMIT_WINDOW_MS", 15 * 60 * 1000)?;
        let max_requests = parse_number::<_, u32>(&env, "RATE_LIMIT_MAX_REQUESTS", 100)?;
        let rate_limit = RateLimitConfig::new(Duration::from_millis(window_ms), max_requests)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "RATE_LIMIT_MAX_REQUESTS".to_string(),
                    "window and request count must both be greater than zero".to_string(),
                )
            })?;

        let max_body_bytes = get_first_of(&env, &["MAX_BODY_SIZE", "MAX_FILE_SIZE"])
            .map_or(Ok(10 * 1024 * 1024), |raw| {
                parse_byte_size(&raw).ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "MAX_BODY_SIZE".to_string(),
                        format!("unrecognised size '{raw}'"),
                    )
                })
            })?;

        let sentry = SentryConfig {
            dsn: env("SENTRY_DSN").filter(|s| !s.is_empty()),
            environment: env("SENTRY_ENVIRONMENT").or_else(|| Some(environment.clone())),
            sample_rate: parse_number::<_, f32>(&env, "SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: parse_number::<_, f32>(&env, "SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            jwt_secret,
            cors_origins,
            rate_limit,
            max_body_bytes,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RateLimitConfig {
    /// Create a rate limit. Returns `None` if either value is zero.
    #[must_use]
    pub fn new(window: Duration, max_requests: u32) -> Option<Self> {
        (!window.is_zero() && max_requests > 0).then_some(Self {
            window,
            max_requests,
        })
    }

    /// Length of the rate limit window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Requests allowed per window; also the burst size.
    #[must_use]
    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Time to replenish a single request slot, never below one millisecond.
    #[must_use]
    pub fn replenish_interval(&self) -> Duration {
        (self.window / self.max_requests).max(Duration::from_millis(1))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the first variable in `keys` that is set.
fn get_first_of<F>(env: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| env(key))
}

/// Get a required environment variable.
fn get_required_env<F>(env: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default<F>(env: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a numeric variable, falling back to `default` when unset.
fn parse_number<F, T>(env: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Split a comma separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a human byte size such as `512kb`, `10mb` or `1048576`.
///
/// Units are binary (`1kb` = 1024 bytes) and case-insensitive.
fn parse_byte_size(raw: &str) -> Option<usize> {
    let lower = raw.trim().to_ascii_lowercase();
    let split = lower
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lower.len());
    let (digits, unit) = lower.split_at(split);
    let value: usize = digits.parse().ok()?;

    let multiplier: usize = match unit.trim() {
        "" | "b" => 1,
        "kb" => 1024,
        "mb" => 1024 * 1024,
        "gb" => 1024 * 1024 * 1024,
        _ => return None,
    };

    value.checked_mul(multiplier)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret<F>(env: &F, key: &str) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = get_required_env(env, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

impl SentryConfig {
    /// Whether a DSN was configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.dsn.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const STRONG_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("API_DATABASE_URL", "postgres://localhost/myngo"),
            ("JWT_SECRET", STRONG_SECRET),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
        assert_eq!(config.environment, "development");
        assert_eq!(config.cors_origins.len(), 4);
        assert_eq!(config.rate_limit.max_requests(), 100);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(900));
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert!(!config.sentry.is_enabled());
    }

    #[test]
    fn test_missing_database_url() {
        let result = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", STRONG_SECRET)]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "API_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_falls_back_to_generic() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://fallback/db"),
            ("JWT_SECRET", STRONG_SECRET),
        ]))
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/db");
    }

    #[test]
    fn test_port_precedence() {
        let mut vars = minimal();
        vars.push(("BACKEND_PORT", "4000"));
        vars.push(("API_SERVER_PORT", "5000"));
        let config = ApiConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.port, 5000);

        vars.push(("API_PORT", "6000"));
        let config = ApiConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.port, 6000);
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = minimal();
        vars.push(("API_PORT", "not-a-port"));
        let result = ApiConfig::from_lookup(lookup(&vars));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_cors_origins_parsed() {
        let mut vars = minimal();
        vars.push(("CORS_ORIGINS", " https://a.test ,https://b.test,, "));
        let config = ApiConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.cors_origins, ["https://a.test", "https://b.test"]);
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut vars = minimal();
        vars.push(("RATE_LIMIT_MAX_REQUESTS", "0"));
        assert!(ApiConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_replenish_interval() {
        let limit = RateLimitConfig::new(Duration::from_secs(900), 100).unwrap();
        assert_eq!(limit.replenish_interval(), Duration::from_secs(9));

        let tight = RateLimitConfig::new(Duration::from_millis(10), 1000).unwrap();
        assert_eq!(tight.replenish_interval(), Duration::from_millis(1));

        assert!(RateLimitConfig::new(Duration::ZERO, 10).is_none());
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("10mb"), Some(10 * 1024 * 1024));
        assert_eq!(parse_byte_size("512KB"), Some(512 * 1024));
        assert_eq!(parse_byte_size("1 gb"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_byte_size("2048"), Some(2048));
        assert_eq!(parse_byte_size("100b"), Some(100));
        assert_eq!(parse_byte_size("ten mb"), None);
        assert_eq!(parse_byte_size("5tb"), None);
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_placeholder() {
        let result = validate_secret_strength("your-jwt-signing-key-goes-right-here", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_too_short() {
        let result = validate_secret_strength("aB3$xY9!", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_low_entropy() {
        let result = validate_secret_strength(&"a".repeat(40), "JWT_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_valid() {
        assert!(validate_secret_strength(STRONG_SECRET, "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let config = ApiConfig::from_lookup(lookup(&minimal())).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains(STRONG_SECRET));
        assert!(!debug_output.contains("postgres://localhost/myngo"));
    }
}
