//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AMORK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `AMORK_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `AMORK_HOST` - Bind address (default: 127.0.0.1)
//! - `AMORK_PORT` - Listen port (default: 5000)
//! - `AMORK_JWT_ISSUER` - Token issuer claim (default: amork-api)
//! - `AMORK_JWT_AUDIENCE` - Token audience claim (default: amork-app)
//! - `AMORK_TOKEN_TTL_DAYS` - Token lifetime in days (default: 7)
//! - `AMORK_DELIVERY_FEE` - Flat delivery fee per order (default: 1.00)
//! - `AMORK_TAX` - Flat tax per order (default: 0.00)
//! - `AMORK_CORS_ORIGINS` - Comma-separated allowed origins (default: none)
//! - `AMORK_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use amork_core::types::money::validate_price;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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
    /// Session token settings
    pub jwt: JwtConfig,
    /// Order charges
    pub pricing: PricingConfig,
    /// Origins allowed by CORS; empty disables the CORS layer
    pub cors_origins: Vec<String>,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Take the client IP from `X-Forwarded-For`/`X-Real-IP`; only set
    /// behind a proxy that overwrites those headers
    pub trust_proxy: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Session token configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: SecretString,
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim
    pub audience: String,
    /// Token lifetime in days
    pub ttl_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_days", &self.ttl_days)
            .finish()
    }
}

/// Flat charges added to every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    pub delivery_fee: Decimal,
    pub tax: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            delivery_fee: Decimal::ONE,
            tax: Decimal::ZERO,
        }
    }
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

        let database_url = get_database_url("AMORK_DATABASE_URL")?;
        let host = parse_env("AMORK_HOST", "127.0.0.1")?;
        let port = parse_env("AMORK_PORT", "5000")?;

        let jwt = JwtConfig::from_env()?;
        let pricing = PricingConfig::from_env()?;

        let cors_origins = parse_origins(&get_env_or_default("AMORK_CORS_ORIGINS", ""));
        let log_json = is_truthy(&get_env_or_default("AMORK_LOG_JSON", ""));
        let trust_proxy = is_truthy(&get_env_or_default("AMORK_TRUST_PROXY", ""));

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            pricing,
            cors_origins,
            log_json,
            trust_proxy,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = signing_secret("AMORK_JWT_SECRET")?;

        let ttl_days: i64 = parse_env("AMORK_TOKEN_TTL_DAYS", "7")?;
        if ttl_days < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "AMORK_TOKEN_TTL_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            secret,
            issuer: get_env_or_default("AMORK_JWT_ISSUER", "amork-api"),
            audience: get_env_or_default("AMORK_JWT_AUDIENCE", "amork-app"),
            ttl_days,
        })
    }
}

impl PricingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            delivery_fee: parse_amount(
                "AMORK_DELIVERY_FEE",
                &get_env_or_default("AMORK_DELIVERY_FEE", "1.00"),
            )?,
            tax: parse_amount("AMORK_TAX", &get_env_or_default("AMORK_TAX", "0.00"))?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a non-negative money amount with at most two decimal places.
fn parse_amount(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    let amount = value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    validate_price(amount).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Bits of Shannon entropy per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject signing secrets that are short, look like a placeholder, or have
/// too little entropy to resist guessing.
fn check_signing_secret(key: &str, secret: &str) -> Result<(), ConfigError> {
    let insecure = |why: String| ConfigError::InsecureSecret(key.to_string(), why);

    let len = secret.chars().count();
    if len < MIN_JWT_SECRET_LENGTH {
        return Err(insecure(format!(
            "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {len})"
        )));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(insecure(format!(
            "appears to be a placeholder (contains '{pattern}')"
        )));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}), use a randomly generated secret"
        )));
    }
    Ok(())
}

/// Load the token signing secret.
fn signing_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    check_signing_secret(key, &value)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6v";

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy(STRONG) > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_signing_secret_checks() {
        assert!(check_signing_secret("K", STRONG).is_ok());

        let short = check_signing_secret("K", "k9$Lm2!q").unwrap_err();
        assert!(short.to_string().contains("at least 32"));

        let placeholder =
            check_signing_secret("K", "changeme-changeme-changeme-changeme").unwrap_err();
        assert!(placeholder.to_string().contains("placeholder"));

        let flat = check_signing_secret("K", &"ab".repeat(16)).unwrap_err();
        assert!(flat.to_string().contains("entropy"));
    }
    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("FEE", " 1.00 ").unwrap(),
            "1.00".parse::<Decimal>().unwrap()
        );
        assert!(matches!(
            parse_amount("FEE", "-1"),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "FEE"
        ));
        assert!(parse_amount("FEE", "1.005").is_err());
        assert!(parse_amount("FEE", "one").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://amork.app ,,"),
            vec!["http://localhost:3000", "https://amork.app"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(!is_truthy(""));
        assert!(!is_truthy("0"));
    }

    #[test]
    fn test_pricing_default() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.delivery_fee, Decimal::ONE);
        assert_eq!(pricing.tax, Decimal::ZERO);
    }

    #[test]
    fn test_jwt_config_debug_redacts_secret() {
        let config = JwtConfig {
            secret: SecretString::from(STRONG.to_string()),
            issuer: "amork-api".to_string(),
            audience: "amork-app".to_string(),
            ttl_days: 7,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("aB3$"));
    }
}
