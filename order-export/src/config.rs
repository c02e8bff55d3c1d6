//! Export service configuration
//!
//! Read once at start-up and handed to the components that need it; nothing
//! reads the environment at request time.

use std::fmt::Display;
use std::str::FromStr;

use crate::export::FilterStrategy;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Upstream order API settings
#[derive(Debug, Clone)]
pub struct OrdersApiConfig {
    /// Base URL of the order API (without project key)
    pub api_url: String,
    /// Project key, first path segment of every call
    pub project_key: String,
    /// Pre-issued bearer token, forwarded as-is
    pub token: Option<String>,
    /// Optional `limit` query parameter; upstream default when unset
    pub page_limit: Option<u32>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// What to export and where to put it
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub strategy: FilterStrategy,
    /// Target bucket
    pub bucket: String,
    /// Key prefix; one namespace per deployment
    pub prefix: String,
    /// Appended to the date to form the file name
    pub file_suffix: String,
}

/// Object store settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub region: String,
    /// S3-compatible endpoint override (path-style addressing)
    pub endpoint_url: Option<String>,
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub http_port: u16,
    pub orders: OrdersApiConfig,
    pub export: ExportConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| var(name).ok_or_else(|| format!("{name} must be set"));

        let strategy: FilterStrategy = match var("EXPORT_STRATEGY") {
            Some(raw) => raw.parse()?,
            None => FilterStrategy::LastModifiedLocal,
        };

        Ok(Self {
            http_port: parse_var("HTTP_PORT", var("HTTP_PORT"))?.unwrap_or(8080),
            orders: OrdersApiConfig {
                api_url: require("ORDERS_API_URL")?,
                project_key: require("ORDERS_PROJECT_KEY")?,
                token: var("ORDERS_API_TOKEN"),
                page_limit: parse_var("ORDERS_PAGE_LIMIT", var("ORDERS_PAGE_LIMIT"))?,
                timeout_secs: parse_var("ORDERS_TIMEOUT_SECS", var("ORDERS_TIMEOUT_SECS"))?
                    .unwrap_or(30),
            },
            export: ExportConfig {
                strategy,
                bucket: var("EXPORT_S3_BUCKET")
                    .unwrap_or_else(|| "innovation-training-2024".into()),
                prefix: var("EXPORT_S3_PREFIX")
                    .unwrap_or_else(|| strategy.default_prefix().into()),
                file_suffix: var("EXPORT_FILE_SUFFIX")
                    .unwrap_or_else(|| strategy.default_file_suffix().into()),
            },
            store: StoreConfig {
                region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".into()),
                endpoint_url: var("S3_ENDPOINT_URL"),
            },
        })
    }
}

/// Parse an optional numeric variable; a value that is set must be valid
fn parse_var<T>(name: &str, raw: Option<String>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(|v| v.trim().parse::<T>())
        .transpose()
        .map_err(|e| format!("{name} is invalid: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("ORDERS_API_URL", "https://api.example.com"),
        ("ORDERS_PROJECT_KEY", "shop"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.orders.timeout_secs, 30);
        assert!(config.orders.token.is_none());
        assert!(config.orders.page_limit.is_none());
        assert_eq!(config.export.strategy, FilterStrategy::LastModifiedLocal);
        assert_eq!(config.export.bucket, "innovation-training-2024");
        assert_eq!(config.export.file_suffix, ".csv");
        assert_eq!(config.store.region, "us-east-1");
        assert!(config.store.endpoint_url.is_none());
    }

    #[test]
    fn test_created_at_strategy_defaults() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EXPORT_STRATEGY", "created-at"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.export.strategy, FilterStrategy::CreatedAtUtc);
        assert_eq!(config.export.file_suffix, "-orders.csv");
        assert_ne!(
            config.export.prefix,
            FilterStrategy::LastModifiedLocal.default_prefix()
        );
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("HTTP_PORT", "9090"),
            ("ORDERS_API_TOKEN", "secret"),
            ("ORDERS_PAGE_LIMIT", "500"),
            ("EXPORT_S3_BUCKET", "exports"),
            ("EXPORT_S3_PREFIX", "team-a"),
            ("AWS_REGION", "eu-west-1"),
            ("S3_ENDPOINT_URL", "http://localhost:4566"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.orders.token.as_deref(), Some("secret"));
        assert_eq!(config.orders.page_limit, Some(500));
        assert_eq!(config.export.bucket, "exports");
        assert_eq!(config.export.prefix, "team-a");
        assert_eq!(config.store.region, "eu-west-1");
        assert_eq!(
            config.store.endpoint_url.as_deref(),
            Some("http://localhost:4566")
        );
    }

    #[test]
    fn test_missing_api_url_is_error() {
        let err = Config::from_lookup(lookup(&[("ORDERS_PROJECT_KEY", "shop")])).unwrap_err();
        assert!(err.to_string().contains("ORDERS_API_URL"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            ("ORDERS_API_URL", "https://api.example.com"),
            ("ORDERS_PROJECT_KEY", "  "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ORDERS_PROJECT_KEY"));
    }

    #[test]
    fn test_unknown_strategy_is_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EXPORT_STRATEGY", "yesterday"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_invalid_page_limit_is_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ORDERS_PAGE_LIMIT", "lots"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("ORDERS_PAGE_LIMIT"));
    }

    #[test]
    fn test_invalid_port_is_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("HTTP_PORT", "80800"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
    }

    #[test]
    fn test_invalid_timeout_is_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ORDERS_TIMEOUT_SECS", "30s"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("ORDERS_TIMEOUT_SECS"));
    }

    #[test]
    fn test_numeric_values_are_trimmed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("HTTP_PORT", " 9000 "), ("ORDERS_TIMEOUT_SECS", "5")]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.orders.timeout_secs, 5);
    }
}
