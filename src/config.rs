//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::catalog::LoadPolicy;
use crate::pricing::PricingRules;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feed A: JSON array of products
    #[serde(default = "default_fake_store_url")]
    pub fake_store_url: String,

    /// Feed B: `{ "products": [...] }` envelope
    #[serde(default = "default_dummy_json_url")]
    pub dummy_json_url: String,

    /// How to combine the two feed outcomes
    #[serde(default)]
    pub policy: LoadPolicy,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Fixed seed for synthesized reviews (reproducible output)
    #[serde(default)]
    pub review_seed: Option<u64>,

    /// Tax rate, free shipping threshold and flat shipping cost
    #[serde(default)]
    pub pricing: PricingRules,

    /// Simulated order processing time in milliseconds
    #[serde(default = "default_checkout_delay_ms")]
    pub checkout_delay_ms: u64,

    /// Email dispatch endpoint
    #[serde(default = "default_email_endpoint")]
    pub email_endpoint: String,

    #[serde(default)]
    pub email_service_id: String,

    #[serde(default)]
    pub email_template_id: String,

    #[serde(default)]
    pub email_user_id: String,

    /// Page that accepts `?email=..&token=..` reset links
    #[serde(default = "default_reset_base_url")]
    pub reset_base_url: String,

    /// Where cart, wishlist, users and orders are kept
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_fake_store_url() -> String {
    "https://fakestoreapi.com/products".to_string()
}

fn default_dummy_json_url() -> String {
    "https://dummyjson.com/products?limit=100".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_checkout_delay_ms() -> u64 {
    2000
}

fn default_email_endpoint() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".to_string()
}

fn default_reset_base_url() -> String {
    "http://localhost:3000/reset-password".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fake_store_url: default_fake_store_url(),
            dummy_json_url: default_dummy_json_url(),
            policy: LoadPolicy::default(),
            request_timeout_secs: default_request_timeout_secs(),
            proxy: None,
            review_seed: None,
            pricing: PricingRules::default(),
            checkout_delay_ms: default_checkout_delay_ms(),
            email_endpoint: default_email_endpoint(),
            email_service_id: String::new(),
            email_template_id: String::new(),
            email_user_id: String::new(),
            reset_base_url: default_reset_base_url(),
            data_dir: None,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("zenvia").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides. Unparseable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("ZENVIA_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(proxy) = std::env::var("ZENVIA_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(rate) = std::env::var("ZENVIA_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(r) if (0.0..=1.0).contains(&r) => self.pricing.tax_rate = r,
                _ => debug!("Ignoring ZENVIA_TAX_RATE={}", rate),
            }
        }

        if let Ok(policy) = std::env::var("ZENVIA_POLICY") {
            if let Ok(p) = policy.parse() {
                self.policy = p;
            }
        }

        self
    }

    /// Resolved data directory: configured path, else the platform data dir,
    /// else `./.zenvia`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("zenvia")))
            .unwrap_or_else(|| PathBuf::from(".zenvia"))
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fake_store_url, "https://fakestoreapi.com/products");
        assert!(config.dummy_json_url.contains("limit=100"));
        assert_eq!(config.policy, LoadPolicy::Partial);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.checkout_delay_ms, 2000);
        assert_eq!(config.pricing, PricingRules::default());
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.proxy.is_none());
        assert!(config.review_seed.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("table, json, markdown, csv"));
    }

    #[test]
    fn test_output_format_serde() {
        let json = serde_json::to_string(&OutputFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");

        let parsed: OutputFormat = serde_json::from_str("\"markdown\"").unwrap();
        assert_eq!(parsed, OutputFormat::Markdown);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            policy = "strict"
            checkout_delay_ms = 0
            review_seed = 42

            [pricing]
            tax_rate = 0.08
            free_shipping_threshold = 50.0
            shipping_cost = 5.0
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.policy, LoadPolicy::Strict);
        assert_eq!(config.checkout_delay_ms, 0);
        assert_eq!(config.review_seed, Some(42));
        assert_eq!(config.pricing.tax_rate, 0.08);
        assert_eq!(config.pricing.shipping_cost, 5.0);
        // Untouched fields keep their defaults
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            email_service_id = "service_x"
            data_dir = "/tmp/zenvia-test"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.email_service_id, "service_x");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/zenvia-test"));
    }

    #[test]
    fn test_config_from_file_not_found() {
        let err = Config::from_file("/nonexistent/path/config.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = 3").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.request_timeout_secs, 3);
    }

    // Env-var cases share one test so they cannot race each other.
    #[test]
    fn test_config_with_env() {
        let vars = ["ZENVIA_DATA_DIR", "ZENVIA_PROXY", "ZENVIA_TAX_RATE", "ZENVIA_POLICY"];
        let saved: Vec<_> = vars.iter().map(|v| std::env::var(v).ok()).collect();

        std::env::set_var("ZENVIA_DATA_DIR", "/var/lib/zenvia");
        std::env::set_var("ZENVIA_PROXY", "http://proxy:8080");
        std::env::set_var("ZENVIA_TAX_RATE", "0.07");
        std::env::set_var("ZENVIA_POLICY", "strict");

        let config = Config::new().with_env();
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/zenvia")));
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
        assert_eq!(config.pricing.tax_rate, 0.07);
        assert_eq!(config.policy, LoadPolicy::Strict);

        std::env::set_var("ZENVIA_TAX_RATE", "lots");
        std::env::set_var("ZENVIA_POLICY", "sometimes");
        let config = Config::new().with_env();
        assert_eq!(config.pricing.tax_rate, 0.05);
        assert_eq!(config.policy, LoadPolicy::Partial);

        for (var, value) in vars.iter().zip(saved) {
            match value {
                Some(v) => std::env::set_var(var, v),
                None => std::env::remove_var(var),
            }
        }
    }
}
