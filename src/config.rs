//! Configuration management

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{self, Context, Result};

use crate::services::directions::{
    DirectionsConfig, GoogleDirectionsConfig, ProxyDirectionsConfig,
};

/// Which directions provider the binary talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionsProvider {
    Google,
    Proxy,
    Mock,
}

impl FromStr for DirectionsProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(DirectionsProvider::Google),
            "proxy" => Ok(DirectionsProvider::Proxy),
            "mock" => Ok(DirectionsProvider::Mock),
            other => anyhow::bail!(
                "Unknown DIRECTIONS_PROVIDER '{}' (expected google, proxy or mock)",
                other
            ),
        }
    }
}

impl fmt::Display for DirectionsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirectionsProvider::Google => "google",
            DirectionsProvider::Proxy => "proxy",
            DirectionsProvider::Mock => "mock",
        })
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub provider: DirectionsProvider,

    /// Google Directions API key (required for the google provider)
    pub google_api_key: Option<String>,

    pub google_directions_url: String,

    /// Routing proxy endpoint (required for the proxy provider)
    pub route_proxy_url: Option<String>,

    /// Routing proxy subscription key, kept server-side
    pub route_proxy_subscription_key: Option<String>,

    pub route_proxy_api_version: String,

    /// Deadline for one directions request
    pub directions_timeout_seconds: u64,

    /// Directory for rolling log files
    pub logs_dir: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("google_directions_url", &self.google_directions_url)
            .field("route_proxy_url", &self.route_proxy_url)
            .field("route_proxy_api_version", &self.route_proxy_api_version)
            .field("directions_timeout_seconds", &self.directions_timeout_seconds)
            .field("logs_dir", &self.logs_dir)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match var("DIRECTIONS_PROVIDER") {
            Some(value) => value.parse()?,
            None => DirectionsProvider::Mock,
        };

        let google_api_key = var("GOOGLE_MAPS_API_KEY");
        let google_directions_url = var("GOOGLE_DIRECTIONS_URL")
            .unwrap_or_else(|| crate::services::directions::GOOGLE_DIRECTIONS_URL.to_string());

        let route_proxy_url = var("ROUTE_PROXY_URL");
        let route_proxy_subscription_key = var("ROUTE_PROXY_SUBSCRIPTION_KEY");
        let route_proxy_api_version = var("ROUTE_PROXY_API_VERSION")
            .unwrap_or_else(|| crate::services::directions::DEFAULT_PROXY_API_VERSION.to_string());

        let directions_timeout_seconds = match var("DIRECTIONS_TIMEOUT_SECONDS") {
            Some(value) => value
                .parse::<u64>()
                .context("DIRECTIONS_TIMEOUT_SECONDS must be a whole number of seconds")?,
            None => crate::types::DEFAULT_DIRECTIONS_TIMEOUT.as_secs(),
        };
        if directions_timeout_seconds == 0 {
            anyhow::bail!("DIRECTIONS_TIMEOUT_SECONDS must be greater than zero");
        }

        let logs_dir = var("LOGS_DIR").unwrap_or_else(|| "./logs".to_string());

        match provider {
            DirectionsProvider::Google if google_api_key.is_none() => {
                anyhow::bail!("GOOGLE_MAPS_API_KEY must be set for the google provider")
            }
            DirectionsProvider::Proxy if route_proxy_url.is_none() => {
                anyhow::bail!("ROUTE_PROXY_URL must be set for the proxy provider")
            }
            DirectionsProvider::Proxy if route_proxy_subscription_key.is_none() => {
                anyhow::bail!("ROUTE_PROXY_SUBSCRIPTION_KEY must be set for the proxy provider")
            }
            _ => {}
        }

        Ok(Self {
            provider,
            google_api_key,
            google_directions_url,
            route_proxy_url,
            route_proxy_subscription_key,
            route_proxy_api_version,
            directions_timeout_seconds,
            logs_dir,
        })
    }

    pub fn directions_timeout(&self) -> Duration {
        Duration::from_secs(self.directions_timeout_seconds)
    }

    /// Provider settings for `create_directions_client`
    pub fn directions_config(&self) -> DirectionsConfig {
        match self.provider {
            DirectionsProvider::Google => DirectionsConfig::Google(GoogleDirectionsConfig {
                base_url: self.google_directions_url.clone(),
                api_key: self.google_api_key.clone().unwrap_or_default(),
                timeout_seconds: self.directions_timeout_seconds,
            }),
            DirectionsProvider::Proxy => DirectionsConfig::Proxy(ProxyDirectionsConfig {
                base_url: self.route_proxy_url.clone().unwrap_or_default(),
                subscription_key: self.route_proxy_subscription_key.clone().unwrap_or_default(),
                api_version: self.route_proxy_api_version.clone(),
                timeout_seconds: self.directions_timeout_seconds,
            }),
            DirectionsProvider::Mock => DirectionsConfig::Mock,
        }
    }
}
