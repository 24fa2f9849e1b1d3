use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where the train/predict endpoints live on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteLayout {
    /// `/api/train`, `/api/predict` (the proxied single-page deployment).
    #[default]
    Proxied,
    /// `/train`, `/predict` (the page served next to the backend).
    Root,
}

impl RouteLayout {
    pub fn train_path(self) -> &'static str {
        match self {
            RouteLayout::Proxied => "/api/train",
            RouteLayout::Root => "/train",
        }
    }

    pub fn predict_path(self) -> &'static str {
        match self {
            RouteLayout::Proxied => "/api/predict",
            RouteLayout::Root => "/predict",
        }
    }
}

impl FromStr for RouteLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "proxied" => Ok(RouteLayout::Proxied),
            "root" | "/" => Ok(RouteLayout::Root),
            other => Err(format!("expected `api` or `root`, got `{other}`")),
        }
    }
}

impl fmt::Display for RouteLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteLayout::Proxied => f.write_str("api"),
            RouteLayout::Root => f.write_str("root"),
        }
    }
}

/// Connection settings for the prediction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub routes: RouteLayout,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_API_URL.to_string(),
            routes: RouteLayout::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the environment (and `.env`, if any).
    ///
    /// - `CREDIT_API_URL`: backend base URL (default `http://127.0.0.1:8080`)
    /// - `CREDIT_API_ROUTES`: `api` or `root` (default `api`)
    /// - `CREDIT_API_TIMEOUT_SECS`: request timeout (default 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(url) = lookup("CREDIT_API_URL") {
            config.base_url = parse_base_url(&url)?;
        }

        if let Some(routes) = lookup("CREDIT_API_ROUTES") {
            config.routes = routes.parse().map_err(|reason| ConfigError::Invalid {
                name: "CREDIT_API_ROUTES",
                value: routes.clone(),
                reason,
            })?;
        }

        if let Some(secs) = lookup("CREDIT_API_TIMEOUT_SECS") {
            config.timeout = parse_timeout_secs(&secs)?;
        }

        Ok(config)
    }

    pub fn train_url(&self) -> String {
        format!("{}{}", self.base_url, self.routes.train_path())
    }

    pub fn predict_url(&self) -> String {
        format!("{}{}", self.base_url, self.routes.predict_path())
    }
}

/// Whole seconds, at least one.
pub fn parse_timeout_secs(secs: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "CREDIT_API_TIMEOUT_SECS",
        value: secs.to_string(),
        reason,
    };
    match secs.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be at least 1 second".to_string())),
        Ok(n) => Ok(Duration::from_secs(n)),
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// Validates the scheme and strips trailing slashes.
pub fn parse_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name: "CREDIT_API_URL",
            value: url.to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.train_url(), "http://127.0.0.1:8080/api/train");
    }

    #[test]
    fn root_layout_drops_the_api_prefix() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CREDIT_API_URL", "https://credit.example.com/"),
            ("CREDIT_API_ROUTES", "root"),
            ("CREDIT_API_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.predict_url(), "https://credit.example.com/predict");
        assert_eq!(config.train_url(), "https://credit.example.com/train");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = ClientConfig::from_lookup(lookup(&[("CREDIT_API_ROUTES", "v2")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CREDIT_API_ROUTES", .. }));

        let err = ClientConfig::from_lookup(lookup(&[("CREDIT_API_URL", "localhost:8080")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CREDIT_API_URL", .. }));

        assert!(ClientConfig::from_lookup(lookup(&[("CREDIT_API_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("CREDIT_API_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CREDIT_API_TIMEOUT_SECS", .. }));
        assert_eq!(parse_timeout_secs(" 1 "), Ok(Duration::from_secs(1)));
    }
}
