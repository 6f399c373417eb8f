//! Controller configuration loaded from environment variables.

use crate::error::ControllerError;
use std::time::Duration;

const DEFAULT_INVENTORY_URL: &str = "http://sysinv-api.platform:6385";
const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_RESYNC_SECONDS: u64 = 300;

/// Runtime configuration for the controller
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub inventory_url: String,
    pub inventory_token: String,
    pub namespace: String,
    pub resync_interval: Duration,
    pub reconciler_enabled: bool,
}

impl ControllerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let inventory_url = lookup("INVENTORY_URL").unwrap_or_else(|| DEFAULT_INVENTORY_URL.to_string());
        let inventory_token = lookup("INVENTORY_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ControllerError::InvalidConfig(
                "INVENTORY_TOKEN environment variable is required".to_string()
            ))?;
        let namespace = lookup("WATCH_NAMESPACE")
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let resync_seconds = match lookup("RESYNC_INTERVAL_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ControllerError::InvalidConfig(format!("RESYNC_INTERVAL_SECONDS '{}': {}", raw, e))
            })?,
            None => DEFAULT_RESYNC_SECONDS,
        };
        if resync_seconds == 0 {
            return Err(ControllerError::InvalidConfig(
                "RESYNC_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        let reconciler_enabled = match lookup("PLATFORM_NETWORK_RECONCILER_ENABLED") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ControllerError::InvalidConfig(format!(
                    "PLATFORM_NETWORK_RECONCILER_ENABLED must be true or false, got '{}'",
                    raw
                ))
            })?,
            None => true,
        };

        Ok(Self {
            inventory_url,
            inventory_token,
            namespace,
            resync_interval: Duration::from_secs(resync_seconds),
            reconciler_enabled,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
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
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::from_lookup(lookup(&[("INVENTORY_TOKEN", "secret")])).unwrap();
        assert_eq!(config.inventory_url, DEFAULT_INVENTORY_URL);
        assert_eq!(config.namespace, "default");
        assert_eq!(config.resync_interval, Duration::from_secs(300));
        assert!(config.reconciler_enabled);
    }

    #[test]
    fn test_token_required() {
        let result = ControllerConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ControllerError::InvalidConfig(_))));
    }

    #[test]
    fn test_overrides() {
        let config = ControllerConfig::from_lookup(lookup(&[
            ("INVENTORY_TOKEN", "secret"),
            ("INVENTORY_URL", "http://10.0.0.1:6385"),
            ("WATCH_NAMESPACE", "deployment"),
            ("RESYNC_INTERVAL_SECONDS", "60"),
            ("PLATFORM_NETWORK_RECONCILER_ENABLED", "False"),
        ]))
        .unwrap();
        assert_eq!(config.inventory_url, "http://10.0.0.1:6385");
        assert_eq!(config.namespace, "deployment");
        assert_eq!(config.resync_interval, Duration::from_secs(60));
        assert!(!config.reconciler_enabled);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_interval = ControllerConfig::from_lookup(lookup(&[
            ("INVENTORY_TOKEN", "secret"),
            ("RESYNC_INTERVAL_SECONDS", "soon"),
        ]));
        assert!(matches!(bad_interval, Err(ControllerError::InvalidConfig(_))));

        let bad_switch = ControllerConfig::from_lookup(lookup(&[
            ("INVENTORY_TOKEN", "secret"),
            ("PLATFORM_NETWORK_RECONCILER_ENABLED", "maybe"),
        ]));
        assert!(matches!(bad_switch, Err(ControllerError::InvalidConfig(_))));
    }
}
