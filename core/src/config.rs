//! Transport configuration.
//!
//! Defaults leave every reqwest setting alone, so timeouts and connection
//! reuse stay whatever the client ships with.

use serde::Deserialize;

pub const USER_AGENT_ENV: &str = "NETKIT_USER_AGENT";
pub const PROXY_ENV: &str = "NETKIT_PROXY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Sent as `User-Agent` unless a request sets its own.
    pub user_agent: Option<String>,
    /// Proxy for all schemes, e.g. `http://127.0.0.1:8080`.
    pub proxy: Option<String>,
}

impl TransportConfig {
    /// Read overrides from `NETKIT_USER_AGENT` and `NETKIT_PROXY`. Unset or
    /// empty variables leave the default in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        Self {
            user_agent: non_empty(USER_AGENT_ENV),
            proxy: non_empty(PROXY_ENV),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_overrides_nothing() {
        let config = TransportConfig::default();
        assert!(config.user_agent.is_none());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn lookup_reads_known_keys() {
        let env: HashMap<&str, &str> =
            [(USER_AGENT_ENV, "netkit/0.1"), (PROXY_ENV, "http://127.0.0.1:8080")].into();
        let config = TransportConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.user_agent.as_deref(), Some("netkit/0.1"));
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = TransportConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, TransportConfig::default());
    }

    #[test]
    fn deserializes_partial_json() {
        let config: TransportConfig = serde_json::from_str(r#"{"user_agent":"probe"}"#).unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("probe"));
        assert!(config.proxy.is_none());
    }
}
