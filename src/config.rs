//! Configuration types.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::checkin::ProxyConfig;
use crate::error::ConfigError;
use crate::store::DEFAULT_SESSION_FILE;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind: SocketAddr,
    /// JSON file holding every user's session.
    pub session_file: PathBuf,
    /// Text-generation proxy for daily check-ins. `None` uses the static reply.
    pub check_in: Option<ProxyConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5001),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            check_in: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ip: IpAddr = match lookup("HEALTH_ONBOARD_BIND") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "HEALTH_ONBOARD_BIND".to_string(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.bind.ip(),
        };

        let port: u16 = match lookup("HEALTH_ONBOARD_PORT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "HEALTH_ONBOARD_PORT".to_string(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.bind.port(),
        };

        let session_file = lookup("HEALTH_ONBOARD_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let check_in = lookup("LLMPROXY_ENDPOINT")
            .filter(|s| !s.trim().is_empty())
            .map(|endpoint| {
                let api_key = SecretString::from(lookup("LLMPROXY_API_KEY").unwrap_or_default());
                let mut proxy = ProxyConfig::new(endpoint, api_key);
                if let Some(model) = lookup("HEALTH_ONBOARD_MODEL") {
                    proxy.model = model;
                }
                if let Some(secs) = lookup("HEALTH_ONBOARD_CHECKIN_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                {
                    proxy.timeout = Duration::from_secs(secs);
                }
                proxy
            });

        Ok(Self {
            bind: SocketAddr::new(ip, port),
            session_file,
            check_in,
        })
    }
}
