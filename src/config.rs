//! Frontend configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The configuration is immutable once
//! handed to the frontend.

use std::path::{Path, PathBuf};

use crate::error::{FrontendError, Result};

/// Zeroconf name used when `HTTP_ZEROCONF` is not set.
pub const DEFAULT_ZEROCONF_NAME: &str = "Mopidy HTTP server on $hostname";

/// Top-level frontend configuration.
///
/// Loaded once at startup via [`FrontendConfig::from_env`], or built
/// directly with [`FrontendConfig::new`] and the `with_*` setters.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Host or address the HTTP server binds to (e.g. `0.0.0.0`).
    pub hostname: String,

    /// TCP port. Kept wider than `u16` so out-of-range values reach
    /// [`FrontendConfig::validate`] instead of wrapping.
    pub port: u32,

    /// Service name advertised over Zeroconf. `None` disables discovery.
    pub zeroconf_name: Option<String>,

    /// Directory served at `/`. `None` selects the bundled web client.
    pub static_dir: Option<PathBuf>,

    /// Bundled asset directory serving `/mopidy` and the favicon.
    pub data_dir: PathBuf,

    /// Whether the engine's per-request tracing is mounted.
    pub access_log: bool,

    /// Capacity of the domain [`crate::domain::EventBus`].
    pub event_bus_capacity: usize,

    /// Outbound broadcast buffer per WebSocket connection. A connection
    /// falling further behind loses the oldest messages.
    pub ws_buffer_capacity: usize,

    /// Capacity of the lifecycle actor's command mailbox.
    pub mailbox_capacity: usize,
}

impl FrontendConfig {
    /// Creates a configuration for `hostname:port` with discovery disabled
    /// and every other setting at its default.
    #[must_use]
    pub fn new(hostname: impl Into<String>, port: u32) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            zeroconf_name: None,
            static_dir: None,
            data_dir: bundled_data_dir(),
            access_log: false,
            event_bus_capacity: 1_000,
            ws_buffer_capacity: 256,
            mailbox_capacity: 1_024,
        }
    }

    /// Sets the Zeroconf service name. Blank names disable discovery.
    #[must_use]
    pub fn with_zeroconf_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.zeroconf_name = (!name.trim().is_empty()).then_some(name);
        self
    }

    /// Overrides the directory served at `/`.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Overrides the bundled asset directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Config`] if `HTTP_PORT` is set but is not
    /// a number.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Config`] if `HTTP_PORT` is present but
    /// unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hostname = lookup("HTTP_HOSTNAME").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("HTTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| FrontendError::Config(format!("HTTP_PORT is not a number: {raw}")))?,
            None => 6680,
        };

        let defaults = Self::new(hostname, port);

        let zeroconf_name = lookup("HTTP_ZEROCONF")
            .unwrap_or_else(|| DEFAULT_ZEROCONF_NAME.to_string());

        let mut config = defaults.with_zeroconf_name(zeroconf_name);
        config.static_dir = lookup("HTTP_STATIC_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        if let Some(dir) = lookup("HTTP_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        config.access_log = parse_bool(lookup("HTTP_ACCESS_LOG").as_deref(), false);
        config.event_bus_capacity =
            parse_or(lookup("EVENT_BUS_CAPACITY").as_deref(), config.event_bus_capacity);
        config.ws_buffer_capacity =
            parse_or(lookup("WS_BUFFER_CAPACITY").as_deref(), config.ws_buffer_capacity);
        config.mailbox_capacity =
            parse_or(lookup("FRONTEND_MAILBOX_CAPACITY").as_deref(), config.mailbox_capacity);

        Ok(config)
    }

    /// Checks the settings `start` depends on.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Config`] when the port is outside
    /// `1..=65535`, the hostname is blank, or a capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(FrontendError::Config("hostname must not be empty".into()));
        }
        if !(1..=u32::from(u16::MAX)).contains(&self.port) {
            return Err(FrontendError::Config(format!(
                "port {} is outside 1-65535",
                self.port
            )));
        }
        if self.ws_buffer_capacity == 0
            || self.event_bus_capacity == 0
            || self.mailbox_capacity == 0
        {
            return Err(FrontendError::Config("capacities must be positive".into()));
        }
        Ok(())
    }

    /// Port as `u16`, once [`FrontendConfig::validate`] has passed.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Config`] for out-of-range ports.
    pub fn port_u16(&self) -> Result<u16> {
        u16::try_from(self.port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| FrontendError::Config(format!("port {} is outside 1-65535", self.port)))
    }

    /// `host:port` string used for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        if self.hostname.contains(':') && !self.hostname.starts_with('[') {
            format!("[{}]:{}", self.hostname, self.port)
        } else {
            format!("{}:{}", self.hostname, self.port)
        }
    }

    /// Directory served at `/`.
    #[must_use]
    pub fn effective_static_dir(&self) -> &Path {
        self.static_dir.as_deref().unwrap_or(&self.data_dir)
    }
}

/// Location of the web assets shipped with the crate.
#[must_use]
pub fn bundled_data_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

/// Parses `raw` as `T`, returning `default` on missing or invalid values.
fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parses a boolean. Accepts `"true"`, `"1"`, `"false"`, `"0"`
/// (case-insensitive). Returns `default` otherwise.
fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let Ok(config) = FrontendConfig::from_lookup(|_| None) else {
            panic!("empty environment must load");
        };
        assert_eq!(config.hostname, "127.0.0.1");
        assert_eq!(config.port, 6680);
        assert_eq!(config.zeroconf_name.as_deref(), Some(DEFAULT_ZEROCONF_NAME));
        assert!(config.static_dir.is_none());
        assert!(!config.access_log);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_zeroconf_disables_discovery() {
        let Ok(config) = FrontendConfig::from_lookup(lookup_from(&[("HTTP_ZEROCONF", "")])) else {
            panic!("config must load");
        };
        assert!(config.zeroconf_name.is_none());
    }

    #[test]
    fn reads_overrides() {
        let lookup = lookup_from(&[
            ("HTTP_HOSTNAME", "0.0.0.0"),
            ("HTTP_PORT", "8080"),
            ("HTTP_ZEROCONF", "Kitchen"),
            ("HTTP_STATIC_DIR", "/srv/web"),
            ("HTTP_ACCESS_LOG", "TRUE"),
            ("WS_BUFFER_CAPACITY", "16"),
        ]);
        let Ok(config) = FrontendConfig::from_lookup(lookup) else {
            panic!("config must load");
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.zeroconf_name.as_deref(), Some("Kitchen"));
        assert_eq!(config.effective_static_dir(), Path::new("/srv/web"));
        assert!(config.access_log);
        assert_eq!(config.ws_buffer_capacity, 16);
    }

    #[test]
    fn unparsable_port_is_config_error() {
        let result = FrontendConfig::from_lookup(lookup_from(&[("HTTP_PORT", "http")]));
        assert!(matches!(result, Err(FrontendError::Config(_))));
    }

    #[test]
    fn validate_rejects_out_of_range_ports() {
        assert!(FrontendConfig::new("localhost", 0).validate().is_err());
        assert!(FrontendConfig::new("localhost", 65_536).validate().is_err());
        assert!(FrontendConfig::new("localhost", 65_535).validate().is_ok());
        assert!(FrontendConfig::new("localhost", 1).validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_hostname() {
        let result = FrontendConfig::new("  ", 6680).validate();
        assert!(matches!(result, Err(FrontendError::Config(_))));
    }

    #[test]
    fn ipv6_bind_addr_is_bracketed() {
        assert_eq!(FrontendConfig::new("::", 6680).bind_addr(), "[::]:6680");
    }

    #[test]
    fn unset_static_dir_falls_back_to_bundled_assets() {
        let config = FrontendConfig::new("localhost", 6680);
        assert_eq!(config.effective_static_dir(), bundled_data_dir().as_path());
    }
}
