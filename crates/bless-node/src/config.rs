// ============================================
// File: crates/bless-node/src/config.rs
// ============================================
//! # Client Configuration
//!
//! ## Creation Reason
//! Provides configuration management for the Bless node client: gateway
//! endpoints, retry policy, lifecycle timings, proxy mode and file paths.
//!
//! ## Main Functionality
//! - `NodeConfig`: Main configuration structure
//! - TOML file loading and parsing, defaults for every field
//! - Configuration validation
//! - Conversion into runtime values (`GatewaySettings`, `RetryPolicy`,
//!   `LifecycleTimings`, `SchedulerSettings`)
//!
//! ## Configuration Sections
//! - `gateway`: endpoints, timeout, browser-extension identity
//! - `retry`: attempts per call and pause between attempts
//! - `lifecycle`: stage pause, heartbeat/earnings/resync intervals
//! - `proxy`: `none`, `private` (local file) or `public` (downloaded list)
//! - `accounts`: account file path
//! - `logging`: Log level
//!
//! ## Example Configuration
//! ```toml
//! [gateway]
//! base_url = "https://gateway-run.bls.dev"
//! request_timeout_secs = 60
//!
//! [retry]
//! max_attempts = 5
//! delay_secs = 5
//!
//! [lifecycle]
//! heartbeat_interval_secs = 600
//! earnings_interval_secs = 900
//!
//! [proxy]
//! mode = "private"
//! file = "proxy.txt"
//!
//! [accounts]
//! path = "accounts.json"
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - All config changes require a restart
//! - A missing file means defaults, a malformed file is an error
//! - `--proxy-mode` and `--accounts` on the command line override the file
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use bless_core::protocol::{EXTENSION_ORIGIN, EXTENSION_USER_AGENT, GATEWAY_BASE_URL, IP_CHECK_URL};
use bless_core::HardwareInfo;
use bless_transport::{GatewaySettings, RetryPolicy};

use crate::error::{NodeError, Result};
use crate::scheduler::SchedulerSettings;
use crate::services::LifecycleTimings;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ============================================
// NodeConfig
// ============================================

/// Main client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Gateway endpoints and identity.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Per-call retry policy.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Lifecycle timings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Proxy source.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Account file.
    #[serde(default)]
    pub accounts: AccountsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if file cannot be read, parsed or validated.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| NodeError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| NodeError::config_load(&path_str, e.to_string()))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads the file if it exists, defaults otherwise.
    ///
    /// # Errors
    /// Returns error if an existing file is invalid.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            info!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads configuration from a string (useful for testing).
    ///
    /// # Errors
    /// Returns error if the content cannot be parsed or validated.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| NodeError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.gateway.validate()?;
        self.retry.validate()?;
        self.lifecycle.validate()?;
        self.proxy.validate()?;
        self.accounts.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Serializes configuration to TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

// ============================================
// GatewayConfig
// ============================================

/// Gateway configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Node gateway base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// IP-check service URL.
    #[serde(default = "default_ip_check_url")]
    pub ip_check_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// `Origin` header.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Hardware descriptor sent at registration.
    #[serde(default)]
    pub hardware_info: HardwareInfo,
}

fn default_base_url() -> String {
    GATEWAY_BASE_URL.to_string()
}

fn default_ip_check_url() -> String {
    IP_CHECK_URL.to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    EXTENSION_USER_AGENT.to_string()
}

fn default_origin() -> String {
    EXTENSION_ORIGIN.to_string()
}

impl GatewayConfig {
    fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("gateway.base_url", &self.base_url),
            ("gateway.ip_check_url", &self.ip_check_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(NodeError::config_invalid(field, "must be an http(s) URL"));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(NodeError::config_invalid(
                "gateway.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(NodeError::config_invalid("gateway.user_agent", "cannot be empty"));
        }
        Ok(())
    }

    /// Returns the HTTP gateway settings.
    #[must_use]
    pub fn settings(&self) -> GatewaySettings {
        GatewaySettings {
            base_url: self.base_url.clone(),
            ip_check_url: self.ip_check_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            user_agent: self.user_agent.clone(),
            origin: self.origin.clone(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ip_check_url: default_ip_check_url(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
            origin: default_origin(),
            hardware_info: HardwareInfo::default(),
        }
    }
}

// ============================================
// RetryConfig
// ============================================

/// Retry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per gateway call.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts in seconds.
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delay() -> u64 {
    5
}

impl RetryConfig {
    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(NodeError::config_invalid(
                "retry.max_attempts",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, Duration::from_secs(self.delay_secs))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay(),
        }
    }
}

// ============================================
// LifecycleConfig
// ============================================

/// Lifecycle configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Pause after a failed stage in seconds.
    #[serde(default = "default_stage_retry")]
    pub stage_retry_secs: u64,

    /// Pause between heartbeats in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Pause between reward polls in seconds.
    #[serde(default = "default_earnings_interval")]
    pub earnings_interval_secs: u64,

    /// Account resync period in seconds.
    #[serde(default = "default_resync_interval")]
    pub resync_interval_secs: u64,

    /// How long to wait for node tasks at shutdown, in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

fn default_stage_retry() -> u64 {
    5
}

fn default_heartbeat_interval() -> u64 {
    10 * 60
}

fn default_earnings_interval() -> u64 {
    15 * 60
}

fn default_resync_interval() -> u64 {
    10
}

fn default_shutdown_grace() -> u64 {
    5
}

impl LifecycleConfig {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("lifecycle.heartbeat_interval_secs", self.heartbeat_interval_secs),
            ("lifecycle.earnings_interval_secs", self.earnings_interval_secs),
            ("lifecycle.resync_interval_secs", self.resync_interval_secs),
        ] {
            if value == 0 {
                return Err(NodeError::config_invalid(field, "must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Returns the per-node timings.
    #[must_use]
    pub const fn timings(&self) -> LifecycleTimings {
        LifecycleTimings {
            stage_retry: Duration::from_secs(self.stage_retry_secs),
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
            earnings_interval: Duration::from_secs(self.earnings_interval_secs),
        }
    }

    /// Returns the scheduler settings.
    #[must_use]
    pub const fn scheduler(&self) -> SchedulerSettings {
        SchedulerSettings {
            resync_interval: Duration::from_secs(self.resync_interval_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            stage_retry_secs: default_stage_retry(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            earnings_interval_secs: default_earnings_interval(),
            resync_interval_secs: default_resync_interval(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

// ============================================
// ProxyConfig
// ============================================

/// Where proxies come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    /// Direct connections.
    #[default]
    None,
    /// Downloaded public list.
    Public,
    /// Local proxy file.
    Private,
}

/// Proxy configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy mode.
    #[serde(default)]
    pub mode: ProxyMode,

    /// Proxy file used in `private` mode.
    #[serde(default = "default_proxy_file")]
    pub file: PathBuf,

    /// List URL used in `public` mode.
    #[serde(default = "default_public_list_url")]
    pub public_list_url: String,
}

fn default_proxy_file() -> PathBuf {
    PathBuf::from("proxy.txt")
}

fn default_public_list_url() -> String {
    "https://raw.githubusercontent.com/monosans/proxy-list/main/proxies/all.txt".to_string()
}

impl ProxyConfig {
    fn validate(&self) -> Result<()> {
        match self.mode {
            ProxyMode::Private if self.file.as_os_str().is_empty() => {
                Err(NodeError::config_invalid("proxy.file", "required in private mode"))
            }
            ProxyMode::Public if !self.public_list_url.starts_with("http") => Err(
                NodeError::config_invalid("proxy.public_list_url", "must be an http(s) URL"),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            mode: ProxyMode::default(),
            file: default_proxy_file(),
            public_list_url: default_public_list_url(),
        }
    }
}

// ============================================
// AccountsConfig
// ============================================

/// Account file configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// JSON account file.
    #[serde(default = "default_accounts_path")]
    pub path: PathBuf,
}

fn default_accounts_path() -> PathBuf {
    PathBuf::from("accounts.json")
}

impl AccountsConfig {
    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(NodeError::config_invalid("accounts.path", "cannot be empty"));
        }
        Ok(())
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            path: default_accounts_path(),
        }
    }
}

// ============================================
// LoggingConfig
// ============================================

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(NodeError::config_invalid(
                "logging.level",
                format!("must be one of {}", LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.policy(), RetryPolicy::default());

        let timings = config.lifecycle.timings();
        assert_eq!(timings.stage_retry, Duration::from_secs(5));
        assert_eq!(timings.heartbeat_interval, Duration::from_secs(600));
        assert_eq!(timings.earnings_interval, Duration::from_secs(900));
        assert_eq!(config.lifecycle.scheduler().resync_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_full_config_format() {
        let toml = r#"
            [gateway]
            base_url = "http://127.0.0.1:8080"
            request_timeout_secs = 30

            [retry]
            max_attempts = 3
            delay_secs = 1

            [lifecycle]
            heartbeat_interval_secs = 60

            [proxy]
            mode = "private"
            file = "/etc/bless/proxy.txt"

            [accounts]
            path = "/etc/bless/accounts.json"

            [logging]
            level = "debug"
        "#;

        let config = NodeConfig::from_str(toml).unwrap();
        assert_eq!(config.gateway.settings().timeout, Duration::from_secs(30));
        assert_eq!(config.gateway.ip_check_url, IP_CHECK_URL);
        assert_eq!(config.retry.policy(), RetryPolicy::fixed(3, Duration::from_secs(1)));
        assert_eq!(config.lifecycle.heartbeat_interval_secs, 60);
        assert_eq!(config.lifecycle.earnings_interval_secs, 900);
        assert_eq!(config.proxy.mode, ProxyMode::Private);
        assert_eq!(config.accounts.path, PathBuf::from("/etc/bless/accounts.json"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = NodeConfig::from_str("").unwrap();
        assert_eq!(config.proxy.mode, ProxyMode::None);
        assert_eq!(config.gateway.base_url, GATEWAY_BASE_URL);
    }

    #[test]
    fn test_invalid_values() {
        let err = NodeConfig::from_str("[retry]\nmax_attempts = 0").unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("retry.max_attempts"));

        let err = NodeConfig::from_str("[gateway]\nbase_url = \"ftp://x\"").unwrap_err();
        assert!(err.to_string().contains("gateway.base_url"));

        let err = NodeConfig::from_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(err.to_string().contains("logging.level"));

        assert!(NodeConfig::from_str("[proxy]\nmode = \"sometimes\"").is_err());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let config = NodeConfig::default();
        let parsed = NodeConfig::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed.gateway.settings(), config.gateway.settings());
        assert_eq!(parsed.gateway.hardware_info, config.gateway.hardware_info);
    }

    #[tokio::test]
    async fn test_load_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NodeConfig::load_or_default(dir.path().join("missing.toml"))
            .await
            .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bless.toml");
        tokio::fs::write(&path, "[retry\nmax_attempts = ").await.unwrap();

        let err = NodeConfig::load_or_default(&path).await.unwrap_err();
        assert!(matches!(err, NodeError::ConfigLoad { .. }));
    }
}
