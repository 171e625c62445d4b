//! ============================================
//! File: crates/bless-core/src/protocol/messages.rs
//! ============================================
//! Purpose: Gateway request and reply models
//!
//! Main Data Structures:
//!   - HeartbeatPayload: the constant ping body `{"isB7SConnected": true}`
//!   - RegisterNodeRequest / HardwareInfo: node registration body
//!   - StartSessionRequest: the empty `{}` session body
//!   - IpEcho: reply of the IP-check service
//!   - NodeStatus: reward figures, unknown fields kept
//!
//! ⚠️ Important Note for Next Developer:
//!   - Serialization order is declaration order; the gateway signs the body
//!     bytes, so do not reorder HeartbeatPayload or RegisterNodeRequest fields
//!   - Registration, session and ping replies are opaque (`GatewayReply`)
//!
//! Last Modified: v0.1.0 - Initial models
//! ============================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::version::EXTENSION_VERSION;

/// Sentinel reported when a reward figure is unavailable.
pub const REWARD_UNAVAILABLE: &str = "N/A";

/// Opaque reply of registration, session start and heartbeat calls.
pub type GatewayReply = Value;

/// Heartbeat body.
///
/// The content never varies; only the signature over it depends on the
/// account secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatPayload {
    /// Always `true`.
    #[serde(rename = "isB7SConnected")]
    pub is_b7s_connected: bool,
}

impl HeartbeatPayload {
    /// The one heartbeat body the client ever sends.
    pub const CONNECTED: Self = Self { is_b7s_connected: true };
}

impl Default for HeartbeatPayload {
    fn default() -> Self {
        Self::CONNECTED
    }
}

/// Hardware descriptor sent at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareInfo {
    /// CPU architecture, e.g. `x86_64`.
    pub cpu_architecture: String,
    /// CPU model name.
    pub cpu_model: String,
    /// CPU feature flags.
    pub cpu_features: Vec<String>,
    /// Logical processor count.
    pub num_of_processors: u32,
    /// Total memory in bytes.
    pub total_memory: u64,
}

impl Default for HardwareInfo {
    fn default() -> Self {
        Self {
            cpu_architecture: "x86_64".to_string(),
            cpu_model: "Intel(R) Core(TM) i7-10700K CPU @ 3.80GHz".to_string(),
            cpu_features: ["mmx", "sse", "sse2", "sse3", "ssse3", "sse4_1", "sse4_2", "avx", "avx2"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            num_of_processors: 8,
            total_memory: 16 * 1024 * 1024 * 1024,
        }
    }
}

/// Registration body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNodeRequest {
    /// Public address discovered through the IP-check service.
    pub ip_address: String,
    /// Node hardware identifier.
    pub hardware_id: String,
    /// Hardware descriptor.
    pub hardware_info: HardwareInfo,
    /// Extension version, always [`EXTENSION_VERSION`].
    pub extension_version: String,
}

impl RegisterNodeRequest {
    /// Builds a registration body.
    pub fn new(
        ip_address: impl Into<String>,
        hardware_id: impl Into<String>,
        hardware_info: HardwareInfo,
    ) -> Self {
        Self {
            ip_address: ip_address.into(),
            hardware_id: hardware_id.into(),
            hardware_info,
            extension_version: EXTENSION_VERSION.to_string(),
        }
    }
}

/// Session start body (`{}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StartSessionRequest {}

/// Reply of the IP-check service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IpEcho {
    /// Caller's public address as seen by the service.
    pub ip: String,
}

/// Node status reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// Uptime reward accrued today.
    #[serde(default)]
    pub today_reward: Option<Value>,
    /// Uptime reward accrued in total.
    #[serde(default)]
    pub total_reward: Option<Value>,
    /// Every other field of the reply.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeStatus {
    /// Today's reward for display, [`REWARD_UNAVAILABLE`] when absent.
    #[must_use]
    pub fn today_reward_display(&self) -> String {
        reward_display(self.today_reward.as_ref())
    }

    /// Total reward for display, [`REWARD_UNAVAILABLE`] when absent.
    #[must_use]
    pub fn total_reward_display(&self) -> String {
        reward_display(self.total_reward.as_ref())
    }
}

fn reward_display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => REWARD_UNAVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_field_names() {
        let request = RegisterNodeRequest::new("1.2.3.4", "hw-1", HardwareInfo::default());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["ipAddress"], "1.2.3.4");
        assert_eq!(value["hardwareId"], "hw-1");
        assert_eq!(value["extensionVersion"], EXTENSION_VERSION);
        assert_eq!(value["hardwareInfo"]["cpuArchitecture"], "x86_64");
        assert_eq!(value["hardwareInfo"]["numOfProcessors"], 8);
    }

    #[test]
    fn test_start_session_is_empty_object() {
        assert_eq!(serde_json::to_string(&StartSessionRequest {}).unwrap(), "{}");
    }

    #[test]
    fn test_node_status_rewards() {
        let status: NodeStatus = serde_json::from_str(
            r#"{"pubKey":"pk","todayReward":12.5,"totalReward":"340","isConnected":true}"#,
        )
        .unwrap();

        assert_eq!(status.today_reward_display(), "12.5");
        assert_eq!(status.total_reward_display(), "340");
        assert_eq!(status.extra["isConnected"], Value::Bool(true));
    }

    #[test]
    fn test_node_status_missing_rewards() {
        let status: NodeStatus = serde_json::from_str(r#"{"todayReward":null}"#).unwrap();
        assert_eq!(status.today_reward_display(), REWARD_UNAVAILABLE);
        assert_eq!(status.total_reward_display(), REWARD_UNAVAILABLE);
    }
}
