// ============================================
// File: crates/bless-node/src/services/earnings.rs
// ============================================
//! # Earnings Poll Loop
//!
//! Fetches the node's reward figures forever, pausing between polls.
//! Unavailable figures are reported as `"N/A"`.
//!
//! Last Modified: v0.1.0 - Initial earnings loop
// ============================================

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use bless_core::protocol::REWARD_UNAVAILABLE;

use crate::reporter::NodeEvent;

use super::runtime::NodeRuntime;

/// Periodic reward poll of one node.
#[derive(Debug, Clone)]
pub struct EarningsPollLoop {
    runtime: NodeRuntime,
    interval: Duration,
}

impl EarningsPollLoop {
    /// Creates the loop.
    #[must_use]
    pub const fn new(runtime: NodeRuntime, interval: Duration) -> Self {
        Self { runtime, interval }
    }

    /// Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = self.poll() => {}
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        debug!(node = %self.runtime.pub_key().masked(), "Earnings loop stopped");
    }

    async fn poll(&self) {
        let runtime = &self.runtime;
        let proxy = runtime.current_proxy();
        let result = runtime
            .client()
            .fetch_node_status(&runtime.account().token, runtime.pub_key(), proxy.as_ref())
            .await;
        let event = match result {
            Ok(status) => NodeEvent::Earnings {
                today: status.today_reward_display(),
                total: status.total_reward_display(),
            },
            Err(e) => {
                debug!(node = %runtime.pub_key().masked(), error = %e, "Status unavailable");
                NodeEvent::Earnings {
                    today: REWARD_UNAVAILABLE.to_string(),
                    total: REWARD_UNAVAILABLE.to_string(),
                }
            }
        };
        runtime.report(proxy.as_ref(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{account, Harness};
    use bless_transport::mock::MockOutcome;
    use bless_transport::{Operation, RetryPolicy};
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_rewards_reported() {
        let harness = Harness::new(RetryPolicy::single(), 0);
        harness.gateway.script(
            Operation::NodeStatus,
            [
                MockOutcome::ok(json!({ "todayReward": 12, "totalReward": "340" })),
                MockOutcome::status(503),
                MockOutcome::ok(json!({ "pubKey": "pk-a", "totalReward": 355 })),
            ],
        );
        let account = account("token-a", "abc", &["pk-a"]);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(
            EarningsPollLoop::new(harness.runtime(&account, 0), Duration::from_secs(900))
                .run(cancel.clone()),
        );
        // t = 0, 15, 30 minutes
        tokio::time::sleep(Duration::from_secs(40 * 60)).await;
        cancel.cancel();
        task.await.unwrap();

        let earnings = |today: &str, total: &str| NodeEvent::Earnings {
            today: today.into(),
            total: total.into(),
        };
        assert_eq!(
            harness.sink.events_for(&account.nodes[0].pub_key),
            vec![earnings("12", "340"), earnings("N/A", "N/A"), earnings("N/A", "355")]
        );
    }
}
