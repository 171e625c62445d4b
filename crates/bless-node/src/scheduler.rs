// ============================================
// File: crates/bless-node/src/scheduler.rs
// ============================================
//! # Account Scheduler
//!
//! ## Creation Reason
//! Fans out one `NodeLifecycle` per node of every account and supervises
//! them until the operator stops the client.
//!
//! ## Supervision Loop
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            │ load accounts ──► launch missing lifecycles  │
//!            └───────────────────────┬──────────────────────┘
//!                                    ▼
//!   ┌──────────────── select! ─────────────────────────────────┐
//!   │ cancelled        → stop: cancel children, wait grace,    │
//!   │                    abort stragglers                      │
//!   │ task finished    → report panic, forget node (relaunch   │
//!   │                    at next resync)                       │
//!   │ resync tick 10s  → reload accounts, launch missing ones  │
//!   └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Main Functionality
//! - Accounts with an empty token, secret or node list are skipped
//! - Nodes with an empty key or hardware id are skipped
//! - One lifecycle per public key, duplicates launched once
//! - A panicking lifecycle is reported and relaunched at the next resync
//!
//! ## ⚠️ Important Note for Next Developer
//! - Each lifecycle runs in its own spawned task so a panic is isolated;
//!   the `JoinSet` holds the small tasks awaiting those handles
//! - Every lifecycle gets a child of the scheduler's token
//! - A failed resync keeps the running nodes as they are
//!
//! ## Last Modified
//! v0.1.0 - Initial scheduler

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinError, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bless_common::{Account, NodeKey};
use bless_transport::{GatewayClient, HttpGateway};

use crate::accounts::{AccountStore, JsonAccountStore};
use crate::config::{NodeConfig, ProxyMode};
use crate::error::Result;
use crate::proxy::build_proxy_source;
use crate::reporter::{EventSink, NodeContext, NodeEvent, TracingSink};
use crate::services::{LifecycleDeps, NodeLifecycle, NodeRuntime};

// ============================================
// SchedulerSettings
// ============================================

/// Supervision timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Account resync period.
    pub resync_interval: Duration,
    /// How long shutdown waits for node tasks before aborting them.
    pub shutdown_grace: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            resync_interval: Duration::from_secs(10),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

// ============================================
// AccountScheduler
// ============================================

/// Outcome of one supervised lifecycle task.
type Exit = (NodeKey, std::result::Result<(), JoinError>);

struct RunningNode {
    ctx: NodeContext,
    abort: AbortHandle,
}

/// Runs and supervises the lifecycles of every node.
pub struct AccountScheduler {
    store: Arc<dyn AccountStore>,
    deps: LifecycleDeps,
    settings: SchedulerSettings,
}

impl AccountScheduler {
    /// Creates a scheduler.
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, deps: LifecycleDeps, settings: SchedulerSettings) -> Self {
        Self {
            store,
            deps,
            settings,
        }
    }

    /// Builds the production scheduler: HTTP gateway, proxy source for
    /// `proxy_mode`, JSON account store.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built or the proxy list
    /// cannot be loaded.
    pub async fn from_config(
        config: &NodeConfig,
        proxy_mode: ProxyMode,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let gateway = HttpGateway::new(config.gateway.settings())?;
        let client = GatewayClient::new(Arc::new(gateway), config.retry.policy())
            .with_hardware_info(config.gateway.hardware_info.clone());
        let proxies = build_proxy_source(&config.proxy, proxy_mode).await?;
        let deps = LifecycleDeps {
            client: Arc::new(client),
            proxies,
            sink,
            timings: config.lifecycle.timings(),
        };
        let store = Arc::new(JsonAccountStore::new(config.accounts.path.clone()));
        Ok(Self::new(store, deps, config.lifecycle.scheduler()))
    }

    /// Runs until `cancel` fires, then stops every node.
    ///
    /// # Errors
    /// Returns error only if the first account load fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let accounts = self.store.load().await?;
        info!(accounts = accounts.len(), "Accounts loaded");

        let mut tasks: JoinSet<Exit> = JoinSet::new();
        let mut running: HashMap<NodeKey, RunningNode> = HashMap::new();
        self.fan_out(accounts, &mut tasks, &mut running, &cancel, true);

        let period = self.settings.resync_interval;
        let mut resync = tokio::time::interval_at(Instant::now() + period, period);
        resync.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                Some(joined) = tasks.join_next() => {
                    self.on_exit(joined, &mut running, &cancel);
                }
                _ = resync.tick() => match self.store.load().await {
                    Ok(accounts) => self.fan_out(accounts, &mut tasks, &mut running, &cancel, false),
                    Err(e) => warn!(error = %e, "Account resync failed, keeping running nodes"),
                },
            }
        }

        self.shutdown(tasks, running).await;
        Ok(())
    }

    /// Launches a lifecycle for every valid node that has none.
    fn fan_out(
        &self,
        accounts: Vec<Account>,
        tasks: &mut JoinSet<Exit>,
        running: &mut HashMap<NodeKey, RunningNode>,
        cancel: &CancellationToken,
        initial: bool,
    ) {
        let mut launched = 0usize;
        for account in accounts {
            if let Err(e) = account.validate() {
                if initial {
                    warn!(account = %account.masked_token(), error = %e, "Skipping account");
                } else {
                    debug!(account = %account.masked_token(), error = %e, "Skipping account");
                }
                continue;
            }
            let account = Arc::new(account);
            for node in &account.nodes {
                if let Err(e) = node.validate() {
                    if initial {
                        warn!(account = %account.masked_token(), error = %e, "Skipping node");
                    }
                    continue;
                }
                if running.contains_key(&node.pub_key) {
                    continue;
                }

                let runtime = NodeRuntime::new(Arc::clone(&account), node.clone(), &self.deps);
                let ctx = runtime.context().clone();
                let lifecycle = NodeLifecycle::new(runtime, self.deps.timings);
                let handle = tokio::spawn(lifecycle.run(cancel.child_token()));
                let abort = handle.abort_handle();

                let key = node.pub_key.clone();
                tasks.spawn(async move { (key, handle.await) });
                running.insert(node.pub_key.clone(), RunningNode { ctx, abort });
                launched += 1;
            }
        }
        if launched > 0 {
            info!(launched, running = running.len(), "Node lifecycles launched");
        }
    }

    /// Handles a finished lifecycle task.
    fn on_exit(
        &self,
        joined: std::result::Result<Exit, JoinError>,
        running: &mut HashMap<NodeKey, RunningNode>,
        cancel: &CancellationToken,
    ) {
        let (key, outcome) = match joined {
            Ok(exit) => exit,
            Err(e) => {
                warn!(error = %e, "Node supervision task failed");
                return;
            }
        };
        let Some(node) = running.remove(&key) else {
            return;
        };
        let reason = match outcome {
            Ok(()) if cancel.is_cancelled() => return,
            Ok(()) => "returned".to_string(),
            Err(e) if e.is_panic() => format!("panicked: {}", panic_message(e.into_panic())),
            Err(_) => "aborted".to_string(),
        };
        self.deps
            .sink
            .report(&node.ctx, None, NodeEvent::LifecycleExited { reason });
    }

    /// Waits for node tasks within the grace period, then aborts the rest.
    async fn shutdown(&self, mut tasks: JoinSet<Exit>, running: HashMap<NodeKey, RunningNode>) {
        info!(nodes = running.len(), "Stopping node lifecycles");
        let grace = self.settings.shutdown_grace;
        let done = async { while tasks.join_next().await.is_some() {} };
        if tokio::time::timeout(grace, done).await.is_err() {
            warn!(grace_secs = grace.as_secs(), "Node tasks still running after grace, aborting");
            for node in running.values() {
                node.abort.abort();
            }
            tasks.shutdown().await;
        }
        info!("All node lifecycles stopped");
    }
}

impl std::fmt::Debug for AccountScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountScheduler")
            .field("deps", &self.deps)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Runs every node of the configured account file until `cancel` fires,
/// reporting through [`TracingSink`].
///
/// # Errors
/// Returns error if the client cannot be built or the first account load
/// fails.
pub async fn run_accounts(config: &NodeConfig, cancel: CancellationToken) -> Result<()> {
    AccountScheduler::from_config(config, config.proxy.mode, Arc::new(TracingSink))
        .await?
        .run(cancel)
        .await
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::StaticAccountStore;
    use crate::error::NodeError;
    use crate::reporter::MemorySink;
    use crate::testing::{plain_account, Harness};
    use async_trait::async_trait;
    use bless_common::{Node, Proxy};
    use bless_transport::{Operation, RetryPolicy};
    use parking_lot::Mutex;
    use std::collections::HashSet;

    fn scheduler(harness: &Harness, store: Arc<dyn AccountStore>) -> AccountScheduler {
        AccountScheduler::new(store, harness.deps.clone(), SchedulerSettings::default())
    }

    fn sessions(harness: &Harness, key: &str) -> usize {
        harness
            .gateway
            .count_for(Operation::StartSession, &NodeKey::new(key))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_skips_invalid_and_duplicates() {
        let harness = Harness::new(RetryPolicy::single(), 0);
        let mut third = plain_account("token-three", "s3", &["pk-2", "pk-4"]);
        third.nodes.push(Node::new("pk-5", ""));
        let store = Arc::new(StaticAccountStore::new(vec![
            plain_account("token-one", "s1", &["pk-1", "pk-2"]),
            plain_account("", "s2", &["pk-3"]),
            third,
            plain_account("token-four", "s4", &[]),
        ]));
        let cancel = CancellationToken::new();
        let run = tokio::spawn(scheduler(&harness, store).run(cancel.clone()));

        // several resync passes
        tokio::time::sleep(Duration::from_secs(60)).await;
        cancel.cancel();
        run.await.unwrap().unwrap();

        assert_eq!(sessions(&harness, "pk-1"), 1);
        assert_eq!(sessions(&harness, "pk-2"), 1);
        assert_eq!(sessions(&harness, "pk-3"), 0);
        assert_eq!(sessions(&harness, "pk-4"), 1);
        assert_eq!(sessions(&harness, "pk-5"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resync_launches_new_nodes() {
        let harness = Harness::new(RetryPolicy::single(), 0);
        let store = Arc::new(StaticAccountStore::new(vec![plain_account(
            "token-one",
            "s1",
            &["pk-1"],
        )]));
        let cancel = CancellationToken::new();
        let run = tokio::spawn(scheduler(&harness, store.clone()).run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(sessions(&harness, "pk-9"), 0);
        store.replace(vec![plain_account("token-one", "s1", &["pk-1", "pk-9"])]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        cancel.cancel();
        run.await.unwrap().unwrap();

        assert_eq!(sessions(&harness, "pk-1"), 1);
        assert_eq!(sessions(&harness, "pk-9"), 1);
    }

    /// Panics on the first `SessionStarted` of each listed node.
    struct PanickingSink {
        inner: MemorySink,
        armed: Mutex<HashSet<NodeKey>>,
    }

    impl EventSink for PanickingSink {
        fn report(&self, ctx: &NodeContext, proxy: Option<&Proxy>, event: NodeEvent) {
            let trip = event == NodeEvent::SessionStarted && self.armed.lock().remove(&ctx.pub_key);
            self.inner.report(ctx, proxy, event);
            assert!(!trip, "sink exploded");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_lifecycle_relaunched() {
        let mut harness = Harness::new(RetryPolicy::single(), 0);
        let sink = Arc::new(PanickingSink {
            inner: MemorySink::new(),
            armed: Mutex::new(HashSet::from([NodeKey::new("pk-1")])),
        });
        harness.deps.sink = sink.clone();
        let store = Arc::new(StaticAccountStore::new(vec![plain_account(
            "token-one",
            "s1",
            &["pk-1", "pk-2"],
        )]));
        let cancel = CancellationToken::new();
        let run = tokio::spawn(scheduler(&harness, store).run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(15)).await;
        cancel.cancel();
        run.await.unwrap().unwrap();

        assert_eq!(sessions(&harness, "pk-1"), 2);
        assert_eq!(sessions(&harness, "pk-2"), 1);
        let exits = sink
            .inner
            .count(|e| matches!(e, NodeEvent::LifecycleExited { reason } if reason.contains("sink exploded")));
        assert_eq!(exits, 1);
    }

    struct BrokenStore;

    #[async_trait]
    impl AccountStore for BrokenStore {
        async fn load(&self) -> Result<Vec<Account>> {
            Err(NodeError::account_load("accounts.json", "permission denied"))
        }
    }

    #[tokio::test]
    async fn test_initial_load_failure_is_returned() {
        let harness = Harness::new(RetryPolicy::single(), 0);
        let result = scheduler(&harness, Arc::new(BrokenStore))
            .run(CancellationToken::new())
            .await;
        assert!(matches!(result, Err(NodeError::AccountLoad { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_promptly() {
        let harness = Harness::new(RetryPolicy::single(), 0);
        let store = Arc::new(StaticAccountStore::new(vec![plain_account(
            "token-one",
            "s1",
            &["pk-1", "pk-2", "pk-3"],
        )]));
        let cancel = CancellationToken::new();
        let run = tokio::spawn(scheduler(&harness, store).run(cancel.clone()));

        harness.gateway.wait_for(Operation::Heartbeat, 3).await;
        let stopped_at = Instant::now();
        cancel.cancel();
        run.await.unwrap().unwrap();

        assert!(stopped_at.elapsed() < Duration::from_secs(1));
        let heartbeats = harness.gateway.count(Operation::Heartbeat);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(harness.gateway.count(Operation::Heartbeat), heartbeats);
    }
}
