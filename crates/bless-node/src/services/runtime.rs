// ============================================
// File: crates/bless-node/src/services/runtime.rs
// ============================================
//! Per-node handle to the collaborators shared by every node task.

use std::fmt;
use std::sync::Arc;

use bless_common::{Account, Node, NodeKey, Proxy};
use bless_transport::GatewayClient;

use crate::proxy::ProxySource;
use crate::reporter::{EventSink, NodeContext, NodeEvent};

use super::lifecycle::LifecycleTimings;

/// Collaborators shared by all node tasks.
#[derive(Clone)]
pub struct LifecycleDeps {
    /// Retrying gateway client.
    pub client: Arc<GatewayClient>,
    /// Proxy assignment.
    pub proxies: Arc<dyn ProxySource>,
    /// Event sink.
    pub sink: Arc<dyn EventSink>,
    /// Stage pause and loop intervals.
    pub timings: LifecycleTimings,
}

impl fmt::Debug for LifecycleDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleDeps")
            .field("client", &self.client)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

/// Everything one node task needs.
#[derive(Clone)]
pub struct NodeRuntime {
    account: Arc<Account>,
    node: Node,
    client: Arc<GatewayClient>,
    proxies: Arc<dyn ProxySource>,
    sink: Arc<dyn EventSink>,
    ctx: NodeContext,
}

impl NodeRuntime {
    /// Binds `node` of `account` to the shared collaborators.
    #[must_use]
    pub fn new(account: Arc<Account>, node: Node, deps: &LifecycleDeps) -> Self {
        let ctx = NodeContext::new(&account, &node.pub_key);
        Self {
            account,
            node,
            client: Arc::clone(&deps.client),
            proxies: Arc::clone(&deps.proxies),
            sink: Arc::clone(&deps.sink),
            ctx,
        }
    }

    /// Owning account.
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The node.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Node public key.
    #[must_use]
    pub fn pub_key(&self) -> &NodeKey {
        &self.node.pub_key
    }

    /// Masked identity used in events.
    #[must_use]
    pub fn context(&self) -> &NodeContext {
        &self.ctx
    }

    /// Gateway client.
    #[must_use]
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// Proxy currently assigned to this node.
    #[must_use]
    pub fn current_proxy(&self) -> Option<Proxy> {
        self.proxies.next(&self.node.pub_key)
    }

    /// Moves this node to another proxy.
    #[must_use]
    pub fn rotate_proxy(&self) -> Option<Proxy> {
        self.proxies.rotate(&self.node.pub_key)
    }

    /// Reports `event` for this node.
    pub fn report(&self, proxy: Option<&Proxy>, event: NodeEvent) {
        self.sink.report(&self.ctx, proxy, event);
    }
}

impl fmt::Debug for NodeRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRuntime")
            .field("account", &self.ctx.account)
            .field("node", &self.ctx.pub_key.masked())
            .finish_non_exhaustive()
    }
}
