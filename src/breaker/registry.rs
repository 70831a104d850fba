//! Gate registry.
//!
//! # Responsibilities
//! - Key gates by (route, request path)
//! - Create gates lazily through an injected factory
//! - Hand out shared gate instances for concurrent calls
//!
//! # Design Decisions
//! - The factory is an explicit capability resolved at construction time,
//!   not a service-locator lookup at call time
//! - Path-level keying: per-endpoint isolation, at the cost of one gate per
//!   distinct path seen

use std::sync::Arc;

use dashmap::DashMap;

use crate::breaker::gate::BreakerGate;
use crate::breaker::manual::ManualGate;

/// Composite identity selecting the gate for a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreakerKey {
    /// Matched route identifier.
    pub route_id: String,
    /// Request path within the route.
    pub path: String,
}

impl BreakerKey {
    pub fn new(route_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            path: path.into(),
        }
    }
}

/// Creates a gate for a key the registry has not seen before.
pub type GateFactory = Arc<dyn Fn(&BreakerKey) -> Arc<dyn BreakerGate> + Send + Sync>;

/// Lazily-populated map of gates, shared by all concurrent requests.
pub struct BreakerRegistry {
    gates: DashMap<BreakerKey, Arc<dyn BreakerGate>>,
    factory: GateFactory,
}

impl BreakerRegistry {
    /// Create a registry with the given gate factory.
    pub fn new(factory: GateFactory) -> Self {
        Self {
            gates: DashMap::new(),
            factory,
        }
    }

    /// Registry producing operator-controlled [`ManualGate`]s.
    pub fn with_manual_gates() -> Self {
        Self::new(Arc::new(|key: &BreakerKey| {
            Arc::new(ManualGate::new(format!("{}:{}", key.route_id, key.path)))
                as Arc<dyn BreakerGate>
        }))
    }

    /// Get the gate for a key, creating it on first use.
    pub fn obtain(&self, key: &BreakerKey) -> Arc<dyn BreakerGate> {
        if let Some(gate) = self.gates.get(key) {
            return gate.clone();
        }
        self.gates
            .entry(key.clone())
            .or_insert_with(|| (self.factory)(key))
            .clone()
    }

    /// Number of gates created so far.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns true if no gate has been created yet.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
