use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use alertgate_core::{Alert, ReceiverName};
use alertgate_matcher::{matches_all, Matcher, RegexCache};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("route node references undefined receiver: {0}")]
    UndefinedReceiver(String),
    #[error("root node must specify a default receiver")]
    MissingRootReceiver,
}

/// Grouping parameters, inherited from an ancestor unless overridden at the
/// matching node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupParams {
    pub group_by: Vec<String>,
    pub group_wait: Option<Duration>,
    pub group_interval: Option<Duration>,
    pub repeat_interval: Option<Duration>,
}

impl GroupParams {
    fn inherit(&self, overrides: &RouteNode) -> Self {
        Self {
            group_by: if overrides.group_by.is_empty() { self.group_by.clone() } else { overrides.group_by.clone() },
            group_wait: overrides.group_wait.or(self.group_wait),
            group_interval: overrides.group_interval.or(self.group_interval),
            repeat_interval: overrides.repeat_interval.or(self.repeat_interval),
        }
    }
}

/// A node in the configured routing tree. The root has empty `matchers`
/// (always matches) and must carry `receiver`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNode {
    pub matchers: Vec<Matcher>,
    pub receiver: Option<ReceiverName>,
    #[serde(default)]
    pub children: Vec<RouteNode>,
    #[serde(default, rename = "continue")]
    pub continue_: bool,
    #[serde(default)]
    pub group_by: Vec<String>,
    pub group_wait: Option<Duration>,
    pub group_interval: Option<Duration>,
    pub repeat_interval: Option<Duration>,
}

/// A resolved (receiver, group parameters) pair produced by evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub receiver: ReceiverName,
    pub group: GroupParams,
}

pub struct RouteTree {
    root: RouteNode,
}

impl RouteTree {
    /// Parse and validate a configured tree. Rejects references to
    /// receivers outside `known_receivers`; matcher regex validity is
    /// already enforced by `Matcher::new` during deserialization upstream.
    /// Cycles cannot occur structurally since `RouteNode` owns its children.
    pub fn parse(root: RouteNode, known_receivers: &HashSet<ReceiverName>) -> Result<Self, RouteError> {
        if root.receiver.is_none() {
            return Err(RouteError::MissingRootReceiver);
        }
        Self::validate_receivers(&root, known_receivers)?;
        Ok(Self { root })
    }

    fn validate_receivers(node: &RouteNode, known: &HashSet<ReceiverName>) -> Result<(), RouteError> {
        if let Some(r) = &node.receiver {
            if !known.contains(r) {
                return Err(RouteError::UndefinedReceiver(r.as_str().to_string()));
            }
        }
        for child in &node.children {
            Self::validate_receivers(child, known)?;
        }
        Ok(())
    }

    /// Depth-first evaluation producing an ordered, receiver-deduplicated
    /// binding list. Empty result is structurally impossible: the root
    /// always matches and always has a receiver.
    #[must_use]
    pub fn evaluate(&self, alert: &Alert, cache: &RegexCache) -> Vec<Binding> {
        let raw = Self::evaluate_node(&self.root, alert, cache, None, &GroupParams::default());
        dedup_by_receiver(raw)
    }

    fn evaluate_node(
        node: &RouteNode,
        alert: &Alert,
        cache: &RegexCache,
        inherited_receiver: Option<&ReceiverName>,
        inherited_group: &GroupParams,
    ) -> Vec<Binding> {
        if !matches_all(alert, &node.matchers, cache) {
            return Vec::new();
        }

        let own_receiver = node.receiver.clone().or_else(|| inherited_receiver.cloned());
        let own_group = inherited_group.inherit(node);

        let mut child_bindings = Vec::new();
        for child in &node.children {
            let bindings = Self::evaluate_node(child, alert, cache, own_receiver.as_ref(), &own_group);
            let matched = !bindings.is_empty();
            if matched {
                child_bindings.extend(bindings);
                if !child.continue_ {
                    break;
                }
            }
        }

        if child_bindings.is_empty() {
            match own_receiver {
                Some(receiver) => vec![Binding { receiver, group: own_group }],
                None => Vec::new(),
            }
        } else {
            child_bindings
        }
    }
}

fn dedup_by_receiver(bindings: Vec<Binding>) -> Vec<Binding> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(bindings.len());
    for binding in bindings {
        if seen.insert(binding.receiver.clone()) {
            out.push(binding);
        }
    }
    out
}

/// Hot-swappable handle over the current route tree, exchanged atomically
/// on configuration reload. Readers capture the `Arc` at the start of a
/// request and evaluate against that snapshot for its whole lifetime.
pub struct RouteTreeHandle {
    inner: ArcSwap<RouteTree>,
}

impl RouteTreeHandle {
    #[must_use]
    pub fn new(tree: RouteTree) -> Self {
        Self { inner: ArcSwap::from_pointee(tree) }
    }

    #[must_use]
    pub fn load(&self) -> Arc<RouteTree> {
        self.inner.load_full()
    }

    pub fn swap(&self, tree: RouteTree) {
        self.inner.store(Arc::new(tree));
    }
}
