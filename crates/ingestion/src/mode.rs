//! The enrichment mode controller (§4.7): a process-wide switch resolved at
//! startup and on a periodic refresh, cached for lock-free hot-path reads,
//! with a write-through control-plane setter and `{from,to}`-labeled
//! transition counting.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alertgate_core::GatewayError;
use alertgate_state::{KeyKind, StateKey, StateStore};
use dashmap::DashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnrichmentMode {
    Bypass = 0,
    Transparent = 1,
    Enriched = 2,
}

impl EnrichmentMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::Transparent => "transparent",
            Self::Enriched => "enriched",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "bypass" => Some(Self::Bypass),
            "transparent" => Some(Self::Transparent),
            "enriched" => Some(Self::Enriched),
            _ => None,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Bypass,
            1 => Self::Transparent,
            _ => Self::Enriched,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ModeSource {
    DistributedStore = 0,
    Environment = 1,
    Default = 2,
}

impl ModeSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DistributedStore => "distributed_store",
            Self::Environment => "environment",
            Self::Default => "default",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::DistributedStore,
            1 => Self::Environment,
            _ => Self::Default,
        }
    }
}

/// Lock-free cached mode plus the distributed-store/env/default resolution
/// chain that refreshes it.
pub struct EnrichmentModeController {
    backend: Arc<dyn StateStore>,
    namespace: String,
    env_var: String,
    mode: AtomicU8,
    source: AtomicU8,
    transitions: DashMap<(&'static str, &'static str), AtomicU64>,
}

impl EnrichmentModeController {
    /// Resolve the initial mode (distributed store → env → default) and
    /// construct the controller. Call [`Self::spawn_refresh`] afterward to
    /// keep it current.
    pub async fn load(backend: Arc<dyn StateStore>, namespace: impl Into<String>, env_var: impl Into<String>) -> Arc<Self> {
        let controller = Arc::new(Self {
            backend,
            namespace: namespace.into(),
            env_var: env_var.into(),
            mode: AtomicU8::new(EnrichmentMode::Enriched as u8),
            source: AtomicU8::new(ModeSource::Default as u8),
            transitions: DashMap::new(),
        });
        let (mode, source) = controller.resolve().await;
        controller.mode.store(mode as u8, Ordering::Relaxed);
        controller.source.store(source as u8, Ordering::Relaxed);
        controller
    }

    fn key(&self) -> StateKey {
        StateKey::new(&self.namespace, "default", KeyKind::EnrichmentMode, "mode")
    }

    async fn resolve(&self) -> (EnrichmentMode, ModeSource) {
        match self.backend.get(&self.key()).await {
            Ok(Some(raw)) => {
                if let Some(mode) = EnrichmentMode::parse(&raw) {
                    return (mode, ModeSource::DistributedStore);
                }
                warn!(value = %raw, "distributed store holds an unrecognized enrichment mode, falling through");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "enrichment mode distributed store read failed, falling through to environment"),
        }

        if let Ok(raw) = std::env::var(&self.env_var) {
            if let Some(mode) = EnrichmentMode::parse(&raw) {
                return (mode, ModeSource::Environment);
            }
            warn!(value = %raw, var = %self.env_var, "environment variable holds an unrecognized enrichment mode, defaulting");
        }

        (EnrichmentMode::Enriched, ModeSource::Default)
    }

    /// Current mode, via a lock-free atomic load.
    #[must_use]
    pub fn current(&self) -> (EnrichmentMode, ModeSource) {
        (EnrichmentMode::from_u8(self.mode.load(Ordering::Relaxed)), ModeSource::from_u8(self.source.load(Ordering::Relaxed)))
    }

    fn apply(&self, mode: EnrichmentMode, source: ModeSource) {
        let previous = EnrichmentMode::from_u8(self.mode.swap(mode as u8, Ordering::Relaxed));
        self.source.store(source as u8, Ordering::Relaxed);
        if previous != mode {
            self.transitions.entry((previous.as_str(), mode.as_str())).or_insert_with(|| AtomicU64::new(0)).fetch_add(1, Ordering::Relaxed);
            info!(from = previous.as_str(), to = mode.as_str(), source = source.as_str(), "enrichment mode transitioned");
        }
    }

    /// Re-run the resolution chain and swap in the result if it changed.
    /// Intended to run on a periodic background tick (§5 default 30s).
    pub async fn refresh(&self) {
        let (mode, source) = self.resolve().await;
        self.apply(mode, source);
    }

    /// Drive periodic refresh until the returned handle is dropped/aborted.
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                self.refresh().await;
            }
        })
    }

    /// Control-plane setter: write-through to the distributed store, then
    /// apply locally so this process observes the change immediately
    /// instead of waiting for the next refresh tick.
    pub async fn set_mode(&self, mode: EnrichmentMode) -> Result<(), GatewayError> {
        self.backend
            .set(&self.key(), mode.as_str(), None)
            .await
            .map_err(|e| GatewayError::internal("failed to persist enrichment mode").with_details(e.to_string()))?;
        self.apply(mode, ModeSource::DistributedStore);
        Ok(())
    }

    /// Snapshot of transition counts observed so far, keyed by `(from, to)`.
    #[must_use]
    pub fn transition_counts(&self) -> Vec<((&'static str, &'static str), u64)> {
        self.transitions.iter().map(|e| (*e.key(), e.value().load(Ordering::Relaxed))).collect()
    }
}
