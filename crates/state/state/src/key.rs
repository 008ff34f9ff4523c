use serde::{Deserialize, Serialize};

/// The kind of state being stored, trimmed to what the alert pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Cached classification verdict, L2 tier.
    Classification,
    /// Silence document.
    Silence,
    /// Index of active (firing) alerts for inhibition lookups.
    ActiveEvents,
    /// Process-wide enrichment mode setting.
    EnrichmentMode,
    /// Dead-letter queue entry.
    Dlq,
    Custom(String),
}

impl KeyKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Classification => "classification",
            Self::Silence => "silence",
            Self::ActiveEvents => "active_events",
            Self::EnrichmentMode => "enrichment_mode",
            Self::Dlq => "dlq",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key used to address state entries in the store: `namespace:tenant:kind:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub namespace: String,
    pub tenant: String,
    pub kind: KeyKind,
    pub id: String,
}

impl StateKey {
    #[must_use]
    pub fn new(namespace: impl Into<String>, tenant: impl Into<String>, kind: KeyKind, id: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), tenant: tenant.into(), kind, id: id.into() }
    }

    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}:{}:{}:{}", self.namespace, self.tenant, self.kind, self.id)
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}
