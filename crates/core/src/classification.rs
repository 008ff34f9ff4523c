use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Noise,
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictSource {
    CacheL1,
    CacheL2,
    Model,
    Fallback,
}

/// Output of the classifier: a severity judgment plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub severity: Severity,
    pub confidence: f64,
    pub reasoning: String,
    pub recommendations: Vec<String>,
    pub source: VerdictSource,
    pub model_id: Option<String>,
}

impl ClassificationVerdict {
    /// Maximum confidence permitted for a `source=fallback` verdict, per the
    /// invariant that fallback judgments are never reported as confidently
    /// as a real model call.
    pub const FALLBACK_CONFIDENCE_CEILING: f64 = 0.5;

    #[must_use]
    pub fn fallback(severity: Severity, reasoning: impl Into<String>) -> Self {
        Self {
            severity,
            confidence: Self::FALLBACK_CONFIDENCE_CEILING,
            reasoning: reasoning.into(),
            recommendations: Vec::new(),
            source: VerdictSource::Fallback,
            model_id: None,
        }
    }

    #[must_use]
    pub fn is_within_invariants(&self) -> bool {
        if self.source == VerdictSource::Fallback && self.confidence > Self::FALLBACK_CONFIDENCE_CEILING {
            return false;
        }
        (0.0..=1.0).contains(&self.confidence)
    }
}
