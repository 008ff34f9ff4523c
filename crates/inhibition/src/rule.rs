use alertgate_core::Alert;
use alertgate_matcher::{matches_all, Matcher, RegexCache};
use serde::{Deserialize, Serialize};

use crate::active_cache::ActiveAlertCache;

/// Loaded from configuration; regexes pre-compile eagerly via `Matcher::new`
/// at parse time, so a rule set here is already validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InhibitionRule {
    pub source_matchers: Vec<Matcher>,
    pub target_matchers: Vec<Matcher>,
    /// Label names that must compare equal between source and target.
    pub equal_labels: Vec<String>,
}

impl InhibitionRule {
    fn equal_labels_match(&self, source: &Alert, target: &Alert) -> bool {
        self.equal_labels.iter().all(|label| source.label(label) == target.label(label) && source.label(label).is_some())
    }
}

/// `ShouldInhibit(targetAlert, firingAlerts, rules) -> bool`.
///
/// For each rule, candidate sources are pre-filtered by `alertname` via the
/// active cache's secondary index; a target is never inhibited by itself.
/// First matching rule+source pair short-circuits the search.
#[must_use]
pub fn should_inhibit(target: &Alert, cache: &ActiveAlertCache, rules: &[InhibitionRule], regex_cache: &RegexCache) -> bool {
    for rule in rules {
        if !matches_all(target, &rule.target_matchers, regex_cache) {
            continue;
        }
        for source in cache.all_firing() {
            if source.fingerprint == target.fingerprint {
                continue;
            }
            if !matches_all(&source, &rule.source_matchers, regex_cache) {
                continue;
            }
            if rule.equal_labels_match(&source, target) {
                return true;
            }
        }
    }
    false
}
