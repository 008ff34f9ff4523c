//! The label matcher primitive backing silencing, inhibition, and routing.
//!
//! Implemented once here and reused by every subsystem that needs to ask
//! "does this alert satisfy this set of label predicates", per the design
//! note that matchers must not be duplicated across subsystems.

mod regex_cache;

pub use regex_cache::RegexCache;

use alertgate_core::Alert;
use serde::{Deserialize, Serialize};

pub const MAX_PATTERN_LENGTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = "=~")]
    Match,
    #[serde(rename = "!~")]
    NotMatch,
}

impl Operator {
    #[must_use]
    pub fn is_negative(self) -> bool {
        matches!(self, Operator::Neq | Operator::NotMatch)
    }

    #[must_use]
    pub fn is_regex(self) -> bool {
        matches!(self, Operator::Match | Operator::NotMatch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matcher {
    pub name: String,
    pub value: String,
    pub operator: Operator,
}

#[derive(Debug, thiserror::Error)]
pub enum MatcherParseError {
    #[error("pattern exceeds {MAX_PATTERN_LENGTH} bytes")]
    PatternTooLong,
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(String),
}

impl Matcher {
    pub fn new(name: impl Into<String>, value: impl Into<String>, operator: Operator) -> Result<Self, MatcherParseError> {
        let value = value.into();
        if value.len() > MAX_PATTERN_LENGTH {
            return Err(MatcherParseError::PatternTooLong);
        }
        if operator.is_regex() {
            regex::Regex::new(&value).map_err(|e| MatcherParseError::InvalidRegex(e.to_string()))?;
        }
        Ok(Self { name: name.into(), value, operator })
    }

    /// Evaluate this single matcher against an alert's labels, using `cache`
    /// to resolve compiled regexes for `=~`/`!~` operators.
    ///
    /// A regex that fails to recompile at evaluation time (should be
    /// unreachable since `new` validates at parse time) is treated as a
    /// non-match, matching the spec's "impossible but logged" clause.
    #[must_use]
    pub fn matches(&self, alert: &Alert, cache: &RegexCache) -> bool {
        let label = alert.label(&self.name);
        match self.operator {
            Operator::Eq => label == Some(self.value.as_str()),
            Operator::Neq => label != Some(self.value.as_str()),
            Operator::Match => match (label, cache.get_or_compile(&self.value)) {
                (Some(v), Some(re)) => re.is_match(v),
                _ => false,
            },
            Operator::NotMatch => match label {
                None => true,
                Some(v) => match cache.get_or_compile(&self.value) {
                    Some(re) => !re.is_match(v),
                    None => false,
                },
            },
        }
    }
}

/// `Matches(alert, matcherSeq) -> bool`. Empty sequence always matches
/// (used for the route tree root). Evaluation is AND, short-circuiting in
/// declared order.
#[must_use]
pub fn matches_all(alert: &Alert, matchers: &[Matcher], cache: &RegexCache) -> bool {
    matchers.iter().all(|m| m.matches(alert, cache))
}
