use std::sync::Arc;

use moka::sync::Cache;
use regex::Regex;
use tracing::warn;

/// Bounded cache of compiled patterns keyed by pattern string, shared across
/// every `Matcher` instance. A cache hit returns the compiled artifact; a
/// miss compiles and inserts, evicting the least-recently-used entry once
/// the cache is full.
pub struct RegexCache {
    inner: Cache<String, Arc<Regex>>,
}

impl RegexCache {
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self { inner: Cache::new(capacity) }
    }

    /// Resolve the compiled regex for `pattern`, compiling and caching on
    /// miss. Returns `None` if the pattern fails to compile — unreachable
    /// for matchers constructed via `Matcher::new` (which validates eagerly)
    /// but handled defensively since recompilation happens on every miss.
    #[must_use]
    pub fn get_or_compile(&self, pattern: &str) -> Option<Arc<Regex>> {
        if let Some(re) = self.inner.get(pattern) {
            return Some(re);
        }
        match Regex::new(pattern) {
            Ok(re) => {
                let re = Arc::new(re);
                self.inner.insert(pattern.to_string(), re.clone());
                Some(re)
            }
            Err(e) => {
                warn!(pattern, error = %e, "regex failed to compile at evaluation time");
                None
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_caches() {
        let cache = RegexCache::new(8);
        assert!(cache.is_empty());
        let re = cache.get_or_compile("^api-.*").unwrap();
        assert!(re.is_match("api-1"));
        assert_eq!(cache.len(), 1);
        // second call is a cache hit, not a recompile
        let re2 = cache.get_or_compile("^api-.*").unwrap();
        assert!(Arc::ptr_eq(&re, &re2));
    }

    #[test]
    fn invalid_pattern_returns_none() {
        let cache = RegexCache::new(8);
        assert!(cache.get_or_compile("(unterminated").is_none());
    }

    #[test]
    fn evicts_when_over_capacity() {
        let cache = RegexCache::new(2);
        cache.get_or_compile("a");
        cache.get_or_compile("b");
        cache.get_or_compile("c");
        cache.inner.run_pending_tasks();
        assert!(cache.len() <= 2);
    }
}
