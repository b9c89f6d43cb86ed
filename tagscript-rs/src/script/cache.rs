//! Parsed-script cache.
//!
//! Tagging runs the same handful of scripts over thousands of files, so each
//! distinct source text is parsed once and the tree shared.  Entries are never
//! evicted.
//!
//! Lookups read an immutable snapshot of the map and take no lock.  A miss
//! parses outside any lock, then publishes a new snapshot while holding the
//! insert guard; if two threads race on the same source the first tree
//! inserted wins and both get it.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use super::ast::Expression;
use super::error::ParseError;
use super::parser::parse;
use super::registry::FunctionRegistry;

#[derive(Debug, Default)]
pub struct ScriptCache {
    snapshot: ArcSwap<HashMap<String, Arc<Expression>>>,
    /// Serializes writers so no insert is lost between load and store.
    insert: Mutex<()>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed tree for `source`, parsing it on first use.
    ///
    /// Parse failures are returned and not cached.
    pub fn get_or_parse(
        &self,
        source: &str,
        registry: &FunctionRegistry,
    ) -> Result<Arc<Expression>, ParseError> {
        if let Some(hit) = self.snapshot.load().get(source) {
            return Ok(Arc::clone(hit));
        }

        let parsed = Arc::new(parse(source, registry)?);
        debug!(len = source.len(), "script cache miss");

        let _guard = self.insert.lock();
        let current = self.snapshot.load_full();
        if let Some(winner) = current.get(source) {
            return Ok(Arc::clone(winner));
        }
        let mut next = HashMap::clone(&current);
        next.insert(source.to_owned(), Arc::clone(&parsed));
        debug!(entries = next.len(), "script cache insert");
        self.snapshot.store(Arc::new(next));
        Ok(parsed)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.snapshot.load().contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    pub fn clear(&self) {
        let _guard = self.insert.lock();
        self.snapshot.store(Arc::default());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn second_lookup_shares_tree() {
        let cache = ScriptCache::new();
        let registry = FunctionRegistry::global();
        let a = cache.get_or_parse("$upper(%x%)", registry).unwrap();
        let b = cache.get_or_parse("$upper(%x%)", registry).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ScriptCache::new();
        let registry = FunctionRegistry::global();
        assert!(cache.get_or_parse("$nope()", registry).is_err());
        assert!(cache.is_empty());
        assert!(!cache.contains("$nope()"));
    }

    #[test]
    fn concurrent_misses_agree() {
        let cache = Arc::new(ScriptCache::new());
        let trees: Vec<Arc<Expression>> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .get_or_parse("$if(%a%,x,y)", FunctionRegistry::global())
                        .unwrap()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();
        let stored = cache.get_or_parse("$if(%a%,x,y)", FunctionRegistry::global()).unwrap();
        assert_eq!(cache.len(), 1);
        for tree in &trees {
            assert_eq!(**tree, *stored);
        }
    }

    #[test]
    fn hits_do_not_wait_for_writers() {
        let cache = ScriptCache::new();
        let registry = FunctionRegistry::global();
        let first = cache.get_or_parse("$lower(%x%)", registry).unwrap();
        // A writer holding the insert guard must not block a hit.
        let _writer = cache.insert.lock();
        let hit = cache.get_or_parse("$lower(%x%)", registry).unwrap();
        assert!(Arc::ptr_eq(&first, &hit));
        assert!(cache.contains("$lower(%x%)"));
    }

    #[test]
    fn clear_empties() {
        let cache = ScriptCache::new();
        cache.get_or_parse("x", FunctionRegistry::global()).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
