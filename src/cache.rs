//! Per-pass context cache.
//!
//! The cache is the memo table for one export pass: it maps identifiers to
//! their resolved [`SnippetValue`]s and guarantees at-most-once evaluation
//! per identifier per pass. It lives for the duration of a single
//! `assemble` call and is discarded afterward — no state crosses passes.
//!
//! # Ordering
//!
//! Entries remember *completion order*: an identifier is inserted when its
//! resolution finishes. If provider A recursively resolves provider B,
//! B's entry lands before A's, so reading the entries back in reverse
//! yields most-recently-completed first — the order the assembler emits
//! fragments in. This is deliberately not registration order.
//!
//! # Invalidation
//!
//! [`ContextCache::invalidate`] overwrites an entry with
//! [`SnippetValue::Nil`], creating the entry if absent. Pre-seeding an
//! unresolved identifier as `Nil` is how one provider vetoes another: a
//! later `resolve` finds the entry already cached and never invokes the
//! victim's body.

use std::collections::HashMap;

use crate::value::SnippetValue;

/// One resolved identifier and its value.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The identifier this entry was resolved under.
    pub id: String,
    /// The resolved value.
    pub value: SnippetValue,
}

/// Memoized identifier store scoped to exactly one export pass.
#[derive(Debug, Default)]
pub struct ContextCache {
    /// Entries in completion order (oldest first).
    entries: Vec<CacheEntry>,
    /// Identifier -> position in `entries`.
    index: HashMap<String, usize>,
    hits: usize,
    misses: usize,
}

impl ContextCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an identifier, counting a hit or miss.
    pub fn get(&mut self, id: &str) -> Option<&SnippetValue> {
        if let Some(&pos) = self.index.get(id) {
            self.hits += 1;
            Some(&self.entries[pos].value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Whether an identifier already has an entry, without touching the
    /// hit/miss counters.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Record a first-time resolution. The entry takes the next completion
    /// slot. Calling this for an identifier that is already cached is a
    /// logic error in the resolver; the existing entry is left untouched.
    pub fn insert(&mut self, id: &str, value: SnippetValue) {
        if self.index.contains_key(id) {
            return;
        }
        self.index.insert(id.to_string(), self.entries.len());
        self.entries.push(CacheEntry {
            id: id.to_string(),
            value,
        });
    }

    /// Force an identifier's entry to [`SnippetValue::Nil`].
    ///
    /// An existing entry keeps its position; an absent identifier is
    /// pre-seeded, claiming the next completion slot now.
    pub fn invalidate(&mut self, id: &str) {
        if let Some(&pos) = self.index.get(id) {
            self.entries[pos].value = SnippetValue::Nil;
        } else {
            self.insert(id, SnippetValue::Nil);
        }
    }

    /// Iterate entries in completion order (oldest first).
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &CacheEntry> {
        self.entries.iter()
    }

    /// Number of cached identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup statistics as `(hits, misses)`.
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = ContextCache::new();
        assert!(cache.get("a").is_none());
        cache.insert("a", SnippetValue::fragment("A"));
        assert_eq!(cache.get("a"), Some(&SnippetValue::fragment("A")));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_insert_does_not_overwrite() {
        let mut cache = ContextCache::new();
        cache.insert("a", SnippetValue::fragment("first"));
        cache.insert("a", SnippetValue::fragment("second"));
        assert_eq!(cache.get("a"), Some(&SnippetValue::fragment("first")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_existing_keeps_position() {
        let mut cache = ContextCache::new();
        cache.insert("a", SnippetValue::fragment("A"));
        cache.insert("b", SnippetValue::fragment("B"));
        cache.invalidate("a");

        let ids: Vec<_> = cache.entries().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(cache.get("a"), Some(&SnippetValue::Nil));
    }

    #[test]
    fn test_invalidate_preseeds_absent_entry() {
        let mut cache = ContextCache::new();
        cache.invalidate("victim");
        assert!(cache.contains("victim"));
        assert_eq!(cache.get("victim"), Some(&SnippetValue::Nil));
    }

    #[test]
    fn test_completion_order_is_insertion_order() {
        let mut cache = ContextCache::new();
        cache.insert("inner", SnippetValue::fragment("I"));
        cache.insert("outer", SnippetValue::fragment("O"));

        let newest_first: Vec<_> = cache.entries().rev().map(|e| e.id.as_str()).collect();
        assert_eq!(newest_first, vec!["outer", "inner"]);
    }
}
