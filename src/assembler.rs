//! Preamble assembly — the per-pass entry point.
//!
//! [`assemble`] drives one export pass: it creates a fresh
//! [`ContextCache`], resolves every identifier in the backend's
//! registered list in order, then reads the cache back and emits the
//! fragment-carrying values, most-recently-completed first.
//!
//! The completion ordering is part of the contract: when provider A
//! recursively resolves provider B (through a requirement check or an
//! explicit `resolve` in its body), B's cache entry is recorded before
//! A's, so the final sequence places A *before* B. This is neither
//! registration order nor first-resolved-first — a dependency's fragment
//! always lands after the fragment that pulled it in.
//!
//! [`assemble_pass`] returns a [`PassReport`] that additionally exposes
//! the raw resolved cache for tooling and tests.
//!
//! # Examples
//!
//! ```
//! use prologue::{assemble, ProviderDef, Registry, Requirement, SnippetValue};
//!
//! let mut registry: Registry<()> = Registry::new();
//! registry
//!     .register(
//!         ProviderDef::builder("charset")
//!             .body(|_| Ok(SnippetValue::fragment("charset utf-8")))
//!             .build()
//!             .unwrap(),
//!     )
//!     .register(
//!         ProviderDef::builder("viewport")
//!             .requires(Requirement::id("charset"))
//!             .body(|_| Ok(SnippetValue::fragment("viewport meta")))
//!             .build()
//!             .unwrap(),
//!     )
//!     .set_backend("html", ["charset", "viewport"]);
//!
//! let fragments = assemble(&registry, "html", &()).unwrap();
//! // viewport finished last (it resolved charset first), so it leads.
//! assert_eq!(fragments, ["viewport meta", "charset utf-8"]);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::cache::ContextCache;
use crate::error::EngineError;
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::value::SnippetValue;

/// The full outcome of one export pass, for debugging and tooling.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Fragment strings in emission order.
    pub fragments: Vec<String>,
    /// Every resolved cache entry, most-recently-completed first,
    /// including the control values that never reach `fragments`.
    pub resolved: Vec<(String, SnippetValue)>,
    /// Context cache hits during the pass.
    pub cache_hits: usize,
    /// Context cache misses during the pass.
    pub cache_misses: usize,
}

/// Assemble a backend's preamble: the ordered fragment strings.
///
/// Convenience wrapper over [`assemble_pass`] that keeps only the
/// fragments.
pub fn assemble<M>(
    registry: &Registry<M>,
    backend: &str,
    metadata: &M,
) -> Result<Vec<String>, EngineError> {
    Ok(assemble_pass(registry, backend, metadata)?.fragments)
}

/// Run one export pass and return the full [`PassReport`].
///
/// Each call owns a fresh cache; nothing persists across passes. The
/// backend must have a configured provider list
/// ([`EngineError::BackendNotRegistered`] otherwise), but identifiers
/// *within* that list may be unregistered — they resolve as literals.
pub fn assemble_pass<M>(
    registry: &Registry<M>,
    backend: &str,
    metadata: &M,
) -> Result<PassReport, EngineError> {
    let ids = registry
        .backend(backend)
        .ok_or_else(|| EngineError::BackendNotRegistered {
            backend: backend.to_string(),
        })?;

    let mut cache = ContextCache::new();
    {
        let mut resolver = Resolver::new(registry, &mut cache, metadata);
        for id in ids {
            // The return value is discarded: resolving for the cache's
            // side effects is the point.
            resolver.resolve(id)?;
        }
    }

    let resolved: Vec<(String, SnippetValue)> = cache
        .entries()
        .rev()
        .map(|entry| (entry.id.clone(), entry.value.clone()))
        .collect();
    let fragments: Vec<String> = resolved
        .iter()
        .filter_map(|(_, value)| value.fragment_text().map(str::to_string))
        .collect();
    let (cache_hits, cache_misses) = cache.stats();

    debug!(
        backend,
        fragments = fragments.len(),
        resolved = resolved.len(),
        cache_hits,
        cache_misses,
        "assembled preamble"
    );
    Ok(PassReport {
        fragments,
        resolved,
        cache_hits,
        cache_misses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Requirement;
    use crate::provider::ProviderDef;

    fn fragment_provider(name: &str, text: &str) -> ProviderDef<()> {
        let text = text.to_string();
        ProviderDef::builder(name)
            .body(move |_| Ok(SnippetValue::fragment(text.clone())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        let registry = Registry::<()>::new();
        assert!(matches!(
            assemble(&registry, "html", &()),
            Err(EngineError::BackendNotRegistered { backend }) if backend == "html"
        ));
    }

    #[test]
    fn test_dependency_fragment_follows_dependent() {
        let mut registry = Registry::new();
        registry
            .register(fragment_provider("p1", "A"))
            .register(
                ProviderDef::builder("p2")
                    .requires(Requirement::id("p1"))
                    .body(|_| Ok(SnippetValue::fragment("B")))
                    .build()
                    .unwrap(),
            )
            .set_backend("x", ["p1", "p2"]);

        assert_eq!(assemble(&registry, "x", &()).unwrap(), ["B", "A"]);
    }

    #[test]
    fn test_control_values_are_filtered_out() {
        let mut registry = Registry::new();
        registry
            .register(fragment_provider("text", "T"))
            .register(
                ProviderDef::builder("flag")
                    .body(|_| Ok(SnippetValue::Flag(true)))
                    .build()
                    .unwrap(),
            )
            .register(
                ProviderDef::builder("nothing")
                    .body(|_| Ok(SnippetValue::Nil))
                    .build()
                    .unwrap(),
            )
            .set_backend("x", ["flag", "text", "nothing", "bare-literal"]);

        let report = assemble_pass(&registry, "x", &()).unwrap();
        assert_eq!(report.fragments, ["T"]);
        // The control values are still visible in the raw cache.
        assert_eq!(report.resolved.len(), 4);
    }

    #[test]
    fn test_annotated_value_contributes_only_text() {
        let mut registry = Registry::new();
        registry
            .register(
                ProviderDef::builder("styled")
                    .body(|_| {
                        Ok(SnippetValue::annotated(
                            "header",
                            serde_json::json!({"priority": 1}),
                        ))
                    })
                    .build()
                    .unwrap(),
            )
            .set_backend("x", ["styled"]);

        assert_eq!(assemble(&registry, "x", &()).unwrap(), ["header"]);
    }

    #[test]
    fn test_prevents_empties_the_preamble() {
        let mut registry = Registry::new();
        registry
            .register(
                ProviderDef::builder("p1")
                    .prevents(["p2"])
                    .body(|_| Ok(SnippetValue::Nil))
                    .build()
                    .unwrap(),
            )
            .register(fragment_provider("p2", "B"))
            .set_backend("x", ["p1", "p2"]);

        assert_eq!(assemble(&registry, "x", &()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_fresh_cache_per_pass() {
        let mut registry = Registry::new();
        registry
            .register(fragment_provider("p", "P"))
            .set_backend("x", ["p"]);

        let first = assemble_pass(&registry, "x", &()).unwrap();
        let second = assemble_pass(&registry, "x", &()).unwrap();
        assert_eq!(first.fragments, second.fragments);
        assert_eq!(second.cache_hits, first.cache_hits);
    }

    #[test]
    fn test_no_deduplication_of_identical_fragments() {
        let mut registry = Registry::new();
        registry
            .register(fragment_provider("p1", "same"))
            .register(fragment_provider("p2", "same"))
            .set_backend("x", ["p1", "p2"]);

        assert_eq!(assemble(&registry, "x", &()).unwrap(), ["same", "same"]);
    }
}
