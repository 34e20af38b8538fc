//! Identifier resolution against the per-pass cache.
//!
//! The [`Resolver`] is the sole read/write gateway to the
//! [`ContextCache`] during a pass. It owns three operations:
//!
//! - [`resolve`](Resolver::resolve) — look up or lazily compute an
//!   identifier's value, memoizing the first result;
//! - [`invalidate`](Resolver::invalidate) — force an identifier's entry
//!   to falsy, the cross-provider veto;
//! - [`satisfies`](Resolver::satisfies) — evaluate a requirement tree
//!   with short-circuit semantics, resolving leaves through the cache.
//!
//! Resolution of a registered provider runs the fixed invocation steps
//! documented in [`crate::provider`]; an unregistered identifier resolves
//! to itself as a literal [`SnippetValue::Ident`] — never an error.
//!
//! Providers that resolve each other in a cycle are detected via an
//! in-flight stack and reported as
//! [`EngineError::CircularDependency`] instead of recursing without
//! bound.

use tracing::{debug, trace};

use crate::cache::ContextCache;
use crate::error::EngineError;
use crate::expr::Requirement;
use crate::provider::ProviderDef;
use crate::registry::{Binding, Registry};
use crate::value::SnippetValue;

/// Read/write gateway to one pass's context cache.
///
/// A resolver borrows the registry, the pass metadata, and the pass's
/// cache for the duration of one `assemble` call. Provider bodies receive
/// `&mut Resolver` so they can resolve further identifiers recursively
/// and reach the metadata via [`Resolver::metadata`].
pub struct Resolver<'a, M> {
    registry: &'a Registry<M>,
    cache: &'a mut ContextCache,
    metadata: &'a M,
    /// Identifiers currently being resolved, outermost first.
    in_flight: Vec<String>,
}

impl<'a, M> Resolver<'a, M> {
    /// Bind a resolver to a registry, a fresh cache, and the pass
    /// metadata.
    pub fn new(registry: &'a Registry<M>, cache: &'a mut ContextCache, metadata: &'a M) -> Self {
        Self {
            registry,
            cache,
            metadata,
            in_flight: Vec::new(),
        }
    }

    /// The read-only pass metadata supplied by the host.
    #[must_use]
    pub fn metadata(&self) -> &'a M {
        self.metadata
    }

    /// Resolve an identifier, computing and memoizing it on first use.
    ///
    /// A cached identifier is returned as-is with no side effects. A
    /// registered provider is invoked once and its value cached; an
    /// unregistered identifier self-resolves to
    /// [`SnippetValue::Ident`]`(id)`.
    pub fn resolve(&mut self, id: &str) -> Result<SnippetValue, EngineError> {
        if let Some(value) = self.cache.get(id) {
            trace!(id, "context cache hit");
            return Ok(value.clone());
        }
        if self.in_flight.iter().any(|active| active == id) {
            let mut chain = self.in_flight.clone();
            chain.push(id.to_string());
            return Err(EngineError::CircularDependency {
                chain: chain.join(" -> "),
            });
        }

        let value = match self.registry.binding(id) {
            Binding::Provider(provider) => {
                self.in_flight.push(id.to_string());
                let outcome = self.invoke(provider);
                self.in_flight.pop();
                let value = outcome?;
                debug!(id, truthy = value.is_truthy(), "resolved provider");
                value
            }
            Binding::Literal => {
                debug!(id, "resolved literal identifier");
                SnippetValue::Ident(id.to_string())
            }
        };
        self.cache.insert(id, value.clone());
        Ok(value)
    }

    /// Force `id`'s cache entry to falsy, pre-seeding it if absent.
    ///
    /// This is the veto mechanism: invalidating an identifier before its
    /// own resolution is reached makes the later `resolve` short-circuit
    /// to `Nil` without ever invoking its provider. Invalidating after
    /// the identifier has resolved only affects subsequent lookups within
    /// the same pass.
    pub fn invalidate(&mut self, id: &str) {
        debug!(id, "invalidating context entry");
        self.cache.invalidate(id);
    }

    /// Evaluate a requirement tree with short-circuit semantics.
    ///
    /// Leaves are resolved through [`resolve`](Self::resolve), so
    /// evaluation is cache-affecting: members skipped by short-circuit
    /// are never resolved and their side effects never occur.
    pub fn satisfies(&mut self, expr: &Requirement) -> Result<bool, EngineError> {
        let satisfied = match expr {
            Requirement::Id(id) => self.resolve(id)?.is_truthy(),
            Requirement::Not(inner) => !self.satisfies(inner)?,
            Requirement::All(parts) => {
                let mut all = true;
                for part in parts {
                    if !self.satisfies(part)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            Requirement::Any(parts) => {
                let mut any = false;
                for part in parts {
                    if self.satisfies(part)? {
                        any = true;
                        break;
                    }
                }
                any
            }
        };
        trace!(?expr, satisfied, "evaluated requirement");
        Ok(satisfied)
    }

    /// Run a provider's fixed invocation steps: prevents, requirement,
    /// body.
    fn invoke(&mut self, provider: &ProviderDef<M>) -> Result<SnippetValue, EngineError> {
        // Vetoes fire unconditionally, before the requirement check.
        for target in provider.prevents() {
            self.invalidate(target);
        }
        if let Some(expr) = provider.requires() {
            if !self.satisfies(expr)? {
                trace!(name = provider.name(), "requirement not satisfied, skipping body");
                return Ok(SnippetValue::Nil);
            }
        }
        (provider.body)(self).map_err(|source| EngineError::Provider {
            name: provider.name().to_string(),
            source,
        })
    }
}

impl<M> std::fmt::Debug for Resolver<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("in_flight", &self.in_flight)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
