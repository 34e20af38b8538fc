//! Snippet provider definitions.
//!
//! A [`ProviderDef`] binds a computed identifier to an optional
//! [`Requirement`], an optional "prevents" list, and a body closure.
//! Definitions are built declaratively through [`ProviderBuilder`], which
//! performs registration-time validation, and are invoked by the resolver
//! with the following fixed runtime steps:
//!
//! 1. Invalidate every identifier on the prevents list, unconditionally.
//! 2. If a requirement is present, evaluate it; on failure the provider
//!    resolves to [`SnippetValue::Nil`] and the body never runs.
//! 3. Run the body; its return value becomes the identifier's cached
//!    value.
//!
//! The ordering is load-bearing: vetoes fire even when the provider
//! itself declines to contribute, so a provider can suppress others as a
//! pure side effect.
//!
//! Bodies receive the pass [`Resolver`], giving them the pass metadata
//! (via [`Resolver::metadata`]) and the ability to resolve further
//! identifiers recursively.

use crate::error::EngineError;
use crate::expr::Requirement;
use crate::resolver::Resolver;
use crate::value::SnippetValue;

/// The body computation of a provider.
///
/// Errors propagate to the host and abort the pass; there is no partial
/// recovery.
pub type ProviderBody<M> =
    Box<dyn Fn(&mut Resolver<'_, M>) -> anyhow::Result<SnippetValue> + Send + Sync>;

/// A registered snippet provider: a named computed identifier.
pub struct ProviderDef<M> {
    pub(crate) name: String,
    pub(crate) requires: Option<Requirement>,
    pub(crate) prevents: Vec<String>,
    pub(crate) body: ProviderBody<M>,
}

impl<M> ProviderDef<M> {
    /// Start building a provider registered under `name`.
    pub fn builder(name: impl Into<String>) -> ProviderBuilder<M> {
        ProviderBuilder {
            name: name.into(),
            requires: None,
            prevents: Vec::new(),
            body: None,
        }
    }

    /// The identifier this provider is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requirement gating the body, if any.
    #[must_use]
    pub fn requires(&self) -> Option<&Requirement> {
        self.requires.as_ref()
    }

    /// Identifiers this provider vetoes before running.
    #[must_use]
    pub fn prevents(&self) -> &[String] {
        &self.prevents
    }
}

impl<M> std::fmt::Debug for ProviderDef<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDef")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .field("prevents", &self.prevents)
            .finish_non_exhaustive()
    }
}

/// Declarative builder for [`ProviderDef`].
///
/// # Examples
///
/// ```
/// use prologue::{ProviderDef, Requirement, SnippetValue};
///
/// struct Meta;
///
/// let provider: ProviderDef<Meta> = ProviderDef::builder("utf8-header")
///     .requires(Requirement::not(Requirement::id("ascii-only")))
///     .prevents(["legacy-header"])
///     .body(|_ctx| Ok(SnippetValue::fragment("#+CHARSET: utf-8")))
///     .build()
///     .unwrap();
/// assert_eq!(provider.name(), "utf8-header");
/// ```
pub struct ProviderBuilder<M> {
    name: String,
    requires: Option<Requirement>,
    prevents: Vec<String>,
    body: Option<ProviderBody<M>>,
}

impl<M> ProviderBuilder<M> {
    /// Gate the body behind a requirement expression.
    #[must_use]
    pub fn requires(mut self, expr: Requirement) -> Self {
        self.requires = Some(expr);
        self
    }

    /// Gate the body behind a flat identifier list (implicit AND).
    #[must_use]
    pub fn requires_all<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires(Requirement::all_ids(ids))
    }

    /// Identifiers to invalidate before anything else runs.
    #[must_use]
    pub fn prevents<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prevents = ids.into_iter().map(Into::into).collect();
        self
    }

    /// The body computation.
    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Resolver<'_, M>) -> anyhow::Result<SnippetValue> + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    /// Validate and produce the definition.
    pub fn build(self) -> Result<ProviderDef<M>, EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::EmptyProviderName);
        }
        if let Some(expr) = &self.requires {
            expr.validate().map_err(|reason| EngineError::InvalidRequirement {
                provider: self.name.clone(),
                reason,
            })?;
        }
        let body = self.body.ok_or(EngineError::MissingBody {
            provider: self.name.clone(),
        })?;
        Ok(ProviderDef {
            name: self.name,
            requires: self.requires,
            prevents: self.prevents,
            body,
        })
    }
}
