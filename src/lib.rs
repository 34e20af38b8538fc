//! prologue - conditional snippet composition for document export preambles.
//!
//! A document export pass often needs a backend-specific prologue: a
//! handful of declaration fragments that should appear only when certain
//! runtime conditions hold — a detected document feature, a configuration
//! flag, the presence (or absence) of another fragment. This crate is the
//! engine that decides which fragments apply and in what order, leaving
//! parsing and rendering of the document itself to the host.
//!
//! # Architecture Overview
//!
//! One export pass flows through three pieces:
//!
//! - A process-wide [`Registry`] maps provider names to
//!   [`ProviderDef`]s and each backend name to its ordered provider
//!   list. It is configured once and only read during passes.
//! - A per-pass [`ContextCache`] memoizes every resolved identifier:
//!   at most one body invocation per identifier per pass, with entries
//!   recorded in completion order.
//! - The [`Resolver`] mediates all cache access: lazy resolution,
//!   [`Requirement`] evaluation with short-circuiting, and the
//!   invalidation-based veto between providers.
//!
//! [`assemble`] ties them together: fresh cache, resolve the backend's
//! list in order, then emit the fragment-carrying cache values,
//! most-recently-completed first — so a dependency's fragment always
//! follows the fragment that required it.
//!
//! # Core Modules
//!
//! - [`registry`] - provider registrations and backend lists, including
//!   TOML-loadable [`BackendConfig`]
//! - [`provider`] - the declarative snippet definition builder
//! - [`expr`] - AND/OR/NOT requirement trees over identifiers
//! - [`resolver`] - memoized resolution, requirement evaluation, vetoes
//! - [`cache`] - the per-pass completion-ordered memo store
//! - [`assembler`] - the `assemble` entry point and [`PassReport`]
//! - [`value`] - the [`SnippetValue`] union cached per identifier
//! - [`error`] - typed [`EngineError`] with fail-fast semantics
//!
//! # Example
//!
//! ```
//! use prologue::{assemble, ProviderDef, Registry, Requirement, Resolver, SnippetValue};
//!
//! // Host-owned pass metadata; the engine never looks inside it.
//! struct ExportMeta {
//!     has_math: bool,
//! }
//!
//! let mut registry: Registry<ExportMeta> = Registry::new();
//! registry
//!     .register(
//!         ProviderDef::builder("math-macros")
//!             .body(|ctx: &mut Resolver<'_, ExportMeta>| {
//!                 Ok(if ctx.metadata().has_math {
//!                     SnippetValue::fragment("\\usepackage{amsmath}")
//!                 } else {
//!                     SnippetValue::Nil
//!                 })
//!             })
//!             .build()
//!             .unwrap(),
//!     )
//!     .register(
//!         ProviderDef::builder("font-setup")
//!             .requires(Requirement::not(Requirement::id("math-macros")))
//!             .body(|_| Ok(SnippetValue::fragment("\\usepackage{lmodern}")))
//!             .build()
//!             .unwrap(),
//!     )
//!     .set_backend("latex", ["math-macros", "font-setup"]);
//!
//! let meta = ExportMeta { has_math: true };
//! let fragments = assemble(&registry, "latex", &meta).unwrap();
//! // math-macros contributed, so font-setup's requirement fails.
//! assert_eq!(fragments, ["\\usepackage{amsmath}"]);
//! ```
//!
//! # Semantics worth knowing
//!
//! - Unknown identifiers never error: they resolve to themselves as
//!   truthy literals, so requirement leaves double as sentinel flags.
//! - A provider's `prevents` list fires before its requirement check —
//!   a provider can veto others even while declining to contribute.
//! - Vetoes only work forward: invalidating an identifier that already
//!   resolved does not pull its fragment back out of the pass.
//! - Provider bodies are fallible; the first error aborts the pass.

pub mod assembler;
pub mod cache;
pub mod error;
pub mod expr;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod value;

pub use assembler::{assemble, assemble_pass, PassReport};
pub use cache::{CacheEntry, ContextCache};
pub use error::{EngineError, Result};
pub use expr::Requirement;
pub use provider::{ProviderBody, ProviderBuilder, ProviderDef};
pub use registry::{BackendConfig, Registry};
pub use resolver::Resolver;
pub use value::SnippetValue;
