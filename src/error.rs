//! Error handling for the preamble engine.
//!
//! The engine follows a fail-fast policy: configuration mistakes (empty
//! provider names, malformed requirement expressions) are rejected when a
//! provider is built, and a provider body that fails during a pass aborts
//! the rest of that pass's assembly. There is no partial-result recovery
//! and no retry — every operation is pure in-process computation.
//!
//! Note that resolving an *unknown identifier* is never an error: it
//! degrades to literal self-resolution (see [`crate::resolver`]), which
//! lets expression leaves double as predicate flags or sentinel constants.

use thiserror::Error;

/// Errors raised by provider registration and preamble assembly.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A provider was built with an empty name.
    #[error("provider name must not be empty")]
    EmptyProviderName,

    /// A requirement expression failed registration-time validation.
    #[error("invalid requirement expression for provider '{provider}': {reason}")]
    InvalidRequirement {
        /// Name of the provider being built.
        provider: String,
        /// What was malformed about the expression.
        reason: String,
    },

    /// A provider was built without a body computation.
    #[error("provider '{provider}' has no body")]
    MissingBody {
        /// Name of the provider being built.
        provider: String,
    },

    /// The backend named in an `assemble` call has no provider list.
    #[error("backend '{backend}' has no registered provider list")]
    BackendNotRegistered {
        /// The unknown backend name.
        backend: String,
    },

    /// Two or more providers resolve each other in a cycle.
    #[error("circular provider dependency: {chain}")]
    CircularDependency {
        /// The resolution chain that closed the cycle, e.g. `a -> b -> a`.
        chain: String,
    },

    /// A provider body returned an error; the pass is aborted.
    #[error("provider '{name}' failed")]
    Provider {
        /// Name of the failing provider.
        name: String,
        /// The underlying error from the provider body.
        #[source]
        source: anyhow::Error,
    },
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
