//! Provider registrations and backend configuration.
//!
//! A [`Registry`] holds the process-wide state the engine reads during a
//! pass: the set of [`ProviderDef`]s keyed by identifier, and the mapping
//! from backend name to its *ordered* provider list. Registrations are
//! created at configuration time and never mutated during a pass — the
//! engine only reads the registry while assembling.
//!
//! Backend lists can be set programmatically with
//! [`Registry::set_backend`] or loaded from a TOML file through
//! [`BackendConfig`]:
//!
//! ```toml
//! [backends]
//! html = ["doctype", "charset-meta", "viewport-meta"]
//! latex = ["documentclass", "inputenc", "fontenc"]
//! ```
//!
//! An identifier listed for a backend does not have to name a registered
//! provider: unregistered identifiers resolve as literals, so backend
//! lists can seed sentinel flags for later requirement checks.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::provider::ProviderDef;

/// How an identifier is bound at resolve time.
///
/// This is the explicit dispatch tag replacing any "is it callable?"
/// probing: a registry lookup either finds a provider or the identifier
/// is a literal that resolves to itself.
#[derive(Debug)]
pub(crate) enum Binding<'a, M> {
    /// The identifier names a registered provider.
    Provider(&'a ProviderDef<M>),
    /// The identifier is unregistered and resolves to its own name.
    Literal,
}

/// Process-wide provider registrations and backend lists.
pub struct Registry<M> {
    providers: HashMap<String, ProviderDef<M>>,
    backends: HashMap<String, Vec<String>>,
}

impl<M> Registry<M> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            backends: HashMap::new(),
        }
    }

    /// Register a provider under its name.
    ///
    /// Registering a second provider under an existing name replaces the
    /// first; the replacement is logged.
    pub fn register(&mut self, provider: ProviderDef<M>) -> &mut Self {
        let name = provider.name().to_string();
        if self.providers.insert(name.clone(), provider).is_some() {
            warn!(name = %name, "replacing previously registered provider");
        }
        self
    }

    /// Set a backend's ordered provider list, replacing any previous list
    /// for that backend.
    pub fn set_backend<I, S>(&mut self, backend: impl Into<String>, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backends
            .insert(backend.into(), ids.into_iter().map(Into::into).collect());
        self
    }

    /// Adopt every backend list from a loaded configuration.
    pub fn apply_backends(&mut self, config: &BackendConfig) -> &mut Self {
        for (backend, ids) in &config.backends {
            self.set_backend(backend.clone(), ids.iter().cloned());
        }
        self
    }

    /// The ordered provider list for a backend, if configured.
    #[must_use]
    pub fn backend(&self, name: &str) -> Option<&[String]> {
        self.backends.get(name).map(Vec::as_slice)
    }

    /// Look up a registered provider by name.
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderDef<M>> {
        self.providers.get(name)
    }

    /// Number of registered providers.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Resolve-time dispatch: provider or literal.
    pub(crate) fn binding(&self, id: &str) -> Binding<'_, M> {
        match self.providers.get(id) {
            Some(provider) => Binding::Provider(provider),
            None => Binding::Literal,
        }
    }
}

impl<M> Default for Registry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for Registry<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.providers.keys().collect();
        names.sort();
        f.debug_struct("Registry")
            .field("providers", &names)
            .field("backends", &self.backends)
            .finish()
    }
}

/// Backend → ordered provider list mapping, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend name to ordered provider identifiers.
    #[serde(default)]
    pub backends: HashMap<String, Vec<String>>,
}

impl BackendConfig {
    /// Parse a configuration from TOML text.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid backend configuration")
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read backend configuration: {}", path.display()))?;
        Self::parse(&raw)
            .with_context(|| format!("failed to parse backend configuration: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SnippetValue;

    fn provider(name: &str) -> ProviderDef<()> {
        ProviderDef::builder(name)
            .body(|_| Ok(SnippetValue::Nil))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry.register(provider("p1"));
        assert!(registry.provider("p1").is_some());
        assert!(registry.provider("p2").is_none());
        assert!(matches!(registry.binding("p1"), Binding::Provider(_)));
        assert!(matches!(registry.binding("p2"), Binding::Literal));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = Registry::new();
        registry.register(provider("p"));
        registry.register(
            ProviderDef::builder("p")
                .prevents(["q"])
                .body(|_| Ok(SnippetValue::Nil))
                .build()
                .unwrap(),
        );
        assert_eq!(registry.provider_count(), 1);
        assert_eq!(registry.provider("p").unwrap().prevents(), ["q"]);
    }

    #[test]
    fn test_backend_list_preserves_order() {
        let mut registry = Registry::<()>::new();
        registry.set_backend("html", ["c", "a", "b"]);
        assert_eq!(registry.backend("html").unwrap(), ["c", "a", "b"]);
        assert!(registry.backend("latex").is_none());
    }

    #[test]
    fn test_backend_config_parse_and_apply() {
        let config = BackendConfig::parse(
            r#"
            [backends]
            html = ["doctype", "charset-meta"]
            latex = ["documentclass"]
            "#,
        )
        .unwrap();

        let mut registry = Registry::<()>::new();
        registry.apply_backends(&config);
        assert_eq!(
            registry.backend("html").unwrap(),
            ["doctype", "charset-meta"]
        );
        assert_eq!(registry.backend("latex").unwrap(), ["documentclass"]);
    }

    #[test]
    fn test_backend_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backends.toml");
        std::fs::write(&path, "[backends]\nhtml = [\"doctype\"]\n").unwrap();

        let config = BackendConfig::load(&path).unwrap();
        assert_eq!(config.backends["html"], ["doctype"]);

        assert!(BackendConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
