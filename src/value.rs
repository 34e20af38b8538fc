//! Values stored in the per-pass context cache.
//!
//! A resolved identifier maps to a [`SnippetValue`]. Only the fragment
//! variants ([`SnippetValue::Fragment`] and [`SnippetValue::Annotated`])
//! contribute text to the assembled preamble; the remaining variants exist
//! purely for control flow — requirement checks, vetoes, and literal
//! sentinels — and are filtered out during assembly.

use serde::{Deserialize, Serialize};

/// A value produced by resolving an identifier during an export pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetValue {
    /// A plain text fragment, emitted verbatim into the preamble.
    Fragment(String),
    /// A text fragment carrying arbitrary property data. Only `text`
    /// reaches the preamble; `data` is available to tooling through the
    /// pass report.
    Annotated {
        /// The fragment text.
        text: String,
        /// Arbitrary property data attached by the provider.
        data: serde_json::Value,
    },
    /// The self-value of a literal (unregistered) identifier. Truthy,
    /// never emitted.
    Ident(String),
    /// A boolean control value. Never emitted.
    Flag(bool),
    /// A numeric control value. Truthy (zero included) and never
    /// emitted.
    Number(f64),
    /// Absence. The falsy value written by invalidation and by providers
    /// whose requirement fails.
    Nil,
}

impl SnippetValue {
    /// Build a plain fragment value.
    pub fn fragment(text: impl Into<String>) -> Self {
        Self::Fragment(text.into())
    }

    /// Build a fragment value with attached property data.
    pub fn annotated(text: impl Into<String>, data: serde_json::Value) -> Self {
        Self::Annotated {
            text: text.into(),
            data,
        }
    }

    /// Whether this value counts as true in a requirement expression.
    ///
    /// Only [`Nil`](Self::Nil) and `Flag(false)` are falsy. An empty
    /// fragment string is truthy — presence, not content, is what the
    /// evaluator tests.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Flag(false))
    }

    /// The fragment text this value contributes to the preamble, if any.
    #[must_use]
    pub fn fragment_text(&self) -> Option<&str> {
        match self {
            Self::Fragment(text) | Self::Annotated { text, .. } => Some(text),
            Self::Ident(_) | Self::Flag(_) | Self::Number(_) | Self::Nil => None,
        }
    }
}

impl From<&str> for SnippetValue {
    fn from(text: &str) -> Self {
        Self::Fragment(text.to_string())
    }
}

impl From<String> for SnippetValue {
    fn from(text: String) -> Self {
        Self::Fragment(text)
    }
}

impl From<bool> for SnippetValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}
