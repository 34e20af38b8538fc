//! Requirement expressions.
//!
//! A [`Requirement`] is the small boolean tree a provider uses to gate its
//! body: AND/OR/NOT over identifier leaves, with short-circuit evaluation
//! (performed by [`crate::resolver::Resolver::satisfies`]). Leaves are
//! resolved through the context cache, so evaluating a requirement can
//! itself pull other providers into the pass.
//!
//! Trees are built with the [`Requirement::id`], [`Requirement::all`],
//! [`Requirement::any`] and [`Requirement::not`] constructors and
//! validated once, when the owning provider is built — malformed shapes
//! (empty identifiers, empty groups) are configuration errors reported at
//! registration time, never deferred to evaluation.

use serde::{Deserialize, Serialize};

/// Boolean requirement tree over cache identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Leaf: truthy iff resolving the identifier yields a truthy value.
    Id(String),
    /// Conjunction, evaluated left to right with short-circuit on the
    /// first falsy member.
    All(Vec<Requirement>),
    /// Disjunction, evaluated left to right with short-circuit on the
    /// first truthy member.
    Any(Vec<Requirement>),
    /// Negation.
    Not(Box<Requirement>),
}

impl Requirement {
    /// Leaf requirement on a single identifier.
    pub fn id(name: impl Into<String>) -> Self {
        Self::Id(name.into())
    }

    /// AND over the given sub-requirements.
    #[must_use]
    pub fn all(parts: impl IntoIterator<Item = Requirement>) -> Self {
        Self::All(parts.into_iter().collect())
    }

    /// AND over bare identifiers — the implicit form a flat identifier
    /// list takes.
    pub fn all_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::All(ids.into_iter().map(Self::id).collect())
    }

    /// OR over the given sub-requirements.
    #[must_use]
    pub fn any(parts: impl IntoIterator<Item = Requirement>) -> Self {
        Self::Any(parts.into_iter().collect())
    }

    /// Negation of a sub-requirement.
    #[must_use]
    pub fn not(inner: Requirement) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Check the tree for configuration errors: empty identifier leaves
    /// and empty AND/OR groups. Returns a human-readable reason on
    /// failure.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Self::Id(name) => {
                if name.trim().is_empty() {
                    Err("empty identifier leaf".to_string())
                } else {
                    Ok(())
                }
            }
            Self::All(parts) => {
                if parts.is_empty() {
                    return Err("empty AND group".to_string());
                }
                parts.iter().try_for_each(Self::validate)
            }
            Self::Any(parts) => {
                if parts.is_empty() {
                    return Err("empty OR group".to_string());
                }
                parts.iter().try_for_each(Self::validate)
            }
            Self::Not(inner) => inner.validate(),
        }
    }
}

impl From<&str> for Requirement {
    fn from(name: &str) -> Self {
        Self::id(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_produce_expected_shapes() {
        let expr = Requirement::all([
            Requirement::id("a"),
            Requirement::any([Requirement::id("b"), Requirement::not("c".into())]),
        ]);
        assert_eq!(
            expr,
            Requirement::All(vec![
                Requirement::Id("a".into()),
                Requirement::Any(vec![
                    Requirement::Id("b".into()),
                    Requirement::Not(Box::new(Requirement::Id("c".into()))),
                ]),
            ])
        );
    }

    #[test]
    fn test_all_ids_wraps_flat_list_in_and() {
        assert_eq!(
            Requirement::all_ids(["a", "b"]),
            Requirement::All(vec![Requirement::Id("a".into()), Requirement::Id("b".into())])
        );
    }

    #[test]
    fn test_validate_accepts_nested_tree() {
        let expr = Requirement::not(Requirement::any([
            Requirement::id("x"),
            Requirement::all_ids(["y", "z"]),
        ]));
        assert!(expr.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_identifier() {
        assert!(Requirement::id("  ").validate().is_err());
        assert!(
            Requirement::all([Requirement::id("a"), Requirement::id("")])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_rejects_empty_groups() {
        assert_eq!(
            Requirement::All(vec![]).validate().unwrap_err(),
            "empty AND group"
        );
        assert_eq!(
            Requirement::Any(vec![]).validate().unwrap_err(),
            "empty OR group"
        );
    }
}
