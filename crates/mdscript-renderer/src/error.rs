//! Structural rendering errors.

use crate::ast::Kind;

/// Error that stops a conversion.
///
/// All variants describe a malformed tree or an out-of-order traversal; the
/// script emitted up to that point is not a closed unit and must be discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A node reached its exit phase without an identifier of its own.
    #[error("{kind}: no identifier recorded for the node")]
    MissingSelfBinding {
        /// Kind of the node being closed.
        kind: Kind,
    },

    /// A node needs to attach to a parent that has no identifier.
    #[error("{kind}: no identifier recorded for the parent{}", parent_note(.parent))]
    MissingParentBinding {
        /// Kind of the node being attached.
        kind: Kind,
        /// Kind of the parent, `None` when the node has no parent at all.
        parent: Option<Kind>,
    },

    /// A handler's assumption about a node's payload or children does not hold.
    #[error("{kind}: unexpected node shape: {reason}")]
    UnexpectedNodeShape {
        /// Kind of the offending node.
        kind: Kind,
        /// What was expected.
        reason: String,
    },
}

/// Rejected [`RenderOptions`](crate::RenderOptions) value.
///
/// Names are printed into the script as code, so each one must be a plain
/// JavaScript identifier that cannot collide with the generated ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OptionsError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a JavaScript identifier, got '{value}'")]
    NotIdentifier { field: &'static str, value: String },

    #[error("{field} cannot be the reserved name '{value}'")]
    Reserved { field: &'static str, value: String },

    #[error("{field} clashes with generated element names, got '{value}'")]
    GeneratedName { field: &'static str, value: String },

    /// The container and the generated function share a name.
    #[error("container and entry_point must differ, both are '{0}'")]
    SameName(String),
}

#[allow(clippy::ref_option)]
fn parent_note(parent: &Option<Kind>) -> String {
    parent.map(|p| format!(" ({p})")).unwrap_or_default()
}

impl RenderError {
    pub(crate) fn shape(kind: Kind, reason: impl Into<String>) -> Self {
        RenderError::UnexpectedNodeShape {
            kind,
            reason: reason.into(),
        }
    }
}
