//! Per-conversion render state.

use std::collections::HashMap;

use crate::ast::{Document, Kind, NodeId};
use crate::attributes::AttributeFilter;
use crate::error::{OptionsError, RenderError};
use crate::ident::{IdAllocator, Ident};
use crate::script::{Handle, Script, Statement};
use crate::url::{escape_url, is_dangerous_url};

/// Default name of the root container variable.
pub const DEFAULT_CONTAINER: &str = "mdDiv";

/// Default name of the generated function.
pub const DEFAULT_ENTRY_POINT: &str = "render";

/// Options controlling script generation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Trust the input: disable the URL guard and emit raw HTML via `innerHTML`.
    pub unsafe_html: bool,
    /// Emit a comment before every attachment statement.
    pub debug: bool,
    /// Render soft line breaks inside text runs as `br` elements.
    pub hard_wraps: bool,
    /// Name of a style object whose per-element entries are assigned to
    /// created elements.
    pub style_object: Option<String>,
    /// Root container variable.
    pub container: String,
    /// Generated function name.
    pub entry_point: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            unsafe_html: false,
            debug: false,
            hard_wraps: false,
            style_object: None,
            container: DEFAULT_CONTAINER.to_owned(),
            entry_point: DEFAULT_ENTRY_POINT.to_owned(),
        }
    }
}

impl RenderOptions {
    /// Check the names printed into the script.
    ///
    /// # Errors
    ///
    /// Returns the first name that is not a usable JavaScript identifier,
    /// or [`OptionsError::SameName`] when the container is named like the
    /// entry point.
    pub fn validate(&self) -> Result<(), OptionsError> {
        require_identifier(&self.container, "container")?;
        require_identifier(&self.entry_point, "entry_point")?;
        if let Some(ref style_object) = self.style_object {
            require_identifier(style_object, "style_object")?;
        }
        if self.container == self.entry_point {
            return Err(OptionsError::SameName(self.container.clone()));
        }
        Ok(())
    }
}

/// Names that cannot be bound by the generated script.
const RESERVED_NAMES: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "document", "else", "enum", "export", "extends", "false", "finally", "for",
    "function", "if", "import", "in", "instanceof", "let", "new", "null", "return", "static",
    "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
    "yield",
];

/// Require a name usable as a JavaScript binding that cannot clash with the
/// generated `el{n}` identifiers.
fn require_identifier(value: &str, field: &'static str) -> Result<(), OptionsError> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(OptionsError::Empty { field });
    };
    let valid = (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid {
        return Err(OptionsError::NotIdentifier {
            field,
            value: value.to_owned(),
        });
    }
    if RESERVED_NAMES.contains(&value) {
        return Err(OptionsError::Reserved {
            field,
            value: value.to_owned(),
        });
    }
    if value
        .strip_prefix("el")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(OptionsError::GeneratedName {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Mutable state of one conversion.
///
/// Owns the identifier allocator, the statement sink and the node bindings.
/// A fresh state is built for every call, so identifier numbering is
/// independent between conversions.
pub struct RenderState<'o> {
    options: &'o RenderOptions,
    ids: IdAllocator,
    script: Script,
    bindings: HashMap<NodeId, Handle>,
}

impl<'o> RenderState<'o> {
    #[must_use]
    pub fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            ids: IdAllocator::new(),
            script: Script::new(
                options.container.as_str(),
                options.entry_point.as_str(),
                options.style_object.clone(),
            ),
            bindings: HashMap::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    /// Number of identifiers allocated so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.ids.allocated()
    }

    /// Consume the state, returning the emitted script.
    #[must_use]
    pub fn into_script(self) -> Script {
        self.script
    }

    pub(crate) fn emit(&mut self, statement: Statement) {
        self.script.push(statement);
    }

    /// Allocate an identifier and emit the element creation.
    pub(crate) fn create_element(&mut self, tag: &'static str) -> Ident {
        let id = self.ids.next();
        self.emit(Statement::CreateElement { id, tag });
        id
    }

    /// Allocate an identifier and emit the text node creation.
    pub(crate) fn create_text(&mut self, text: impl Into<String>) -> Ident {
        let id = self.ids.next();
        self.emit(Statement::CreateText {
            id,
            text: text.into(),
        });
        id
    }

    /// Record the handle a node was rendered to.
    pub(crate) fn bind(
        &mut self,
        doc: &Document,
        node: NodeId,
        handle: impl Into<Handle>,
    ) -> Result<(), RenderError> {
        if self.bindings.insert(node, handle.into()).is_some() {
            return Err(RenderError::shape(doc.kind(node), "node rendered twice"));
        }
        Ok(())
    }

    /// Handle recorded for a node.
    #[must_use]
    pub fn binding(&self, node: NodeId) -> Option<Handle> {
        self.bindings.get(&node).copied()
    }

    /// Handle of the node's parent, for attaching content to it.
    pub(crate) fn parent_binding(&self, doc: &Document, node: NodeId) -> Result<Handle, RenderError> {
        let parent = doc.parent(node);
        parent
            .and_then(|p| self.binding(p))
            .ok_or(RenderError::MissingParentBinding {
                kind: doc.kind(node),
                parent: parent.map(|p| doc.kind(p)),
            })
    }

    /// Append a rendered node to its parent's element.
    pub(crate) fn attach(&mut self, doc: &Document, node: NodeId) -> Result<(), RenderError> {
        let kind = doc.kind(node);
        let child = match self.binding(node) {
            Some(Handle::Node(id)) => id,
            Some(Handle::Container) => {
                return Err(RenderError::shape(kind, "the container cannot be attached"));
            }
            None => return Err(RenderError::MissingSelfBinding { kind }),
        };
        let parent = self.parent_binding(doc, node)?;
        let parent_kind = doc.parent(node).map_or(kind, |p| doc.kind(p));
        self.append(parent, child, parent_kind);
        Ok(())
    }

    /// Emit an attachment statement, preceded by a trace comment in debug
    /// mode. `kind` labels the node that owns `parent`.
    pub(crate) fn append(&mut self, parent: Handle, child: Ident, kind: Kind) {
        if self.options.debug {
            let parent_name = match parent {
                Handle::Container => self.options.container.clone(),
                Handle::Node(id) => id.to_string(),
            };
            self.emit(Statement::Comment(format!(
                "dbg -- el: {child} parent: {parent_name} kind: {kind}"
            )));
        }
        self.emit(Statement::Append { parent, child });
    }

    /// Emit the node's allowed attributes onto `target`, in insertion order.
    pub(crate) fn emit_attributes(&mut self, doc: &Document, node: NodeId, target: Handle) {
        let filter = AttributeFilter::for_kind(doc.kind(node));
        for (name, value) in filter.filtered(doc.attributes(node)) {
            self.script.push(Statement::SetAttribute {
                target,
                name: name.to_owned(),
                value: value.to_text().into_owned(),
            });
        }
    }

    /// Emit a payload-derived property unless an allowed attribute of the
    /// same name will be emitted for the node.
    pub(crate) fn set_property(
        &mut self,
        doc: &Document,
        node: NodeId,
        id: Ident,
        name: &'static str,
        value: impl Into<String>,
    ) {
        let filter = AttributeFilter::for_kind(doc.kind(node));
        if filter.allows(name) && doc.attributes(node).contains(name) {
            return;
        }
        self.emit(Statement::SetProperty {
            id,
            name,
            value: value.into(),
        });
    }

    /// Assign the style entry for `key` when a style object is configured.
    pub(crate) fn style(&mut self, id: Ident, key: &str) {
        if self.options.style_object.is_some() {
            self.emit(Statement::AssignStyle {
                id,
                key: key.to_owned(),
            });
        }
    }

    /// Destination ready for `href`/`src`, or `None` when it is blocked.
    pub(crate) fn guarded_url(&self, kind: Kind, url: &str) -> Option<String> {
        if !self.options.unsafe_html && is_dangerous_url(url) {
            tracing::debug!(%kind, url, "Blocked dangerous URL");
            return None;
        }
        Some(escape_url(url).into_owned())
    }

    /// Emit raw HTML into an element, or an omission comment in safe mode.
    pub(crate) fn raw_html(&mut self, id: Ident, content: &str) {
        if self.options.unsafe_html {
            self.emit(Statement::SetProperty {
                id,
                name: "innerHTML",
                value: content.to_owned(),
            });
        } else {
            self.emit(Statement::Comment("raw HTML omitted".to_owned()));
        }
    }
}
