//! Inline run aggregation.
//!
//! Adjacent text children of a block are merged into a single text node;
//! every other inline child is created through [`inline::open`] and
//! appended in document order. The sibling order of the input is preserved
//! because the children are consumed in one left-to-right pass.
//!
//! Emphasis and link content is aggregated the same way. Nesting is tracked
//! on an explicit stack, so deeply nested inline input cannot exhaust the
//! call stack.

use crate::ast::{Document, Kind, NodeId, NodeKind};
use crate::error::RenderError;
use crate::ident::Ident;
use crate::inline;
use crate::script::{Handle, Statement};
use crate::state::RenderState;

/// Text accumulated since the last non-text child.
#[derive(Debug, Default)]
enum Run {
    #[default]
    Idle,
    Accumulating(String),
}

impl Run {
    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self {
            Run::Idle => *self = Run::Accumulating(text.to_owned()),
            Run::Accumulating(buf) => buf.push_str(text),
        }
    }

    /// Emit the buffered text as one text node appended to `target`.
    fn flush(&mut self, state: &mut RenderState<'_>, target: Handle, owner: Kind) {
        if let Run::Accumulating(text) = std::mem::take(self) {
            let id = state.create_text(text);
            state.append(target, id, owner);
        }
    }
}

/// Node whose inline children are being rendered.
struct Level {
    node: NodeId,
    kind: Kind,
    target: Handle,
    next: usize,
    run: Run,
    /// Element to append to the enclosing level once the children are done.
    element: Option<Ident>,
}

impl Level {
    fn new(doc: &Document, node: NodeId, target: Handle, element: Option<Ident>) -> Self {
        Self {
            node,
            kind: doc.kind(node),
            target,
            next: 0,
            run: Run::Idle,
            element,
        }
    }
}

/// Render the inline children of `node` into `target`.
///
/// With `fast_path`, a single plain text child becomes a `textContent`
/// assignment on the target instead of a separate text node. Callers only
/// allow it when the target has no other content yet.
pub(crate) fn render_children(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    target: Handle,
    fast_path: bool,
) -> Result<(), RenderError> {
    if fast_path && set_single_text(state, doc, node, target) {
        return Ok(());
    }

    let hard_wraps = state.options().hard_wraps;
    let mut stack = vec![Level::new(doc, node, target, None)];
    while let Some(level) = stack.last_mut() {
        let Some(&child) = doc.children(level.node).get(level.next) else {
            if let Some(mut done) = stack.pop() {
                done.run.flush(state, done.target, done.kind);
                if let (Some(id), Some(outer)) = (done.element, stack.last()) {
                    state.append(outer.target, id, outer.kind);
                }
            }
            continue;
        };
        level.next += 1;
        let kind = doc.kind(child);
        match doc.node_kind(child) {
            NodeKind::Text {
                value,
                soft_line_break,
                hard_line_break,
            } => {
                level.run.push(value);
                if *hard_line_break || (*soft_line_break && hard_wraps) {
                    level.run.flush(state, level.target, level.kind);
                    let br = state.create_element("br");
                    state.append(level.target, br, level.kind);
                } else if *soft_line_break {
                    level.run.push("\n");
                }
            }
            NodeKind::String { value } => level.run.push(value),
            _ if kind.is_block() => {
                return Err(RenderError::shape(
                    kind,
                    format!("block node inside an inline run of {}", level.kind),
                ));
            }
            _ => {
                level.run.flush(state, level.target, level.kind);
                let (outer_target, outer_kind) = (level.target, level.kind);
                let id = inline::open(state, doc, child)?;
                state.bind(doc, child, id)?;
                if inline::has_inline_content(kind)
                    && !set_single_text(state, doc, child, id.into())
                {
                    stack.push(Level::new(doc, child, id.into(), Some(id)));
                } else {
                    state.append(outer_target, id, outer_kind);
                }
            }
        }
    }
    Ok(())
}

/// Assign a lone plain text child as the target's text content.
fn set_single_text(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    target: Handle,
) -> bool {
    if let [only] = doc.children(node)
        && let NodeKind::Text {
            value,
            soft_line_break: false,
            hard_line_break: false,
        } = doc.node_kind(*only)
    {
        state.emit(Statement::SetTextContent {
            target,
            text: value.clone(),
        });
        return true;
    }
    false
}
