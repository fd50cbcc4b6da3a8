//! Element creation for inline nodes.

use crate::aggregate;
use crate::ast::{Document, Kind, NodeId, NodeKind};
use crate::error::RenderError;
use crate::ident::Ident;
use crate::script::Statement;
use crate::state::RenderState;

const MAILTO: &str = "mailto:";

/// Create the element or text node for an inline node, including its
/// content, without attaching it.
pub(crate) fn create(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
) -> Result<Ident, RenderError> {
    let id = open(state, doc, node)?;
    if has_inline_content(doc.kind(node)) {
        aggregate::render_children(state, doc, node, id.into(), true)?;
    }
    Ok(id)
}

/// Whether the element's content comes from aggregating its inline children.
pub(crate) fn has_inline_content(kind: Kind) -> bool {
    matches!(kind, Kind::Emphasis | Kind::Link)
}

/// Create the element or text node for an inline node. Emphasis and link
/// content is left to the caller.
pub(crate) fn open(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
) -> Result<Ident, RenderError> {
    let kind = doc.kind(node);
    match doc.node_kind(node) {
        NodeKind::Text {
            value,
            soft_line_break,
            hard_line_break,
        } => {
            let mut text = value.clone();
            if *soft_line_break || *hard_line_break {
                text.push('\n');
            }
            Ok(state.create_text(text))
        }
        NodeKind::String { value } => Ok(state.create_text(value.as_str())),
        NodeKind::AutoLink { url, email } => {
            let id = state.create_element("a");
            state.style(id, "a");
            let href = if *email && !has_mailto(url) {
                format!("{MAILTO}{url}")
            } else {
                url.clone()
            };
            if let Some(href) = state.guarded_url(kind, &href) {
                state.set_property(doc, node, id, "href", href);
            }
            state.emit_attributes(doc, node, id.into());
            state.emit(Statement::SetTextContent {
                target: id.into(),
                text: url.clone(),
            });
            Ok(id)
        }
        NodeKind::CodeSpan => {
            let id = state.create_element("code");
            state.style(id, "code");
            state.emit_attributes(doc, node, id.into());
            let text = doc.text_content(node).replace("\r\n", " ").replace(['\n', '\r'], " ");
            state.emit(Statement::SetTextContent {
                target: id.into(),
                text,
            });
            Ok(id)
        }
        NodeKind::Emphasis { level } => {
            let tag = match level {
                1 => "em",
                2 => "strong",
                other => {
                    return Err(RenderError::shape(
                        kind,
                        format!("emphasis level {other} is not 1 or 2"),
                    ));
                }
            };
            let id = state.create_element(tag);
            state.emit_attributes(doc, node, id.into());
            Ok(id)
        }
        NodeKind::Image { destination, title } => {
            let id = state.create_element("img");
            if let Some(src) = state.guarded_url(kind, destination) {
                state.set_property(doc, node, id, "src", src);
            }
            state.set_property(doc, node, id, "alt", doc.text_content(node));
            if let Some(title) = title {
                state.set_property(doc, node, id, "title", title.as_str());
            }
            state.emit_attributes(doc, node, id.into());
            Ok(id)
        }
        NodeKind::Link { destination, title } => {
            let id = state.create_element("a");
            state.style(id, "a");
            if let Some(href) = state.guarded_url(kind, destination) {
                state.set_property(doc, node, id, "href", href);
            }
            if let Some(title) = title {
                state.set_property(doc, node, id, "title", title.as_str());
            }
            state.emit_attributes(doc, node, id.into());
            Ok(id)
        }
        NodeKind::RawHtml { content } => {
            let id = state.create_element("span");
            state.emit_attributes(doc, node, id.into());
            state.raw_html(id, content);
            Ok(id)
        }
        NodeKind::Document
        | NodeKind::Heading { .. }
        | NodeKind::Blockquote
        | NodeKind::CodeBlock { .. }
        | NodeKind::FencedCodeBlock { .. }
        | NodeKind::HtmlBlock { .. }
        | NodeKind::List { .. }
        | NodeKind::ListItem
        | NodeKind::Paragraph
        | NodeKind::TextBlock
        | NodeKind::ThematicBreak => Err(RenderError::shape(kind, "block node in inline position")),
    }
}

fn has_mailto(url: &str) -> bool {
    url.as_bytes()
        .get(..MAILTO.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(MAILTO.as_bytes()))
}
