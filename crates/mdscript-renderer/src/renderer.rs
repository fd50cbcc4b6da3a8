//! Document tree to DOM-building script renderer.

use tracing::{debug, trace};

use crate::aggregate;
use crate::ast::{Document, Kind, NodeId, NodeKind};
use crate::error::{OptionsError, RenderError};
use crate::inline;
use crate::script::{Handle, Script, Statement};
use crate::state::{RenderOptions, RenderState};

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Outcome of a successful handler call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Visit the node's children.
    Continue,
    /// Do not visit the children; the exit phase still runs.
    SkipChildren,
}

/// Render step for one node kind: `(state, document, node, entering)`.
type Handler =
    fn(&mut RenderState<'_>, &Document, NodeId, bool) -> Result<WalkStatus, RenderError>;

/// Renders document trees into DOM-building scripts.
///
/// # Example
///
/// ```
/// use mdscript_renderer::{Document, NodeId, NodeKind, RenderOptions, ScriptRenderer};
///
/// let mut doc = Document::new();
/// let heading = doc.append(NodeId::ROOT, NodeKind::Heading { level: 2 });
/// doc.append(heading, NodeKind::text("Title"));
///
/// let renderer = ScriptRenderer::new(RenderOptions::default()).unwrap();
/// let script = renderer.render(&doc).unwrap();
/// assert!(script.to_js().contains("el2.textContent = 'Title';"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptRenderer {
    options: RenderOptions,
}

impl ScriptRenderer {
    /// Create a renderer for the given options.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError`] if a container, entry point or style object
    /// name cannot be printed into the script as a plain identifier.
    pub fn new(options: RenderOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self { options })
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a document tree.
    ///
    /// Every call starts from fresh state, so rendering the same tree twice
    /// yields identical scripts.
    ///
    /// # Errors
    ///
    /// Returns the first structural error met during the walk. No partial
    /// script is returned.
    pub fn render(&self, doc: &Document) -> Result<Script, RenderError> {
        debug!(nodes = doc.node_count(), "Rendering document");
        let mut state = RenderState::new(&self.options);
        walk(&mut state, doc, doc.root())?;
        let script = state.into_script();
        debug!(
            statements = script.len(),
            elements = script.creation_count(),
            "Rendered document"
        );
        Ok(script)
    }

    /// Parse markdown with the tree builder and render it.
    ///
    /// # Errors
    ///
    /// Returns a structural error if the built tree cannot be rendered.
    pub fn render_markdown(&self, markdown: &str) -> Result<Script, RenderError> {
        self.render(&Document::from_markdown(markdown))
    }
}

/// Pending step of the walk.
#[derive(Clone, Copy, Debug)]
enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

/// Depth-first walk: entry, children unless skipped, exit.
///
/// Pending visits live on an explicit stack, so tree depth is bounded by
/// memory rather than by the call stack.
fn walk(state: &mut RenderState<'_>, doc: &Document, root: NodeId) -> Result<(), RenderError> {
    let mut pending = vec![Visit::Enter(root)];
    while let Some(visit) = pending.pop() {
        match visit {
            Visit::Enter(node) => {
                let kind = doc.kind(node);
                trace!(%kind, node = node.index(), "Visiting node");
                let status = handler(kind)(state, doc, node, true)?;
                pending.push(Visit::Exit(node));
                if status == WalkStatus::Continue {
                    pending.extend(doc.children(node).iter().rev().map(|&c| Visit::Enter(c)));
                }
            }
            Visit::Exit(node) => {
                handler(doc.kind(node))(state, doc, node, false)?;
            }
        }
    }
    Ok(())
}

fn handler(kind: Kind) -> Handler {
    match kind {
        Kind::Document => render_document,
        Kind::Heading => render_heading,
        Kind::Blockquote => render_blockquote,
        Kind::CodeBlock | Kind::FencedCodeBlock => render_code_block,
        Kind::HtmlBlock => render_html_block,
        Kind::List => render_list,
        Kind::ListItem => render_list_item,
        Kind::Paragraph => render_paragraph,
        Kind::TextBlock => render_text_block,
        Kind::ThematicBreak => render_thematic_break,
        Kind::AutoLink
        | Kind::CodeSpan
        | Kind::Emphasis
        | Kind::Image
        | Kind::Link
        | Kind::RawHtml
        | Kind::Text
        | Kind::String => render_inline,
    }
}

fn render_document(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if doc.parent(node).is_some() {
        return Err(RenderError::shape(Kind::Document, "document node below the root"));
    }
    if entering {
        state.emit(Statement::Preamble);
        state.bind(doc, node, Handle::Container)?;
        state.emit_attributes(doc, node, Handle::Container);
    } else {
        state.emit(Statement::Trailer);
    }
    Ok(WalkStatus::Continue)
}

/// Exit phase shared by kinds that attach themselves on exit.
fn exit(state: &mut RenderState<'_>, doc: &Document, node: NodeId) -> Result<WalkStatus, RenderError> {
    state.attach(doc, node)?;
    Ok(WalkStatus::Continue)
}

fn render_heading(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let NodeKind::Heading { level } = doc.node_kind(node) else {
        return Err(RenderError::shape(Kind::Heading, "missing heading payload"));
    };
    let Some(&tag) = usize::from(*level)
        .checked_sub(1)
        .and_then(|i| HEADING_TAGS.get(i))
    else {
        return Err(RenderError::shape(
            Kind::Heading,
            format!("level {level} is out of range"),
        ));
    };
    let id = state.create_element(tag);
    state.style(id, tag);
    state.emit_attributes(doc, node, id.into());
    state.bind(doc, node, id)?;
    aggregate::render_children(state, doc, node, id.into(), true)?;
    Ok(WalkStatus::SkipChildren)
}

fn render_blockquote(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let id = state.create_element("blockquote");
    state.style(id, "block");
    state.emit_attributes(doc, node, id.into());
    state.bind(doc, node, id)?;
    Ok(WalkStatus::Continue)
}

/// `pre` wrapper, inner `code` element and the verbatim text.
fn render_code_block(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let kind = doc.kind(node);
    let (language, content) = match doc.node_kind(node) {
        NodeKind::CodeBlock { content } => (None, content),
        NodeKind::FencedCodeBlock { language, content } => (language.as_deref(), content),
        _ => return Err(RenderError::shape(kind, "missing code payload")),
    };

    let pre = state.create_element("pre");
    state.emit_attributes(doc, node, pre.into());
    let code = state.create_element("code");
    state.style(code, "code");
    if let Some(lang) = language.filter(|l| !l.is_empty()) {
        state.emit(Statement::SetProperty {
            id: code,
            name: "className",
            value: format!("language-{lang}"),
        });
    }
    let text = state.create_text(content.as_str());
    state.append(code.into(), text, kind);
    state.append(pre.into(), code, kind);
    state.bind(doc, node, pre)?;
    Ok(WalkStatus::SkipChildren)
}

fn render_html_block(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let NodeKind::HtmlBlock { content } = doc.node_kind(node) else {
        return Err(RenderError::shape(Kind::HtmlBlock, "missing HTML payload"));
    };
    let id = state.create_element("div");
    state.emit_attributes(doc, node, id.into());
    state.raw_html(id, content);
    state.bind(doc, node, id)?;
    Ok(WalkStatus::SkipChildren)
}

fn render_list(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let NodeKind::List { ordered, start } = *doc.node_kind(node) else {
        return Err(RenderError::shape(Kind::List, "missing list payload"));
    };
    let tag = if ordered { "ol" } else { "ul" };
    let id = state.create_element(tag);
    state.style(id, tag);
    if ordered && start != 1 {
        state.set_property(doc, node, id, "start", start.to_string());
    }
    state.emit_attributes(doc, node, id.into());
    state.bind(doc, node, id)?;
    Ok(WalkStatus::Continue)
}

fn render_list_item(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let id = state.create_element("li");
    state.style(id, "li");
    state.emit_attributes(doc, node, id.into());
    state.bind(doc, node, id)?;
    Ok(WalkStatus::Continue)
}

/// Creates, fills and attaches the paragraph in one step.
fn render_paragraph(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return Ok(WalkStatus::Continue);
    }
    let id = state.create_element("p");
    state.style(id, "p");
    state.emit_attributes(doc, node, id.into());
    state.bind(doc, node, id)?;
    aggregate::render_children(state, doc, node, id.into(), true)?;
    state.attach(doc, node)?;
    Ok(WalkStatus::SkipChildren)
}

/// Inline content rendered straight into the parent's element.
fn render_text_block(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return Ok(WalkStatus::Continue);
    }
    let target = state.parent_binding(doc, node)?;
    let first = doc
        .parent(node)
        .and_then(|p| doc.children(p).first())
        .is_some_and(|&c| c == node);
    aggregate::render_children(state, doc, node, target, first)?;
    Ok(WalkStatus::SkipChildren)
}

fn render_thematic_break(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let id = state.create_element("hr");
    state.emit_attributes(doc, node, id.into());
    state.bind(doc, node, id)?;
    Ok(WalkStatus::SkipChildren)
}

/// Inline node outside an aggregated run.
fn render_inline(
    state: &mut RenderState<'_>,
    doc: &Document,
    node: NodeId,
    entering: bool,
) -> Result<WalkStatus, RenderError> {
    if !entering {
        return exit(state, doc, node);
    }
    let id = inline::create(state, doc, node)?;
    state.bind(doc, node, id)?;
    Ok(WalkStatus::SkipChildren)
}
