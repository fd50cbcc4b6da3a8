//! Arena-backed markdown document tree.
//!
//! Nodes are owned by the [`Document`] and addressed by [`NodeId`]. Parent
//! links are plain ids, so the tree has no reference cycles and can be walked
//! while the render state is borrowed mutably.

use std::fmt::{self, Write};

use crate::attributes::{AttrValue, Attributes};

/// Index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The document root, always present.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload-free discriminant of a node, used for dispatch and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Document,
    Heading,
    Blockquote,
    CodeBlock,
    FencedCodeBlock,
    HtmlBlock,
    List,
    ListItem,
    Paragraph,
    TextBlock,
    ThematicBreak,
    AutoLink,
    CodeSpan,
    Emphasis,
    Image,
    Link,
    RawHtml,
    Text,
    String,
}

impl Kind {
    /// Human-readable kind name, as printed in dumps and error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Kind::Document => "Document",
            Kind::Heading => "Heading",
            Kind::Blockquote => "Blockquote",
            Kind::CodeBlock => "CodeBlock",
            Kind::FencedCodeBlock => "FencedCodeBlock",
            Kind::HtmlBlock => "HTMLBlock",
            Kind::List => "List",
            Kind::ListItem => "ListItem",
            Kind::Paragraph => "Paragraph",
            Kind::TextBlock => "TextBlock",
            Kind::ThematicBreak => "ThematicBreak",
            Kind::AutoLink => "AutoLink",
            Kind::CodeSpan => "CodeSpan",
            Kind::Emphasis => "Emphasis",
            Kind::Image => "Image",
            Kind::Link => "Link",
            Kind::RawHtml => "RawHTML",
            Kind::Text => "Text",
            Kind::String => "String",
        }
    }

    /// Whether nodes of this kind live in block context.
    #[must_use]
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Kind::Document
                | Kind::Heading
                | Kind::Blockquote
                | Kind::CodeBlock
                | Kind::FencedCodeBlock
                | Kind::HtmlBlock
                | Kind::List
                | Kind::ListItem
                | Kind::Paragraph
                | Kind::TextBlock
                | Kind::ThematicBreak
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node kind together with its kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading {
        /// Heading level (1-6).
        level: u8,
    },
    Blockquote,
    /// Indented code block.
    CodeBlock {
        content: String,
    },
    FencedCodeBlock {
        /// First word of the info string, if any.
        language: Option<String>,
        content: String,
    },
    HtmlBlock {
        content: String,
    },
    List {
        ordered: bool,
        /// Start number; only meaningful for ordered lists.
        start: u64,
    },
    ListItem,
    Paragraph,
    /// Inline content of a tight list item, without a paragraph of its own.
    TextBlock,
    ThematicBreak,
    AutoLink {
        url: String,
        /// Email autolink (`<user@example.com>`).
        email: bool,
    },
    /// Inline code; its text lives in `Text` children.
    CodeSpan,
    Emphasis {
        /// 1 for `em`, 2 for `strong`.
        level: u8,
    },
    Image {
        destination: String,
        title: Option<String>,
    },
    Link {
        destination: String,
        title: Option<String>,
    },
    RawHtml {
        content: String,
    },
    Text {
        value: String,
        soft_line_break: bool,
        hard_line_break: bool,
    },
    /// Literal string produced by an earlier pass (e.g. typographic replacements).
    String {
        value: String,
    },
}

impl NodeKind {
    /// Plain text node without line breaks.
    pub fn text(value: impl Into<String>) -> Self {
        NodeKind::Text {
            value: value.into(),
            soft_line_break: false,
            hard_line_break: false,
        }
    }

    /// Link node with an optional title.
    pub fn link(destination: impl Into<String>, title: Option<&str>) -> Self {
        NodeKind::Link {
            destination: destination.into(),
            title: title.map(str::to_owned),
        }
    }

    /// Image node with an optional title.
    pub fn image(destination: impl Into<String>, title: Option<&str>) -> Self {
        NodeKind::Image {
            destination: destination.into(),
            title: title.map(str::to_owned),
        }
    }

    /// Discriminant of this node kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            NodeKind::Document => Kind::Document,
            NodeKind::Heading { .. } => Kind::Heading,
            NodeKind::Blockquote => Kind::Blockquote,
            NodeKind::CodeBlock { .. } => Kind::CodeBlock,
            NodeKind::FencedCodeBlock { .. } => Kind::FencedCodeBlock,
            NodeKind::HtmlBlock { .. } => Kind::HtmlBlock,
            NodeKind::List { .. } => Kind::List,
            NodeKind::ListItem => Kind::ListItem,
            NodeKind::Paragraph => Kind::Paragraph,
            NodeKind::TextBlock => Kind::TextBlock,
            NodeKind::ThematicBreak => Kind::ThematicBreak,
            NodeKind::AutoLink { .. } => Kind::AutoLink,
            NodeKind::CodeSpan => Kind::CodeSpan,
            NodeKind::Emphasis { .. } => Kind::Emphasis,
            NodeKind::Image { .. } => Kind::Image,
            NodeKind::Link { .. } => Kind::Link,
            NodeKind::RawHtml { .. } => Kind::RawHtml,
            NodeKind::Text { .. } => Kind::Text,
            NodeKind::String { .. } => Kind::String,
        }
    }
}

/// A node of the document tree.
#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: Attributes,
}

impl Node {
    /// Kind and payload.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attributes attached by earlier passes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attrs
    }
}

/// Markdown document tree.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                attrs: Attributes::default(),
            }],
        }
    }

    /// Root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Append a new node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "unknown parent node {parent:?}");
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            attrs: Attributes::default(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Kind and payload of a node.
    #[must_use]
    pub fn node_kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Discriminant of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Kind {
        self.nodes[id.0].kind.kind()
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Total number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Set an attribute on a node, replacing any previous value.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.nodes[id.0].attrs.set(name, value)
    }

    /// Attributes of a node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &Attributes {
        &self.nodes[id.0].attrs
    }

    /// Mutable access to a node's payload (used by the tree builder).
    pub(crate) fn node_kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    /// Concatenated text of all `Text` and `String` descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = pending.pop() {
            match self.node_kind(node) {
                NodeKind::Text { value, .. } | NodeKind::String { value } => out.push_str(value),
                _ => pending.extend(self.children(node).iter().rev()),
            }
        }
        out
    }

    /// Indented dump of the tree, one node per line.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut pending = vec![(NodeId::ROOT, 0)];
        while let Some((id, depth)) = pending.pop() {
            self.dump_node(id, depth, &mut out);
            pending.extend(self.children(id).iter().rev().map(|&child| (child, depth + 1)));
        }
        out
    }

    /// Dump line of a single node.
    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.get(id);
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.kind.kind().name());
        match &node.kind {
            NodeKind::Heading { level } => write!(out, " level={level}").unwrap(),
            NodeKind::List { ordered, start } => {
                write!(out, " ordered={ordered}").unwrap();
                if *ordered {
                    write!(out, " start={start}").unwrap();
                }
            }
            NodeKind::FencedCodeBlock { language, content } => {
                if let Some(lang) = language {
                    write!(out, " language={lang}").unwrap();
                }
                write!(out, " content={content:?}").unwrap();
            }
            NodeKind::CodeBlock { content }
            | NodeKind::HtmlBlock { content }
            | NodeKind::RawHtml { content } => write!(out, " content={content:?}").unwrap(),
            NodeKind::AutoLink { url, email } => write!(out, " url={url:?} email={email}").unwrap(),
            NodeKind::Emphasis { level } => write!(out, " level={level}").unwrap(),
            NodeKind::Image { destination, title } | NodeKind::Link { destination, title } => {
                write!(out, " destination={destination:?}").unwrap();
                if let Some(title) = title {
                    write!(out, " title={title:?}").unwrap();
                }
            }
            NodeKind::Text {
                value,
                soft_line_break,
                hard_line_break,
            } => {
                write!(out, " {value:?}").unwrap();
                if *soft_line_break {
                    out.push_str(" soft_break");
                }
                if *hard_line_break {
                    out.push_str(" hard_break");
                }
            }
            NodeKind::String { value } => write!(out, " {value:?}").unwrap(),
            NodeKind::Document
            | NodeKind::Blockquote
            | NodeKind::ListItem
            | NodeKind::Paragraph
            | NodeKind::TextBlock
            | NodeKind::ThematicBreak
            | NodeKind::CodeSpan => {}
        }
        for (name, value) in node.attrs.iter() {
            write!(out, " @{name}={:?}", value.to_text()).unwrap();
        }
        out.push('\n');
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
