//! Document tree construction from `pulldown-cmark` events.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};
use tracing::warn;

use crate::ast::{Document, Kind, NodeId, NodeKind};

/// Parser options understood by the tree builder.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_HEADING_ATTRIBUTES
}

/// Build a document tree from markdown events.
///
/// Constructs outside the node vocabulary are dropped; the inline content
/// of dropped containers stays in the enclosing node.
pub fn build_tree<'a, I>(events: I) -> Document
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut builder = TreeBuilder::new();
    for event in events {
        builder.process_event(event);
    }
    builder.doc
}

impl Document {
    /// Parse markdown and build its document tree.
    ///
    /// # Example
    ///
    /// ```
    /// use mdscript_renderer::{Document, Kind, NodeId};
    ///
    /// let doc = Document::from_markdown("# Title\n");
    /// let heading = doc.children(NodeId::ROOT)[0];
    /// assert_eq!(doc.kind(heading), Kind::Heading);
    /// ```
    #[must_use]
    pub fn from_markdown(markdown: &str) -> Self {
        build_tree(Parser::new_ext(markdown, parser_options()))
    }
}

/// Open container on the builder stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    /// Node opened by a start tag.
    Node(NodeId),
    /// Text block opened for inline content directly under a block container.
    Implicit(NodeId),
    /// Unsupported container; its content goes to the enclosing node.
    Transparent,
    /// Unsupported container whose content is dropped.
    Suppressed,
}

struct TreeBuilder {
    doc: Document,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            stack: Vec::new(),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some(parent) = self.inline_parent() {
                    let span = self.doc.append(parent, NodeKind::CodeSpan);
                    self.doc.append(span, NodeKind::text(&*code));
                }
            }
            Event::Html(html) => self.html(&html),
            Event::InlineHtml(html) => {
                if let Some(parent) = self.inline_parent() {
                    self.doc.append(parent, NodeKind::RawHtml {
                        content: html.to_string(),
                    });
                }
            }
            Event::SoftBreak => self.line_break(false),
            Event::HardBreak => self.line_break(true),
            Event::Rule => {
                let parent = self.block_parent();
                self.doc.append(parent, NodeKind::ThematicBreak);
            }
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {
                warn!(?event, "Skipping unsupported markdown event");
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let node = self.open_block(NodeKind::Heading {
                    level: heading_level_to_num(level),
                });
                if let Some(id) = id {
                    self.doc.set_attribute(node, "id", &*id);
                }
                if !classes.is_empty() {
                    let class = classes.iter().map(|c| &**c).collect::<Vec<&str>>().join(" ");
                    self.doc.set_attribute(node, "class", class);
                }
                for (name, value) in attrs {
                    self.doc
                        .set_attribute(node, &*name, value.as_deref().unwrap_or_default());
                }
                return;
            }
            Tag::BlockQuote(_) => NodeKind::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Indented) => NodeKind::CodeBlock {
                content: String::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeKind::FencedCodeBlock {
                language: info.split_whitespace().next().map(str::to_owned),
                content: String::new(),
            },
            Tag::HtmlBlock => NodeKind::HtmlBlock {
                content: String::new(),
            },
            Tag::List(start) => NodeKind::List {
                ordered: start.is_some(),
                start: start.unwrap_or(1),
            },
            Tag::Item => NodeKind::ListItem,
            Tag::Emphasis => return self.open_inline(NodeKind::Emphasis { level: 1 }),
            Tag::Strong => return self.open_inline(NodeKind::Emphasis { level: 2 }),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let node = match link_type {
                    LinkType::Autolink | LinkType::Email => NodeKind::AutoLink {
                        url: dest_url.to_string(),
                        email: link_type == LinkType::Email,
                    },
                    _ => NodeKind::link(&*dest_url, non_empty(&title)),
                };
                return self.open_inline(node);
            }
            Tag::Image {
                dest_url, title, ..
            } => return self.open_inline(NodeKind::image(&*dest_url, non_empty(&title))),
            Tag::MetadataBlock(_) => {
                warn!("Skipping metadata block");
                self.stack.push(Frame::Suppressed);
                return;
            }
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript => {
                warn!(?tag, "Skipping unsupported markdown container");
                self.stack.push(Frame::Transparent);
                return;
            }
        };
        self.open_block(kind);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if matches!(self.stack.last(), Some(Frame::Implicit(_))) {
            self.stack.pop();
        }
        if self.stack.pop().is_none() {
            warn!(?tag, "Unbalanced end tag");
        }
    }

    /// Node that receives new blocks, closing any implicit text block.
    fn block_parent(&mut self) -> NodeId {
        if matches!(self.stack.last(), Some(Frame::Implicit(_))) {
            self.stack.pop();
        }
        self.current()
    }

    /// Node that receives inline content, or `None` inside a suppressed
    /// container. Inline content directly under a block container is wrapped
    /// in a text block.
    fn inline_parent(&mut self) -> Option<NodeId> {
        if self.stack.contains(&Frame::Suppressed) {
            return None;
        }
        let current = self.current();
        if matches!(
            self.doc.kind(current),
            Kind::Document | Kind::Blockquote | Kind::ListItem
        ) {
            let block = self.doc.append(current, NodeKind::TextBlock);
            self.stack.push(Frame::Implicit(block));
            return Some(block);
        }
        Some(current)
    }

    /// Innermost open node.
    fn current(&self) -> NodeId {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Node(id) | Frame::Implicit(id) => Some(*id),
                Frame::Transparent | Frame::Suppressed => None,
            })
            .unwrap_or(NodeId::ROOT)
    }

    fn open_block(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.block_parent();
        let node = self.doc.append(parent, kind);
        self.stack.push(Frame::Node(node));
        node
    }

    fn open_inline(&mut self, kind: NodeKind) {
        match self.inline_parent() {
            Some(parent) => {
                let node = self.doc.append(parent, kind);
                self.stack.push(Frame::Node(node));
            }
            None => self.stack.push(Frame::Suppressed),
        }
    }

    fn text(&mut self, text: &str) {
        if self.stack.contains(&Frame::Suppressed) {
            return;
        }
        let current = self.current();
        match self.doc.node_kind_mut(current) {
            NodeKind::CodeBlock { content }
            | NodeKind::FencedCodeBlock { content, .. }
            | NodeKind::HtmlBlock { content } => {
                content.push_str(text);
                return;
            }
            // The label of an autolink is its URL.
            NodeKind::AutoLink { .. } => return,
            _ => {}
        }
        if let Some(parent) = self.inline_parent() {
            self.doc.append(parent, NodeKind::text(text));
        }
    }

    fn html(&mut self, html: &str) {
        let current = self.current();
        if let NodeKind::HtmlBlock { content } = self.doc.node_kind_mut(current) {
            content.push_str(html);
        } else if let Some(parent) = self.inline_parent() {
            self.doc.append(parent, NodeKind::RawHtml {
                content: html.to_owned(),
            });
        }
    }

    /// Flag the preceding text node, or add an empty one carrying the break.
    fn line_break(&mut self, hard: bool) {
        let Some(parent) = self.inline_parent() else {
            return;
        };
        let last = self.doc.children(parent).last().copied();
        if let Some(last) = last
            && let NodeKind::Text {
                soft_line_break: soft @ false,
                hard_line_break: hard_flag @ false,
                ..
            } = self.doc.node_kind_mut(last)
        {
            if hard {
                *hard_flag = true;
            } else {
                *soft = true;
            }
            return;
        }
        self.doc.append(parent, NodeKind::Text {
            value: String::new(),
            soft_line_break: !hard,
            hard_line_break: hard,
        });
    }
}

fn non_empty<'a>(s: &'a CowStr<'_>) -> Option<&'a str> {
    (!s.is_empty()).then_some(&**s)
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dump(markdown: &str) -> String {
        Document::from_markdown(markdown).dump()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            dump("# Title\n\nSome *em* text.\n"),
            "Document\n\
             \x20 Heading level=1\n\
             \x20   Text \"Title\"\n\
             \x20 Paragraph\n\
             \x20   Text \"Some \"\n\
             \x20   Emphasis level=1\n\
             \x20     Text \"em\"\n\
             \x20   Text \" text.\"\n"
        );
    }

    #[test]
    fn test_heading_attributes() {
        assert_eq!(
            dump("## Setup {#setup .wide .dark data-x=1}\n"),
            "Document\n\
             \x20 Heading level=2 @id=\"setup\" @class=\"wide dark\" @data-x=\"1\"\n\
             \x20   Text \"Setup\"\n"
        );
    }

    #[test]
    fn test_tight_list_wraps_text_block() {
        assert_eq!(
            dump("3. one\n4. two\n"),
            "Document\n\
             \x20 List ordered=true start=3\n\
             \x20   ListItem\n\
             \x20     TextBlock\n\
             \x20       Text \"one\"\n\
             \x20   ListItem\n\
             \x20     TextBlock\n\
             \x20       Text \"two\"\n"
        );
    }

    #[test]
    fn test_nested_list_closes_text_block() {
        assert_eq!(
            dump("- a\n  - b\n"),
            "Document\n\
             \x20 List ordered=false\n\
             \x20   ListItem\n\
             \x20     TextBlock\n\
             \x20       Text \"a\"\n\
             \x20     List ordered=false\n\
             \x20       ListItem\n\
             \x20         TextBlock\n\
             \x20           Text \"b\"\n"
        );
    }

    #[test]
    fn test_code_blocks() {
        assert_eq!(
            dump("```rust ignore\nfn x() {}\n```\n\n    indented\n"),
            "Document\n\
             \x20 FencedCodeBlock language=rust content=\"fn x() {}\\n\"\n\
             \x20 CodeBlock content=\"indented\\n\"\n"
        );
    }

    #[test]
    fn test_links_and_autolinks() {
        assert_eq!(
            dump("[a](/x \"T\") <https://y> <me@z.org>\n"),
            "Document\n\
             \x20 Paragraph\n\
             \x20   Link destination=\"/x\" title=\"T\"\n\
             \x20     Text \"a\"\n\
             \x20   Text \" \"\n\
             \x20   AutoLink url=\"https://y\" email=false\n\
             \x20   Text \" \"\n\
             \x20   AutoLink url=\"me@z.org\" email=true\n"
        );
    }

    #[test]
    fn test_inline_code_image_and_html() {
        assert_eq!(
            dump("`c` ![alt](i.png) <b>\n"),
            "Document\n\
             \x20 Paragraph\n\
             \x20   CodeSpan\n\
             \x20     Text \"c\"\n\
             \x20   Text \" \"\n\
             \x20   Image destination=\"i.png\"\n\
             \x20     Text \"alt\"\n\
             \x20   Text \" \"\n\
             \x20   RawHTML content=\"<b>\"\n"
        );
    }

    #[test]
    fn test_line_breaks_flag_preceding_text() {
        assert_eq!(
            dump("one\ntwo  \nthree\n"),
            "Document\n\
             \x20 Paragraph\n\
             \x20   Text \"one\" soft_break\n\
             \x20   Text \"two\" hard_break\n\
             \x20   Text \"three\"\n"
        );
    }

    #[test]
    fn test_blocks_without_inline_content() {
        assert_eq!(
            dump("> quoted\n\n---\n\n<div>\nraw\n</div>\n"),
            "Document\n\
             \x20 Blockquote\n\
             \x20   Paragraph\n\
             \x20     Text \"quoted\"\n\
             \x20 ThematicBreak\n\
             \x20 HTMLBlock content=\"<div>\\nraw\\n</div>\\n\"\n"
        );
    }

    #[test]
    fn test_unsupported_containers_keep_content() {
        let options = parser_options() | Options::ENABLE_STRIKETHROUGH;
        let doc = build_tree(Parser::new_ext("a ~~b~~ c\n", options));
        assert_eq!(
            doc.dump(),
            "Document\n\
             \x20 Paragraph\n\
             \x20   Text \"a \"\n\
             \x20   Text \"b\"\n\
             \x20   Text \" c\"\n"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(dump(""), "Document\n");
    }
}
