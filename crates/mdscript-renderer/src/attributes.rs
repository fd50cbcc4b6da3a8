//! Node attributes and per-element allow-lists.

use std::borrow::Cow;

use crate::ast::Kind;

/// Attribute value as attached by a pre-processing pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    Bytes(Vec<u8>),
    Text(String),
    Integer(i64),
}

impl AttrValue {
    /// Textual form used in the emitted script.
    ///
    /// Bytes are decoded as UTF-8 (invalid sequences replaced), integers are
    /// printed in base 10.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            AttrValue::Bytes(bytes) => String::from_utf8_lossy(bytes),
            AttrValue::Text(text) => Cow::Borrowed(text),
            AttrValue::Integer(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Integer(value)
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(value: Vec<u8>) -> Self {
        AttrValue::Bytes(value)
    }
}

impl From<&[u8]> for AttrValue {
    fn from(value: &[u8]) -> Self {
        AttrValue::Bytes(value.to_vec())
    }
}

/// Ordered attribute bag with unique, case-sensitive names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    /// Set an attribute, returning the previous value.
    ///
    /// Replacing keeps the first insertion position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        let name = name.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((name, value));
        None
    }

    /// Attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    /// Whether an attribute with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Attribute names any element can carry. Kept sorted for binary search.
const GLOBAL_ATTRIBUTES: &[&str] = &[
    "accesskey",
    "autocapitalize",
    "autofocus",
    "class",
    "contenteditable",
    "dir",
    "draggable",
    "enterkeyhint",
    "hidden",
    "id",
    "inert",
    "inputmode",
    "is",
    "itemid",
    "itemprop",
    "itemref",
    "itemscope",
    "itemtype",
    "lang",
    "part",
    "role",
    "slot",
    "spellcheck",
    "style",
    "tabindex",
    "title",
    "translate",
];

/// Prefix of custom data attributes, allowed on every element.
const DATA_PREFIX: &str = "data-";

/// Prefix of accessibility attributes, part of the global list.
const ARIA_PREFIX: &str = "aria-";

/// Allow-list deciding which attributes of a node reach the emitted script.
///
/// Every filter accepts the global attributes, `aria-*` and `data-*` names;
/// element-specific filters extend that set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeFilter {
    extra: &'static [&'static str],
}

impl AttributeFilter {
    /// Global attributes only (headings, paragraphs, code, emphasis).
    pub const GLOBAL: AttributeFilter = AttributeFilter { extra: &[] };

    pub const BLOCKQUOTE: AttributeFilter = AttributeFilter { extra: &["cite"] };

    pub const LIST: AttributeFilter = AttributeFilter {
        extra: &["start", "reversed", "type"],
    };

    pub const LIST_ITEM: AttributeFilter = AttributeFilter { extra: &["value"] };

    /// `hr` attributes, mostly deprecated but still honoured by browsers.
    pub const THEMATIC_BREAK: AttributeFilter = AttributeFilter {
        extra: &["align", "color", "noshade", "size", "width"],
    };

    /// `a` attributes. `href` is absent on purpose: it only comes from the
    /// link destination, which goes through the URL guard.
    pub const LINK: AttributeFilter = AttributeFilter {
        extra: &[
            "download",
            "hreflang",
            "media",
            "ping",
            "referrerpolicy",
            "rel",
            "shape",
            "target",
        ],
    };

    /// `img` attributes. `src` comes from the guarded destination only.
    pub const IMAGE: AttributeFilter = AttributeFilter {
        extra: &[
            "align",
            "border",
            "crossorigin",
            "decoding",
            "height",
            "importance",
            "intrinsicsize",
            "ismap",
            "loading",
            "referrerpolicy",
            "sizes",
            "srcset",
            "usemap",
            "width",
        ],
    };

    /// Filter applied to nodes of the given kind.
    #[must_use]
    pub fn for_kind(kind: Kind) -> AttributeFilter {
        match kind {
            Kind::Blockquote => Self::BLOCKQUOTE,
            Kind::List => Self::LIST,
            Kind::ListItem => Self::LIST_ITEM,
            Kind::ThematicBreak => Self::THEMATIC_BREAK,
            Kind::AutoLink | Kind::Link => Self::LINK,
            Kind::Image => Self::IMAGE,
            Kind::Document
            | Kind::Heading
            | Kind::CodeBlock
            | Kind::FencedCodeBlock
            | Kind::HtmlBlock
            | Kind::Paragraph
            | Kind::TextBlock
            | Kind::CodeSpan
            | Kind::Emphasis
            | Kind::RawHtml
            | Kind::Text
            | Kind::String => Self::GLOBAL,
        }
    }

    /// Whether an attribute name passes this filter.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        name.starts_with(DATA_PREFIX)
            || name.starts_with(ARIA_PREFIX)
            || GLOBAL_ATTRIBUTES.binary_search(&name).is_ok()
            || self.extra.contains(&name)
    }

    /// Retained attributes in insertion order.
    pub fn filtered<'a>(
        self,
        attrs: &'a Attributes,
    ) -> impl Iterator<Item = (&'a str, &'a AttrValue)> + 'a {
        attrs.iter().filter(move |(name, _)| self.allows(name))
    }
}
