//! Markdown tree renderer that emits DOM-building JavaScript.
//!
//! This crate walks a parsed markdown [`Document`] and produces a [`Script`]:
//! an ordered list of imperative statements that, executed by a browser-like
//! runtime, rebuild an equivalent element tree with `createElement`,
//! `createTextNode` and `appendChild`.
//!
//! # Architecture
//!
//! - [`ScriptRenderer`]: depth-first dispatch over the closed set of node kinds
//! - inline run aggregation: adjacent text children are merged into one text node
//! - [`AttributeFilter`]: per-element allow-lists deciding which attributes survive
//! - [`is_dangerous_url`]: blocks `javascript:` and friends unless unsafe mode is on
//!
//! The input tree is usually built from `pulldown-cmark` events with
//! [`build_tree`], but any conforming [`Document`] can be rendered.
//!
//! # Example
//!
//! ```
//! use mdscript_renderer::{RenderOptions, ScriptRenderer};
//!
//! let renderer = ScriptRenderer::new(RenderOptions::default()).unwrap();
//! let script = renderer.render_markdown("# Hello\n\n**Bold** text").unwrap();
//! assert!(script.to_js().contains("document.createElement('h1')"));
//! ```

mod aggregate;
mod ast;
mod attributes;
mod builder;
mod error;
mod escape;
mod ident;
mod inline;
mod renderer;
mod script;
mod state;
mod url;

pub use ast::{Document, Kind, Node, NodeId, NodeKind};
pub use attributes::{AttrValue, AttributeFilter, Attributes};
pub use builder::{build_tree, parser_options};
pub use error::{OptionsError, RenderError};
pub use escape::js_string;
pub use ident::{IdAllocator, Ident};
pub use renderer::{ScriptRenderer, WalkStatus};
pub use script::{Handle, Script, Statement};
pub use state::{RenderOptions, RenderState};
pub use url::{escape_url, is_dangerous_url};
