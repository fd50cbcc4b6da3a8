//! Emitted statements and the output sink.

use std::fmt::{self, Write};

use crate::escape::{comment_text, js_string};
use crate::ident::Ident;

/// Attachment target: the root container or an emitted element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    Container,
    Node(Ident),
}

impl From<Ident> for Handle {
    fn from(id: Ident) -> Self {
        Handle::Node(id)
    }
}

/// One imperative statement of the generated script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// Opens the generator function and creates the root container.
    Preamble,
    CreateElement {
        id: Ident,
        tag: &'static str,
    },
    CreateText {
        id: Ident,
        text: String,
    },
    /// DOM property assignment (`href`, `src`, `start`, ...).
    SetProperty {
        id: Ident,
        name: &'static str,
        value: String,
    },
    /// Attribute copied from the node's attribute bag.
    SetAttribute {
        target: Handle,
        name: String,
        value: String,
    },
    SetTextContent {
        target: Handle,
        text: String,
    },
    /// `Object.assign(el.style, <style object>.<key>)`.
    AssignStyle {
        id: Ident,
        key: String,
    },
    Append {
        parent: Handle,
        child: Ident,
    },
    Comment(String),
    /// Returns the container and closes the generator function.
    Trailer,
}

impl Statement {
    /// Whether this statement creates an element or text node.
    #[must_use]
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Statement::CreateElement { .. } | Statement::CreateText { .. }
        )
    }

    /// Identifier created by this statement.
    #[must_use]
    pub fn created(&self) -> Option<Ident> {
        match self {
            Statement::CreateElement { id, .. } | Statement::CreateText { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Generated script: the ordered statements plus the names needed to print them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    statements: Vec<Statement>,
    container: String,
    entry_point: String,
    style_object: Option<String>,
}

impl Script {
    pub(crate) fn new(
        container: impl Into<String>,
        entry_point: impl Into<String>,
        style_object: Option<String>,
    ) -> Self {
        Self {
            statements: Vec::with_capacity(256),
            container: container.into(),
            entry_point: entry_point.into(),
            style_object,
        }
    }

    pub(crate) fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Statements in emission order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Number of element and text node creation statements.
    #[must_use]
    pub fn creation_count(&self) -> usize {
        self.statements.iter().filter(|s| s.is_creation()).count()
    }

    /// Full JavaScript text, one statement per line.
    #[must_use]
    pub fn to_js(&self) -> String {
        let mut out = String::with_capacity(self.statements.len() * 40);
        for statement in &self.statements {
            self.write_statement(statement, &mut out);
            out.push('\n');
        }
        out
    }

    fn write_statement(&self, statement: &Statement, out: &mut String) {
        let c = &self.container;
        match statement {
            Statement::Preamble => {
                write!(
                    out,
                    "function {}() {{\nconst {c} = document.createElement('div');\n{c}.id = {};",
                    self.entry_point,
                    js_string(c)
                )
                .unwrap();
            }
            Statement::CreateElement { id, tag } => {
                write!(out, "const {id} = document.createElement('{tag}');").unwrap();
            }
            Statement::CreateText { id, text } => {
                write!(out, "const {id} = document.createTextNode({});", js_string(text)).unwrap();
            }
            Statement::SetProperty { id, name, value } => {
                write!(out, "{id}.{name} = {};", js_string(value)).unwrap();
            }
            Statement::SetAttribute {
                target,
                name,
                value,
            } => {
                write!(
                    out,
                    "{}.setAttribute({}, {});",
                    self.target(*target),
                    js_string(name),
                    js_string(value)
                )
                .unwrap();
            }
            Statement::SetTextContent { target, text } => {
                write!(out, "{}.textContent = {};", self.target(*target), js_string(text)).unwrap();
            }
            Statement::AssignStyle { id, key } => {
                let object = self.style_object.as_deref().unwrap_or("mdStyle");
                write!(out, "Object.assign({id}.style, {object}.{key});").unwrap();
            }
            Statement::Append { parent, child } => {
                write!(out, "{}.appendChild({child});", self.target(*parent)).unwrap();
            }
            Statement::Comment(text) => {
                write!(out, "// {}", comment_text(text)).unwrap();
            }
            Statement::Trailer => {
                write!(out, "return {c};\n}}").unwrap();
            }
        }
    }

    fn target(&self, handle: Handle) -> Target<'_> {
        Target {
            handle,
            container: &self.container,
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js())
    }
}

/// Printable attachment target.
struct Target<'a> {
    handle: Handle,
    container: &'a str,
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle {
            Handle::Container => f.write_str(self.container),
            Handle::Node(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdAllocator;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_print_statements() {
        let mut ids = IdAllocator::new();
        let p = ids.next();
        let t = ids.next();
        let mut script = Script::new("mdDiv", "render", Some("siteStyle".to_owned()));
        script.push(Statement::Preamble);
        script.push(Statement::CreateElement { id: p, tag: "p" });
        script.push(Statement::AssignStyle {
            id: p,
            key: "p".to_owned(),
        });
        script.push(Statement::SetAttribute {
            target: Handle::Node(p),
            name: "class".to_owned(),
            value: "lead".to_owned(),
        });
        script.push(Statement::CreateText {
            id: t,
            text: "it's".to_owned(),
        });
        script.push(Statement::Append {
            parent: p.into(),
            child: t,
        });
        script.push(Statement::Comment("line\nbreak".to_owned()));
        script.push(Statement::Append {
            parent: Handle::Container,
            child: p,
        });
        script.push(Statement::Trailer);

        let expected = "\
function render() {
const mdDiv = document.createElement('div');
mdDiv.id = 'mdDiv';
const el2 = document.createElement('p');
Object.assign(el2.style, siteStyle.p);
el2.setAttribute('class', 'lead');
const el3 = document.createTextNode('it\\'s');
el2.appendChild(el3);
// line break
mdDiv.appendChild(el2);
return mdDiv;
}
";
        assert_eq!(script.to_js(), expected);
        assert_eq!(script.to_string(), expected);
        assert_eq!(script.creation_count(), 2);
        assert_eq!(script.len(), 9);
    }

    #[test]
    fn test_print_properties_and_text_content() {
        let mut ids = IdAllocator::new();
        let a = ids.next();
        let mut script = Script::new("root", "build", None);
        script.push(Statement::SetProperty {
            id: a,
            name: "href",
            value: "https://x".to_owned(),
        });
        script.push(Statement::SetTextContent {
            target: Handle::Container,
            text: "hi".to_owned(),
        });

        assert_eq!(
            script.to_js(),
            "el2.href = 'https://x';\nroot.textContent = 'hi';\n"
        );
    }

    #[test]
    fn test_created_identifier() {
        let mut ids = IdAllocator::new();
        let id = ids.next();
        assert_eq!(Statement::CreateElement { id, tag: "p" }.created(), Some(id));
        assert_eq!(Statement::Trailer.created(), None);
        assert!(!Statement::Preamble.is_creation());
    }
}
