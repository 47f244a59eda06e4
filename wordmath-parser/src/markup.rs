//! Element tree built from the markup token stream.

use crate::lexer::Token;
use logos::Logos;
use wordmath_source::{Error, Source};

/// A markup element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Local name (namespace prefix stripped).
    pub name: String,
    /// Concatenated text of all descendants, trimmed.
    pub value: String,
    pub children: Vec<Element>,
    /// 1-based line of the start tag.
    pub line: usize,
}

impl Element {
    /// Create a leaf element with the specified text.
    pub fn leaf(name: &str, value: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            children: Vec::new(),
            line,
        }
    }
}

/// An element that has been opened but not closed yet.
struct OpenElement {
    qualified_name: String,
    text: String,
    children: Vec<Element>,
    line: usize,
}

impl OpenElement {
    fn new(qualified_name: String, line: usize) -> Self {
        Self {
            qualified_name,
            text: String::new(),
            children: Vec::new(),
            line,
        }
    }

    fn close(self) -> (Element, String) {
        let name = local_name(&self.qualified_name).to_string();
        let element = Element {
            name,
            value: self.text.trim().to_string(),
            children: self.children,
            line: self.line,
        };
        (element, self.text)
    }
}

fn local_name(qualified_name: &str) -> &str {
    qualified_name.rsplit(':').next().unwrap_or(qualified_name)
}

/// Parses the markup in `source` and returns its root element.
pub fn parse_markup(source: &Source) -> Result<Element, Error> {
    let mut lexer = Token::lexer(source.content);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Element> = None;

    while let Some(token) = lexer.next() {
        let line = source.line_at(lexer.span().start);

        // Closed elements are attached to their parent, or become the root.
        let mut finished = None;
        match token {
            Token::StartTag(tag) => {
                if root.is_some() {
                    return Err(Error::syntax(
                        format!("Unexpected <{}> after the root element", tag.name),
                        Some(line),
                    ));
                }
                let open = OpenElement::new(tag.name, line);
                if tag.self_closing {
                    finished = Some(open.close());
                } else {
                    stack.push(open);
                }
            }
            Token::EndTag(name) => match stack.pop() {
                Some(open) if open.qualified_name == name => finished = Some(open.close()),
                Some(open) => {
                    return Err(Error::syntax(
                        format!(
                            "Mismatched closing tag </{}>, expected </{}>",
                            name, open.qualified_name
                        ),
                        Some(line),
                    ))
                }
                None => {
                    return Err(Error::syntax(
                        format!("Unexpected closing tag </{}>", name),
                        Some(line),
                    ))
                }
            },
            Token::Text(text) => match stack.last_mut() {
                Some(open) => open.text.push_str(&text),
                None if text.trim().is_empty() => {}
                None => {
                    return Err(Error::syntax(
                        "Text outside of the root element",
                        Some(line),
                    ))
                }
            },
            Token::Error => {
                return Err(Error::syntax(
                    format!("Malformed markup near {:?}", lexer.slice()),
                    Some(line),
                ))
            }
        }

        if let Some((element, text)) = finished {
            match stack.last_mut() {
                Some(parent) => {
                    parent.text.push_str(&text);
                    parent.children.push(element);
                }
                None => root = Some(element),
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(Error::syntax(
            format!("Unclosed tag <{}>", open.qualified_name),
            Some(open.line),
        ));
    }
    root.ok_or_else(|| Error::syntax("Document has no root element", None))
}
