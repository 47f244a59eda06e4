//! The lexical cursor walks a window of sibling elements.

use crate::lexer::Operator;
use crate::markup::Element;
use wordmath_source::Error;

/// Borrowed view of the element under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementInfo<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub line: usize,
}

impl<'a> ElementInfo<'a> {
    fn new(element: &'a Element) -> Self {
        Self {
            name: &element.name,
            value: &element.value,
            line: element.line,
        }
    }

    /// Returns the operator if this is an `<mo>` element with a supported operator.
    pub fn operator(&self) -> Option<Operator> {
        if self.name == "mo" {
            Operator::classify(self.value)
        } else {
            None
        }
    }
}

/// A cursor over an ordered window of sibling elements.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    elements: &'a [Element],
    index: usize,
    /// Line of the element owning this window. Used for errors once the cursor is exhausted.
    parent_line: Option<usize>,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over the children of `root`.
    pub fn new(root: &'a Element) -> Self {
        Self {
            elements: &root.children,
            index: 0,
            parent_line: Some(root.line),
        }
    }

    /// Create a cursor over an arbitrary window of elements.
    pub fn from_slice(elements: &'a [Element], parent_line: Option<usize>) -> Self {
        Self {
            elements,
            index: 0,
            parent_line,
        }
    }

    fn raw(&self) -> Option<&'a Element> {
        self.elements.get(self.index)
    }

    /// The element currently pointed to, or `None` if exhausted.
    pub fn current(&self) -> Option<ElementInfo<'a>> {
        self.raw().map(ElementInfo::new)
    }

    /// The element one past the current one, without advancing.
    pub fn peek(&self) -> Option<ElementInfo<'a>> {
        self.elements.get(self.index + 1).map(ElementInfo::new)
    }

    /// The operator under the cursor, if the current element is a supported `<mo>`.
    pub fn operator(&self) -> Option<Operator> {
        self.current().and_then(|info| info.operator())
    }

    /// Line of the current element, falling back to the owner of this window.
    pub fn line(&self) -> Option<usize> {
        self.raw().map(|el| el.line).or(self.parent_line)
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.elements.len()
    }

    /// Number of elements in the window (consumed ones included).
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of elements not consumed yet.
    pub fn remaining(&self) -> usize {
        self.elements.len().saturating_sub(self.index)
    }

    /// Checks that the current element is a `tag` element, consumes it and returns its info.
    pub fn expect(&mut self, tag: &str) -> Result<ElementInfo<'a>, Error> {
        match self.current() {
            Some(info) if info.name == tag => {
                self.index += 1;
                Ok(info)
            }
            Some(info) => Err(Error::syntax(
                format!("Expected <{}> but found <{}>", tag, info.name),
                Some(info.line),
            )),
            None => Err(Error::syntax(
                format!("Expected <{}> but reached the end of the group", tag),
                self.parent_line,
            )),
        }
    }

    /// Returns a new cursor over the children of the current element. Does not advance `self`.
    pub fn child_cursor(&self) -> Result<Cursor<'a>, Error> {
        match self.raw() {
            Some(element) => Ok(Cursor::new(element)),
            None => Err(Error::Internal(
                "Can't create a child cursor, the cursor is exhausted".to_string(),
            )),
        }
    }

    /// Consumes the current element and returns a cursor over a window holding only that element.
    pub fn take_window(&mut self) -> Result<Cursor<'a>, Error> {
        if self.is_exhausted() {
            return Err(Error::syntax(
                "Unexpected end of the group",
                self.parent_line,
            ));
        }
        let window = Cursor::from_slice(
            &self.elements[self.index..self.index + 1],
            self.line(),
        );
        self.index += 1;
        Ok(window)
    }
}
