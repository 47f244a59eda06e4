use crate::ast::{Node, Program};
use crate::cursor::Cursor;
use crate::lexer::{Bracket, Operator};
use crate::markup::{parse_markup, Element};
use tracing::{debug, warn};
use wordmath_source::{Error, Source};

mod expr;
mod stmt;

/// Parser settings supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Log and skip statements that fail to parse instead of aborting the whole document.
    pub skip_broken_statements: bool,
}

pub struct Parser<'a> {
    /// Source markup
    source: &'a Source<'a>,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: &'a Source<'a>, options: ParseOptions) -> Self {
        Self { source, options }
    }
}

impl<'a> Parser<'a> {
    /// Parses the whole document into a [`Program`].
    /// In tolerant mode, broken statements are skipped and recorded in the source's `ErrorReporter`.
    pub fn parse_program(&self) -> Result<Program, Error> {
        let root = parse_markup(self.source)?;
        self.parse_statement_list(&root)
    }

    /// Parses the statement containers of `root`. A `math` root is a one-statement program.
    pub fn parse_statement_list(&self, root: &Element) -> Result<Program, Error> {
        let containers: Vec<&Element> = if root.name == "math" {
            vec![root]
        } else {
            root.children.iter().collect()
        };

        let mut program = Program::default();
        for container in containers {
            match self.parse_statement(container) {
                Ok(stmt) => {
                    debug!(line = container.line, "parsed statement `{}`", stmt);
                    program.statements.push(stmt);
                }
                Err(err) => {
                    let err = err.or_line(Some(container.line));
                    if !self.options.skip_broken_statements {
                        return Err(err);
                    }
                    warn!("skipping statement: {}", err);
                    self.source.errors.add_error(err);
                }
            }
        }
        Ok(program)
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    /// Fails unless every element of `cursor` has been consumed.
    fn expect_end(&self, cursor: &Cursor<'_>) -> Result<(), Error> {
        match cursor.current() {
            None => Ok(()),
            Some(info) if info.name == "mo" => Err(Error::syntax(
                format!("Unexpected operator `{}`", info.value),
                Some(info.line),
            )),
            Some(info) => Err(Error::syntax(
                format!("Unexpected <{}>", info.name),
                Some(info.line),
            )),
        }
    }

    /// Error for a group that does not end with the bracket matching `open`.
    fn expected_close(&self, cursor: &Cursor<'_>, open: Bracket) -> Error {
        let found = match cursor.current() {
            Some(info) if info.name == "mo" => format!("`{}`", info.value),
            Some(info) => format!("<{}>", info.name),
            None => "the end of the group".to_string(),
        };
        Error::syntax(
            format!("Expected `{}` but found {}", open.closing(), found),
            cursor.line(),
        )
    }

    /// Parses `( item , item , … )` starting at the opening bracket under `cursor`.
    /// Brackets nested inside an item are matched by the item parser, never by scanning.
    fn parse_bracketed<'e, T>(
        &self,
        cursor: &mut Cursor<'e>,
        open: Bracket,
        mut item: impl FnMut(&mut Cursor<'e>) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        cursor.expect("mo")?;
        let mut items = Vec::new();
        if cursor.operator() == Some(Operator::Close(open)) {
            cursor.expect("mo")?;
            return Ok(items);
        }
        loop {
            items.push(item(cursor)?);
            match cursor.operator() {
                Some(Operator::Comma) => {
                    cursor.expect("mo")?;
                }
                Some(Operator::Close(close)) if close == open => {
                    cursor.expect("mo")?;
                    return Ok(items);
                }
                _ if cursor.is_exhausted() => {
                    return Err(Error::syntax("Missing closing bracket", cursor.line()))
                }
                _ => return Err(self.expected_close(cursor, open)),
            }
        }
    }

    /// Parses a list filling the rest of `cursor`: either a bracketed list whose closing bracket
    /// ends the window, or a bare comma-separated list.
    fn parse_list<'e, T>(
        &self,
        cursor: &mut Cursor<'e>,
        mut item: impl FnMut(&mut Cursor<'e>) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        if let Some(Operator::Open(open)) = cursor.operator() {
            let mut attempt = cursor.clone();
            if let Ok(items) = self.parse_bracketed(&mut attempt, open, &mut item) {
                if attempt.is_exhausted() {
                    *cursor = attempt;
                    return Ok(items);
                }
            }
            // `(a + b)(c + d)`: the first bracket closes early, so the window is one bare list
        }

        let mut items = Vec::new();
        while !cursor.is_exhausted() {
            items.push(item(cursor)?);
            if cursor.operator() == Some(Operator::Comma) {
                cursor.expect("mo")?;
            } else {
                self.expect_end(cursor)?;
            }
        }
        Ok(items)
    }

    /// Strips single-child `mrow`/`mfenced` wrappers from a one-element window.
    /// Returns the innermost window and whether it is the content of an `mfenced`.
    fn unnest<'e>(&self, mut window: Cursor<'e>) -> Result<(Cursor<'e>, bool), Error> {
        loop {
            match window.current() {
                Some(info) if window.remaining() == 1 && info.name == "mrow" => {
                    window = window.child_cursor()?;
                }
                Some(info) if window.remaining() == 1 && info.name == "mfenced" => {
                    let inner = window.child_cursor()?;
                    if inner.element_count() != 1 {
                        return Ok((inner, true));
                    }
                    window = inner;
                }
                _ => return Ok((window, false)),
            }
        }
    }

    /// Parses a list inside a group returned by [`Parser::unnest`].
    /// The children of an `mfenced` are separate items; separators between them are optional.
    fn parse_group_list<'e, T>(
        &self,
        group: (Cursor<'e>, bool),
        mut item: impl FnMut(&mut Cursor<'e>) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        let (mut cursor, fenced) = group;
        if !fenced {
            return self.parse_list(&mut cursor, item);
        }
        let mut items = Vec::new();
        while !cursor.is_exhausted() {
            if cursor.operator() == Some(Operator::Comma) {
                cursor.expect("mo")?;
                continue;
            }
            let mut window = cursor.take_window()?;
            items.push(item(&mut window)?);
            self.expect_end(&window)?;
        }
        Ok(items)
    }
}
