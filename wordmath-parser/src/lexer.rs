use logos::{Lexer, Logos};

/// An opening tag. `self_closing` is set for `<tag/>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Qualified name, including any namespace prefix (e.g. `mml:mi`).
    pub name: String,
    pub self_closing: bool,
}

#[derive(Debug, Logos, Clone, PartialEq, Eq)]
pub enum Token {
    // elements
    #[regex(r"<[A-Za-z_][^>]*>", start_tag)]
    StartTag(Tag),
    #[regex(r"</[^>]+>", end_tag)]
    EndTag(String),

    // character data
    #[regex(r"[^<]+", text)]
    Text(String),

    // misc
    #[regex(r"<[?!][^>]*>", logos::skip)] // declarations, processing instructions, comments
    #[error]
    Error,
}

fn tag_name(inner: &str) -> String {
    inner
        .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn start_tag(lex: &mut Lexer<Token>) -> Tag {
    let slice = lex.slice();
    Tag {
        name: tag_name(&slice[1..]),
        self_closing: slice.ends_with("/>"),
    }
}

fn end_tag(lex: &mut Lexer<Token>) -> String {
    tag_name(lex.slice()[2..].trim_start())
}

fn text(lex: &mut Lexer<Token>) -> Option<String> {
    decode_entities(lex.slice())
}

/// Decodes the predefined XML entities and numeric character references.
/// Returns `None` if an entity is malformed or unknown.
pub fn decode_entities(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let semi = rest.find(';')?;
        let entity = &rest[1..semi];
        let decoded = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()?
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()?
                } else {
                    return None;
                };
                char::from_u32(code)?
            }
        };
        out.push(decoded);
        rest = &rest[semi + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// The invisible "function application" operator (U+2061).
pub const FUNCTION_APPLICATION: &str = "\u{2061}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Paren,
    Square,
    Curly,
}

impl Bracket {
    pub fn closing(self) -> char {
        match self {
            Bracket::Paren => ')',
            Bracket::Square => ']',
            Bracket::Curly => '}',
        }
    }
}

/// The operators understood inside `<mo>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Equals,
    Comma,
    Open(Bracket),
    Close(Bracket),
    FunctionApplication,
}

impl Operator {
    /// Classifies the text of an `<mo>` element or returns `None` if unsupported.
    pub fn classify(text: &str) -> Option<Operator> {
        let op = match text {
            "+" => Operator::Plus,
            "-" | "\u{2212}" => Operator::Minus,
            "*" | "\u{2217}" | "\u{b7}" | "\u{22c5}" | "\u{d7}" | "\u{2062}" => Operator::Times,
            "/" | "\u{f7}" | "\u{2215}" => Operator::Divide,
            "=" => Operator::Equals,
            "," | "\u{2063}" => Operator::Comma,
            "(" => Operator::Open(Bracket::Paren),
            "[" => Operator::Open(Bracket::Square),
            "{" => Operator::Open(Bracket::Curly),
            ")" => Operator::Close(Bracket::Paren),
            "]" => Operator::Close(Bracket::Square),
            "}" => Operator::Close(Bracket::Curly),
            FUNCTION_APPLICATION => Operator::FunctionApplication,
            _ => return None,
        };
        Some(op)
    }

    /// Returns `true` if the operator terminates a term (`term` stops before it).
    pub fn ends_term(self) -> bool {
        matches!(
            self,
            Operator::Plus
                | Operator::Minus
                | Operator::Equals
                | Operator::Comma
                | Operator::Close(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Token::lexer(source).collect()
    }

    #[test]
    fn test_tags() {
        assert_eq!(
            tokens(r#"<?xml version="1.0"?><mml:math xmlns:mml="x"><mi>x</mi><mrow/></mml:math>"#),
            vec![
                Token::StartTag(Tag {
                    name: "mml:math".to_string(),
                    self_closing: false
                }),
                Token::StartTag(Tag {
                    name: "mi".to_string(),
                    self_closing: false
                }),
                Token::Text("x".to_string()),
                Token::EndTag("mi".to_string()),
                Token::StartTag(Tag {
                    name: "mrow".to_string(),
                    self_closing: true
                }),
                Token::EndTag("mml:math".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            tokens("<!-- note --><mn>1</mn>"),
            vec![
                Token::StartTag(Tag {
                    name: "mn".to_string(),
                    self_closing: false
                }),
                Token::Text("1".to_string()),
                Token::EndTag("mn".to_string()),
            ]
        );
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("a &lt; b").as_deref(), Some("a < b"));
        assert_eq!(decode_entities("&#x2061;").as_deref(), Some(FUNCTION_APPLICATION));
        assert_eq!(decode_entities("&#960;").as_deref(), Some("π"));
        assert_eq!(decode_entities("&nbsp;"), None);
        assert_eq!(decode_entities("&amp"), None);
        assert_eq!(tokens("&bogus;"), vec![Token::Error]);
    }

    #[test]
    fn test_operator_classification() {
        assert_eq!(Operator::classify("\u{2212}"), Some(Operator::Minus));
        assert_eq!(Operator::classify("\u{d7}"), Some(Operator::Times));
        assert_eq!(
            Operator::classify(FUNCTION_APPLICATION),
            Some(Operator::FunctionApplication)
        );
        assert_eq!(Operator::classify("<"), None);
        assert!(Operator::Close(Bracket::Paren).ends_term());
        assert!(!Operator::Times.ends_term());
    }
}
