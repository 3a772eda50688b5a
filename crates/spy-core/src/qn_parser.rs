//! Tokenizer and recursive-descent parser for the canonical QN text form.
//!
//! ```text
//! fqn     := segment ("::" segment)*
//! segment := name ["[" fqn ("," fqn)* "]"] ["#" suffix]
//! ```
//!
//! Whitespace between tokens is ignored, so `dict[i32,f64]` and
//! `dict[i32, f64]` parse to the same name.

use crate::error::{QnParseError, QnParseErrorKind};
use crate::qualified_name::{QualifiedName, Segment, is_valid_name};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Name(String),
    ColonColon,
    OpenBracket,
    CloseBracket,
    Comma,
    Hash,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Name(name) => format!("`{name}`"),
            TokenKind::ColonColon => "`::`".to_string(),
            TokenKind::OpenBracket => "`[`".to_string(),
            TokenKind::CloseBracket => "`]`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Hash => "`#`".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    /// Byte offset of the token in the input.
    pos: usize,
}

fn tokenize(text: &str) -> Result<Vec<Token>, QnParseError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut name_start: Option<usize> = None;

    let flush = |tokens: &mut Vec<Token>, start: &mut Option<usize>, end: usize| {
        if let Some(pos) = start.take() {
            tokens.push(Token {
                kind: TokenKind::Name(text[pos..end].to_string()),
                pos,
            });
        }
    };

    while let Some((pos, ch)) = chars.next() {
        let punct = match ch {
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            ',' => Some(TokenKind::Comma),
            '#' => Some(TokenKind::Hash),
            ':' if matches!(chars.peek(), Some((_, ':'))) => {
                chars.next();
                Some(TokenKind::ColonColon)
            }
            _ => None,
        };
        if let Some(kind) = punct {
            flush(&mut tokens, &mut name_start, pos);
            tokens.push(Token { kind, pos });
        } else if ch.is_whitespace() {
            flush(&mut tokens, &mut name_start, pos);
        } else if is_valid_name(ch.encode_utf8(&mut [0; 4])) {
            name_start.get_or_insert(pos);
        } else {
            return Err(QnParseError::new(
                QnParseErrorKind::InvalidName,
                pos,
                format!("invalid character {ch:?} in name"),
            ));
        }
    }
    flush(&mut tokens, &mut name_start, text.len());
    Ok(tokens)
}

/// Parser over a pre-tokenized QN string.
pub(crate) struct QnParser {
    tokens: Vec<Token>,
    index: usize,
    /// Current bracket nesting, used to report unclosed brackets.
    depth: usize,
    end: usize,
}

impl QnParser {
    pub(crate) fn new(text: &str) -> Result<Self, QnParseError> {
        Ok(Self {
            tokens: tokenize(text)?,
            index: 0,
            depth: 0,
            end: text.len(),
        })
    }

    /// Parse a complete name; any input left over is an error.
    pub(crate) fn parse(mut self) -> Result<QualifiedName, QnParseError> {
        let qn = self.parse_fqn()?;
        if let Some(tok) = self.peek() {
            return Err(QnParseError::new(
                QnParseErrorKind::TrailingInput,
                tok.pos,
                format!("unexpected {} after complete name", tok.kind.describe()),
            ));
        }
        Ok(qn)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn eof_error(&self, expected: &str) -> QnParseError {
        if self.depth > 0 {
            QnParseError::new(
                QnParseErrorKind::UnclosedBracket,
                self.end,
                "unclosed bracket",
            )
        } else {
            QnParseError::new(
                QnParseErrorKind::UnexpectedEnd,
                self.end,
                format!("expected {expected}, found end of input"),
            )
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), QnParseError> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                self.index += 1;
                Ok(())
            }
            Some(tok) => Err(QnParseError::new(
                QnParseErrorKind::UnexpectedToken,
                tok.pos,
                format!(
                    "expected {}, found {}",
                    kind.describe(),
                    tok.kind.describe()
                ),
            )),
            None => Err(self.eof_error(&kind.describe())),
        }
    }

    fn expect_name(&mut self, what: &str) -> Result<String, QnParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Name(name),
                ..
            }) => {
                let name = name.clone();
                self.index += 1;
                Ok(name)
            }
            Some(tok) => Err(QnParseError::new(
                QnParseErrorKind::UnexpectedToken,
                tok.pos,
                format!("expected {what}, found {}", tok.kind.describe()),
            )),
            None => Err(self.eof_error(what)),
        }
    }

    fn parse_fqn(&mut self) -> Result<QualifiedName, QnParseError> {
        let mut segments = vec![self.parse_segment()?];
        while self.peek_kind() == Some(&TokenKind::ColonColon) {
            self.index += 1;
            segments.push(self.parse_segment()?);
        }
        Ok(QualifiedName::new(segments))
    }

    fn parse_segment(&mut self) -> Result<Segment, QnParseError> {
        let name = self.expect_name("a name")?;
        let mut qualifiers = Vec::new();
        if self.peek_kind() == Some(&TokenKind::OpenBracket) {
            self.index += 1;
            self.depth += 1;
            qualifiers = self.parse_qualifiers()?;
            self.depth -= 1;
        }
        let mut segment = Segment::with_qualifiers(name, qualifiers);
        if self.peek_kind() == Some(&TokenKind::Hash) {
            self.index += 1;
            segment = segment.suffixed(self.expect_name("a suffix")?);
        }
        Ok(segment)
    }

    fn parse_qualifiers(&mut self) -> Result<Vec<QualifiedName>, QnParseError> {
        let mut qualifiers = Vec::new();
        loop {
            qualifiers.push(self.parse_fqn()?);
            match self.peek_kind() {
                None => return Err(self.eof_error("`]`")),
                Some(TokenKind::Comma) => self.index += 1,
                Some(_) => {
                    self.expect(TokenKind::CloseBracket)?;
                    return Ok(qualifiers);
                }
            }
        }
    }
}
