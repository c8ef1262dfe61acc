//! Lazy tokenizer for docblock text.
//!
//! The lexer never fails on prose: anything that is not part of the
//! annotation sub-grammar comes out as a [`TokenKind::Other`] token, which the
//! parser only ever skips via [`Lexer::seek_to_type`].  Whitespace and runs of
//! `*` (the gutter of a `/** ... */` comment) produce no tokens at all, so a
//! parameter list may span several docblock lines.  The closing `*/` is the
//! end of input; anything after it is never tokenized.
//!
//! Tokens are produced one at a time on demand; at most one token of
//! lookahead is buffered.

use std::fmt;

use crate::error::AnnotationError;

/// The kind of a docblock token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `@`
    At,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[` or `{`
    OpenBracket,
    /// `]` or `}`
    CloseBracket,
    /// `,`
    Comma,
    /// `=`
    Equal,
    /// `\` (namespace separator)
    Backslash,
    Identifier,
    Integer,
    Float,
    /// `true` / `false`, case-insensitive.
    Boolean,
    /// `"..."`; the token text is the unescaped content.
    QuotedString,
    /// Any other single character (prose).
    Other,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::At => "`@`",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::OpenBracket => "opening bracket",
            TokenKind::CloseBracket => "closing bracket",
            TokenKind::Comma => "`,`",
            TokenKind::Equal => "`=`",
            TokenKind::Backslash => "`\\`",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Boolean => "boolean",
            TokenKind::QuotedString => "quoted string",
            TokenKind::Other => "character",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token and where it started in the docblock.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

impl Token {
    pub(crate) fn unexpected(self, expected: Option<TokenKind>) -> AnnotationError {
        AnnotationError::UnexpectedToken {
            expected,
            found: self.kind,
            text: self.text,
            offset: self.offset,
        }
    }
}

/// Pull-based tokenizer over a docblock.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    lookahead: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            lookahead: None,
        }
    }

    /// Kind of the next unread token, or `None` at end of input.
    pub fn peek(&mut self) -> Option<TokenKind> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan();
        }
        self.lookahead.as_ref().map(|t| t.kind)
    }

    /// Consume the next token.
    pub fn read(&mut self) -> Result<Token, AnnotationError> {
        self.peek();
        self.lookahead
            .take()
            .ok_or(AnnotationError::UnexpectedEndOfInput)
    }

    /// Consume the next token, which must be of kind `expected`.
    pub fn read_expect(&mut self, expected: TokenKind) -> Result<Token, AnnotationError> {
        let token = self.read()?;
        if token.kind == expected {
            Ok(token)
        } else {
            Err(token.unexpected(Some(expected)))
        }
    }

    /// Discard tokens until one of kind `kind` is next.
    ///
    /// The matching token is left unconsumed.  Returns `false` once the input
    /// is exhausted without a match.
    pub fn seek_to_type(&mut self, kind: TokenKind) -> bool {
        while let Some(next) = self.peek() {
            if next == kind {
                return true;
            }
            self.lookahead = None;
        }
        false
    }

    // ─── Scanning ───────────────────────────────────────────────────────

    fn scan(&mut self) -> Option<Token> {
        self.skip_insignificant();

        let start = self.pos;
        let c = self.input[start..].chars().next()?;

        let kind = match c {
            '@' => TokenKind::At,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' | '{' => TokenKind::OpenBracket,
            ']' | '}' => TokenKind::CloseBracket,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Equal,
            '\\' => TokenKind::Backslash,
            '"' => {
                if let Some(token) = self.scan_quoted(start) {
                    return Some(token);
                }
                TokenKind::Other
            }
            c if c.is_ascii_digit() || (c == '-' && self.digit_at(start + 1)) => {
                return Some(self.scan_number(start));
            }
            c if c.is_alphabetic() || c == '_' => return Some(self.scan_word(start)),
            _ => TokenKind::Other,
        };

        self.pos = start + c.len_utf8();
        Some(Token {
            kind,
            text: c.to_string(),
            offset: start,
        })
    }

    /// Skip whitespace and gutter stars.  A `*/` ends the comment, so the
    /// cursor moves to the end of input.
    fn skip_insignificant(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '*');
        let skipped = &rest[..rest.len() - trimmed.len()];
        if trimmed.starts_with('/') && skipped.ends_with('*') {
            self.pos = self.input.len();
            return;
        }
        self.pos += skipped.len();
    }

    fn digit_at(&self, pos: usize) -> bool {
        self.input
            .as_bytes()
            .get(pos)
            .is_some_and(|b| b.is_ascii_digit())
    }

    fn skip_digits(&mut self) {
        let bytes = self.input.as_bytes();
        while bytes.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let bytes = self.input.as_bytes();
        let mut kind = TokenKind::Integer;

        self.pos = start;
        if bytes[self.pos] == b'-' {
            self.pos += 1;
        }
        self.skip_digits();

        // Fraction: only when a digit follows the dot, so `1.` stays an
        // integer followed by prose.
        if bytes.get(self.pos) == Some(&b'.') && self.digit_at(self.pos + 1) {
            self.pos += 1;
            self.skip_digits();
            kind = TokenKind::Float;
        }

        if matches!(bytes.get(self.pos), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(self.pos + 1), Some(b'+' | b'-')));
            if self.digit_at(self.pos + 1 + sign) {
                self.pos += 1 + sign;
                self.skip_digits();
                kind = TokenKind::Float;
            }
        }

        Token {
            kind,
            text: self.input[start..self.pos].to_string(),
            offset: start,
        }
    }

    fn scan_word(&mut self, start: usize) -> Token {
        let rest = &self.input[start..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        self.pos = start + len;

        let word = &rest[..len];
        let kind = if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
            TokenKind::Boolean
        } else {
            TokenKind::Identifier
        };

        Token {
            kind,
            text: word.to_string(),
            offset: start,
        }
    }

    /// Scan a `"`-delimited string starting at `start`.
    ///
    /// `\"` and `\\` are escapes; any other backslash is kept verbatim so
    /// class names like `"App\Entity\User"` survive.  Returns `None` (and
    /// leaves the cursor alone) when the string is unterminated.
    fn scan_quoted(&mut self, start: usize) -> Option<Token> {
        let bytes = self.input.as_bytes();
        let mut cursor = start + 1;
        let mut value = String::new();

        loop {
            let hit = cursor + memchr::memchr2(b'"', b'\\', &bytes[cursor..])?;
            value.push_str(&self.input[cursor..hit]);

            if bytes[hit] == b'"' {
                self.pos = hit + 1;
                return Some(Token {
                    kind: TokenKind::QuotedString,
                    text: value,
                    offset: start,
                });
            }

            match bytes.get(hit + 1) {
                Some(&escaped @ (b'"' | b'\\')) => {
                    value.push(char::from(escaped));
                    cursor = hit + 2;
                }
                _ => {
                    value.push('\\');
                    cursor = hit + 1;
                }
            }
        }
    }
}
