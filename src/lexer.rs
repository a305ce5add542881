//! DCL lexical analyzer
//!
//! This module converts source text into a flat, ordered sequence of tokens.
//! The lexer never fails: an unterminated string simply runs to the end of
//! input and is reported as a diagnostic.

use crate::error::{Diagnostic, DiagnosticKind, Position};
use std::borrow::Cow;
use std::fmt;

/// Single-character delimiters, excluding the `;` terminator
const DELIMITERS: &[char] = &['{', '}', '[', ']', ','];

/// Characters that start an operator; `::` is the only two-character operator
const OPERATOR_CHARS: &[char] = &[':', '+', '-', '*', '/'];

/// Reserved words that are lexically identifiers
const KEYWORDS: &[&str] = &["tag", "copy", "key"];

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Bare word that is not a keyword or literal: `SContainer`, `Key`, `=`
    Identifier,
    /// `: :: + - * /`
    Operator,
    NumberLiteral,
    StringLiteral,
    BoolLiteral,
    /// `{ } [ ] ,`
    Delimiter,
    /// Statement terminator `;`
    End,
    /// `tag`, `copy`, `key`
    Keyword,
}

impl TokenKind {
    /// Returns true for operators, delimiters and the terminator
    pub fn is_syntax(self) -> bool {
        matches!(
            self,
            TokenKind::Operator | TokenKind::Delimiter | TokenKind::End
        )
    }

    /// Returns a name for the kind, for messages
    pub fn type_name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Operator => "operator",
            TokenKind::NumberLiteral => "number",
            TokenKind::StringLiteral => "string",
            TokenKind::BoolLiteral => "boolean",
            TokenKind::Delimiter => "delimiter",
            TokenKind::End => "';'",
            TokenKind::Keyword => "keyword",
        }
    }
}

/// A classified piece of source text
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// Token text; for strings, the unescaped content without quotes
    pub value: Cow<'a, str>,
    pub kind: TokenKind,
    /// Position of the token's first character
    pub position: Position,
}

impl<'a> Token<'a> {
    pub fn new(value: impl Into<Cow<'a, str>>, kind: TokenKind, position: Position) -> Self {
        Self {
            value: value.into(),
            kind,
            position,
        }
    }

    /// Returns true if this is the given delimiter, operator or terminator.
    ///
    /// String literals never match, so `"{"` is not a brace.
    pub fn is_syntax(&self, text: &str) -> bool {
        self.kind.is_syntax() && self.value == text
    }

    /// Returns true if this is the given keyword
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.value == word
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::StringLiteral => f.write_str(&crate::value::escape_string(&self.value)),
            _ => f.write_str(&self.value),
        }
    }
}

/// Returns true if `word` matches the numeric grammar: optional leading `-`,
/// then digits with at most one `.`
pub fn is_number(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    if digits.is_empty() {
        return false;
    }

    let mut has_dot = false;
    for c in digits.chars() {
        if c == '.' {
            if has_dot {
                return false;
            }
            has_dot = true;
        } else if !c.is_ascii_digit() {
            return false;
        }
    }
    true
}

/// Classifies a complete bare word, operator or delimiter
pub fn classify(word: &str) -> TokenKind {
    match word {
        ";" => TokenKind::End,
        "::" => TokenKind::Operator,
        "true" | "false" => TokenKind::BoolLiteral,
        _ if KEYWORDS.contains(&word) => TokenKind::Keyword,
        _ if is_single(word, DELIMITERS) => TokenKind::Delimiter,
        _ if is_single(word, OPERATOR_CHARS) => TokenKind::Operator,
        _ if is_number(word) => TokenKind::NumberLiteral,
        _ => TokenKind::Identifier,
    }
}

fn is_single(word: &str, set: &[char]) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if set.contains(&c))
}

fn ends_bare_word(c: char) -> bool {
    c.is_whitespace() || c == ';' || DELIMITERS.contains(&c) || OPERATOR_CHARS.contains(&c)
}

/// DCL lexer; one instance per input, no shared state between inputs
#[derive(Debug, Clone)]
pub struct DclLexer<'a> {
    /// Input text being lexed
    input: &'a str,
    /// Current position (line, column, byte offset)
    position: Position,
    /// Degradations found while lexing
    diagnostics: Vec<Diagnostic>,
}

impl<'a> DclLexer<'a> {
    /// Creates a new lexer over the input
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: Position::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Returns the diagnostics recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the lexer, returning its diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Lexes the remaining input into a vector
    pub fn tokenize(&mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position.offset..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.position.advance(c);
        Some(c)
    }

    /// Produces the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        loop {
            let c = self.peek_char()?;

            if c.is_whitespace() {
                self.advance();
                continue;
            }

            if c == '/' && self.peek_char_at(1) == Some('/') {
                self.skip_line_comment();
                continue;
            }

            let start = self.position;
            return Some(match c {
                '"' => self.lex_string(),
                ';' => {
                    self.advance();
                    Token::new(";", TokenKind::End, start)
                }
                _ if DELIMITERS.contains(&c) => {
                    let text = &self.input[start.offset..start.offset + c.len_utf8()];
                    self.advance();
                    Token::new(text, TokenKind::Delimiter, start)
                }
                _ if OPERATOR_CHARS.contains(&c) => self.lex_operator(),
                _ => self.lex_bare_word(),
            });
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn lex_operator(&mut self) -> Token<'a> {
        let start = self.position;
        let text = if self.rest().starts_with("::") {
            "::"
        } else {
            let c = self.peek_char().unwrap_or(':');
            &self.input[start.offset..start.offset + c.len_utf8()]
        };
        for _ in 0..text.len() {
            self.advance();
        }
        Token::new(text, TokenKind::Operator, start)
    }

    /// Lexes a bare word.
    ///
    /// A `"` inside a word does not start a string; it becomes part of the
    /// word, as strings only open between tokens.
    fn lex_bare_word(&mut self) -> Token<'a> {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if ends_bare_word(c) {
                break;
            }
            self.advance();
        }
        let word = &self.input[start.offset..self.position.offset];
        Token::new(word, classify(word), start)
    }

    /// Lexes a double-quoted string starting at the opening quote.
    ///
    /// Text without escapes or carriage returns borrows from the input.
    fn lex_string(&mut self) -> Token<'a> {
        let start = self.position;
        self.advance();
        let content_start = self.position.offset;
        let mut owned: Option<String> = None;

        while let Some(c) = self.peek_char() {
            let offset = self.position.offset;
            self.advance();
            match c {
                '"' => {
                    let text = match owned {
                        Some(s) => Cow::Owned(s),
                        None => Cow::Borrowed(&self.input[content_start..offset]),
                    };
                    return Token::new(text, TokenKind::StringLiteral, start);
                }
                '\r' => {
                    owned.get_or_insert_with(|| self.input[content_start..offset].to_string());
                }
                '\\' => {
                    let buffer =
                        owned.get_or_insert_with(|| self.input[content_start..offset].to_string());
                    let Some(escaped) = self.peek_char() else {
                        break;
                    };
                    self.position.advance(escaped);
                    buffer.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                _ => {
                    if let Some(buffer) = owned.as_mut() {
                        buffer.push(c);
                    }
                }
            }
        }

        self.diagnostics
            .push(Diagnostic::new(DiagnosticKind::UnterminatedString, start));
        let text = match owned {
            Some(s) => Cow::Owned(s),
            None => Cow::Borrowed(&self.input[content_start..self.position.offset]),
        };
        Token::new(text, TokenKind::StringLiteral, start)
    }
}

impl<'a> Iterator for DclLexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenizes `input` with a fresh lexer, discarding diagnostics
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    DclLexer::new(input).tokenize()
}
