//! Block structuring: groups the flat token stream into (header, body) blocks
//!
//! A `{ ... }` span becomes a child block whose header is the tokens written
//! before the brace; a `;` closes a leaf statement.

use crate::lexer::Token;
use smallvec::SmallVec;

/// Tokens of one header or statement; most statements are short
pub type TokenSpan<'a> = SmallVec<[Token<'a>; 4]>;

/// A header with an ordered body of child blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokensBlock<'a> {
    pub header: TokenSpan<'a>,
    pub body: Vec<TokensBlock<'a>>,
}

impl<'a> TokensBlock<'a> {
    /// Creates a leaf block from a statement
    pub fn statement(header: TokenSpan<'a>) -> Self {
        Self {
            header,
            body: Vec::new(),
        }
    }

    /// Returns true if the block declares a container: it has children, or
    /// its header contains `tag ::`
    pub fn is_container(&self) -> bool {
        !self.body.is_empty()
            || self
                .header
                .windows(2)
                .any(|pair| pair[0].is_keyword("tag") && pair[1].is_syntax("::"))
    }
}

/// Structures a token sequence into a root block whose body holds the
/// top-level statements and containers
pub fn structure<'a>(tokens: &[Token<'a>]) -> TokensBlock<'a> {
    let mut current = TokensBlock::default();
    let mut line = TokenSpan::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        if token.is_syntax("{") {
            let body_start = i + 1;
            let mut depth = 1usize;
            let mut j = body_start;
            while j < tokens.len() {
                if tokens[j].is_syntax("{") {
                    depth += 1;
                } else if tokens[j].is_syntax("}") {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                j += 1;
            }

            // j is the matching close, or the end of input for an unclosed brace
            let mut child = structure(&tokens[body_start..j]);
            child.header = std::mem::take(&mut line);
            current.body.push(child);
            i = j + 1;
            continue;
        }

        if token.is_syntax(";") {
            if !line.is_empty() {
                current
                    .body
                    .push(TokensBlock::statement(std::mem::take(&mut line)));
            }
            i += 1;
            continue;
        }

        line.push(token.clone());
        i += 1;
    }

    if !line.is_empty() {
        current.body.push(TokensBlock::statement(line));
    }

    current
}
