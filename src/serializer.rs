//! Renders a resolved document back to DCL source text
//!
//! The output holds literals only: references and copies have already been
//! replaced by their resolved values, so loading it again yields the same
//! value set.

use crate::document::{Container, Document, FieldKind};
use crate::lexer::{TokenKind, tokenize};
use crate::value::escape_string;
use std::fmt::{self, Write};

/// Spaces per nesting level
const INDENT_WIDTH: usize = 4;

/// Serializes a document's top-level fields
pub fn serialize(document: &Document) -> String {
    document.to_string()
}

/// Writes every container reachable from the root to `out`
pub(crate) fn write_document<W: Write>(document: &Document, out: &mut W) -> fmt::Result {
    write_container(document, document.root(), 0, out)
}

/// Writes the fields of `container` at the given nesting level
fn write_container<W: Write>(
    document: &Document,
    container: &Container,
    level: usize,
    out: &mut W,
) -> fmt::Result {
    let indent = " ".repeat(level * INDENT_WIDTH);

    for field in container.fields() {
        match &field.kind {
            FieldKind::Leaf(value) if field.is_key => {
                writeln!(out, "{indent}key {} = {value};", field.name)?;
            }
            FieldKind::Leaf(value) => {
                writeln!(out, "{indent}{}: {value};", field.name)?;
            }
            FieldKind::Container(id) => {
                let Some(child) = document.container(*id) else {
                    continue;
                };
                writeln!(out, "{indent}tag::{} {}", tag_literal(child.tag()), child.name())?;
                writeln!(out, "{indent}{{")?;
                write_container(document, child, level + 1, out)?;
                writeln!(out, "{indent}}}")?;
                out.write_char('\n')?;
            }
        }
    }

    Ok(())
}

/// Bare when the tag lexes back as a single identifier, quoted otherwise
fn tag_literal(tag: &str) -> String {
    match tokenize(tag).as_slice() {
        [token] if token.kind == TokenKind::Identifier && token.value == tag => tag.to_string(),
        _ => escape_string(tag),
    }
}
