//! Tree building and reference resolution
//!
//! A [`Decoder`] turns a structured [`TokensBlock`] into a [`Document`] in two
//! passes. [`Decoder::build`] creates the container arena, leaving value
//! token spans and `copy` directives pending in side tables. [`Decoder::resolve`]
//! then walks the tree parent-before-children, turning spans into values,
//! registering keys and applying copies.
//!
//! Nothing here fails: every construct that cannot be decoded degrades to
//! `Void` (or to no field at all) and is recorded as a [`Diagnostic`].

use crate::blocks::{TokenSpan, TokensBlock};
use crate::document::{Container, ContainerId, Document, Field, FieldKind, ROOT_NAME};
use crate::error::{Diagnostic, DiagnosticKind, Position};
use crate::lexer::{Token, TokenKind};
use crate::value::Value;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Address of a field inside the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FieldSlot {
    container: ContainerId,
    index: usize,
}

/// A `copy` directive waiting for the resolver
#[derive(Debug, Clone)]
struct PendingCopy {
    source: String,
    position: Position,
}

/// Per-load decoding state
#[derive(Debug, Default)]
pub struct Decoder<'a> {
    containers: Vec<Container>,
    key_index: IndexMap<String, ContainerId>,
    /// Value spans of leaf fields not yet resolved
    pending_values: HashMap<FieldSlot, TokenSpan<'a>>,
    /// Copy directives, indexed by container id
    pending_copies: Vec<Vec<PendingCopy>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Decoder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder that carries diagnostics from an earlier stage
    pub fn with_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut decoder = Self::new();
        for diagnostic in diagnostics {
            decoder.record(diagnostic);
        }
        decoder
    }

    /// Builds and resolves a structured block into a document
    pub fn decode(mut self, block: TokensBlock<'a>) -> Document {
        let root = self.build(block);
        self.resolve(root);
        self.finish(root)
    }

    /// Creates the synthetic root and the containers and fields below it.
    ///
    /// Values are left pending; call [`Decoder::resolve`] next.
    pub fn build(&mut self, block: TokensBlock<'a>) -> ContainerId {
        let root = self.new_container(None);
        self.containers[root.0].name = ROOT_NAME.to_string();
        self.build_body(root, block.body);
        root
    }

    /// Resolves `id` and everything below it, parent before children
    pub fn resolve(&mut self, id: ContainerId) {
        let field_count = self.containers[id.0].fields.len();
        for index in 0..field_count {
            self.resolve_slot(FieldSlot {
                container: id,
                index,
            });
        }

        self.register_key(id);
        self.apply_copies(id);

        let children: SmallVec<[ContainerId; 8]> = self.containers[id.0]
            .fields
            .iter()
            .filter_map(Field::container_id)
            .collect();
        for child in children {
            self.resolve(child);
        }
    }

    /// Hands the arena, key index and diagnostics over to a [`Document`]
    pub fn finish(self, root: ContainerId) -> Document {
        tracing::debug!(
            containers = self.containers.len(),
            keys = self.key_index.len(),
            diagnostics = self.diagnostics.len(),
            "decoded document"
        );
        Document::new(self.containers, root, self.key_index, self.diagnostics)
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(position = %diagnostic.position, "{}", diagnostic.kind);
        self.diagnostics.push(diagnostic);
    }

    fn new_container(&mut self, parent: Option<ContainerId>) -> ContainerId {
        let id = ContainerId(self.containers.len());
        self.containers.push(Container::new(id, parent));
        self.pending_copies.push(Vec::new());
        id
    }

    fn build_body(&mut self, current: ContainerId, body: Vec<TokensBlock<'a>>) {
        for block in body {
            if block.is_container() {
                self.build_container(current, block);
            } else {
                self.build_statement(current, block.header);
            }
        }
    }

    fn build_container(&mut self, parent: ContainerId, block: TokensBlock<'a>) {
        let id = self.new_container(Some(parent));
        let (tag, name) = parse_header(&block.header);

        let container = &mut self.containers[id.0];
        if let Some(tag) = tag {
            container.tag = tag.to_string();
        }
        if let Some(name) = name {
            container.name = name.to_string();
        }
        let field = Field::container(container.name.clone(), id);
        self.containers[parent.0].fields.push(field);

        self.build_body(id, block.body);
    }

    fn build_statement(&mut self, current: ContainerId, header: TokenSpan<'a>) {
        let Some(first) = header.first() else {
            return;
        };

        if first.is_keyword("copy") {
            match header.get(1) {
                Some(source) if source.kind == TokenKind::Identifier => {
                    self.pending_copies[current.0].push(PendingCopy {
                        source: source.value.to_string(),
                        position: source.position,
                    });
                }
                _ => self.drop_statement(&header),
            }
            return;
        }

        if first.is_keyword("key") {
            match header.get(1) {
                Some(name) if name.kind == TokenKind::Identifier && header.len() >= 3 => {
                    let field = Field::key(name.value.as_ref(), Value::Void);
                    let span = value_span(&header[3..]);
                    self.push_field(current, field, span);
                }
                _ => self.drop_statement(&header),
            }
            return;
        }

        let colon = header
            .iter()
            .position(|token| token.is_syntax(":"))
            .filter(|&i| i > 0 && header[i - 1].kind == TokenKind::Identifier);
        match colon {
            Some(i) => {
                let field = Field::leaf(header[i - 1].value.as_ref(), Value::Void);
                let span = value_span(&header[i + 1..]);
                self.push_field(current, field, span);
            }
            None => self.drop_statement(&header),
        }
    }

    fn push_field(&mut self, container: ContainerId, field: Field, span: TokenSpan<'a>) {
        let fields = &mut self.containers[container.0].fields;
        let slot = FieldSlot {
            container,
            index: fields.len(),
        };
        fields.push(field);
        if !span.is_empty() {
            self.pending_values.insert(slot, span);
        }
    }

    fn drop_statement(&mut self, header: &[Token<'a>]) {
        let position = header.first().map(|t| t.position).unwrap_or_default();
        self.record(Diagnostic::new(
            DiagnosticKind::DroppedStatement {
                text: join_tokens(header),
            },
            position,
        ));
    }

    /// Parses the pending span of a field in its own container's scope
    fn resolve_slot(&mut self, slot: FieldSlot) {
        let Some(span) = self.pending_values.get(&slot) else {
            return;
        };

        let mut diagnostics = Vec::new();
        let value = self.parse_value(span, slot.container, &mut diagnostics);
        self.pending_values.remove(&slot);

        if let Some(field) = self.containers[slot.container.0].fields.get_mut(slot.index) {
            field.kind = FieldKind::Leaf(value);
        }
        for diagnostic in diagnostics {
            self.record(diagnostic);
        }
    }

    fn register_key(&mut self, id: ContainerId) {
        let container = &self.containers[id.0];
        let designated = container.fields.iter().enumerate().find_map(|(index, field)| {
            field
                .value()
                .filter(|value| field.is_key && value.is_scalar_key())
                .map(|value| (index, value.to_canonical_string()))
        });
        let Some((index, key)) = designated else {
            return;
        };

        if let Some(previous) = self.key_index.insert(key.clone(), id) {
            tracing::debug!(
                key = %key,
                previous = %self.containers[previous.0].name,
                container = %container.name,
                "key re-registered"
            );
        }
        self.containers[id.0].key = Some(index);
    }

    fn apply_copies(&mut self, target: ContainerId) {
        let copies = std::mem::take(&mut self.pending_copies[target.0]);

        for copy in copies {
            let Some(source) = self.find_container(&copy.source, target) else {
                self.record(Diagnostic::new(
                    DiagnosticKind::MissingCopySource { name: copy.source },
                    copy.position,
                ));
                continue;
            };

            // only fields present before the copy starts are candidates
            let field_count = self.containers[source.0].fields.len();
            for index in 0..field_count {
                let candidate = &self.containers[source.0].fields[index];
                if candidate.is_container()
                    || self.containers[target.0].find_field(&candidate.name).is_some()
                {
                    continue;
                }

                self.resolve_slot(FieldSlot {
                    container: source,
                    index,
                });
                let inherited = self.containers[source.0].fields[index].clone();
                self.containers[target.0].fields.push(inherited);
            }
        }
    }

    /// Walks from `start` up to the root
    fn scope_chain(&self, start: ContainerId) -> impl Iterator<Item = &Container> + '_ {
        std::iter::successors(self.containers.get(start.0), move |container| {
            container.parent.and_then(|parent| self.containers.get(parent.0))
        })
    }

    /// Finds the nearest container field with the given name
    fn find_container(&self, name: &str, scope: ContainerId) -> Option<ContainerId> {
        self.scope_chain(scope).find_map(|container| {
            container
                .fields
                .iter()
                .find(|field| field.is_container() && field.name == name)
                .and_then(Field::container_id)
        })
    }

    fn parse_value(
        &self,
        tokens: &[Token<'a>],
        scope: ContainerId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Value {
        let Some(first) = tokens.first() else {
            return Value::Void;
        };

        if first.is_syntax("[") {
            return self.parse_array(tokens, scope, diagnostics);
        }

        if tokens.len() >= 3 && tokens[1].is_syntax("::") {
            return self.lookup_scoped(&tokens[0], &tokens[2], scope, diagnostics);
        }

        if tokens.len() == 1 {
            match first.kind {
                TokenKind::NumberLiteral => {
                    return match first.value.parse::<f64>() {
                        Ok(n) => Value::Number(n),
                        Err(_) => {
                            diagnostics.push(Diagnostic::new(
                                DiagnosticKind::MalformedNumber {
                                    literal: first.value.to_string(),
                                },
                                first.position,
                            ));
                            Value::Void
                        }
                    };
                }
                TokenKind::StringLiteral => return Value::String(first.value.to_string()),
                TokenKind::BoolLiteral => return Value::Bool(first.value == "true"),
                TokenKind::Identifier => return self.lookup_identifier(first, scope, diagnostics),
                _ => {}
            }
        }

        diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnsupportedValue {
                text: join_tokens(tokens),
            },
            first.position,
        ));
        Value::Void
    }

    /// Parses `[a, b, ...]` starting at the opening bracket.
    ///
    /// Elements are the comma-separated groups at bracket depth zero; an
    /// unclosed array takes everything up to the end of the span.
    fn parse_array(
        &self,
        tokens: &[Token<'a>],
        scope: ContainerId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Value {
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut group_start = 1;

        for (i, token) in tokens.iter().enumerate().skip(1) {
            if token.is_syntax("[") {
                depth += 1;
            } else if token.is_syntax("]") {
                if depth == 0 {
                    self.push_element(&mut items, &tokens[group_start..i], scope, diagnostics);
                    return Value::Array(items);
                }
                depth -= 1;
            } else if token.is_syntax(",") && depth == 0 {
                self.push_element(&mut items, &tokens[group_start..i], scope, diagnostics);
                group_start = i + 1;
            }
        }

        self.push_element(&mut items, &tokens[group_start..], scope, diagnostics);
        Value::Array(items)
    }

    fn push_element(
        &self,
        items: &mut Vec<Value>,
        group: &[Token<'a>],
        scope: ContainerId,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if !group.is_empty() {
            items.push(self.parse_value(group, scope, diagnostics));
        }
    }

    fn lookup_identifier(
        &self,
        token: &Token<'a>,
        scope: ContainerId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Value {
        let name = token.value.as_ref();

        for container in self.scope_chain(scope) {
            let Some(index) = container.fields.iter().position(|field| field.name == name) else {
                continue;
            };

            return match &container.fields[index].kind {
                FieldKind::Leaf(value) => {
                    self.check_pending(container.id, index, token, diagnostics);
                    value.clone()
                }
                FieldKind::Container(_) => {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::ContainerAsValue {
                            name: name.to_string(),
                        },
                        token.position,
                    ));
                    Value::Void
                }
            };
        }

        diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnresolvedIdentifier {
                name: name.to_string(),
            },
            token.position,
        ));
        Value::Void
    }

    fn lookup_scoped(
        &self,
        container_token: &Token<'a>,
        field_token: &Token<'a>,
        scope: ContainerId,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Value {
        let container_name = container_token.value.as_ref();
        let field_name = field_token.value.as_ref();

        let Some(id) = self.find_container(container_name, scope) else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnresolvedContainer {
                    name: container_name.to_string(),
                },
                container_token.position,
            ));
            return Value::Void;
        };

        let container = &self.containers[id.0];
        let leaf = container
            .fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == field_name && !field.is_container());

        match leaf {
            Some((index, field)) => {
                self.check_pending(id, index, field_token, diagnostics);
                field.value().cloned().unwrap_or_default()
            }
            None => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnresolvedField {
                        container: container_name.to_string(),
                        field: field_name.to_string(),
                    },
                    field_token.position,
                ));
                Value::Void
            }
        }
    }

    fn check_pending(
        &self,
        container: ContainerId,
        index: usize,
        token: &Token<'a>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if self
            .pending_values
            .contains_key(&FieldSlot { container, index })
        {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::PendingTarget {
                    name: token.value.to_string(),
                },
                token.position,
            ));
        }
    }
}

/// Reads the tag and name from a container header.
///
/// `tag :: X` sets the tag; the first other identifier is the name.
fn parse_header<'h>(header: &'h [Token<'_>]) -> (Option<&'h str>, Option<&'h str>) {
    let mut tag = None;
    let mut name = None;
    let mut i = 0;

    while i < header.len() {
        let token = &header[i];
        if token.is_keyword("tag") && header.get(i + 1).is_some_and(|t| t.is_syntax("::")) {
            if let Some(value) = header.get(i + 2) {
                tag = Some(value.value.as_ref());
                i += 3;
                continue;
            }
        }
        if name.is_none() && token.kind == TokenKind::Identifier {
            name = Some(token.value.as_ref());
        }
        i += 1;
    }

    (tag, name)
}

fn value_span<'a>(tokens: &[Token<'a>]) -> TokenSpan<'a> {
    tokens
        .iter()
        .filter(|token| token.kind != TokenKind::End)
        .cloned()
        .collect()
}

fn join_tokens(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::structure;
    use crate::lexer::tokenize;

    fn decode(input: &str) -> Document {
        let tokens = tokenize(input);
        Decoder::new().decode(structure(&tokens))
    }

    fn kinds(doc: &Document) -> Vec<DiagnosticKind> {
        doc.diagnostics().iter().map(|d| d.kind.clone()).collect()
    }

    #[test]
    fn test_leaf_literals() {
        let doc = decode("tag::t C { N: 1.5; S: \"x\"; B: true; F: false; }");
        assert_eq!(doc.get_field("C::N"), &Value::from(1.5));
        assert_eq!(doc.get_field("C::S"), &Value::from("x"));
        assert_eq!(doc.get_field("C::B"), &Value::from(true));
        assert_eq!(doc.get_field("C::F"), &Value::from(false));
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_header_defaults() {
        let doc = decode("tag::thing { A: 1; } Named { B: 2; }");
        let first = doc.container(doc.fields()[0].container_id().unwrap()).unwrap();
        assert_eq!(first.tag(), "thing");
        assert_eq!(first.name(), "container0");

        let second = doc.container(doc.fields()[1].container_id().unwrap()).unwrap();
        assert_eq!(second.tag(), "container");
        assert_eq!(second.name(), "Named");
        assert_eq!(doc.fields()[1].name, "Named");
    }

    #[test]
    fn test_empty_value_is_void_without_diagnostic() {
        let doc = decode("tag::t C { Empty: ; }");
        assert!(doc.get_field("C::Empty").is_void());
        assert_eq!(doc.root().fields().len(), 1);
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_dropped_statements() {
        let doc = decode("just words; copy; : 1; Plain {}");
        assert!(doc.fields().is_empty());
        assert_eq!(doc.diagnostics().len(), 4);
        assert!(kinds(&doc)
            .iter()
            .all(|k| matches!(k, DiagnosticKind::DroppedStatement { .. })));
        assert_eq!(
            kinds(&doc)[0],
            DiagnosticKind::DroppedStatement {
                text: "just words".to_string()
            }
        );
    }

    #[test]
    fn test_identifier_reference_walks_scope_chain() {
        let doc = decode(
            "Speed: 1;
             tag::t Outer {
                 Speed: 2;
                 tag::t Inner { Here: Speed; }
                 tag::t Other { Near: Top; }
             }
             Top: 3;",
        );
        assert_eq!(doc.get_field("Outer::Inner::Here"), &Value::from(2));
        // root fields resolve before any child container
        assert_eq!(doc.get_field("Outer::Other::Near"), &Value::from(3));
    }

    #[test]
    fn test_identifier_failures() {
        let doc = decode("tag::t C { A: Missing; tag::t Box {} B: Box; }");
        assert!(doc.get_field("C::A").is_void());
        assert!(doc.get_field("C::B").is_void());
        assert_eq!(
            kinds(&doc),
            [
                DiagnosticKind::UnresolvedIdentifier {
                    name: "Missing".to_string()
                },
                DiagnosticKind::ContainerAsValue {
                    name: "Box".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_forward_reference_is_pending() {
        let doc = decode("tag::t C { A: B; B: 5; }");
        assert!(doc.get_field("C::A").is_void());
        assert_eq!(doc.get_field("C::B"), &Value::from(5));
        assert_eq!(
            kinds(&doc),
            [DiagnosticKind::PendingTarget {
                name: "B".to_string()
            }]
        );
    }

    #[test]
    fn test_self_reference_is_pending() {
        let doc = decode("tag::t C { A: A; }");
        assert!(doc.get_field("C::A").is_void());
        assert_eq!(
            kinds(&doc),
            [DiagnosticKind::PendingTarget {
                name: "A".to_string()
            }]
        );
    }

    #[test]
    fn test_scoped_reference() {
        let doc = decode(
            "tag::t Source { V: 7; tag::t V {} }
             tag::t User {
                 Good: Source::V;
                 NoField: Source::W;
                 NoContainer: Nowhere::V;
             }",
        );
        assert_eq!(doc.get_field("User::Good"), &Value::from(7));
        assert!(doc.get_field("User::NoField").is_void());
        assert!(doc.get_field("User::NoContainer").is_void());
        assert_eq!(
            kinds(&doc),
            [
                DiagnosticKind::UnresolvedField {
                    container: "Source".to_string(),
                    field: "W".to_string()
                },
                DiagnosticKind::UnresolvedContainer {
                    name: "Nowhere".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_scoped_reference_to_unresolved_sibling() {
        let doc = decode("tag::t A { X: B::Y; } tag::t B { Y: 1; }");
        assert!(doc.get_field("A::X").is_void());
        assert_eq!(
            kinds(&doc),
            [DiagnosticKind::PendingTarget {
                name: "Y".to_string()
            }]
        );
    }

    #[test]
    fn test_arrays() {
        let doc = decode(
            "Base: 4;
             tag::t C {
                 Flat: [1, \"two\", true];
                 Nested: [[1, 2], [], 3];
                 Sparse: [, 1,, 2,];
                 Refs: [Base, C::Flat];
                 Empty: [];
                 Trailing: [1] junk;
             }",
        );
        assert_eq!(
            doc.get_field("C::Flat"),
            &Value::Array(vec![Value::from(1), Value::from("two"), Value::from(true)])
        );
        assert_eq!(
            doc.get_field("C::Nested"),
            &Value::Array(vec![
                Value::Array(vec![Value::from(1), Value::from(2)]),
                Value::Array(vec![]),
                Value::from(3),
            ])
        );
        assert_eq!(
            doc.get_field("C::Sparse"),
            &Value::Array(vec![Value::from(1), Value::from(2)])
        );
        assert_eq!(
            doc.get_field("C::Refs"),
            &Value::Array(vec![
                Value::from(4),
                Value::Array(vec![Value::from(1), Value::from("two"), Value::from(true)]),
            ])
        );
        assert_eq!(doc.get_field("C::Empty"), &Value::Array(vec![]));
        assert_eq!(doc.get_field("C::Trailing"), &Value::Array(vec![Value::from(1)]));
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_unsupported_and_malformed_values() {
        let doc = decode("tag::t C { Neg: -1; Dot: .; Sum: 1 + 2; }");
        assert!(doc.get_field("C::Neg").is_void());
        assert!(doc.get_field("C::Dot").is_void());
        assert!(doc.get_field("C::Sum").is_void());
        assert_eq!(
            kinds(&doc),
            [
                DiagnosticKind::UnsupportedValue {
                    text: "- 1".to_string()
                },
                DiagnosticKind::MalformedNumber {
                    literal: ".".to_string()
                },
                DiagnosticKind::UnsupportedValue {
                    text: "1 + 2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_key_registration() {
        let doc = decode(
            "tag::e A { key Name = \"alpha\"; key Other = 2; }
             tag::e B { key Flag = true; key Id = 7; }
             tag::e C { key Missing = Nope; }",
        );
        let a = doc.find_by_key("alpha").unwrap();
        assert_eq!(a.name(), "A");
        assert_eq!(a.key_field().unwrap().name, "Name");
        assert!(doc.find_by_key("2").is_none());

        // bools cannot designate a key, the next key field can
        assert_eq!(doc.find_by_key("7").map(Container::name), Some("B"));

        let c = doc.get_by_tag("e", None, false)[2];
        assert!(c.key_field().is_none());
        assert_eq!(doc.keys().count(), 2);
    }

    #[test]
    fn test_later_key_overwrites() {
        let doc = decode("tag::e A { key Id = 1; } tag::e B { key Id = \"1\"; }");
        assert_eq!(doc.find_by_key("1").map(Container::name), Some("B"));
        assert_eq!(doc.keys().count(), 1);
    }

    #[test]
    fn test_copy_does_not_override_and_first_source_wins() {
        let doc = decode(
            "tag::t A { X: 1; Y: 1; }
             tag::t B { Y: 2; Z: 2; }
             tag::t Target { copy A; copy B; X: 0; }",
        );
        let target = doc.get_by_tag("t", None, false)[2];
        let names: Vec<&str> = target.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["X", "Y", "Z"]);
        assert_eq!(doc.get_field("Target::X"), &Value::from(0));
        assert_eq!(doc.get_field("Target::Y"), &Value::from(1));
        assert_eq!(doc.get_field("Target::Z"), &Value::from(2));
    }

    #[test]
    fn test_copy_resolves_source_in_its_own_scope() {
        let doc = decode(
            "tag::t Owner {
                 V: \"owner\";
                 tag::t Target { V: \"target\"; copy Src; }
                 tag::t Src { Ref: V; }
             }",
        );
        // Target resolves before Src, so Src's field is resolved on demand
        assert_eq!(doc.get_field("Owner::Target::Ref"), &Value::from("owner"));
        assert_eq!(doc.get_field("Owner::Src::Ref"), &Value::from("owner"));
    }

    #[test]
    fn test_copy_skips_container_fields() {
        let doc = decode("tag::t Src { A: 1; tag::t Inner { B: 2; } } tag::t Dst { copy Src; }");
        let dst = doc.get_by_tag("t", None, false)[1];
        assert_eq!(dst.fields().len(), 1);
        assert_eq!(dst.fields()[0].name, "A");
    }

    #[test]
    fn test_missing_copy_source() {
        let doc = decode("tag::t C { copy Ghost; A: 1; }");
        assert_eq!(
            kinds(&doc),
            [DiagnosticKind::MissingCopySource {
                name: "Ghost".to_string()
            }]
        );
        assert_eq!(doc.diagnostics()[0].position.column, 17);
    }

    #[test]
    fn test_carried_diagnostics_come_first() {
        let carried = vec![Diagnostic::new(DiagnosticKind::UnterminatedString, Position::new())];
        let tokens = tokenize("A: Missing;");
        let doc = Decoder::with_diagnostics(carried).decode(structure(&tokens));
        assert_eq!(doc.diagnostics().len(), 2);
        assert_eq!(doc.diagnostics()[0].kind, DiagnosticKind::UnterminatedString);
    }
}
