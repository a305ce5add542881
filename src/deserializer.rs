//! Serde deserializer implementation for DCL documents
//!
//! This module provides the serde integration, allowing a resolved document
//! to be deserialized directly into Rust types using the standard serde
//! derive macros. Containers are maps from field name to value, arrays are
//! sequences and Void is unit (or `None` for options).

use crate::document::{Container, Document, Field, FieldKind};
use crate::error::{DclError, SerdeError};
use crate::value::{Value, integral};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, Deserialize, DeserializeOwned, DeserializeSeed, Visitor};

static VOID: Value = Value::Void;

/// What a deserializer is positioned on
#[derive(Debug, Clone, Copy)]
enum Node<'de> {
    Value(&'de Value),
    Container(&'de Container),
}

/// Deserializer over a resolved document or one of its nodes
pub struct DocumentDeserializer<'de> {
    document: &'de Document,
    node: Node<'de>,
}

impl<'de> DocumentDeserializer<'de> {
    /// Creates a deserializer positioned on the document's top-level fields
    pub fn new(document: &'de Document) -> Self {
        Self {
            document,
            node: Node::Container(document.root()),
        }
    }

    /// Creates a deserializer positioned on a single container
    pub fn from_container(document: &'de Document, container: &'de Container) -> Self {
        Self {
            document,
            node: Node::Container(container),
        }
    }

    fn field_node(&self, field: &'de Field) -> Node<'de> {
        field_node(self.document, field)
    }

    fn found(&self) -> &'static str {
        match self.node {
            Node::Value(value) => value.kind().as_str(),
            Node::Container(_) => "container",
        }
    }

    fn mismatch(&self, expected: &str) -> DclError {
        DclError::Serde(SerdeError::TypeMismatch {
            expected: expected.to_string(),
            found: self.found().to_string(),
        })
    }
}

fn field_node<'de>(document: &'de Document, field: &'de Field) -> Node<'de> {
    match &field.kind {
        FieldKind::Leaf(value) => Node::Value(value),
        FieldKind::Container(id) => document
            .container(*id)
            .map(Node::Container)
            .unwrap_or(Node::Value(&VOID)),
    }
}

impl<'de> de::Deserializer<'de> for DocumentDeserializer<'de> {
    type Error = DclError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Void) => visitor.visit_unit(),
            Node::Value(Value::Number(n)) => match integral(*n) {
                Some(i) => visitor.visit_i64(i),
                None => visitor.visit_f64(*n),
            },
            Node::Value(Value::String(s)) => visitor.visit_borrowed_str(s),
            Node::Value(Value::Bool(b)) => visitor.visit_bool(*b),
            Node::Value(Value::Array(items)) => {
                visitor.visit_seq(DclSeqAccess::new(self.document, items))
            }
            Node::Container(container) => {
                visitor.visit_map(DclMapAccess::new(self.document, container))
            }
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Bool(b)) => visitor.visit_bool(*b),
            _ => Err(self.mismatch("bool")),
        }
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Number(n)) => visitor.visit_i64(*n as i64),
            _ => Err(self.mismatch("integer")),
        }
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Number(n)) if *n >= 0.0 => visitor.visit_u64(*n as u64),
            _ => Err(self.mismatch("unsigned integer")),
        }
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Number(n)) => visitor.visit_f64(*n),
            _ => Err(self.mismatch("number")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::String(s)) => visitor.visit_borrowed_str(s),
            _ => Err(self.mismatch("string")),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Void) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Void) => visitor.visit_unit(),
            _ => Err(self.mismatch("void")),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Value(Value::Array(items)) => {
                visitor.visit_seq(DclSeqAccess::new(self.document, items))
            }
            _ => Err(self.mismatch("array")),
        }
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            Node::Container(container) => {
                visitor.visit_map(DclMapAccess::new(self.document, container))
            }
            _ => Err(self.mismatch("container")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.node {
            // Unit variant written as a string
            Node::Value(Value::String(s)) => {
                visitor.visit_enum(DclEnumAccess::new(self.document, s, None))
            }
            // Data variant written as a container with a single field
            Node::Container(container) if container.fields().len() == 1 => {
                let field = &container.fields()[0];
                let value = self.field_node(field);
                visitor.visit_enum(DclEnumAccess::new(self.document, &field.name, Some(value)))
            }
            _ => Err(self.mismatch("enum")),
        }
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    serde::forward_to_deserialize_any! {
        i128 u128 char bytes byte_buf
        unit_struct tuple tuple_struct identifier ignored_any
    }
}

/// Sequence access for DCL arrays
struct DclSeqAccess<'de> {
    document: &'de Document,
    items: std::slice::Iter<'de, Value>,
}

impl<'de> DclSeqAccess<'de> {
    fn new(document: &'de Document, items: &'de [Value]) -> Self {
        Self {
            document,
            items: items.iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for DclSeqAccess<'de> {
    type Error = DclError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.items.next() {
            Some(value) => {
                let deserializer = DocumentDeserializer {
                    document: self.document,
                    node: Node::Value(value),
                };
                seed.deserialize(deserializer).map(Some)
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Map access over a container's fields
struct DclMapAccess<'de> {
    document: &'de Document,
    fields: std::slice::Iter<'de, Field>,
    current_value: Option<Node<'de>>,
}

impl<'de> DclMapAccess<'de> {
    fn new(document: &'de Document, container: &'de Container) -> Self {
        Self {
            document,
            fields: container.fields().iter(),
            current_value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for DclMapAccess<'de> {
    type Error = DclError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.fields.next() {
            Some(field) => {
                self.current_value = Some(field_node(self.document, field));
                let key_deserializer = BorrowedStrDeserializer::<DclError>::new(field.name.as_str());
                seed.deserialize(key_deserializer).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        match self.current_value.take() {
            Some(node) => seed.deserialize(DocumentDeserializer {
                document: self.document,
                node,
            }),
            None => Err(DclError::Serde(SerdeError::Custom(
                "No value available for map entry".to_string(),
            ))),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// Enum access for DCL enum deserialization
struct DclEnumAccess<'de> {
    document: &'de Document,
    variant_name: &'de str,
    variant_value: Option<Node<'de>>,
}

impl<'de> DclEnumAccess<'de> {
    fn new(document: &'de Document, variant_name: &'de str, variant_value: Option<Node<'de>>) -> Self {
        Self {
            document,
            variant_name,
            variant_value,
        }
    }
}

impl<'de> de::EnumAccess<'de> for DclEnumAccess<'de> {
    type Error = DclError;
    type Variant = DclVariantAccess<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let variant_name = seed.deserialize(BorrowedStrDeserializer::<DclError>::new(self.variant_name))?;
        let variant_access = DclVariantAccess {
            document: self.document,
            value: self.variant_value,
        };
        Ok((variant_name, variant_access))
    }
}

/// Variant access for DCL enum variants
struct DclVariantAccess<'de> {
    document: &'de Document,
    value: Option<Node<'de>>,
}

impl<'de> DclVariantAccess<'de> {
    fn data(self, kind: &str) -> Result<DocumentDeserializer<'de>, DclError> {
        match self.value {
            Some(node) => Ok(DocumentDeserializer {
                document: self.document,
                node,
            }),
            None => Err(DclError::Serde(SerdeError::Custom(format!(
                "Expected {kind} variant data, found unit"
            )))),
        }
    }
}

impl<'de> de::VariantAccess<'de> for DclVariantAccess<'de> {
    type Error = DclError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            None | Some(Node::Value(Value::Void)) => Ok(()),
            Some(_) => Err(DclError::Serde(SerdeError::Custom(
                "Expected unit variant, found data".to_string(),
            ))),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self.data("newtype")?)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self.data("tuple")?, visitor)
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self.data("struct")?, visitor)
    }
}

/// Deserializes a loaded document into a Rust type, borrowing its strings
pub fn from_document<'d, T>(document: &'d Document) -> Result<T, DclError>
where
    T: Deserialize<'d>,
{
    T::deserialize(DocumentDeserializer::new(document))
}

/// Loads DCL text and deserializes the resolved document into a Rust type
pub fn from_str<T>(s: &str) -> Result<T, DclError>
where
    T: DeserializeOwned,
{
    let document = crate::load_from_str(s);
    from_document(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_from_str;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Transform {
        origin: Vec<f64>,
        #[serde(rename = "ID")]
        id: u32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entity {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Transform")]
        transform: Transform,
        #[serde(rename = "Hidden", default)]
        hidden: Option<bool>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Shape {
        Point,
        Circle(f64),
        Rect { w: u32, h: u32 },
    }

    #[test]
    fn test_struct_from_container() {
        let dcl = r#"
            tag::entity Player
            {
                key Name = "hero";
                Hidden: ;
                tag::component Transform
                {
                    Origin: [10.0, 20.0, 3.04];
                    ID: 7;
                }
            }
        "#;

        let parsed: HashMap<String, Entity> = from_str(dcl).unwrap();
        let player = &parsed["Player"];
        assert_eq!(player.name, "hero");
        assert_eq!(player.hidden, None);
        assert_eq!(player.transform.origin, vec![10.0, 20.0, 3.04]);
        assert_eq!(player.transform.id, 7);
    }

    #[test]
    fn test_borrowed_strings() {
        #[derive(Deserialize)]
        struct Borrowed<'a> {
            #[serde(borrow)]
            label: &'a str,
        }

        let document = load_from_str("label: \"plain\";");
        let parsed: Borrowed<'_> = from_document(&document).unwrap();
        assert_eq!(parsed.label, "plain");
    }

    #[test]
    fn test_integral_numbers_visit_integers() {
        let parsed: HashMap<String, serde_json::Value> = from_str("a: 10; b: 2.5; c: 10.0;").unwrap();
        assert!(parsed["a"].is_i64());
        assert!(parsed["b"].is_f64());
        assert!(parsed["c"].is_i64());
    }

    #[test]
    fn test_type_coercion() {
        #[derive(Debug, Deserialize)]
        struct Coercion {
            as_i32: i32,
            as_f64: f64,
            as_string: String,
            as_bool: bool,
        }

        let parsed: Coercion =
            from_str("as_i32: 42; as_f64: 42; as_string: \"42\"; as_bool: true;").unwrap();
        assert_eq!(parsed.as_i32, 42);
        assert_eq!(parsed.as_f64, 42.0);
        assert_eq!(parsed.as_string, "42");
        assert!(parsed.as_bool);
    }

    #[test]
    fn test_enum_variants() {
        #[derive(Debug, Deserialize)]
        struct Shapes {
            a: Shape,
            b: Shape,
            c: Shape,
        }

        let dcl = r#"
            a: "Point";
            b { Circle: 2.5; }
            c { Rect { w: 3; h: 4; } }
        "#;
        let parsed: Shapes = from_str(dcl).unwrap();
        assert_eq!(parsed.a, Shape::Point);
        assert_eq!(parsed.b, Shape::Circle(2.5));
        assert_eq!(parsed.c, Shape::Rect { w: 3, h: 4 });
    }

    #[test]
    fn test_type_mismatch_names_kinds() {
        #[derive(Debug, Deserialize)]
        struct Wants {
            #[allow(dead_code)]
            count: u32,
        }

        let error = from_str::<Wants>("count: \"many\";").unwrap_err();
        assert!(matches!(
            &error,
            DclError::Serde(SerdeError::TypeMismatch { expected, found })
                if expected == "unsigned integer" && found == "string"
        ));
    }

    #[test]
    fn test_missing_field_is_custom_error() {
        #[derive(Debug, Deserialize)]
        struct Wants {
            #[allow(dead_code)]
            required: String,
        }

        let error = from_str::<Wants>("other: 1;").unwrap_err();
        assert!(error.to_string().contains("required"));
    }

    #[test]
    fn test_void_array_elements_are_none() {
        let parsed: HashMap<String, Vec<Option<i64>>> = from_str("v: [1, Missing, 3];").unwrap();
        assert_eq!(parsed["v"], vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn test_from_container() {
        let document = load_from_str("tag::t Inner { x: 1; y: 2; }");
        let container = document.get_by_tag("t", None, false)[0];
        let parsed: HashMap<String, i32> =
            Deserialize::deserialize(DocumentDeserializer::from_container(&document, container))
                .unwrap();
        assert_eq!(parsed["x"], 1);
        assert_eq!(parsed["y"], 2);
    }
}
