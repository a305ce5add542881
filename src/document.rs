//! The resolved, queryable container tree
//!
//! Containers live in an arena owned by the [`Document`]; container fields
//! and parent links are [`ContainerId`] handles into it. Ownership runs
//! strictly top-down, the parent handle is only used for scope walks.

use crate::error::Diagnostic;
use crate::value::Value;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Tag given to containers whose header names none
pub const DEFAULT_TAG: &str = "container";

/// Name given to containers whose header names none
pub const DEFAULT_CONTAINER_NAME: &str = "container0";

/// Name of the synthetic root container
pub const ROOT_NAME: &str = "root";

static VOID: Value = Value::Void;

/// Handle of a container inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) usize);

impl ContainerId {
    /// Returns the arena index of the container
    pub fn index(self) -> usize {
        self.0
    }
}

/// The two shapes a field can take
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Leaf(Value),
    Container(ContainerId),
}

/// A named slot of a container
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Declared with the `key` keyword
    pub is_key: bool,
    pub kind: FieldKind,
}

impl Field {
    /// Creates a leaf field
    pub fn leaf(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            is_key: false,
            kind: FieldKind::Leaf(value),
        }
    }

    /// Creates a leaf field declared with `key`
    pub fn key(name: impl Into<String>, value: Value) -> Self {
        Self {
            is_key: true,
            ..Self::leaf(name, value)
        }
    }

    /// Creates a field owning a child container
    pub fn container(name: impl Into<String>, id: ContainerId) -> Self {
        Self {
            name: name.into(),
            is_key: false,
            kind: FieldKind::Container(id),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, FieldKind::Container(_))
    }

    /// Returns the value of a leaf field
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            FieldKind::Leaf(value) => Some(value),
            FieldKind::Container(_) => None,
        }
    }

    /// Returns the child container of a container field
    pub fn container_id(&self) -> Option<ContainerId> {
        match self.kind {
            FieldKind::Container(id) => Some(id),
            FieldKind::Leaf(_) => None,
        }
    }
}

/// A named, tagged node owning an ordered list of fields
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub(crate) id: ContainerId,
    pub(crate) tag: String,
    pub(crate) name: String,
    pub(crate) fields: Vec<Field>,
    pub(crate) parent: Option<ContainerId>,
    /// Index of the designated key field
    pub(crate) key: Option<usize>,
}

impl Container {
    pub(crate) fn new(id: ContainerId, parent: Option<ContainerId>) -> Self {
        Self {
            id,
            tag: DEFAULT_TAG.to_string(),
            name: DEFAULT_CONTAINER_NAME.to_string(),
            fields: Vec::new(),
            parent,
            key: None,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in source order, inherited fields after explicit ones
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Enclosing container; `None` for the synthetic root
    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    /// The first `key` field that resolved to a number or string
    pub fn key_field(&self) -> Option<&Field> {
        self.key.and_then(|index| self.fields.get(index))
    }

    /// Returns the first field with the given name, leaf or container
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Looks up several names at once; names without a field are left out
    pub fn find_fields<'c>(&'c self, names: &[&str]) -> HashMap<String, &'c Field> {
        names
            .iter()
            .filter_map(|name| self.find_field(name).map(|f| (name.to_string(), f)))
            .collect()
    }

    /// Returns the first leaf field with the given name
    pub fn find_leaf(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.name == name && !field.is_container())
    }

    fn child_ids(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.fields.iter().filter_map(Field::container_id)
    }
}

/// A fully resolved document: the container arena, its key index and the
/// diagnostics recorded while loading. Read-only once built.
#[derive(Debug, Clone)]
pub struct Document {
    containers: Vec<Container>,
    root: ContainerId,
    key_index: IndexMap<String, ContainerId>,
    diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub(crate) fn new(
        containers: Vec<Container>,
        root: ContainerId,
        key_index: IndexMap<String, ContainerId>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            containers,
            root,
            key_index,
            diagnostics,
        }
    }

    /// The synthetic root holding the top-level fields
    pub fn root(&self) -> &Container {
        &self.containers[self.root.0]
    }

    /// Top-level fields in source order
    pub fn fields(&self) -> &[Field] {
        self.root().fields()
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    /// Iterates over the containers owned by container fields of `container`
    pub fn children<'d>(&'d self, container: &'d Container) -> impl Iterator<Item = &'d Container> {
        container.child_ids().map(|id| &self.containers[id.0])
    }

    /// Everything that degraded to Void or was dropped during the load
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Looks up a leaf value by `Container::...::Field` path.
    ///
    /// The first segment must name a top-level container and the last one a
    /// leaf field; anything else yields Void.
    pub fn get_field(&self, path: &str) -> &Value {
        let segments: Vec<&str> = path.split("::").collect();
        let Some((last, containers)) = segments.split_last() else {
            return &VOID;
        };
        if containers.is_empty() {
            return &VOID;
        }

        let mut current = self.root();
        for segment in containers {
            let next = current
                .fields
                .iter()
                .find(|field| field.name == *segment && field.is_container())
                .and_then(Field::container_id);
            match next {
                Some(id) => current = &self.containers[id.0],
                None => return &VOID,
            }
        }

        current
            .find_leaf(last)
            .and_then(Field::value)
            .unwrap_or(&VOID)
    }

    /// Collects containers with the given tag, breadth first.
    ///
    /// Starts from `scope`'s fields, or the top-level fields when `scope` is
    /// `None`. With `deep`, the container fields of each match are searched
    /// too; non-matching containers are never descended into.
    pub fn get_by_tag(&self, tag: &str, scope: Option<&Container>, deep: bool) -> Vec<&Container> {
        let start = scope
            .and_then(|container| self.container(container.id))
            .unwrap_or_else(|| self.root());
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut found = Vec::new();

        for child in self.children(start) {
            if child.tag == tag && visited.insert(child.id) {
                queue.push_back(child);
            }
        }

        while let Some(container) = queue.pop_front() {
            found.push(container);

            if deep {
                for child in self.children(container) {
                    if child.tag == tag && visited.insert(child.id) {
                        queue.push_back(child);
                    }
                }
            }
        }

        found
    }

    /// Returns the container registered under a key value
    pub fn find_by_key(&self, key: &str) -> Option<&Container> {
        self.key_index
            .get(key)
            .and_then(|id| self.containers.get(id.0))
    }

    /// Key-index entries in registration order
    pub fn keys(&self) -> impl Iterator<Item = (&str, &Container)> {
        self.key_index
            .iter()
            .map(|(key, id)| (key.as_str(), &self.containers[id.0]))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::serializer::write_document(self, f)
    }
}

/// Serializes a container as a map of field names to values or nested maps
pub(crate) struct ContainerMap<'d> {
    pub(crate) document: &'d Document,
    pub(crate) container: &'d Container,
}

impl Serialize for ContainerMap<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.container.fields.len()))?;
        for field in &self.container.fields {
            match &field.kind {
                FieldKind::Leaf(value) => map.serialize_entry(&field.name, value)?,
                FieldKind::Container(id) => map.serialize_entry(
                    &field.name,
                    &ContainerMap {
                        document: self.document,
                        container: &self.document.containers[id.0],
                    },
                )?,
            }
        }
        map.end()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ContainerMap {
            document: self,
            container: self.root(),
        }
        .serialize(serializer)
    }
}
