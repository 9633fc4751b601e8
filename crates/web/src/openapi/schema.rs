//! Shape to OpenAPI schema resolution with a cycle-safe, per-document schema registry.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::shape::{ObjectShape, PrimitiveKind, Shape};

pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// The JSON shape of a type as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Primitive(PrimitiveKind),
    Enum(Vec<String>),
    Array(Box<SchemaNode>),
    /// An object with arbitrary string keys, rendered as `additionalProperties`.
    Map(Box<SchemaNode>),
    Object(Vec<(String, SchemaNode)>),
    Reference(String),
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            SchemaNode::Primitive(kind) => {
                let (ty, format) = kind.openapi_type();
                map.serialize_entry("type", ty)?;
                if let Some(format) = format {
                    map.serialize_entry("format", format)?;
                }
            }
            SchemaNode::Enum(variants) => {
                map.serialize_entry("type", "string")?;
                map.serialize_entry("enum", variants)?;
            }
            SchemaNode::Array(items) => {
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
            }
            SchemaNode::Map(values) => {
                map.serialize_entry("type", "object")?;
                map.serialize_entry("additionalProperties", values)?;
            }
            SchemaNode::Object(properties) => {
                map.serialize_entry("type", "object")?;
                if !properties.is_empty() {
                    map.serialize_entry("properties", &OrderedMap(properties))?;
                }
            }
            SchemaNode::Reference(name) => {
                map.serialize_entry("$ref", &format!("{SCHEMA_REF_PREFIX}{name}"))?;
            }
        }
        map.end()
    }
}

/// Serializes `(key, value)` pairs as a map, keeping their order.
pub(crate) struct OrderedMap<'a, V>(pub &'a [(String, V)]);

impl<V: Serialize> Serialize for OrderedMap<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, value)))
    }
}

pub(crate) fn serialize_ordered<V: Serialize, S: Serializer>(
    pairs: &[(String, V)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    OrderedMap(pairs).serialize(serializer)
}

/// Named object schemas collected while resolving shapes.
///
/// Each object type is registered once, keyed by its [`TypeId`]. The entry is inserted as a
/// bare `object` placeholder before its properties are resolved, so a type reached again while
/// its own properties are being resolved resolves to a reference instead of recursing.
///
/// ```
/// use probe_web::openapi::{SchemaNode, SchemaRegistry};
/// use probe_web::shape::{Describe, Property, Shape};
///
/// struct Tree {
///     children: Vec<Tree>,
/// }
///
/// impl Describe for Tree {
///     fn shape() -> Shape {
///         Shape::object::<Tree>("Tree", || vec![Property::of::<Vec<Tree>>("children")])
///     }
/// }
///
/// let mut registry = SchemaRegistry::new();
/// assert_eq!(registry.resolve(&Tree::shape()), SchemaNode::Reference("Tree".into()));
/// assert_eq!(registry.schemas().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<(String, SchemaNode)>,
    by_type: HashMap<TypeId, usize>,
    names: HashSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, shape: &Shape) -> SchemaNode {
        match shape {
            Shape::Primitive(kind) => SchemaNode::Primitive(*kind),
            Shape::Enum(shape) => SchemaNode::Enum(shape.variants.iter().map(|v| (*v).to_string()).collect()),
            Shape::Array(item) => SchemaNode::Array(Box::new(self.resolve(item))),
            Shape::Map(value) => SchemaNode::Map(Box::new(self.resolve(value))),
            // nullability only shows in `required`
            Shape::Nullable(inner) => self.resolve(inner),
            Shape::Object(object) => self.resolve_object(object),
        }
    }

    fn resolve_object(&mut self, object: &ObjectShape) -> SchemaNode {
        if let Some(&index) = self.by_type.get(&object.type_id) {
            return SchemaNode::Reference(self.schemas[index].0.clone());
        }

        let name = self.unique_name(object.name);
        let index = self.schemas.len();
        self.schemas.push((name.clone(), SchemaNode::Object(Vec::new())));
        self.by_type.insert(object.type_id, index);
        self.names.insert(name.clone());

        let properties = object
            .properties()
            .into_iter()
            .map(|property| (property.name.to_string(), self.resolve(&property.shape)))
            .collect();
        self.schemas[index].1 = SchemaNode::Object(properties);

        SchemaNode::Reference(name)
    }

    /// Distinct types sharing a name get a numeric suffix: `User`, `User2`, `User3`.
    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_string();
        }
        (2..)
            .map(|suffix| format!("{name}{suffix}"))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    /// Registered schemas in registration order.
    pub fn schemas(&self) -> &[(String, SchemaNode)] {
        &self.schemas
    }

    pub fn into_schemas(self) -> Vec<(String, SchemaNode)> {
        self.schemas
    }
}
