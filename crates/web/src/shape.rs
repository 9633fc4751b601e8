//! Declared type descriptors for handler parameters and return values.
//!
//! Handlers are registered without reflection, so every type that crosses the wire
//! describes its JSON shape through [`Describe`]. The binder uses a [`Shape`] to convert raw
//! path and query text, the OpenAPI generator uses it to build schemas.
//!
//! Object properties are produced lazily by a function pointer, which lets a type describe
//! itself recursively:
//!
//! ```
//! use probe_web::shape::{Describe, Property, Shape};
//!
//! struct Node {
//!     value: i32,
//!     children: Vec<Node>,
//! }
//!
//! impl Describe for Node {
//!     fn shape() -> Shape {
//!         Shape::object::<Node>("Node", || {
//!             vec![Property::of::<i32>("value"), Property::of::<Vec<Node>>("children")]
//!         })
//!     }
//! }
//!
//! assert_eq!(Node::shape().to_string(), "Node");
//! ```

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// The built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Uuid,
    Timestamp,
}

impl PrimitiveKind {
    /// The OpenAPI `type` and optional `format` of this kind.
    pub fn openapi_type(self) -> (&'static str, Option<&'static str>) {
        match self {
            PrimitiveKind::String => ("string", None),
            PrimitiveKind::Boolean => ("boolean", None),
            PrimitiveKind::Int32 => ("integer", Some("int32")),
            PrimitiveKind::Int64 => ("integer", Some("int64")),
            PrimitiveKind::Float => ("number", Some("float")),
            PrimitiveKind::Double => ("number", Some("double")),
            PrimitiveKind::Uuid => ("string", Some("uuid")),
            PrimitiveKind::Timestamp => ("string", Some("date-time")),
        }
    }

    fn zero_value(self) -> Value {
        match self {
            PrimitiveKind::String => Value::String(String::new()),
            PrimitiveKind::Boolean => Value::Bool(false),
            PrimitiveKind::Int32 | PrimitiveKind::Int64 => json!(0),
            PrimitiveKind::Float | PrimitiveKind::Double => json!(0.0),
            PrimitiveKind::Uuid => Value::String(Uuid::nil().to_string()),
            PrimitiveKind::Timestamp => Value::String(ZERO_TIMESTAMP.to_string()),
        }
    }
}

/// The zero value of a timestamp: the first instant of year one, UTC.
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// A named enumeration serialized as one of its variant names.
#[derive(Debug, Clone, Copy)]
pub struct EnumShape {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

/// A named object type with a lazily produced property list.
#[derive(Clone, Copy)]
pub struct ObjectShape {
    pub name: &'static str,
    pub type_id: TypeId,
    properties: fn() -> Vec<Property>,
}

impl ObjectShape {
    pub fn properties(&self) -> Vec<Property> {
        (self.properties)()
    }
}

impl fmt::Debug for ObjectShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectShape").field("name", &self.name).field("type_id", &self.type_id).finish_non_exhaustive()
    }
}

/// One serialized field of an object.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: &'static str,
    pub shape: Shape,
}

impl Property {
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self { name, shape }
    }

    pub fn of<T: Describe>(name: &'static str) -> Self {
        Self::new(name, T::shape())
    }
}

/// The declared shape of a value.
#[derive(Debug, Clone)]
pub enum Shape {
    Primitive(PrimitiveKind),
    Enum(EnumShape),
    Array(Box<Shape>),
    /// A map with string keys.
    Map(Box<Shape>),
    Nullable(Box<Shape>),
    Object(ObjectShape),
}

impl Shape {
    pub fn object<T: 'static>(name: &'static str, properties: fn() -> Vec<Property>) -> Self {
        Shape::Object(ObjectShape { name, type_id: TypeId::of::<T>(), properties })
    }

    pub fn enumeration(name: &'static str, variants: &'static [&'static str]) -> Self {
        Shape::Enum(EnumShape { name, variants })
    }

    pub fn array(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    pub fn map(value: Shape) -> Self {
        Shape::Map(Box::new(value))
    }

    pub fn nullable(inner: Shape) -> Self {
        Shape::Nullable(Box::new(inner))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Shape::Nullable(_))
    }

    /// Whether values of this shape go over the wire as plain text rather than JSON.
    pub fn is_text(&self) -> bool {
        matches!(self, Shape::Primitive(PrimitiveKind::String))
    }

    /// The value used when a request supplies nothing for a parameter.
    ///
    /// Objects expand to a map of their properties' zero values, an object that is already
    /// being expanded further up yields `null` so self-referential types terminate.
    pub fn zero_value(&self) -> Value {
        self.zero_value_within(&mut HashSet::new())
    }

    fn zero_value_within(&self, expanding: &mut HashSet<TypeId>) -> Value {
        match self {
            Shape::Primitive(kind) => kind.zero_value(),
            Shape::Enum(shape) => shape.variants.first().map_or(Value::Null, |v| Value::String((*v).to_string())),
            Shape::Array(_) => Value::Array(Vec::new()),
            Shape::Map(_) => Value::Object(Map::new()),
            Shape::Nullable(_) => Value::Null,
            Shape::Object(object) => {
                if !expanding.insert(object.type_id) {
                    return Value::Null;
                }
                let fields = object
                    .properties()
                    .into_iter()
                    .map(|property| (property.name.to_string(), property.shape.zero_value_within(expanding)))
                    .collect::<Map<_, _>>();
                expanding.remove(&object.type_id);
                Value::Object(fields)
            }
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive(kind) => match kind.openapi_type() {
                (ty, Some(format)) => write!(f, "{ty}({format})"),
                (ty, None) => f.write_str(ty),
            },
            Shape::Enum(shape) => f.write_str(shape.name),
            Shape::Array(item) => write!(f, "array<{item}>"),
            Shape::Map(value) => write!(f, "map<string, {value}>"),
            Shape::Nullable(inner) => write!(f, "{inner}?"),
            Shape::Object(object) => f.write_str(object.name),
        }
    }
}

/// Types that can describe their JSON shape.
pub trait Describe {
    fn shape() -> Shape;
}

macro_rules! describe_primitive {
    ($kind:ident => $($ty:ty),+) => {
        $(
            impl Describe for $ty {
                fn shape() -> Shape {
                    Shape::Primitive(PrimitiveKind::$kind)
                }
            }
        )+
    };
}

describe_primitive!(String => String, &'static str);
describe_primitive!(Boolean => bool);
describe_primitive!(Int32 => i8, i16, i32, u8, u16);
describe_primitive!(Int64 => i64, u32, u64, isize, usize);
describe_primitive!(Float => f32);
describe_primitive!(Double => f64);
describe_primitive!(Uuid => Uuid);
describe_primitive!(Timestamp => DateTime<Utc>, DateTime<FixedOffset>);

/// Free-form JSON, documented as an object without declared properties.
impl Describe for Value {
    fn shape() -> Shape {
        Shape::object::<Value>("Object", Vec::new)
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn shape() -> Shape {
        Shape::nullable(T::shape())
    }
}

impl<T: Describe> Describe for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<V: Describe, S> Describe for HashMap<String, V, S> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }
}

impl<V: Describe> Describe for BTreeMap<String, V> {
    fn shape() -> Shape {
        Shape::map(V::shape())
    }
}
