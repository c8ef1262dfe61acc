//! Data types shared by the lexer, parser, coercer and object builder.
//!
//! This module contains the registry-side metadata model
//! ([`AnnotationMetadata`], [`Creator`], [`ParamSpec`]), the transient parsed
//! parameter values ([`ParsedValue`]), the coerced argument values
//! ([`Value`]) and the type-erased handle to a constructed annotation
//! ([`Instance`]).

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Caller-supplied alias → fully-qualified namespace prefix table.
pub type NamespaceMap = HashMap<String, String>;

// ─── Registry metadata ──────────────────────────────────────────────────────

/// One expected argument of a creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    /// Declared type descriptor, e.g. `"int"`, `"string[]"`, `"App\\Route"`.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, ty: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            ty: ty.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, ty: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            ty: ty.into(),
            required: false,
        }
    }
}

/// How an annotation's instance is produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Creator {
    /// Zero-argument construction.  Parsed parameters are discarded; named
    /// parameters are *not* assigned to properties.
    #[default]
    Default,
    /// The class constructor, called with the bound arguments in parameter order.
    Constructor {
        #[serde(default)]
        params: Vec<ParamSpec>,
    },
    /// A named static factory operation.
    Factory {
        method: String,
        #[serde(default)]
        params: Vec<ParamSpec>,
    },
}

impl Creator {
    /// The ordered parameter specs, or `None` for [`Creator::Default`].
    pub fn params(&self) -> Option<&[ParamSpec]> {
        match self {
            Creator::Default => None,
            Creator::Constructor { params } | Creator::Factory { params, .. } => Some(params),
        }
    }
}

impl fmt::Display for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Creator::Default => f.write_str("default constructor"),
            Creator::Constructor { .. } => f.write_str("constructor"),
            Creator::Factory { method, .. } => write!(f, "factory `{method}`"),
        }
    }
}

/// Registry entry for one annotation class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationMetadata {
    /// Fully-qualified class identity, without a leading `\`.
    pub class: String,
    /// Allowed location tags; `None` allows every location.
    pub on: Option<Vec<String>>,
    pub creator: Creator,
}

impl AnnotationMetadata {
    pub fn new(class: impl Into<String>) -> Self {
        let class = class.into();
        AnnotationMetadata {
            class: class.strip_prefix('\\').unwrap_or(&class).to_string(),
            on: None,
            creator: Creator::Default,
        }
    }

    pub fn on<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on = Some(locations.into_iter().map(Into::into).collect());
        self
    }

    pub fn constructor(mut self, params: Vec<ParamSpec>) -> Self {
        self.creator = Creator::Constructor { params };
        self
    }

    pub fn factory(mut self, method: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        self.creator = Creator::Factory {
            method: method.into(),
            params,
        };
        self
    }

    /// Whether the annotation may appear at `location`.
    pub fn allows(&self, location: &str) -> bool {
        self.on
            .as_ref()
            .is_none_or(|on| on.iter().any(|l| l == location))
    }
}

// ─── Parsed values ──────────────────────────────────────────────────────────

/// A parameter value as written in the docblock, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Array(Vec<ParsedValue>),
    /// A nested annotation, already constructed.
    Annotation { class: String, instance: Instance },
}

impl ParsedValue {
    /// The source kind name used in type-mismatch messages: `integer`,
    /// `float`, `boolean`, `string`, `array`, or the nested class identity.
    pub fn kind_name(&self) -> &str {
        match self {
            ParsedValue::Integer(_) => "integer",
            ParsedValue::Float(_) => "float",
            ParsedValue::Boolean(_) => "boolean",
            ParsedValue::String(_) => "string",
            ParsedValue::Array(_) => "array",
            ParsedValue::Annotation { class, .. } => class,
        }
    }
}

/// A coerced argument value in its native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Instance),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(instance) => instance.serialize(serializer),
        }
    }
}

// ─── Constructed instances ──────────────────────────────────────────────────

/// Shared, type-erased handle to a constructed annotation object.
///
/// The handle remembers the class it was built for and the ancestor type
/// names registered for that class, which is what `is_instance_of` checks
/// during coercion of nested annotations.
#[derive(Clone)]
pub struct Instance {
    class: Arc<str>,
    ancestors: Arc<[String]>,
    object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(
        class: impl Into<Arc<str>>,
        ancestors: Arc<[String]>,
        object: T,
    ) -> Self {
        Instance {
            class: class.into(),
            ancestors,
            object: Arc::new(object),
        }
    }

    pub(crate) fn from_boxed(
        class: impl Into<Arc<str>>,
        ancestors: Arc<[String]>,
        object: Box<dyn Any + Send + Sync>,
    ) -> Self {
        Instance {
            class: class.into(),
            ancestors,
            object: Arc::from(object),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Whether this instance satisfies `type_name`: its own class or any
    /// registered ancestor.  A leading `\` on `type_name` is ignored.
    pub fn is_instance_of(&self, type_name: &str) -> bool {
        let type_name = type_name.strip_prefix('\\').unwrap_or(type_name);
        &*self.class == type_name || self.ancestors.iter().any(|a| a == type_name)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref()
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.object).downcast().ok()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.downcast_ref::<Record>() {
            Some(record) => f
                .debug_struct("Instance")
                .field("class", &self.class)
                .field("fields", &record.fields)
                .finish(),
            None => f
                .debug_struct("Instance")
                .field("class", &self.class)
                .finish_non_exhaustive(),
        }
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The class name owns the `class` key; a field of that name is dropped.
        let fields = self.downcast_ref::<Record>().map(|r| &r.fields);
        let len = fields.map_or(0, |f| f.len() - usize::from(f.contains_key("class")));
        let mut map = serializer.serialize_map(Some(1 + len))?;
        map.serialize_entry("class", &*self.class)?;
        for (name, value) in fields.into_iter().flatten() {
            if name != "class" {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// Generic annotation object used for registries loaded from configuration,
/// where no Rust type exists for the class.  Fields are keyed by parameter
/// name in parameter order; absent optional arguments are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub class: String,
    pub fields: IndexMap<String, Option<Value>>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(Option::as_ref)
    }
}
