//! Object construction through a typed factory registry.
//!
//! Each annotation class that should produce a Rust value is described by a
//! [`ClassFactory`]: an optional zero-argument factory, an optional
//! constructor, any number of named factory operations, and the ancestor
//! type names its instances satisfy.  The factories are plain closures
//! registered at start-up; [`ObjectBuilder::build`] picks the one matching
//! the metadata's [`Creator`] and hands it the coerced [`Arguments`].
//!
//! Registries loaded from configuration have no Rust types to build, so a
//! factory can instead fall back to a generic [`Record`] that simply keeps
//! the arguments keyed by parameter name.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::AnnotationError;
use crate::types::{AnnotationMetadata, Creator, Instance, Record, Value};

type Erased = Box<dyn Any + Send + Sync>;
type DefaultFn = Arc<dyn Fn() -> Erased + Send + Sync>;
type CreatorFn = Arc<dyn Fn(&Arguments) -> Result<Erased, AnnotationError> + Send + Sync>;

// ─── Arguments ──────────────────────────────────────────────────────────────

/// The bound, coerced arguments handed to a creator, in parameter order.
///
/// `None` marks an optional parameter that was not supplied.
#[derive(Debug, Clone)]
pub struct Arguments {
    class: String,
    names: Vec<String>,
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub fn new(class: impl Into<String>, names: Vec<String>, values: Vec<Option<Value>>) -> Self {
        Arguments {
            class: class.into(),
            names,
            values,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `index`, or `None` when absent or out of range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// The value bound to the parameter called `name`.
    pub fn named(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n == name)?;
        self.get(index)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn int(&self, index: usize) -> Result<i64, AnnotationError> {
        self.require(index, "int", Value::as_int)
    }

    pub fn opt_int(&self, index: usize) -> Result<Option<i64>, AnnotationError> {
        self.optional(index, "int", Value::as_int)
    }

    pub fn float(&self, index: usize) -> Result<f64, AnnotationError> {
        self.require(index, "float", Value::as_float)
    }

    pub fn opt_float(&self, index: usize) -> Result<Option<f64>, AnnotationError> {
        self.optional(index, "float", Value::as_float)
    }

    pub fn bool(&self, index: usize) -> Result<bool, AnnotationError> {
        self.require(index, "bool", Value::as_bool)
    }

    pub fn opt_bool(&self, index: usize) -> Result<Option<bool>, AnnotationError> {
        self.optional(index, "bool", Value::as_bool)
    }

    pub fn string(&self, index: usize) -> Result<String, AnnotationError> {
        self.require(index, "string", |v| v.as_str().map(str::to_string))
    }

    pub fn opt_string(&self, index: usize) -> Result<Option<String>, AnnotationError> {
        self.optional(index, "string", |v| v.as_str().map(str::to_string))
    }

    pub fn array(&self, index: usize) -> Result<Vec<Value>, AnnotationError> {
        self.require(index, "array", |v| v.as_array().map(<[Value]>::to_vec))
    }

    pub fn opt_array(&self, index: usize) -> Result<Option<Vec<Value>>, AnnotationError> {
        self.optional(index, "array", |v| v.as_array().map(<[Value]>::to_vec))
    }

    /// A nested annotation instance downcast to `T`.
    pub fn object<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, AnnotationError> {
        self.require(index, std::any::type_name::<T>(), |v| {
            v.as_object().and_then(Instance::downcast::<T>)
        })
    }

    pub fn opt_object<T: Any + Send + Sync>(
        &self,
        index: usize,
    ) -> Result<Option<Arc<T>>, AnnotationError> {
        self.optional(index, std::any::type_name::<T>(), |v| {
            v.as_object().and_then(Instance::downcast::<T>)
        })
    }

    fn require<T>(
        &self,
        index: usize,
        expected: &str,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, AnnotationError> {
        self.optional(index, expected, extract)?
            .ok_or_else(|| self.error(index, "argument is absent".to_string()))
    }

    fn optional<T>(
        &self,
        index: usize,
        expected: &str,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>, AnnotationError> {
        match self.get(index) {
            None => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| self.error(index, format!("expected {expected}, got {value:?}"))),
        }
    }

    fn error(&self, index: usize, message: String) -> AnnotationError {
        AnnotationError::Argument {
            class: self.class.clone(),
            index,
            message,
        }
    }
}

// ─── Class factories ────────────────────────────────────────────────────────

/// How instances of one annotation class are produced.
#[derive(Clone)]
pub struct ClassFactory {
    class: String,
    ancestors: Vec<String>,
    default: Option<DefaultFn>,
    constructor: Option<CreatorFn>,
    factories: HashMap<String, CreatorFn>,
    record_fallback: bool,
}

impl ClassFactory {
    pub fn new(class: impl Into<String>) -> Self {
        let class = class.into();
        ClassFactory {
            class: class.strip_prefix('\\').unwrap_or(&class).to_string(),
            ancestors: Vec::new(),
            default: None,
            constructor: None,
            factories: HashMap::new(),
            record_fallback: false,
        }
    }

    /// A factory that builds a [`Record`] for whatever creator is requested.
    pub fn record(class: impl Into<String>) -> Self {
        ClassFactory {
            record_fallback: true,
            ..Self::new(class)
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Declare type names (parent classes, interfaces) the instances satisfy.
    pub fn extends<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ancestors.extend(ancestors.into_iter().map(|a| {
            let a = a.into();
            a.strip_prefix('\\').unwrap_or(&a).to_string()
        }));
        self
    }

    pub fn with_default<T, F>(mut self, create: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(move || Box::new(create()) as Erased));
        self
    }

    pub fn with_constructor<T, F>(mut self, create: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, AnnotationError> + Send + Sync + 'static,
    {
        self.constructor = Some(erase(create));
        self
    }

    pub fn with_factory<T, F>(mut self, method: impl Into<String>, create: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, AnnotationError> + Send + Sync + 'static,
    {
        self.factories.insert(method.into(), erase(create));
        self
    }

    fn create(&self, creator: &Creator, args: &Arguments) -> Result<Erased, AnnotationError> {
        let specific = match creator {
            Creator::Default => self.default.as_ref().map(|create| Ok(create())),
            Creator::Constructor { .. } => self.constructor.as_ref().map(|create| create(args)),
            Creator::Factory { method, .. } => self.factories.get(method).map(|create| create(args)),
        };

        match specific {
            Some(result) => result,
            None if self.record_fallback => Ok(Box::new(Record {
                class: self.class.clone(),
                fields: args
                    .names()
                    .iter()
                    .cloned()
                    .zip(args.values().iter().cloned())
                    .collect::<IndexMap<_, _>>(),
            }) as Erased),
            None => Err(AnnotationError::Construction {
                class: self.class.clone(),
                message: format!("no {creator} registered"),
            }),
        }
    }
}

impl fmt::Debug for ClassFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut factories: Vec<&String> = self.factories.keys().collect();
        factories.sort();
        f.debug_struct("ClassFactory")
            .field("class", &self.class)
            .field("ancestors", &self.ancestors)
            .field("default", &self.default.is_some())
            .field("constructor", &self.constructor.is_some())
            .field("factories", &factories)
            .field("record_fallback", &self.record_fallback)
            .finish()
    }
}

fn erase<T, F>(create: F) -> CreatorFn
where
    T: Any + Send + Sync,
    F: Fn(&Arguments) -> Result<T, AnnotationError> + Send + Sync + 'static,
{
    Arc::new(move |args: &Arguments| {
        create(args).map(|value| Box::new(value) as Erased)
    })
}

// ─── Object builder ─────────────────────────────────────────────────────────

/// Registry of [`ClassFactory`]s keyed by class identity.
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    classes: RwLock<HashMap<String, ClassFactory>>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `factory.class()`.
    pub fn register(&self, factory: ClassFactory) {
        self.classes
            .write()
            .insert(factory.class.clone(), factory);
    }

    pub fn contains(&self, class: &str) -> bool {
        let class = class.strip_prefix('\\').unwrap_or(class);
        self.classes.read().contains_key(class)
    }

    /// Construct an instance of `meta.class` with its declared creator.
    ///
    /// `values` must be in the order of the creator's parameter specs; it is
    /// ignored for [`Creator::Default`].
    pub fn build(
        &self,
        meta: &AnnotationMetadata,
        values: Vec<Option<Value>>,
    ) -> Result<Instance, AnnotationError> {
        let names = meta
            .creator
            .params()
            .map(|specs| specs.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default();
        let args = Arguments::new(meta.class.clone(), names, values);

        // Clone the factory out so a creator never runs under the lock.
        let factory = self
            .classes
            .read()
            .get(&meta.class)
            .cloned()
            .ok_or_else(|| AnnotationError::Construction {
                class: meta.class.clone(),
                message: "no factory registered".to_string(),
            })?;

        let object = factory.create(&meta.creator, &args)?;
        Ok(Instance::from_boxed(
            meta.class.as_str(),
            factory.ancestors.into(),
            object,
        ))
    }
}
