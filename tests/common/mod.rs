#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use php_annotation::{
    AnnotationConfigurator, AnnotationMetadata, Arguments, ClassFactory, DocblockParser,
    NamespaceMap, ObjectBuilder, ParamSpec, Value,
};

pub const ROUTE: &str = "App\\Routing\\Route";
pub const COLUMN: &str = "Doctrine\\ORM\\Mapping\\Column";
pub const ENTITY: &str = "Doctrine\\ORM\\Mapping\\Entity";
pub const JOIN_COLUMN: &str = "Doctrine\\ORM\\Mapping\\JoinColumn";
pub const JOIN_TABLE: &str = "Doctrine\\ORM\\Mapping\\JoinTable";
pub const MAPPING: &str = "Doctrine\\ORM\\Mapping\\Annotation";
pub const INJECT: &str = "App\\Di\\Inject";

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path: String,
    pub methods: Vec<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub ty: String,
    pub length: Option<i64>,
    pub nullable: bool,
    pub precision: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity;

#[derive(Debug, Clone, PartialEq)]
pub struct JoinColumn {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinTable {
    pub name: String,
    pub join_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inject {
    pub service: String,
}

fn strings(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn join_table(args: &Arguments) -> Result<JoinTable, php_annotation::AnnotationError> {
    let join_columns = args
        .opt_array(1)?
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_object()?.downcast_ref::<JoinColumn>().cloned())
        .map(|c| c.name)
        .collect();
    Ok(JoinTable {
        name: args.string(0)?,
        join_columns,
    })
}

/// Registry with a routing annotation, a handful of Doctrine-style mapping
/// annotations and a factory-created DI annotation.
pub fn registry() -> AnnotationConfigurator {
    let registry = AnnotationConfigurator::new();
    registry.register(
        AnnotationMetadata::new(ROUTE).on(["method"]).constructor(vec![
            ParamSpec::required("path", "string"),
            ParamSpec::optional("methods", "string[]"),
            ParamSpec::optional("name", "string"),
        ]),
    );
    registry.register(
        AnnotationMetadata::new(COLUMN).on(["property"]).constructor(vec![
            ParamSpec::required("type", "string"),
            ParamSpec::optional("length", "int"),
            ParamSpec::optional("nullable", "bool"),
            ParamSpec::optional("precision", "float"),
        ]),
    );
    registry.register(AnnotationMetadata::new(ENTITY).on(["class"]));
    registry.register(
        AnnotationMetadata::new(JOIN_COLUMN)
            .on([JOIN_TABLE])
            .constructor(vec![ParamSpec::required("name", "string")]),
    );
    registry.register(AnnotationMetadata::new(JOIN_TABLE).on(["property"]).constructor(vec![
        ParamSpec::required("name", "string"),
        ParamSpec::optional("joinColumns", format!("{MAPPING}[]")),
    ]));
    registry.register(
        AnnotationMetadata::new(INJECT)
            .factory("named", vec![ParamSpec::required("service", "string")]),
    );
    registry
}

pub fn builder() -> ObjectBuilder {
    let builder = ObjectBuilder::new();
    builder.register(ClassFactory::new(ROUTE).with_constructor(|args| {
        Ok(Route {
            path: args.string(0)?,
            methods: strings(args.opt_array(1)?.unwrap_or_default()),
            name: args.opt_string(2)?,
        })
    }));
    builder.register(ClassFactory::new(COLUMN).with_constructor(|args| {
        Ok(Column {
            ty: args.string(0)?,
            length: args.opt_int(1)?,
            nullable: args.opt_bool(2)?.unwrap_or(false),
            precision: args.opt_float(3)?,
        })
    }));
    builder.register(ClassFactory::new(ENTITY).with_default(Entity::default));
    builder.register(
        ClassFactory::new(JOIN_COLUMN)
            .extends([MAPPING])
            .with_constructor(|args| {
                Ok(JoinColumn {
                    name: args.string(0)?,
                })
            }),
    );
    builder.register(
        ClassFactory::new(JOIN_TABLE)
            .extends([MAPPING])
            .with_constructor(join_table),
    );
    builder.register(ClassFactory::new(INJECT).with_factory("named", |args| {
        Ok(Inject {
            service: args.string(0)?,
        })
    }));
    builder
}

pub fn parser() -> DocblockParser {
    DocblockParser::new(Arc::new(registry()), Arc::new(builder()))
}

pub fn namespaces() -> NamespaceMap {
    HashMap::from([
        ("ORM".to_string(), "Doctrine\\ORM\\Mapping".to_string()),
        ("Routing".to_string(), "App\\Routing".to_string()),
        ("Inject".to_string(), INJECT.to_string()),
    ])
}

/// Parser over a single `Foo` class registered with the given metadata and
/// a record factory.
pub fn single(meta: AnnotationMetadata) -> DocblockParser {
    let builder = ObjectBuilder::new();
    builder.register(ClassFactory::record(meta.class.as_str()));
    let registry = AnnotationConfigurator::new();
    registry.register(meta);
    DocblockParser::new(Arc::new(registry), Arc::new(builder))
}
