use std::sync::Arc;

use php_annotation::{
    AnnotationError, AnnotationMetadata, Arguments, ClassFactory, ErrorKind, Instance,
    ObjectBuilder, ParamSpec, Record, Value,
};

fn args(values: Vec<Option<Value>>) -> Arguments {
    let names = (0..values.len()).map(|i| format!("p{i}")).collect();
    Arguments::new("App\\Foo", names, values)
}

// ─── Arguments ──────────────────────────────────────────────────────

#[test]
fn test_typed_accessors() {
    let args = args(vec![
        Some(Value::Int(3)),
        Some(Value::Float(0.5)),
        Some(Value::Bool(true)),
        Some(Value::String("s".into())),
        Some(Value::Array(vec![Value::Int(1)])),
        None,
    ]);
    assert_eq!(args.len(), 6);
    assert_eq!(args.int(0), Ok(3));
    assert_eq!(args.float(1), Ok(0.5));
    assert_eq!(args.bool(2), Ok(true));
    assert_eq!(args.string(3), Ok("s".to_string()));
    assert_eq!(args.array(4), Ok(vec![Value::Int(1)]));
    assert_eq!(args.opt_int(5), Ok(None));
    assert_eq!(args.opt_string(42), Ok(None));
    assert_eq!(args.named("p3"), Some(&Value::String("s".into())));
    assert_eq!(args.named("p5"), None);
    assert_eq!(args.named("nope"), None);
}

#[test]
fn test_accessor_type_errors() {
    let args = args(vec![Some(Value::Int(3)), None]);

    let err = args.string(0).unwrap_err();
    assert!(matches!(
        err,
        AnnotationError::Argument { index: 0, ref class, .. } if class == "App\\Foo"
    ));
    assert_eq!(err.kind(), ErrorKind::Construction);

    assert!(matches!(
        args.int(1),
        Err(AnnotationError::Argument { index: 1, .. })
    ));
}

#[test]
fn test_object_accessor() {
    #[derive(Debug, PartialEq)]
    struct Inner(u8);

    let instance = Instance::new("App\\Inner", Arc::from(Vec::new()), Inner(9));
    let args = args(vec![Some(Value::Object(instance)), Some(Value::Int(1))]);

    assert_eq!(*args.object::<Inner>(0).unwrap(), Inner(9));
    assert!(args.object::<String>(0).is_err());
    assert!(args.opt_object::<Inner>(1).is_err());
    assert_eq!(args.opt_object::<Inner>(2).unwrap(), None);
}

// ─── Object builder ─────────────────────────────────────────────────

#[test]
fn test_build_with_constructor() {
    let builder = ObjectBuilder::new();
    builder.register(
        ClassFactory::new("\\App\\Pair")
            .with_constructor(|args| Ok((args.int(0)?, args.opt_int(1)?))),
    );
    assert!(builder.contains("App\\Pair"));

    let meta = AnnotationMetadata::new("App\\Pair").constructor(vec![
        ParamSpec::required("a", "int"),
        ParamSpec::optional("b", "int"),
    ]);
    let instance = builder
        .build(&meta, vec![Some(Value::Int(1)), None])
        .unwrap();
    assert_eq!(instance.class(), "App\\Pair");
    assert_eq!(instance.downcast_ref::<(i64, Option<i64>)>(), Some(&(1, None)));
}

#[test]
fn test_build_selects_factory_by_method() {
    let builder = ObjectBuilder::new();
    builder.register(
        ClassFactory::new("App\\Color")
            .with_factory("red", |_| Ok("red"))
            .with_factory("named", |args| Ok(args.string(0)?)),
    );

    let red = AnnotationMetadata::new("App\\Color").factory("red", vec![]);
    assert_eq!(
        builder.build(&red, vec![]).unwrap().downcast_ref::<&str>(),
        Some(&"red")
    );

    let named = AnnotationMetadata::new("App\\Color")
        .factory("named", vec![ParamSpec::required("name", "string")]);
    let instance = builder
        .build(&named, vec![Some(Value::String("teal".into()))])
        .unwrap();
    assert_eq!(instance.downcast_ref::<String>().map(String::as_str), Some("teal"));

    let missing = AnnotationMetadata::new("App\\Color").factory("blue", vec![]);
    assert_eq!(
        builder.build(&missing, vec![]).unwrap_err(),
        AnnotationError::Construction {
            class: "App\\Color".to_string(),
            message: "no factory `blue` registered".to_string(),
        }
    );
}

#[test]
fn test_build_without_factory() {
    let builder = ObjectBuilder::new();
    let meta = AnnotationMetadata::new("App\\Nothing");
    assert_eq!(
        builder.build(&meta, vec![]).unwrap_err(),
        AnnotationError::Construction {
            class: "App\\Nothing".to_string(),
            message: "no factory registered".to_string(),
        }
    );
}

#[test]
fn test_missing_creator_kind() {
    let builder = ObjectBuilder::new();
    builder.register(ClassFactory::new("App\\Foo").with_default(|| 1u8));
    let meta = AnnotationMetadata::new("App\\Foo").constructor(vec![]);
    let err = builder.build(&meta, vec![]).unwrap_err();
    assert_eq!(err.to_string(), "cannot construct App\\Foo: no constructor registered");
}

#[test]
fn test_record_fallback() {
    let builder = ObjectBuilder::new();
    builder.register(ClassFactory::record("App\\Foo").extends(["\\App\\Base"]));

    let meta = AnnotationMetadata::new("App\\Foo").constructor(vec![
        ParamSpec::required("a", "int"),
        ParamSpec::optional("b", "string"),
    ]);
    let instance = builder
        .build(&meta, vec![Some(Value::Int(1)), None])
        .unwrap();

    assert!(instance.is_instance_of("App\\Foo"));
    assert!(instance.is_instance_of("App\\Base"));
    assert!(!instance.is_instance_of("App\\Other"));

    let record = instance.downcast_ref::<Record>().unwrap();
    assert_eq!(record.class, "App\\Foo");
    assert_eq!(record.get("a"), Some(&Value::Int(1)));
    assert_eq!(record.get("b"), None);
    assert_eq!(
        record.fields.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[test]
fn test_specific_creator_beats_record_fallback() {
    let builder = ObjectBuilder::new();
    builder.register(ClassFactory::record("App\\Foo").with_default(|| "typed"));
    let instance = builder
        .build(&AnnotationMetadata::new("App\\Foo"), vec![])
        .unwrap();
    assert_eq!(instance.downcast_ref::<&str>(), Some(&"typed"));
}

#[test]
fn test_register_replaces() {
    let builder = ObjectBuilder::new();
    builder.register(ClassFactory::new("App\\Foo").with_default(|| 1u32));
    builder.register(ClassFactory::new("App\\Foo").with_default(|| 2u32));
    let instance = builder
        .build(&AnnotationMetadata::new("App\\Foo"), vec![])
        .unwrap();
    assert_eq!(instance.downcast::<u32>().as_deref(), Some(&2));
}

#[test]
fn test_instances_compare_by_identity() {
    let builder = ObjectBuilder::new();
    builder.register(ClassFactory::new("App\\Foo").with_default(|| 1u32));
    let meta = AnnotationMetadata::new("App\\Foo");
    let a = builder.build(&meta, vec![]).unwrap();
    let b = builder.build(&meta, vec![]).unwrap();
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}
