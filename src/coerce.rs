//! Type checking and conversion of parsed parameter values.
//!
//! A creator's [`ParamSpec`](crate::ParamSpec) declares each argument's type
//! as a descriptor string.  Scalars (`bool`/`boolean`, `int`/`integer`,
//! `string`, `float`) must match the literal kind exactly; there is no
//! implicit widening.  Any other name is an object type, satisfied only by a
//! nested annotation whose instance `is_instance_of` that name.  A trailing
//! `[]` makes an array type; a lone value is wrapped into a one-element
//! array before its elements are checked.

use crate::error::AnnotationError;
use crate::types::{ParsedValue, Value};

/// Index qualifiers accepted inside `Type[...]`.  They parse, but keyed
/// arrays are not supported.
const ARRAY_INDEX_TYPES: &[&str] = &["int", "integer", "string", "bool", "boolean", "float"];

/// Coerce `value` to the native representation of `ty`.
///
/// A literal offered for an object type fails with
/// [`AnnotationError::ExpectedObject`] rather than `TypeMismatch`; both report
/// [`ErrorKind::Type`](crate::error::ErrorKind::Type).  Instances of a subclass
/// are accepted through their registered ancestors.
pub fn coerce(value: ParsedValue, ty: &str) -> Result<Value, AnnotationError> {
    if matches!(value, ParsedValue::Array(_)) || ty.ends_with(']') {
        return coerce_array(value, ty);
    }

    if is_type(ty, &["bool", "boolean"]) {
        return match value {
            ParsedValue::Boolean(b) => Ok(Value::Bool(b)),
            other => Err(mismatch(ty, &other)),
        };
    }

    if is_type(ty, &["int", "integer"]) {
        return match value {
            ParsedValue::Integer(n) => Ok(Value::Int(n)),
            other => Err(mismatch(ty, &other)),
        };
    }

    if is_type(ty, &["string"]) {
        return match value {
            ParsedValue::String(s) => Ok(Value::String(s)),
            other => Err(mismatch(ty, &other)),
        };
    }

    if is_type(ty, &["float"]) {
        return match value {
            ParsedValue::Float(n) => Ok(Value::Float(n)),
            other => Err(mismatch(ty, &other)),
        };
    }

    match value {
        ParsedValue::Annotation { instance, .. } if instance.is_instance_of(ty) => {
            Ok(Value::Object(instance))
        }
        ParsedValue::Annotation { class, .. } => Err(AnnotationError::TypeMismatch {
            expected: ty.to_string(),
            got: class,
        }),
        other => Err(AnnotationError::ExpectedObject {
            expected: ty.to_string(),
            got: other.kind_name().to_string(),
        }),
    }
}

/// Split an array type descriptor `Element[Index]` into its element type.
///
/// `Index` may be empty or one of the scalar key types; a non-empty index is
/// rejected as unsupported.
pub fn parse_array_type(ty: &str) -> Result<&str, AnnotationError> {
    let unparsable = || AnnotationError::UnparsableArrayType { ty: ty.to_string() };

    let inner = ty.strip_suffix(']').ok_or_else(unparsable)?;
    let open = inner.rfind('[').ok_or_else(unparsable)?;
    let (element, index) = (&inner[..open], &inner[open + 1..]);

    if index.is_empty() {
        return Ok(element);
    }
    if !is_type(index, ARRAY_INDEX_TYPES) {
        return Err(unparsable());
    }
    Err(AnnotationError::UnsupportedArrayIndex {
        ty: ty.to_string(),
        index: index.to_string(),
    })
}

fn coerce_array(value: ParsedValue, ty: &str) -> Result<Value, AnnotationError> {
    let element = parse_array_type(ty)?;
    let elements = match value {
        ParsedValue::Array(elements) => elements,
        single => vec![single],
    };
    elements
        .into_iter()
        .map(|e| coerce(e, element))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn is_type(ty: &str, names: &[&str]) -> bool {
    names.iter().any(|n| ty.eq_ignore_ascii_case(n))
}

fn mismatch(expected: &str, got: &ParsedValue) -> AnnotationError {
    AnnotationError::TypeMismatch {
        expected: expected.to_string(),
        got: got.kind_name().to_string(),
    }
}
