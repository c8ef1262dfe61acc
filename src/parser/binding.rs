/// Binding of parsed parameters to a creator's parameter specs.
///
/// The result is the positional argument list in parameter order, each present
/// value already coerced to its declared type and each omitted optional
/// parameter left as `None`.
use indexmap::IndexMap;
use tracing::debug;

use crate::coerce::coerce;
use crate::error::AnnotationError;
use crate::types::{AnnotationMetadata, ParamSpec, ParsedValue, Value};

/// The parameters written after an annotation name.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Params {
    /// No parameter list, or `()`.
    None,
    Positional(Vec<ParsedValue>),
    Named(IndexMap<String, ParsedValue>),
}

pub(crate) fn bind(
    meta: &AnnotationMetadata,
    params: Params,
) -> Result<Vec<Option<Value>>, AnnotationError> {
    let Some(specs) = meta.creator.params() else {
        // Default construction takes no arguments.  Named parameters would
        // be property assignments, which are not supported.
        if !matches!(params, Params::None) {
            debug!(class = %meta.class, "discarding parameters of default-constructed annotation");
        }
        return Ok(Vec::new());
    };

    match params {
        Params::None => specs
            .iter()
            .map(|spec| absent(meta, spec))
            .collect(),
        Params::Positional(values) => {
            if values.len() > specs.len() {
                return Err(AnnotationError::TooManyParameters {
                    class: meta.class.clone(),
                    expected: specs.len(),
                    got: values.len(),
                });
            }
            let mut values = values.into_iter();
            specs
                .iter()
                .map(|spec| match values.next() {
                    Some(value) => coerce(value, &spec.ty).map(Some),
                    None => absent(meta, spec),
                })
                .collect()
        }
        Params::Named(mut named) => {
            let bound = specs
                .iter()
                .map(|spec| match named.shift_remove(&spec.name) {
                    Some(value) => coerce(value, &spec.ty).map(Some),
                    None => absent(meta, spec),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if !named.is_empty() {
                let unknown: Vec<&str> = named.keys().map(String::as_str).collect();
                debug!(class = %meta.class, ?unknown, "ignoring unknown named parameters");
            }
            Ok(bound)
        }
    }
}

fn absent(meta: &AnnotationMetadata, spec: &ParamSpec) -> Result<Option<Value>, AnnotationError> {
    if spec.required {
        Err(AnnotationError::MissingRequiredParameter {
            class: meta.class.clone(),
            name: spec.name.clone(),
        })
    } else {
        Ok(None)
    }
}
