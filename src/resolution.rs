/// Namespace resolution for annotation class names.
///
/// Class names are written in the docblock the way PHP code refers to
/// classes, and are resolved against the caller's alias table (the file's
/// `use` imports):
///
///   - Fully-qualified names (`\Doctrine\ORM\Mapping\Column`) are taken
///     as-is, minus the leading `\`.
///   - Qualified names (`ORM\Column`) expand their first segment through the
///     alias table: `ORM` → `Doctrine\ORM\Mapping` gives
///     `Doctrine\ORM\Mapping\Column`.  An unknown alias is an error.
///   - Unqualified names (`Column`) use the alias entry when there is one,
///     and otherwise stay a global name.  That keeps ordinary PHPDoc tags
///     such as `@param` or `@return` from failing a parse: they resolve to
///     a global name nobody registered and are skipped.
use crate::error::AnnotationError;
use crate::types::NamespaceMap;

/// Resolve `name` to a fully-qualified class identity (no leading `\`).
pub fn resolve_class_name(name: &str, namespaces: &NamespaceMap) -> Result<String, AnnotationError> {
    if let Some(fqn) = name.strip_prefix('\\') {
        return Ok(fqn.to_string());
    }

    let (alias, rest) = match name.split_once('\\') {
        Some((alias, rest)) => (alias, Some(rest)),
        None => (name, None),
    };

    match (namespaces.get(alias), rest) {
        (Some(namespace), Some(rest)) => Ok(format!("{}\\{}", trim_namespace(namespace), rest)),
        (Some(namespace), None) => Ok(trim_namespace(namespace).to_string()),
        (None, None) => Ok(name.to_string()),
        (None, Some(_)) => Err(AnnotationError::NamespaceResolution {
            name: name.to_string(),
            alias: alias.to_string(),
        }),
    }
}

/// Alias targets may be written `\Foo\Bar` or `Foo\Bar\`; normalise both.
fn trim_namespace(namespace: &str) -> &str {
    namespace.trim_matches('\\')
}
