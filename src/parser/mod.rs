/// Docblock annotation parsing.
///
/// This module contains the recursive-descent parser that scans a docblock
/// for `@Annotation(...)` declarations, resolves each class name through the
/// caller's namespace table, looks it up in the registry, binds its
/// parameters to the declared creator signature and constructs the instance.
///
/// Sub-modules:
/// - [`annotation`]: The annotation grammar (class names, parameter lists,
///   values, arrays, nested annotations)
/// - [`binding`]: Binding parsed parameters to a creator's parameter specs
///
/// Parsing is fail-fast: the first error aborts the whole docblock and no
/// partial result is returned.  Unregistered annotations are not errors;
/// they are skipped so that ordinary PHPDoc tags can live alongside
/// structured annotations.
mod annotation;
mod binding;

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::builder::ObjectBuilder;
use crate::error::AnnotationError;
use crate::lexer::{Lexer, TokenKind};
use crate::registry::AnnotationRegistry;
use crate::types::{Instance, NamespaceMap};

/// Parses docblocks against a registry and an object builder.
///
/// A parser is immutable once created; `parse` keeps its state in a
/// per-call session, so one parser can serve many threads.
#[derive(Clone)]
pub struct DocblockParser {
    registry: Arc<dyn AnnotationRegistry>,
    builder: Arc<ObjectBuilder>,
}

impl DocblockParser {
    pub fn new(registry: Arc<dyn AnnotationRegistry>, builder: Arc<ObjectBuilder>) -> Self {
        DocblockParser { registry, builder }
    }

    pub fn registry(&self) -> &dyn AnnotationRegistry {
        &*self.registry
    }

    pub fn builder(&self) -> &ObjectBuilder {
        &self.builder
    }

    /// Parse every registered annotation in `docblock`.
    ///
    /// `location` is the caller's tag for the construct the docblock is
    /// attached to (e.g. `"class"`, `"method"`, `"property"`) and is checked
    /// against each annotation's allowed locations.  `namespaces` maps the
    /// aliases in scope to their fully-qualified namespaces.
    pub fn parse(
        &self,
        docblock: &str,
        location: &str,
        namespaces: &NamespaceMap,
    ) -> Result<ParseResult, AnnotationError> {
        let mut session = Session {
            parser: self,
            lexer: Lexer::new(docblock),
            namespaces,
        };
        session.doc_block(location)
    }
}

impl std::fmt::Debug for DocblockParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocblockParser")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

/// State of a single `parse` call.
pub(crate) struct Session<'p, 'a> {
    parser: &'p DocblockParser,
    lexer: Lexer<'a>,
    namespaces: &'p NamespaceMap,
}

impl Session<'_, '_> {
    /// `DocBlock := (prose* Annotation)* prose*`
    fn doc_block(&mut self, location: &str) -> Result<ParseResult, AnnotationError> {
        let mut result = ParseResult::default();

        while self.lexer.seek_to_type(TokenKind::At) {
            self.lexer.read()?;

            // An `@` not followed by a class name (`foo @ bar`, `@@`) is prose.
            if !matches!(
                self.lexer.peek(),
                Some(TokenKind::Identifier | TokenKind::Backslash)
            ) {
                continue;
            }

            if let annotation::Outcome::Built { class, instance } = self.annotation(location)? {
                result.insert(class, instance);
            }
        }

        Ok(result)
    }
}

// ─── Parse result ───────────────────────────────────────────────────────────

/// The annotations found in one docblock, keyed by class identity.
///
/// Keys keep the order in which classes first appeared.  A class that
/// occurs more than once keeps only its last instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    annotations: IndexMap<String, Instance>,
}

impl ParseResult {
    pub(crate) fn insert(&mut self, class: String, instance: Instance) {
        self.annotations.insert(class, instance);
    }

    pub fn get(&self, class: &str) -> Option<&Instance> {
        self.annotations
            .get(class.strip_prefix('\\').unwrap_or(class))
    }

    /// The instance for `class` downcast to its Rust type.
    pub fn get_as<T: std::any::Any>(&self, class: &str) -> Option<&T> {
        self.get(class)?.downcast_ref()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.get(class).is_some()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.annotations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.annotations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, Instance> {
        self.annotations
    }
}

impl IntoIterator for ParseResult {
    type Item = (String, Instance);
    type IntoIter = indexmap::map::IntoIter<String, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.into_iter()
    }
}

impl Serialize for ParseResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.annotations)
    }
}
