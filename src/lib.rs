//! Docblock annotation parser.
//!
//! Turns structured `@Annotation(...)` declarations inside PHP doc comments
//! into constructed, type-checked objects for metadata-driven frameworks
//! (routing, validation, dependency injection):
//!
//! ```text
//! /**
//!  * Shows a single user.
//!  *
//!  * @Route("/users/{id}", methods = ["GET"])
//!  * @param int $id
//!  */
//! ```
//!
//! # Pipeline
//!
//!   1. **Lexer** ([`lexer`]): lazily tokenizes the docblock; prose becomes
//!      inert tokens that the parser skips.
//!   2. **Parser** ([`parser`]): finds each `@`, resolves the class name
//!      through the caller's namespace aliases ([`resolution`]), looks it up
//!      in the [`AnnotationRegistry`], and parses its parameter list.
//!   3. **Coercion** ([`coerce`]): checks each parameter against the
//!      declared type of the creator's [`ParamSpec`]s.
//!   4. **Construction** ([`builder`]): calls the registered factory for
//!      the class and returns a type-erased [`Instance`].
//!
//! Unregistered annotations (ordinary PHPDoc tags like `@param`) are
//! skipped.  Any other problem aborts the docblock with an
//! [`AnnotationError`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use php_annotation::{
//!     AnnotationConfigurator, AnnotationMetadata, ClassFactory, DocblockParser, NamespaceMap,
//!     ObjectBuilder, ParamSpec,
//! };
//!
//! #[derive(Debug)]
//! struct Route {
//!     path: String,
//! }
//!
//! let registry = AnnotationConfigurator::new();
//! registry.register(
//!     AnnotationMetadata::new("App\\Routing\\Route")
//!         .on(["method"])
//!         .constructor(vec![ParamSpec::required("path", "string")]),
//! );
//!
//! let builder = ObjectBuilder::new();
//! builder.register(
//!     ClassFactory::new("App\\Routing\\Route")
//!         .with_constructor(|args| Ok(Route { path: args.string(0)? })),
//! );
//!
//! let parser = DocblockParser::new(Arc::new(registry), Arc::new(builder));
//! let namespaces = NamespaceMap::from([("Routing".to_string(), "App\\Routing".to_string())]);
//!
//! let result = parser
//!     .parse("/** @Routing\\Route(\"/users\") */", "method", &namespaces)
//!     .unwrap();
//! let route = result.get_as::<Route>("App\\Routing\\Route").unwrap();
//! assert_eq!(route.path, "/users");
//! ```

pub mod builder;
pub mod coerce;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod resolution;
pub mod types;

// ─── Re-exports ─────────────────────────────────────────────────────────────

pub use builder::{Arguments, ClassFactory, ObjectBuilder};
pub use coerce::coerce;
pub use error::{AnnotationError, ConfigError, ErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{DocblockParser, ParseResult};
pub use registry::{AnnotationConfigurator, AnnotationRegistry};
pub use resolution::resolve_class_name;
pub use types::{
    AnnotationMetadata, Creator, Instance, NamespaceMap, ParamSpec, ParsedValue, Record, Value,
};
