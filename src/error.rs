//! Error types for docblock parsing and registry loading.
//!
//! Every failure inside a parse aborts the whole docblock; there is no
//! partial [`ParseResult`](crate::ParseResult).  [`AnnotationError::kind`]
//! groups the variants into the coarse categories callers usually branch on.

use std::path::PathBuf;

use crate::lexer::TokenKind;

/// Coarse classification of an [`AnnotationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed annotation grammar or type descriptor.
    Syntax,
    /// A namespace alias could not be resolved.
    NamespaceResolution,
    /// An annotation was used where its metadata does not allow it.
    Location,
    /// Missing, surplus, or mixed-style parameters.
    Parameter,
    /// A parsed value does not fit the declared parameter type.
    Type,
    /// The object builder could not produce an instance.
    Construction,
}

/// Errors raised while parsing a docblock.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("unexpected {found} `{text}` at offset {offset}{}", expected_suffix(.expected))]
    UnexpectedToken {
        expected: Option<TokenKind>,
        found: TokenKind,
        text: String,
        offset: usize,
    },

    #[error("invalid {kind} literal `{text}`")]
    InvalidLiteral { kind: TokenKind, text: String },

    #[error("unmatched parentheses in parameter list of {class}")]
    UnmatchedParentheses { class: String },

    #[error("unable to parse type `{ty}` as an array type")]
    UnparsableArrayType { ty: String },

    /// `Type[int]`-style keyed arrays are accepted by the grammar but have
    /// no semantics yet.
    #[error("keyed array type `{ty}` (index `{index}`) is not supported")]
    UnsupportedArrayIndex { ty: String, index: String },

    #[error("failed to find namespace for {name} (unknown alias `{alias}`)")]
    NamespaceResolution { name: String, alias: String },

    #[error("annotation {class} is not allowed on `{location}`")]
    Location { class: String, location: String },

    #[error("named or anonymous parameters for {class}, pick one")]
    MixedParameterStyle { class: String },

    #[error("too many parameters for {class}: expected at most {expected}, got {got}")]
    TooManyParameters {
        class: String,
        expected: usize,
        got: usize,
    },

    #[error("missing required parameter `{name}` for {class}")]
    MissingRequiredParameter { class: String, name: String },

    #[error("type mismatch, expected {expected} but got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("expected object of type {expected} but got {got}")]
    ExpectedObject { expected: String, got: String },

    /// A nested annotation used as a parameter value is not registered, so
    /// there is no instance to pass on.
    #[error("nested annotation {class} is not registered")]
    UnresolvedNestedAnnotation { class: String },

    #[error("cannot construct {class}: {message}")]
    Construction { class: String, message: String },

    #[error("argument {index} of {class}: {message}")]
    Argument {
        class: String,
        index: usize,
        message: String,
    },
}

fn expected_suffix(expected: &Option<TokenKind>) -> String {
    match expected {
        Some(kind) => format!(", expected {kind}"),
        None => String::new(),
    }
}

impl AnnotationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnnotationError::UnexpectedEndOfInput
            | AnnotationError::UnexpectedToken { .. }
            | AnnotationError::InvalidLiteral { .. }
            | AnnotationError::UnmatchedParentheses { .. }
            | AnnotationError::UnparsableArrayType { .. }
            | AnnotationError::UnsupportedArrayIndex { .. } => ErrorKind::Syntax,
            AnnotationError::NamespaceResolution { .. } => ErrorKind::NamespaceResolution,
            AnnotationError::Location { .. } => ErrorKind::Location,
            AnnotationError::MixedParameterStyle { .. }
            | AnnotationError::TooManyParameters { .. }
            | AnnotationError::MissingRequiredParameter { .. } => ErrorKind::Parameter,
            AnnotationError::TypeMismatch { .. }
            | AnnotationError::ExpectedObject { .. }
            | AnnotationError::UnresolvedNestedAnnotation { .. } => ErrorKind::Type,
            AnnotationError::Construction { .. } | AnnotationError::Argument { .. } => {
                ErrorKind::Construction
            }
        }
    }
}

/// Errors raised while loading a registry file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("could not determine the user configuration directory")]
    NoConfigDir,
}
