/// The annotation grammar.
///
/// ```text
/// Annotation := ClassName ( "(" ParamList? ")" )?
/// ClassName  := "\"? Identifier ( "\" Identifier )*
/// ParamList  := Param ( "," Param )* ","?
/// Param      := ParamValue | Identifier "=" ParamValue
/// ParamValue := Integer | Float | Boolean | QuotedString
///             | "@" Annotation
///             | "[" ( ParamValue ( "," ParamValue )* ","? )? "]"
/// ```
///
/// A parameter list is either entirely positional or entirely named.
/// Nested annotations are location-checked against the class of the
/// annotation whose parameter list they appear in.
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::Session;
use super::binding::{Params, bind};
use crate::error::AnnotationError;
use crate::lexer::TokenKind;
use crate::resolution::resolve_class_name;
use crate::types::{Instance, ParsedValue};

/// What parsing one annotation produced.
pub(super) enum Outcome {
    Built { class: String, instance: Instance },
    /// The class is not in the registry; nothing after the name was read.
    Unregistered { class: String },
}

impl Session<'_, '_> {
    /// Parse one annotation.  The `@` has already been consumed.
    pub(super) fn annotation(&mut self, location: &str) -> Result<Outcome, AnnotationError> {
        let name = self.class_name()?;
        let class = resolve_class_name(&name, self.namespaces)?;

        let Some(meta) = self.parser.registry.get(&class) else {
            debug!(%class, "skipping unregistered annotation");
            return Ok(Outcome::Unregistered { class });
        };

        if !meta.allows(location) {
            return Err(AnnotationError::Location {
                class: meta.class.clone(),
                location: location.to_string(),
            });
        }

        let params = if self.lexer.peek() == Some(TokenKind::OpenParen) {
            self.lexer.read()?;
            self.param_list(&meta.class)?
        } else {
            Params::None
        };

        let values = bind(&meta, params)?;
        let instance = self.parser.builder.build(&meta, values)?;
        trace!(class = %meta.class, creator = %meta.creator, "constructed annotation");

        Ok(Outcome::Built {
            class: meta.class.clone(),
            instance,
        })
    }

    /// Read a possibly namespaced class name, keeping a leading `\`.
    fn class_name(&mut self) -> Result<String, AnnotationError> {
        let mut name = String::new();

        let first = self.lexer.read()?;
        let first = match first.kind {
            TokenKind::Backslash => {
                name.push('\\');
                self.lexer.read_expect(TokenKind::Identifier)?
            }
            TokenKind::Identifier => first,
            _ => return Err(first.unexpected(Some(TokenKind::Identifier))),
        };
        name.push_str(&first.text);

        while self.lexer.peek() == Some(TokenKind::Backslash) {
            self.lexer.read()?;
            let segment = self.lexer.read_expect(TokenKind::Identifier)?;
            name.push('\\');
            name.push_str(&segment.text);
        }

        Ok(name)
    }

    /// Parse parameters up to and including the closing `)`.
    ///
    /// `class` is the annotation being parsed: it names the parameter list in
    /// errors and is the location tag for nested annotations.
    fn param_list(&mut self, class: &str) -> Result<Params, AnnotationError> {
        let mut positional = Vec::new();
        let mut named = IndexMap::new();

        loop {
            match self.lexer.peek() {
                None => return Err(unmatched(class)),
                Some(TokenKind::CloseParen) => {
                    self.lexer.read()?;
                    break;
                }
                Some(TokenKind::Identifier) => {
                    let (name, value) = self.named_param(class)?;
                    named.insert(name, value);
                }
                Some(_) => positional.push(self.param_value(class)?),
            }

            match self.lexer.peek() {
                None => return Err(unmatched(class)),
                Some(TokenKind::Comma) => {
                    self.lexer.read()?;
                }
                Some(TokenKind::CloseParen) => {}
                Some(_) => {
                    let token = self.lexer.read()?;
                    return Err(token.unexpected(Some(TokenKind::Comma)));
                }
            }
        }

        match (positional.is_empty(), named.is_empty()) {
            (true, true) => Ok(Params::None),
            (false, true) => Ok(Params::Positional(positional)),
            (true, false) => Ok(Params::Named(named)),
            (false, false) => Err(AnnotationError::MixedParameterStyle {
                class: class.to_string(),
            }),
        }
    }

    /// `name = value`
    fn named_param(&mut self, location: &str) -> Result<(String, ParsedValue), AnnotationError> {
        let name = self.lexer.read_expect(TokenKind::Identifier)?;
        self.lexer.read_expect(TokenKind::Equal)?;
        let value = self.param_value(location)?;
        Ok((name.text, value))
    }

    fn param_value(&mut self, location: &str) -> Result<ParsedValue, AnnotationError> {
        let token = self.lexer.read()?;
        match token.kind {
            TokenKind::Integer => token
                .text
                .parse()
                .map(ParsedValue::Integer)
                .map_err(|_| invalid_literal(token.kind, token.text)),
            TokenKind::Float => token
                .text
                .parse()
                .map(ParsedValue::Float)
                .map_err(|_| invalid_literal(token.kind, token.text)),
            TokenKind::Boolean => Ok(ParsedValue::Boolean(token.text.eq_ignore_ascii_case("true"))),
            TokenKind::QuotedString => Ok(ParsedValue::String(token.text)),
            TokenKind::At => match self.annotation(location)? {
                Outcome::Built { class, instance } => Ok(ParsedValue::Annotation { class, instance }),
                Outcome::Unregistered { class } => {
                    Err(AnnotationError::UnresolvedNestedAnnotation { class })
                }
            },
            TokenKind::OpenBracket => {
                let close = if token.text == "{" { "}" } else { "]" };
                self.array(close, location).map(ParsedValue::Array)
            }
            _ => Err(token.unexpected(None)),
        }
    }

    /// Parse array elements up to and including the bracket `close`.
    fn array(&mut self, close: &str, location: &str) -> Result<Vec<ParsedValue>, AnnotationError> {
        let mut elements = Vec::new();

        loop {
            match self.lexer.peek() {
                None => return Err(AnnotationError::UnexpectedEndOfInput),
                Some(TokenKind::CloseBracket) => {
                    let token = self.lexer.read()?;
                    if token.text != close {
                        return Err(token.unexpected(Some(TokenKind::CloseBracket)));
                    }
                    return Ok(elements);
                }
                Some(_) => elements.push(self.param_value(location)?),
            }

            match self.lexer.peek() {
                None => return Err(AnnotationError::UnexpectedEndOfInput),
                Some(TokenKind::Comma) => {
                    self.lexer.read()?;
                }
                Some(TokenKind::CloseBracket) => {}
                Some(_) => {
                    let token = self.lexer.read()?;
                    return Err(token.unexpected(Some(TokenKind::Comma)));
                }
            }
        }
    }
}

fn unmatched(class: &str) -> AnnotationError {
    AnnotationError::UnmatchedParentheses {
        class: class.to_string(),
    }
}

fn invalid_literal(kind: TokenKind, text: String) -> AnnotationError {
    AnnotationError::InvalidLiteral { kind, text }
}
