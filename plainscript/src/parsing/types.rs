//! Type annotations.
use super::{nested, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Span, TokenKind},
};
use smol_str::SmolStr;
use std::fmt;

/// Type as written in the source, resolved later by the analyzer.
///
/// ```text
/// let names: [str] = [];
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub span: Span,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    Named(SmolStr),
    Array(Box<TypeExpr>),
}

impl Parse for TypeExpr {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        match input.peek_kind()? {
            TokenKind::Ident => {
                let token = input.consume(TokenKind::Ident)?;
                Ok(TypeExpr {
                    span: token.span,
                    kind: TypeExprKind::Named(input.span_fragment(&token.span).into()),
                })
            }
            TokenKind::LeftBracket => {
                let left = input.consume(TokenKind::LeftBracket)?;
                let element = nested(input, TypeExpr::parse)?;
                let right = input.consume(TokenKind::RightBracket)?;
                Ok(TypeExpr {
                    span: left.span + right.span,
                    kind: TypeExprKind::Array(Box::new(element)),
                })
            }
            _ => Err(input.unexpected("expected a type").into()),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Named(name) => write!(f, "{}", name),
            TypeExprKind::Array(element) => write!(f, "[{}]", element),
        }
    }
}
