use super::{delimited, Block, Ident, NodeId, Parse, ParseError, TypeExpr};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Span, TokenKind},
};

/// Function definition.
///
/// ```text
/// fn add(a: num, b: num) -> num {
///     return a + b;
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub params: Vec<Param>,
    /// Declared return type. Without one the function
    /// returns the dynamic `any` type.
    pub ret: Option<TypeExpr>,
    pub body: Block,
}

/// Function parameter, with an optional type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub ty: Option<TypeExpr>,
}

impl Parse for FuncDef {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::Fn))?;
        let name = Ident::parse(input)?;

        input.consume(TokenKind::LeftParen)?;
        let params = delimited(input, TokenKind::RightParen, Param::parse)?;
        input.consume(TokenKind::RightParen)?;

        let ret = if input.match_token(TokenKind::Arrow)? {
            Some(TypeExpr::parse(input)?)
        } else {
            None
        };

        let body = Block::parse(input)?;

        Ok(Self {
            id: input.node_id(),
            span: keyword.span + body.span,
            name,
            params,
            ret,
            body,
        })
    }
}

impl Parse for Param {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let name = Ident::parse(input)?;

        let ty = if input.match_token(TokenKind::Colon)? {
            Some(TypeExpr::parse(input)?)
        } else {
            None
        };

        Ok(Param {
            id: input.node_id(),
            span: ty.as_ref().map(|ty| name.span + ty.span).unwrap_or(name.span),
            name,
            ty,
        })
    }
}
