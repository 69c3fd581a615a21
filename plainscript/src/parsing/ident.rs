use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Span, TokenKind},
};
use smol_str::SmolStr;

/// User defined name.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub span: Span,
    pub name: SmolStr,
}

impl Parse for Ident {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Ident)?;
        let name = SmolStr::from(input.span_fragment(&token.span));
        Ok(Ident {
            span: token.span,
            name,
        })
    }
}
