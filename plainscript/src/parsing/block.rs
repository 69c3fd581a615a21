use super::{nested, Parse, ParseError, Stmt};
use crate::{
    token_stream::TokenStream,
    tokens::{Span, TokenKind},
};

/// Sequence of statements surrounded by braces.
///
/// A block introduces a new lexical scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// Block contains statements that introduce names into its own scope.
    pub fn has_declarations(&self) -> bool {
        self.stmts.iter().any(Stmt::is_declaration)
    }
}

impl Parse for Block {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        nested(input, parse_block)
    }
}

fn parse_block(input: &mut TokenStream) -> Result<Block, ParseError> {
    let left_brace = input.consume(TokenKind::LeftBrace)?;
    let mut stmts = vec![];

    loop {
        match input.peek_kind()? {
            TokenKind::RightBrace => break,
            // Reports the missing brace.
            TokenKind::EOS => {
                input.consume(TokenKind::RightBrace)?;
            }
            _ => stmts.push(Stmt::parse(input)?),
        }
    }

    let right_brace = input.consume(TokenKind::RightBrace)?;

    Ok(Block {
        span: left_brace.span + right_brace.span,
        stmts,
    })
}
