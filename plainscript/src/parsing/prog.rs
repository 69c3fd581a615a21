use super::{Parse, ParseError, Stmt};
use crate::{token_stream::TokenStream, tokens::TokenKind};

/// Root of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Prog {
    pub stmts: Vec<Stmt>,
    /// Number of node identities allocated while parsing.
    pub node_count: u32,
}

impl Prog {
    /// Parse a whole program from source text.
    pub fn parse_str(source: &str) -> Result<Prog, ParseError> {
        let lexer = crate::lex::Lexer::new(source);
        let mut stream = TokenStream::new(lexer);
        Prog::parse(&mut stream)
    }
}

impl Parse for Prog {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let mut stmts = vec![];

        while input.peek_kind()? != TokenKind::EOS {
            stmts.push(Stmt::parse(input)?);
        }

        Ok(Prog {
            stmts,
            node_count: input.node_count(),
        })
    }
}
