//! Syntactic analysis.
//!
//! Every syntax tree node knows how to parse itself from a [`TokenStream`]
//! via the [`Parse`] trait. The resulting tree is a strict tree: each node
//! owns its children.
mod block;
mod delim;
mod expr;
mod func;
mod ident;
mod literal;
mod prog;
mod stmts;
mod types;

pub use self::{
    block::*, delim::*, expr::*, func::*, ident::*, literal::*, prog::*, stmts::*, types::*,
};

use crate::{
    lex::LexError,
    token_stream::{TokenError, TokenStream},
    tokens::Span,
};
use std::{error::Error, fmt};

/// Deepest nesting of expressions, blocks and types the parser accepts.
///
/// Every later pass walks the tree recursively, so the limit
/// bounds their stack usage as well.
pub const MAX_NESTING: u32 = 256;

/// Parse a construct one nesting level deeper.
pub(crate) fn nested<T>(
    input: &mut TokenStream,
    parse: impl FnOnce(&mut TokenStream) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    let result = if input.descend() > MAX_NESTING {
        let span = input.peek()?.span;
        Err(ParseError::TooDeep(span))
    } else {
        parse(input)
    };
    input.ascend();
    result
}

pub trait Parse: Sized {
    type Output;
    type Err: Error;

    fn parse(input: &mut TokenStream) -> Result<Self::Output, Self::Err>;
}

/// Stable identity of a syntax tree node.
///
/// Identities are handed out by the token stream in the order nodes are
/// created, so parsing the same source always yields the same ids. Semantic
/// decorations are keyed by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Token(TokenError),
    /// Number literal that can't be represented.
    InvalidNumber(Span),
    /// Left-hand-side of an assignment is not a variable or an element.
    InvalidAssignTarget(Span),
    /// Expressions, blocks or types nested deeper than [`MAX_NESTING`].
    TooDeep(Span),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Token(err) => err.span(),
            ParseError::InvalidNumber(span) => *span,
            ParseError::InvalidAssignTarget(span) => *span,
            ParseError::TooDeep(span) => *span,
        }
    }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Token(err) => fmt::Display::fmt(err, f),
            ParseError::InvalidNumber(_) => write!(f, "invalid number literal"),
            ParseError::InvalidAssignTarget(_) => write!(
                f,
                "invalid assignment target, expected a variable or an indexed element"
            ),
            ParseError::TooDeep(_) => write!(
                f,
                "nesting is too deep, at most {} levels are allowed",
                MAX_NESTING
            ),
        }
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        ParseError::Token(err)
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Token(TokenError::Lex(err))
    }
}
