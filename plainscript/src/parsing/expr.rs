//! Expressions.
use super::{delimited, nested, Ident, Literal, NodeId, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Span, TokenKind},
};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// Reference to a named variable.
    Access(Access),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
    /// Array literal
    Array(ArrayExpr),
    /// Element access, `target[index]`
    Index(IndexExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    pub id: NodeId,
    pub ident: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub id: NodeId,
    pub span: Span,
    pub op: UnaryOp,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub id: NodeId,
    pub span: Span,
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub id: NodeId,
    pub span: Span,
    pub callee: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub id: NodeId,
    pub span: Span,
    pub items: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub id: NodeId,
    pub span: Span,
    pub target: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation, `-`
    Neg,
    /// Logical not, `!`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal(literal) => literal.id,
            Expr::Access(access) => access.id,
            Expr::Unary(unary) => unary.id,
            Expr::Binary(binary) => binary.id,
            Expr::Call(call) => call.id,
            Expr::Array(array) => array.id,
            Expr::Index(index) => index.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(literal) => literal.span,
            Expr::Access(access) => access.ident.span,
            Expr::Unary(unary) => unary.span,
            Expr::Binary(binary) => binary.span,
            Expr::Call(call) => call.span,
            Expr::Array(array) => array.span,
            Expr::Index(index) => index.span,
        }
    }
}

impl UnaryOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

impl BinaryOp {
    #[rustfmt::skip]
    fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        match kind {
            T::Plus      => Some(BinaryOp::Add),
            T::Minus     => Some(BinaryOp::Sub),
            T::Star      => Some(BinaryOp::Mul),
            T::Slash     => Some(BinaryOp::Div),
            T::Percent   => Some(BinaryOp::Rem),
            T::EqEq      => Some(BinaryOp::Eq),
            T::BangEq    => Some(BinaryOp::NotEq),
            T::Less      => Some(BinaryOp::Less),
            T::LessEq    => Some(BinaryOp::LessEq),
            T::Greater   => Some(BinaryOp::Greater),
            T::GreaterEq => Some(BinaryOp::GreaterEq),
            T::AmpAmp    => Some(BinaryOp::And),
            T::PipePipe  => Some(BinaryOp::Or),
            _ => None,
        }
    }

    /// Binding power in the source grammar. Higher binds tighter.
    pub fn precedence(self) -> u8 {
        use BinaryOp as B;
        match self {
            B::Or => 1,
            B::And => 2,
            B::Eq | B::NotEq => 3,
            B::Less | B::LessEq | B::Greater | B::GreaterEq => 4,
            B::Add | B::Sub => 5,
            B::Mul | B::Div | B::Rem => 6,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for BinaryOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BinaryOp as B;
        let symbol = match self {
            B::Add       => "+",
            B::Sub       => "-",
            B::Mul       => "*",
            B::Div       => "/",
            B::Rem       => "%",
            B::Eq        => "==",
            B::NotEq     => "!=",
            B::Less      => "<",
            B::LessEq    => "<=",
            B::Greater   => ">",
            B::GreaterEq => ">=",
            B::And       => "&&",
            B::Or        => "||",
        };
        write!(f, "{}", symbol)
    }
}

/// Expressions are parsed by precedence climbing, starting
/// at the loosest binding operator.
impl Parse for Expr {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        nested(input, |input| parse_binary(input, 1))
    }
}

/// Parse a chain of binary operators that bind at least as
/// tight as `min_precedence`.
///
/// All operators are left associative, so the right-hand-side
/// must bind strictly tighter than the operator itself.
fn parse_binary(input: &mut TokenStream, min_precedence: u8) -> Result<Expr, ParseError> {
    let mut lhs = parse_unary(input)?;

    while let Some(op) = BinaryOp::from_token(input.peek_kind()?) {
        let precedence = op.precedence();
        if precedence < min_precedence {
            break;
        }
        input.next_token()?;

        let rhs = parse_binary(input, precedence + 1)?;
        lhs = Expr::Binary(BinaryExpr {
            id: input.node_id(),
            span: lhs.span() + rhs.span(),
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        });
    }

    Ok(lhs)
}

fn parse_unary(input: &mut TokenStream) -> Result<Expr, ParseError> {
    match UnaryOp::from_token(input.peek_kind()?) {
        Some(op) => {
            let token = input.next_token()?;
            let rhs = nested(input, parse_unary)?;
            Ok(Expr::Unary(UnaryExpr {
                id: input.node_id(),
                span: token.span + rhs.span(),
                op,
                rhs: Box::new(rhs),
            }))
        }
        None => parse_postfix(input),
    }
}

fn parse_postfix(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let mut expr = parse_primary(input)?;

    while input.peek_kind()? == TokenKind::LeftBracket {
        input.consume(TokenKind::LeftBracket)?;
        let index = Expr::parse(input)?;
        let right = input.consume(TokenKind::RightBracket)?;

        expr = Expr::Index(IndexExpr {
            id: input.node_id(),
            span: expr.span() + right.span,
            target: Box::new(expr),
            index: Box::new(index),
        });
    }

    Ok(expr)
}

fn parse_primary(input: &mut TokenStream) -> Result<Expr, ParseError> {
    use KeywordKind as K;
    use TokenKind as T;

    match input.peek_kind()? {
        T::Number | T::String | T::Keyword(K::True) | T::Keyword(K::False) => {
            Literal::parse(input).map(Expr::Literal)
        }
        T::Ident => {
            let ident = Ident::parse(input)?;

            if input.peek_kind()? == T::LeftParen {
                input.consume(T::LeftParen)?;
                let args = delimited(input, T::RightParen, Expr::parse)?;
                let right = input.consume(T::RightParen)?;

                Ok(Expr::Call(CallExpr {
                    id: input.node_id(),
                    span: ident.span + right.span,
                    callee: ident,
                    args,
                }))
            } else {
                Ok(Expr::Access(Access {
                    id: input.node_id(),
                    ident,
                }))
            }
        }
        T::LeftParen => {
            input.consume(T::LeftParen)?;
            let expr = Expr::parse(input)?;
            input.consume(T::RightParen)?;
            Ok(expr)
        }
        T::LeftBracket => {
            let left = input.consume(T::LeftBracket)?;
            let items = delimited(input, T::RightBracket, Expr::parse)?;
            let right = input.consume(T::RightBracket)?;

            Ok(Expr::Array(ArrayExpr {
                id: input.node_id(),
                span: left.span + right.span,
                items,
            }))
        }
        _ => Err(input.unexpected("expected an expression").into()),
    }
}
