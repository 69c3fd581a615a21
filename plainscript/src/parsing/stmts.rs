//! Statement parsing.
use super::{
    delimited, nested, Block, Expr, FuncDef, Ident, NodeId, Parse, ParseError, TypeExpr,
};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Span, TokenKind},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Variable or constant definition
    Var(VarDef),
    Func(FuncDef),
    Assign(Assign),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Break(Span),
    Continue(Span),
    Print(PrintStmt),
    /// Nested block with its own scope
    Block(Block),
    /// Expression Statements
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
}

/// Definition of a variable or a constant.
///
/// # Example
///
/// ```text
/// let count: num = 1;
/// const NAME = "plain";
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub id: NodeId,
    pub span: Span,
    pub kind: DeclKind,
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub rhs: Expr,
}

/// Assignment to a variable or an array element.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub span: Span,
    /// Either an [`Expr::Access`] or an [`Expr::Index`].
    pub target: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub span: Span,
    pub cond: Expr,
    pub then_block: Block,
    pub else_branch: Option<Else>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    Block(Block),
    If(Box<IfStmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub span: Span,
    pub cond: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub span: Span,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub span: Span,
    pub args: Vec<Expr>,
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(stmt) => stmt.span,
            Stmt::Func(stmt) => stmt.span,
            Stmt::Assign(stmt) => stmt.span,
            Stmt::If(stmt) => stmt.span,
            Stmt::While(stmt) => stmt.span,
            Stmt::Return(stmt) => stmt.span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
            Stmt::Print(stmt) => stmt.span,
            Stmt::Block(block) => block.span,
            Stmt::Expr(expr) => expr.span(),
        }
    }

    /// Statements after which control never reaches the next
    /// statement in the same block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Stmt::Return(_) | Stmt::Break(_) | Stmt::Continue(_))
    }

    /// Statement introduces a name into the enclosing scope.
    pub fn is_declaration(&self) -> bool {
        matches!(self, Stmt::Var(_) | Stmt::Func(_))
    }
}

impl Parse for Stmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        match input.peek_kind()? {
            T::Keyword(keyword) => match keyword {
                K::Let | K::Const => VarDef::parse(input).map(Stmt::Var),
                K::Fn => FuncDef::parse(input).map(Stmt::Func),
                K::If => IfStmt::parse(input).map(Stmt::If),
                K::While => WhileStmt::parse(input).map(Stmt::While),
                K::Return => ReturnStmt::parse(input).map(Stmt::Return),
                K::Break => parse_jump(input, K::Break).map(Stmt::Break),
                K::Continue => parse_jump(input, K::Continue).map(Stmt::Continue),
                K::Print => PrintStmt::parse(input).map(Stmt::Print),
                K::True | K::False => parse_expr_stmt(input),
                K::Else => Err(input
                    .unexpected("'else' without a preceding 'if'")
                    .into()),
            },
            T::LeftBrace => Block::parse(input).map(Stmt::Block),
            _ => parse_expr_stmt(input),
        }
    }
}

/// Expression statement, or an assignment when the expression
/// is followed by `=`.
fn parse_expr_stmt(input: &mut TokenStream) -> Result<Stmt, ParseError> {
    let expr = Expr::parse(input)?;

    if input.match_token(TokenKind::Eq)? {
        if !matches!(expr, Expr::Access(_) | Expr::Index(_)) {
            return Err(ParseError::InvalidAssignTarget(expr.span()));
        }

        let rhs = Expr::parse(input)?;
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(Stmt::Assign(Assign {
            span: expr.span() + semicolon.span,
            target: expr,
            rhs,
        }))
    } else {
        // Statement must be terminated with a semicolon.
        input.consume(TokenKind::Semicolon)?;
        Ok(Stmt::Expr(expr))
    }
}

fn parse_jump(input: &mut TokenStream, keyword: KeywordKind) -> Result<Span, ParseError> {
    let token = input.consume(TokenKind::Keyword(keyword))?;
    let semicolon = input.consume(TokenKind::Semicolon)?;
    Ok(token.span + semicolon.span)
}

impl Parse for VarDef {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let (keyword, kind) = match input.peek_kind()? {
            TokenKind::Keyword(KeywordKind::Const) => (
                input.consume(TokenKind::Keyword(KeywordKind::Const))?,
                DeclKind::Const,
            ),
            _ => (
                input.consume(TokenKind::Keyword(KeywordKind::Let))?,
                DeclKind::Let,
            ),
        };
        let name = Ident::parse(input)?;

        let ty = if input.match_token(TokenKind::Colon)? {
            Some(TypeExpr::parse(input)?)
        } else {
            None
        };

        input.consume(TokenKind::Eq)?;
        let rhs = Expr::parse(input)?;
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(Self {
            id: input.node_id(),
            span: keyword.span + semicolon.span,
            kind,
            name,
            ty,
            rhs,
        })
    }
}

impl Parse for IfStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::If))?;
        let cond = Expr::parse(input)?;
        let then_block = Block::parse(input)?;

        let else_branch = if input.match_token(TokenKind::Keyword(KeywordKind::Else))? {
            if input.peek_kind()? == TokenKind::Keyword(KeywordKind::If) {
                Some(Else::If(Box::new(nested(input, IfStmt::parse)?)))
            } else {
                Some(Else::Block(Block::parse(input)?))
            }
        } else {
            None
        };

        let end = match &else_branch {
            Some(Else::Block(block)) => block.span,
            Some(Else::If(stmt)) => stmt.span,
            None => then_block.span,
        };

        Ok(IfStmt {
            span: keyword.span + end,
            cond,
            then_block,
            else_branch,
        })
    }
}

impl Parse for WhileStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::While))?;
        let cond = Expr::parse(input)?;
        let body = Block::parse(input)?;

        Ok(WhileStmt {
            span: keyword.span + body.span,
            cond,
            body,
        })
    }
}

impl Parse for ReturnStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::Return))?;

        let value = if input.peek_kind()? == TokenKind::Semicolon {
            None
        } else {
            Some(Expr::parse(input)?)
        };
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(ReturnStmt {
            span: keyword.span + semicolon.span,
            value,
        })
    }
}

impl Parse for PrintStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::Print))?;
        input.consume(TokenKind::LeftParen)?;
        let args = delimited(input, TokenKind::RightParen, Expr::parse)?;
        input.consume(TokenKind::RightParen)?;
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(PrintStmt {
            span: keyword.span + semicolon.span,
            args,
        })
    }
}
