//! Buffered stream of tokens for look ahead.
use crate::{
    lex::{LexError, Lexer},
    parsing::NodeId,
    tokens::{Span, Token, TokenKind},
};

use std::{error, fmt, iter::Peekable};

/// Buffered stream of tokens that allows one token of look ahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer.
///
/// The stream also hands out node identities to the parser, so
/// every node parsed from the same source gets the same id.
pub struct TokenStream<'a> {
    lexer: Peekable<Lexer<'a>>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    source: &'a str,
    /// Span of the previously consumed token, used to
    /// position errors at the end of the source.
    prev: Span,
    next_id: NodeId,
    /// Nesting depth of the construct being parsed.
    depth: u32,
}

impl<'a> TokenStream<'a> {
    #[inline]
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            source: lexer.source_code(),
            lexer: lexer.peekable(),
            prev: Span::default(),
            next_id: NodeId(0),
            depth: 0,
        }
    }

    /// Helper function to extract the span's string fragment
    /// from the original source code.
    #[inline]
    pub fn span_fragment(&self, span: &Span) -> &'a str {
        span.fragment(self.source)
    }

    /// Allocate the identity of a new syntax tree node.
    #[inline]
    pub fn node_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id = NodeId(id.0 + 1);
        id
    }

    /// Step into a nested construct, returning the new depth.
    #[inline]
    pub(crate) fn descend(&mut self) -> u32 {
        self.depth += 1;
        self.depth
    }

    #[inline]
    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Number of node identities handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.0
    }

    /// Consumes the current token regardless of type.
    pub fn next_token(&mut self) -> Result<Token, TokenError> {
        match self.lexer.next() {
            Some(Ok(token)) => {
                self.prev = token.span;
                Ok(token)
            }
            Some(Err(err)) => Err(TokenError::Lex(err)),
            None => Err(TokenError::EndOfSource(self.prev)),
        }
    }

    /// Consumes the current token if it matches the given token type.
    ///
    /// Returns true when matched. Returns false when token types
    /// do not match.
    ///
    /// Does not consume the token if the types do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> Result<bool, TokenError> {
        if self.peek_kind()? == token_kind {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// a mismatch error is returned. The cursor is not advanced if
    /// the token kind does not match.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, TokenError> {
        let token = self.peek()?;

        if token.kind != token_kind {
            Err(TokenError::Mismatch {
                expected: token_kind,
                encountered: token.kind,
                span: token.span,
            })
        } else {
            self.next_token()
        }
    }

    /// Return the current token without advancing the cursor.
    #[inline]
    pub fn peek(&mut self) -> Result<&Token, TokenError> {
        match self.lexer.peek() {
            Some(Ok(token)) => Ok(token),
            Some(Err(err)) => Err(TokenError::Lex(err.clone())),
            None => Err(TokenError::EndOfSource(self.prev)),
        }
    }

    /// Return the current token kind without advancing the cursor.
    #[inline]
    pub fn peek_kind(&mut self) -> Result<TokenKind, TokenError> {
        self.peek().map(|token| token.kind)
    }

    /// Build an error for the current token, which isn't what the parser expected.
    pub fn unexpected(&mut self, msg: impl ToString) -> TokenError {
        match self.peek() {
            Ok(token) => TokenError::Unexpected {
                encountered: token.kind,
                span: token.span,
                msg: msg.to_string(),
            },
            Err(err) => err,
        }
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Mismatch {
        expected: TokenKind,
        encountered: TokenKind,
        span: Span,
    },
    Unexpected {
        encountered: TokenKind,
        span: Span,
        msg: String,
    },
    EndOfSource(Span),
    Lex(LexError),
}

impl TokenError {
    pub fn span(&self) -> Span {
        match self {
            TokenError::Mismatch { span, .. } => *span,
            TokenError::Unexpected { span, .. } => *span,
            TokenError::EndOfSource(span) => *span,
            TokenError::Lex(err) => err.span(),
        }
    }
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::Mismatch {
                expected,
                encountered,
                ..
            } => write!(f, "expected {}, found {}", expected, encountered),
            E::Unexpected {
                encountered, msg, ..
            } => write!(f, "{}, found {}", msg, encountered),
            E::EndOfSource(_) => write!(f, "unexpected end of source code"),
            E::Lex(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<LexError> for TokenError {
    fn from(err: LexError) -> Self {
        TokenError::Lex(err)
    }
}
