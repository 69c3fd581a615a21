//! Lexical analysis (tokenizer)
use crate::tokens::{KeywordKind, Span, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use std::{
    error, fmt,
    iter::Iterator,
    str::{CharIndices, FromStr},
};

/// Lexical analyzer.
pub struct Lexer<'a> {
    pub(crate) source: SourceText<'a>,
    /// Start absolute byte position of the current token
    /// in the source.
    token_start: usize,
    /// Set once the end-of-source token, or an error, was emitted.
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: 0,
            done: false,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    #[rustfmt::skip]
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        self.skip_trivia()?;
        self.start_token();

        let next_char = match self.source.next_char() {
            Some(c) => c,
            // Give end-of-source its own character position.
            None => return Ok(self.make_token(T::EOS)),
        };

        match next_char {
            '+' => Ok(self.make_token(T::Plus)),
            '-' => Ok(self.make_pair('>', T::Arrow, T::Minus)),
            '*' => Ok(self.make_token(T::Star)),
            '/' => Ok(self.make_token(T::Slash)),
            '%' => Ok(self.make_token(T::Percent)),
            '=' => Ok(self.make_pair('=', T::EqEq, T::Eq)),
            '!' => Ok(self.make_pair('=', T::BangEq, T::Bang)),
            '<' => Ok(self.make_pair('=', T::LessEq, T::Less)),
            '>' => Ok(self.make_pair('=', T::GreaterEq, T::Greater)),
            '&' => self.make_double('&', T::AmpAmp),
            '|' => self.make_double('|', T::PipePipe),
            ',' => Ok(self.make_token(T::Comma)),
            ':' => Ok(self.make_token(T::Colon)),
            ';' => Ok(self.make_token(T::Semicolon)),
            '(' => Ok(self.make_token(T::LeftParen)),
            ')' => Ok(self.make_token(T::RightParen)),
            '{' => Ok(self.make_token(T::LeftBrace)),
            '}' => Ok(self.make_token(T::RightBrace)),
            '[' => Ok(self.make_token(T::LeftBracket)),
            ']' => Ok(self.make_token(T::RightBracket)),
            '"' => self.consume_string(),
            '0'..='9' => Ok(self.consume_number()),
            c if is_letter(c) => Ok(self.consume_ident()),
            c => Err(LexError::UnknownCharacter(c, self.make_span())),
        }
    }

    /// Skip whitespace and comments up to the start of the next token.
    ///
    /// Newlines are insignificant in the grammar, so they are erased
    /// like any other whitespace.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.source.peek_char2() {
                (Some(c), _) if is_whitespace(c) => {
                    self.source.next_char();
                }
                (Some('/'), Some('/')) => self.erase_line_comment(),
                (Some('/'), Some('*')) => self.erase_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.offset;
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.token_start as u32,
            (self.source.offset - self.token_start) as u32,
        )
    }

    fn make_token(&mut self, kind: TokenKind) -> Token {
        Token {
            kind,
            span: self.make_span(),
        }
    }

    /// Build a two character token if the next character matches,
    /// otherwise the single character token.
    fn make_pair(&mut self, second: char, pair: TokenKind, single: TokenKind) -> Token {
        if self.source.peek_char() == Some(second) {
            self.source.next_char();
            self.make_token(pair)
        } else {
            self.make_token(single)
        }
    }

    /// Build a token made from a doubled character, like `&&`.
    ///
    /// The single character on its own is not a valid token.
    fn make_double(&mut self, c: char, kind: TokenKind) -> Result<Token, LexError> {
        if self.source.peek_char() == Some(c) {
            self.source.next_char();
            Ok(self.make_token(kind))
        } else {
            Err(LexError::UnknownCharacter(c, self.make_span()))
        }
    }

    fn erase_line_comment(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c == '\n' {
                break;
            }
            self.source.next_char();
        }
    }

    fn erase_block_comment(&mut self) -> Result<(), LexError> {
        self.start_token();

        // Opening `/*`
        self.source.next_char();
        self.source.next_char();

        loop {
            match self.source.peek_char2() {
                (Some('*'), Some('/')) => {
                    self.source.next_char();
                    self.source.next_char();
                    return Ok(());
                }
                (Some(_), _) => {
                    self.source.next_char();
                }
                (None, _) => return Err(LexError::UnterminatedComment(self.make_span())),
            }
        }
    }

    fn consume_number(&mut self) -> Token {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        // Fractional part requires at least one digit after the dot.
        if let (Some('.'), Some('0'..='9')) = self.source.peek_char2() {
            self.source.next_char();
            while let Some('0'..='9') = self.source.peek_char() {
                self.source.next_char();
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn consume_ident(&mut self) -> Token {
        while let Some(c) = self.source.peek_char() {
            if is_letter_or_digit(c) {
                self.source.next_char();
            } else {
                break;
            }
        }

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let token_kind = KeywordKind::from_str(self.token_fragment())
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Ident);
        self.make_token(token_kind)
    }

    /// Consume a string literal up to and including the closing quote.
    ///
    /// Escape sequences are validated here, and later decoded
    /// by [`unescape`] when the parser builds the literal.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        loop {
            match self.source.next_char() {
                Some('"') => return Ok(self.make_token(TokenKind::String)),
                Some('\\') => {
                    let escape_start = self.source.offset - 1;
                    match self.source.next_char() {
                        Some(c) if is_escape(c) => {}
                        Some(_) => {
                            let span = Span::new(
                                escape_start as u32,
                                (self.source.offset - escape_start) as u32,
                            );
                            return Err(LexError::InvalidEscape(span));
                        }
                        None => return Err(LexError::UnterminatedString(self.make_span())),
                    }
                }
                Some('\n') | None => return Err(LexError::UnterminatedString(self.make_span())),
                Some(_) => {}
            }
        }
    }

    fn token_fragment(&self) -> &str {
        &self.source.original[self.token_start..self.source.offset]
    }
}

/// Implement `Lexer` as an interator for consuming
/// tokens lazily.
///
/// The end-of-source token is yielded exactly once. Iteration
/// also stops after the first lexical error.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_token();
        if matches!(
            result,
            Ok(Token {
                kind: TokenKind::EOS,
                ..
            }) | Err(_)
        ) {
            self.done = true;
        }

        Some(result)
    }
}

/// Decode the escape sequences of a string literal body.
///
/// The input is the text between the quotes, already
/// validated by the lexer.
pub fn unescape(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => {}
        }
    }

    result
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
pub(crate) struct SourceText<'a> {
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    pub(crate) original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// The `MultiPeek` wrapper allows for arbitrary lookahead by consuming
    /// the iterator internally and buffering the result. This is required
    /// because UTF-8 characters are variable in width. Indexing the string
    /// for individual bytes is possible, but impossible for encoded characters.
    ///
    /// Peeking advances an internal peek cursor, so every peek helper here
    /// resets it first.
    source: MultiPeek<CharIndices<'a>>,

    /// Byte position of the next character to be consumed.
    offset: usize,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            source: multipeek(source.char_indices()),
            offset: 0,
        }
    }

    /// Advance the cursor and return the next character.
    fn next_char(&mut self) -> Option<char> {
        match self.source.next() {
            Some((index, c)) => {
                self.offset = index + c.len_utf8();
                Some(c)
            }
            None => {
                // Source code iterator has reached end-of-file.
                self.offset = self.original.len();
                None
            }
        }
    }

    /// Peeks the next character in the stream without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.source.reset_peek();
        let c = self.source.peek().map(|(_, c)| *c);
        self.source.reset_peek();
        c
    }

    /// Two character lookahead.
    fn peek_char2(&mut self) -> (Option<char>, Option<char>) {
        self.source.reset_peek();
        let first = self.source.peek().map(|(_, c)| *c);
        let second = self.source.peek().map(|(_, c)| *c);
        self.source.reset_peek();
        (first, second)
    }
}

/// Test whether the character is considered whitespace
/// that should be ignored by the parser.
fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' // space
            | '\u{0009}' // tab
            | '\u{000A}' // line feed
            | '\u{000D}' // carriage return
            | '\u{00A0}' // no-break space
            | '\u{FEFF}' // zero width no-break space
    )
}

fn is_escape(c: char) -> bool {
    matches!(c, 'n' | 't' | 'r' | '0' | '"' | '\\')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || c.is_ascii_digit()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnknownCharacter(char, Span),
    UnterminatedString(Span),
    UnterminatedComment(Span),
    InvalidEscape(Span),
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnknownCharacter(_, span)
            | LexError::UnterminatedString(span)
            | LexError::UnterminatedComment(span)
            | LexError::InvalidEscape(span) => *span,
        }
    }
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexError::UnknownCharacter(c, _) => write!(f, "unrecognized character {:?}", c),
            LexError::UnterminatedString(_) => write!(f, "unterminated string literal"),
            LexError::UnterminatedComment(_) => write!(f, "unterminated block comment"),
            LexError::InvalidEscape(_) => write!(f, "invalid escape sequence in string literal"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).map(|result| result.unwrap().kind).collect()
    }

    #[test]
    #[rustfmt::skip]
    fn test_operators() {
        use TokenKind as T;
        assert_eq!(
            kinds("+ - -> == = != ! <= < >= > && || %"),
            vec![
                T::Plus, T::Minus, T::Arrow, T::EqEq, T::Eq, T::BangEq, T::Bang,
                T::LessEq, T::Less, T::GreaterEq, T::Greater, T::AmpAmp, T::PipePipe,
                T::Percent, T::EOS,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        use TokenKind as T;
        let source = "// leading\nlet /* inline */ x = 1; // trailing";
        assert_eq!(
            kinds(source),
            vec![
                T::Keyword(KeywordKind::Let),
                T::Ident,
                T::Eq,
                T::Number,
                T::Semicolon,
                T::EOS
            ]
        );
    }

    #[test]
    fn test_number_fragments() {
        let source = "12 3.25 4.";
        let lexer = Lexer::new(source);
        let fragments: Vec<_> = lexer
            .take(3)
            .map(|t| t.unwrap().span.fragment(source).to_owned())
            .collect();
        assert_eq!(fragments, vec!["12", "3.25", "4"]);
    }

    #[test]
    fn test_string_literal() {
        let source = r#"print("a \"quoted\" word\n");"#;
        let tokens: Vec<_> = Lexer::new(source).map(|t| t.unwrap()).collect();
        assert_eq!(tokens[2].kind, TokenKind::String);
        let fragment = tokens[2].span.fragment(source);
        assert_eq!(
            unescape(&fragment[1..fragment.len() - 1]),
            "a \"quoted\" word\n"
        );
    }

    #[test]
    fn test_lex_errors() {
        let errors: Vec<_> = ["let a = #;", "\"open", "/* open", "\"bad \\q\"", "a & b"]
            .iter()
            .map(|source| Lexer::new(source).find_map(|r| r.err()).unwrap())
            .collect();

        assert_eq!(errors[0], LexError::UnknownCharacter('#', Span::new(8, 1)));
        assert!(matches!(errors[1], LexError::UnterminatedString(_)));
        assert!(matches!(errors[2], LexError::UnterminatedComment(_)));
        assert_eq!(errors[3], LexError::InvalidEscape(Span::new(5, 2)));
        assert!(matches!(errors[4], LexError::UnknownCharacter('&', _)));
    }

    #[test]
    fn test_iteration_ends_after_eos() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::Ident);
        assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::EOS);
        assert!(lexer.next().is_none());
    }
}
