//! Tokens
use std::{fmt, ops, str::FromStr};

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    // Simple
    Plus,         // `+`
    Minus,        // `-`
    Star,         // `*`
    Slash,        // `/`
    Percent,      // `%`
    Eq,           // `=`
    EqEq,         // `==`
    Bang,         // `!`
    BangEq,       // `!=`
    Less,         // `<`
    LessEq,       // `<=`
    Greater,      // `>`
    GreaterEq,    // `>=`
    AmpAmp,       // `&&`
    PipePipe,     // `||`
    Arrow,        // `->`
    Comma,        // `,`
    Colon,        // `:`
    Semicolon,    // `;`
    LeftParen,    // `(`
    RightParen,   // `)`
    LeftBrace,    // `{`
    RightBrace,   // `}`
    LeftBracket,  // `[`
    RightBracket, // `]`

    // ------------------------------------------------------------------------
    // Complex
    /// Number Literal
    Number,
    /// String literal, including the surrounding quotes.
    String,
    Ident,
    /// Identifier in the set of reserved words.
    Keyword(KeywordKind),

    // ------------------------------------------------------------------------
    // Special
    /// End-of-source
    EOS,
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;
        match self {
            T::Plus         => write!(f, "'+'"),
            T::Minus        => write!(f, "'-'"),
            T::Star         => write!(f, "'*'"),
            T::Slash        => write!(f, "'/'"),
            T::Percent      => write!(f, "'%'"),
            T::Eq           => write!(f, "'='"),
            T::EqEq         => write!(f, "'=='"),
            T::Bang         => write!(f, "'!'"),
            T::BangEq       => write!(f, "'!='"),
            T::Less         => write!(f, "'<'"),
            T::LessEq       => write!(f, "'<='"),
            T::Greater      => write!(f, "'>'"),
            T::GreaterEq    => write!(f, "'>='"),
            T::AmpAmp       => write!(f, "'&&'"),
            T::PipePipe     => write!(f, "'||'"),
            T::Arrow        => write!(f, "'->'"),
            T::Comma        => write!(f, "','"),
            T::Colon        => write!(f, "':'"),
            T::Semicolon    => write!(f, "';'"),
            T::LeftParen    => write!(f, "'('"),
            T::RightParen   => write!(f, "')'"),
            T::LeftBrace    => write!(f, "'{{'"),
            T::RightBrace   => write!(f, "'}}'"),
            T::LeftBracket  => write!(f, "'['"),
            T::RightBracket => write!(f, "']'"),
            T::Number       => write!(f, "number"),
            T::String       => write!(f, "string"),
            T::Ident        => write!(f, "identifier"),
            T::Keyword(kw)  => write!(f, "'{}'", kw),
            T::EOS          => write!(f, "end of source"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Let,
    Const,
    Fn,
    If,
    Else,
    While,
    Return,
    Break,
    Continue,
    Print,
    True,
    False,
}

impl fmt::Display for KeywordKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use KeywordKind as K;
        match self {
            K::Let      => write!(f, "let"),
            K::Const    => write!(f, "const"),
            K::Fn       => write!(f, "fn"),
            K::If       => write!(f, "if"),
            K::Else     => write!(f, "else"),
            K::While    => write!(f, "while"),
            K::Return   => write!(f, "return"),
            K::Break    => write!(f, "break"),
            K::Continue => write!(f, "continue"),
            K::Print    => write!(f, "print"),
            K::True     => write!(f, "true"),
            K::False    => write!(f, "false"),
        }
    }
}

impl FromStr for KeywordKind {
    type Err = ();

    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeywordKind as K;
        match s {
            "let"      => Ok(K::Let),
            "const"    => Ok(K::Const),
            "fn"       => Ok(K::Fn),
            "if"       => Ok(K::If),
            "else"     => Ok(K::Else),
            "while"    => Ok(K::While),
            "return"   => Ok(K::Return),
            "break"    => Ok(K::Break),
            "continue" => Ok(K::Continue),
            "print"    => Ok(K::Print),
            "true"     => Ok(K::True),
            "false"    => Ok(K::False),
            _ => Err(()),
        }
    }
}

/// Chunk of source code, encoded as a starting byte index and a byte size.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.end() as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// One-based line and column of the span's first character.
    ///
    /// Columns count characters, not bytes.
    pub fn line_column(&self, text: &str) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;

        for (i, c) in text.char_indices() {
            if i >= self.index as usize {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        (line, column)
    }

    /// The full line of source text containing the start of the span,
    /// without its line terminator.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> &'a str {
        let index = (self.index as usize).min(text.len());
        let start = text[..index].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[index..].find('\n').map(|i| index + i).unwrap_or(text.len());

        text[start..end].trim_end_matches('\r')
    }

    /// Combine two spans to produce a new span that
    /// covers both (and everything inbetween).
    ///
    /// ```
    /// use plainscript::tokens::Span;
    ///
    /// let span1 = Span::new(4, 13);
    /// let span2 = Span::new(21, 13);
    /// let span3 = span1.merge(&span2);
    /// assert_eq!(4, span3.index);
    /// assert_eq!(30, span3.size);
    /// ```
    pub fn merge(&self, other: &Span) -> Span {
        let index = u32::min(self.index, other.index);
        let size = u32::max(self.end(), other.end()) - index;
        Span { index, size }
    }
}

impl ops::Add for Span {
    type Output = Span;

    #[allow(clippy::suspicious_arithmetic_impl)] // subtract needed to merge spans
    fn add(self, rhs: Self) -> Self::Output {
        self.merge(&rhs)
    }
}
