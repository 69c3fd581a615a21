//! Literal values.
use super::{NodeId, Parse, ParseError};
use crate::{
    lex::unescape,
    token_stream::TokenStream,
    tokens::{KeywordKind, Span, TokenKind},
};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub id: NodeId,
    pub span: Span,
    pub value: LitValue,
}

/// Value of a literal, also used for compile time constants.
#[derive(Debug, Clone, PartialEq)]
pub enum LitValue {
    /// All numbers are double precision floats.
    Num(f64),
    Str(String),
    Bool(bool),
}

impl LitValue {
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LitValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl Parse for Literal {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        let value = match input.peek_kind()? {
            T::Number => {
                let token = input.consume(T::Number)?;
                let value = input
                    .span_fragment(&token.span)
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber(token.span))?;
                (token.span, LitValue::Num(value))
            }
            T::String => {
                let token = input.consume(T::String)?;
                let fragment = input.span_fragment(&token.span);
                // Strip the surrounding quotes.
                let body = &fragment[1..fragment.len() - 1];
                (token.span, LitValue::Str(unescape(body)))
            }
            T::Keyword(K::True) => {
                let token = input.consume(T::Keyword(K::True))?;
                (token.span, LitValue::Bool(true))
            }
            T::Keyword(K::False) => {
                let token = input.consume(T::Keyword(K::False))?;
                (token.span, LitValue::Bool(false))
            }
            _ => return Err(input.unexpected("expected a literal").into()),
        };

        let (span, value) = value;
        Ok(Literal {
            id: input.node_id(),
            span,
            value,
        })
    }
}

/// Format a number the way a JavaScript source literal would be written.
///
/// Integral values print without a fractional part, everything else in the
/// shortest form that reads back to the same double.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        }
    } else if value == value.trunc() && value.abs() < 1e16 {
        format!("{}", value)
    } else {
        format!("{:?}", value)
    }
}

/// Quote a string with the escapes of a JavaScript string literal.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for LitValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LitValue::Num(value) => write!(f, "{}", format_number(*value)),
            LitValue::Str(value) => write!(f, "{}", quote_string(value)),
            LitValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e21), "1e21");
        assert_eq!(format_number(1.0 / 0.0), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("plain"), "\"plain\"");
        assert_eq!(quote_string("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
        assert_eq!(quote_string("\u{1}"), "\"\\u0001\"");
    }
}
