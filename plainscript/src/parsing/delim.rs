//! Delimited list.
use super::ParseError;
use crate::{token_stream::TokenStream, tokens::TokenKind};

/// Parse a comma separated list of items, up to but not including
/// the closing token.
///
/// A trailing comma is allowed. The list may be empty.
pub fn delimited<T>(
    input: &mut TokenStream,
    close: TokenKind,
    mut parse_item: impl FnMut(&mut TokenStream) -> Result<T, ParseError>,
) -> Result<Vec<T>, ParseError> {
    let mut items = vec![];

    while input.peek_kind()? != close {
        items.push(parse_item(input)?);

        if !input.match_token(TokenKind::Comma)? {
            break;
        }
    }

    Ok(items)
}
