//! Identifier names in generated code.
use super::{Symbol, SymbolKind};
use std::borrow::Cow;

/// Words that can't be used as identifiers in JavaScript, and globals
/// the generated code relies on.
#[rustfmt::skip]
const RESERVED: &[&str] = &[
    // Keywords
    "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "export",
    "extends", "false", "finally", "for", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static",
    "super", "switch", "this", "throw", "true", "try", "typeof", "var",
    "void", "while", "with", "yield",
    // Globals
    "arguments", "console", "eval", "Infinity", "Math", "NaN", "undefined",
];

/// Name is reserved in generated code.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Name of a symbol in generated code.
///
/// Source identifiers can't contain `$`, so appending it never
/// collides with another source name. Reserved names get a plain `$`
/// suffix. A symbol that shadows a symbol of the same name is suffixed
/// with its symbol id as well, since the scoping rules of `let` would
/// otherwise resolve references in the shadowing block differently.
pub fn js_name(symbol: &Symbol) -> Cow<'_, str> {
    let reserved = is_reserved(symbol.name.as_str());
    let shadows = symbol.shadows && symbol.kind != SymbolKind::Parameter;

    match (reserved, shadows) {
        (false, false) => Cow::Borrowed(symbol.name.as_str()),
        (true, false) => Cow::Owned(format!("{}$", symbol.name)),
        (false, true) => Cow::Owned(format!("{}${}", symbol.name, symbol.id.0)),
        (true, true) => Cow::Owned(format!("{}$${}", symbol.name, symbol.id.0)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{compile::SymbolId, compile::Type, tokens::Span};

    fn symbol(name: &str, id: u32, shadows: bool) -> Symbol {
        Symbol {
            id: SymbolId(id),
            name: name.into(),
            kind: SymbolKind::Variable,
            ty: Type::Num,
            mutable: true,
            decl: None,
            span: Span::default(),
            value: None,
            shadows,
        }
    }

    #[test]
    fn test_js_name() {
        assert_eq!(js_name(&symbol("count", 0, false)), "count");
        assert_eq!(js_name(&symbol("class", 1, false)), "class$");
        assert_eq!(js_name(&symbol("Math", 2, false)), "Math$");
        assert_eq!(js_name(&symbol("count", 3, true)), "count$3");
        assert_eq!(js_name(&symbol("new", 4, true)), "new$$4");
    }

    #[test]
    fn test_keywords_are_reserved() {
        // Source keywords that are JavaScript keywords too.
        assert!(is_reserved("let"));
        assert!(is_reserved("while"));
        // Source keywords that aren't.
        assert!(!is_reserved("fn"));
        assert!(!is_reserved("print"));
    }
}
