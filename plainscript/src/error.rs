//! Errors reported by a compilation.
use crate::{compile::SemanticError, parsing::ParseError, tokens::Span};
use std::{
    error,
    fmt::{self, Display, Formatter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Source doesn't follow the grammar.
    Syntax,
    /// Program is well formed, but invalid.
    Semantic,
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Category::Syntax => write!(f, "syntax error"),
            Category::Semantic => write!(f, "semantic error"),
        }
    }
}

/// Error message positioned in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: Category,
    pub message: String,
    pub span: Span,
    /// One-based line number.
    pub line: usize,
    /// One-based column, counted in characters.
    pub column: usize,
}

impl Diagnostic {
    pub fn new(category: Category, message: impl ToString, span: Span, source: &str) -> Self {
        let (line, column) = span.line_column(source);
        Self {
            category,
            message: message.to_string(),
            span,
            line,
            column,
        }
    }

    pub fn syntax(err: &ParseError, source: &str) -> Self {
        Self::new(Category::Syntax, err, err.span(), source)
    }

    pub fn semantic(err: &SemanticError, source: &str) -> Self {
        Self::new(Category::Semantic, err, err.span, source)
    }

    /// Render the diagnostic with the offending line of source
    /// and a caret marking the span.
    ///
    /// ```text
    /// semantic error: undeclared identifier 'y'
    ///  --> 1:7
    ///   |
    /// 1 | print(y);
    ///   |       ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let text = self.span.surrounding_line(source);
        let gutter = " ".repeat(self.line.to_string().len());

        // Keep tabs, so the caret lines up in the terminal.
        let padding: String = text
            .chars()
            .take(self.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let width = source
            .get(self.span.index as usize..self.span.end() as usize)
            .map(|fragment| fragment.chars().take_while(|c| *c != '\n').count())
            .unwrap_or(0)
            .max(1);

        format!(
            "{category}: {message}\n{gutter}--> {line}:{column}\n{gutter} |\n{line} | {text}\n{gutter} | {padding}{carets}\n",
            category = self.category,
            message = self.message,
            gutter = gutter,
            line = self.line,
            column = self.column,
            text = text,
            padding = padding,
            carets = "^".repeat(width),
        )
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.line, self.column, self.category, self.message
        )
    }
}

/// Failed compilation.
///
/// A failed compilation produces no output, only diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Parsing stops at the first syntax error.
    Syntax(Diagnostic),
    /// Every semantic error found in the program.
    Semantic(Vec<Diagnostic>),
}

impl CompileError {
    pub fn from_parse_error(err: &ParseError, source: &str) -> Self {
        CompileError::Syntax(Diagnostic::syntax(err, source))
    }

    pub fn from_semantic_errors(errors: &[SemanticError], source: &str) -> Self {
        CompileError::Semantic(
            errors
                .iter()
                .map(|err| Diagnostic::semantic(err, source))
                .collect(),
        )
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Syntax(diagnostic) => std::slice::from_ref(diagnostic),
            CompileError::Semantic(diagnostics) => diagnostics.as_slice(),
        }
    }

    /// Render every diagnostic against the source it was reported for.
    pub fn render(&self, source: &str) -> String {
        self.diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.render(source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl error::Error for CompileError {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render() {
        const SOURCE: &str = "let x = 1;\nprint(y);\n";
        let diagnostic = Diagnostic::new(
            Category::Semantic,
            "undeclared identifier 'y'",
            Span::new(17, 1),
            SOURCE,
        );

        assert_eq!((diagnostic.line, diagnostic.column), (2, 7));
        assert_eq!(
            diagnostic.render(SOURCE),
            "semantic error: undeclared identifier 'y'\n --> 2:7\n  |\n2 | print(y);\n  |       ^\n"
        );
    }

    #[test]
    fn test_render_end_of_source() {
        const SOURCE: &str = "print(1";
        let diagnostic = Diagnostic::new(Category::Syntax, "expected ')'", Span::new(7, 0), SOURCE);

        assert_eq!(diagnostic.to_string(), "1:8: syntax error: expected ')'");
        assert!(diagnostic.render(SOURCE).ends_with("1 | print(1\n  |        ^\n"));
    }
}
