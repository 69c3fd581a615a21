//! Compiler from PlainScript to JavaScript.
//!
//! Compilation is a linear pipeline: the source is parsed into a syntax
//! tree, analysis decorates the tree with scopes and types, an optional
//! pass simplifies the tree, and code generation writes JavaScript.
//!
//! ```
//! use plainscript::{compile_str, CompileOptions, Output};
//!
//! let output = compile_str("let x = 1 + 2; print(x);", &CompileOptions::default()).unwrap();
//! assert_eq!(output, Output::Code("let x = 1 + 2;\nconsole.log(x);\n".to_owned()));
//! ```
pub mod compile;
pub mod dump;
pub mod error;
pub mod lex;
pub mod parsing;
pub mod token_stream;
pub mod tokens;

pub use error::{Category, CompileError, Diagnostic};

use compile::Analysis;
use log::{debug, trace};
use parsing::Prog;

/// Options that select how far the pipeline runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Stop after parsing and dump the syntax tree.
    pub ast_only: bool,
    /// Stop after analysis and dump the decorated syntax tree.
    ///
    /// Ignored when `ast_only` is set.
    pub analyze_only: bool,
    /// Simplify the tree before generating code.
    pub optimize: bool,
}

/// Result of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Dump of the parsed syntax tree.
    Ast(String),
    /// Dump of the decorated syntax tree.
    Decorated(String),
    /// Generated JavaScript source.
    Code(String),
}

impl Output {
    pub fn as_str(&self) -> &str {
        match self {
            Output::Ast(text) | Output::Decorated(text) | Output::Code(text) => text.as_str(),
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Output::Ast(text) | Output::Decorated(text) | Output::Code(text) => text,
        }
    }
}

/// Parse source text into a syntax tree.
pub fn parse(source: &str) -> Result<Prog, CompileError> {
    let prog = Prog::parse_str(source).map_err(|err| CompileError::from_parse_error(&err, source))?;
    debug!(
        "parsed {} statements, {} nodes",
        prog.stmts.len(),
        prog.node_count
    );
    Ok(prog)
}

/// Parse and analyze source text.
pub fn analyze(source: &str) -> Result<(Prog, Analysis), CompileError> {
    let prog = parse(source)?;
    let analysis = compile::analyze(&prog)
        .map_err(|errors| CompileError::from_semantic_errors(&errors, source))?;
    Ok((prog, analysis))
}

/// Compile source text according to the given options.
///
/// Every call is independent, so compilations can run
/// concurrently on separate threads.
pub fn compile_str(source: &str, options: &CompileOptions) -> Result<Output, CompileError> {
    trace!("compiling {} bytes with {:?}", source.len(), options);

    // Syntactic analysis
    let prog = parse(source)?;
    if options.ast_only {
        return Ok(Output::Ast(dump::dump_ast(&prog)));
    }

    // Semantic analysis
    let analysis = compile::analyze(&prog)
        .map_err(|errors| CompileError::from_semantic_errors(&errors, source))?;
    if options.analyze_only {
        return Ok(Output::Decorated(dump::dump_decorated(&prog, &analysis)));
    }

    // Code generation
    let code = if options.optimize {
        let optimized = compile::optimize(&prog, &analysis);
        compile::generate(&optimized, &analysis)
    } else {
        compile::generate(&prog, &analysis)
    };

    Ok(Output::Code(code))
}
