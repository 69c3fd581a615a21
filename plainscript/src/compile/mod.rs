//! Semantic analysis, optimization and code generation.
mod analyze;
mod codegen;
pub mod consteval;
mod names;
mod optimize;
mod symbol;
mod types;

pub use analyze::{analyze, Analyzer};
pub use codegen::{generate, CodeGen};
pub use names::{is_reserved, js_name};
pub use optimize::{optimize, Optimizer};
pub use symbol::{Builtin, Decorations, Scope, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use types::Type;

use crate::{
    parsing::{BinaryOp, UnaryOp},
    tokens::Span,
};
use smol_str::SmolStr;
use std::{error, fmt};

/// Result of semantic analysis.
///
/// The syntax tree itself is left untouched, all semantic
/// information lives in side tables keyed by node identity.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub decorations: Decorations,
}

impl Analysis {
    /// Symbol that the given node resolves to, or declares.
    pub fn symbol_of(&self, node: crate::parsing::NodeId) -> Option<&Symbol> {
        self.decorations
            .binding(node)
            .and_then(|id| self.symbols.get(id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub span: Span,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticErrorKind {
    DuplicateDeclaration(SmolStr),
    UndeclaredIdentifier(SmolStr),
    UnknownType(SmolStr),
    /// `void` used anywhere but a function return type.
    VoidType,
    InvalidOperands {
        op: BinaryOp,
        lhs: Type,
        rhs: Type,
    },
    InvalidOperand {
        op: UnaryOp,
        ty: Type,
    },
    NotIndexable(Type),
    NonNumericIndex(Type),
    /// Strings are immutable, their characters can't be assigned.
    StringElementAssign,
    MixedArray {
        expected: Type,
        found: Type,
    },
    NotCallable(SmolStr),
    FunctionAsValue(SmolStr),
    ArityMismatch {
        name: SmolStr,
        expected: usize,
        found: usize,
    },
    ArgumentType {
        name: SmolStr,
        index: usize,
        expected: Type,
        found: Type,
    },
    /// Argument of `len` is neither an array nor a string.
    LengthOf(Type),
    /// Result of a function without a return value used as a value.
    VoidValue,
    ConditionNotBool(Type),
    TypeMismatch {
        expected: Type,
        found: Type,
    },
    AssignToConst(SmolStr),
    AssignToFunction(SmolStr),
    ReturnOutsideFunction,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    ReturnTypeMismatch {
        expected: Type,
        found: Type,
    },
    MissingReturnValue(Type),
    UnexpectedReturnValue,
    MissingReturn(SmolStr),
    /// Function is called before a variable its body uses is declared.
    CalledBeforeDeclaration {
        function: SmolStr,
        name: SmolStr,
    },
}

impl error::Error for SemanticError {}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use SemanticErrorKind as E;
        match self {
            E::DuplicateDeclaration(name) => {
                write!(f, "'{}' is already declared in this scope", name)
            }
            E::UndeclaredIdentifier(name) => write!(f, "undeclared identifier '{}'", name),
            E::UnknownType(name) => write!(f, "unknown type '{}'", name),
            E::VoidType => write!(f, "'void' is only allowed as a function return type"),
            E::InvalidOperands { op, lhs, rhs } => write!(
                f,
                "operator '{}' cannot be applied to types '{}' and '{}'",
                op, lhs, rhs
            ),
            E::InvalidOperand { op, ty } => {
                write!(f, "operator '{}' cannot be applied to type '{}'", op, ty)
            }
            E::NotIndexable(ty) => write!(f, "type '{}' cannot be indexed", ty),
            E::NonNumericIndex(ty) => write!(f, "index must be a number, found '{}'", ty),
            E::StringElementAssign => write!(f, "cannot assign to an element of a string"),
            E::MixedArray { expected, found } => write!(
                f,
                "array elements must share a type, expected '{}', found '{}'",
                expected, found
            ),
            E::NotCallable(name) => write!(f, "'{}' is not a function", name),
            E::FunctionAsValue(name) => {
                write!(f, "function '{}' cannot be used as a value", name)
            }
            E::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "function '{}' expects {} argument(s), found {}",
                name, expected, found
            ),
            E::ArgumentType {
                name,
                index,
                expected,
                found,
            } => write!(
                f,
                "argument {} of '{}' expects type '{}', found '{}'",
                index + 1,
                name,
                expected,
                found
            ),
            E::LengthOf(ty) => write!(
                f,
                "'len' expects an array or a string, found '{}'",
                ty
            ),
            E::VoidValue => write!(f, "function without a return value used as a value"),
            E::ConditionNotBool(ty) => {
                write!(f, "condition must be of type 'bool', found '{}'", ty)
            }
            E::TypeMismatch { expected, found } => {
                write!(f, "expected type '{}', found '{}'", expected, found)
            }
            E::AssignToConst(name) => write!(f, "cannot assign to constant '{}'", name),
            E::AssignToFunction(name) => write!(f, "cannot assign to function '{}'", name),
            E::ReturnOutsideFunction => write!(f, "'return' outside of a function"),
            E::BreakOutsideLoop => write!(f, "'break' outside of a loop"),
            E::ContinueOutsideLoop => write!(f, "'continue' outside of a loop"),
            E::ReturnTypeMismatch { expected, found } => write!(
                f,
                "function returns '{}', found return value of type '{}'",
                expected, found
            ),
            E::MissingReturnValue(ty) => {
                write!(f, "function must return a value of type '{}'", ty)
            }
            E::UnexpectedReturnValue => write!(f, "function declared 'void' cannot return a value"),
            E::MissingReturn(name) => {
                write!(f, "function '{}' does not return a value on every path", name)
            }
            E::CalledBeforeDeclaration { function, name } => write!(
                f,
                "function '{}' is called before '{}' is declared",
                function, name
            ),
        }
    }
}
