//! Constant expression evaluator.
//!
//! Constant values are computed by the compiler with the semantics the
//! generated JavaScript has at runtime: numbers are IEEE-754 doubles,
//! `+` on strings concatenates and strings order by UTF-16 code units.
//!
//! The analyzer uses these functions to annotate constant expressions,
//! and the optimizer uses them to fold operations over literals, so both
//! passes always agree on a value.
use crate::parsing::{BinaryOp, LitValue, UnaryOp};
use std::cmp::Ordering;

/// Longest string, in bytes, that folding produces. Longer
/// concatenations are left for the generated code to evaluate.
pub const MAX_FOLDED_STRING: usize = 4096;

/// Evaluate a unary operation over a constant operand.
///
/// Returns `None` when the operand type doesn't support the operator.
pub fn fold_unary(op: UnaryOp, rhs: &LitValue) -> Option<LitValue> {
    use LitValue as V;

    match (op, rhs) {
        (UnaryOp::Neg, V::Num(value)) => Some(V::Num(-value)),
        (UnaryOp::Not, V::Bool(value)) => Some(V::Bool(!value)),
        _ => None,
    }
}

/// Evaluate a binary operation over two constant operands.
///
/// Returns `None` when the operand types don't support the operator,
/// or when a concatenation would exceed [`MAX_FOLDED_STRING`].
pub fn fold_binary(op: BinaryOp, lhs: &LitValue, rhs: &LitValue) -> Option<LitValue> {
    use BinaryOp as B;
    use LitValue as V;

    match op {
        B::Add => match (lhs, rhs) {
            (V::Num(a), V::Num(b)) => Some(V::Num(a + b)),
            (V::Str(a), V::Str(b)) if a.len() + b.len() <= MAX_FOLDED_STRING => {
                Some(V::Str(format!("{}{}", a, b)))
            }
            _ => None,
        },
        B::Sub | B::Mul | B::Div | B::Rem => match (lhs, rhs) {
            (V::Num(a), V::Num(b)) => Some(V::Num(arithmetic(op, *a, *b))),
            _ => None,
        },
        B::Eq => Some(V::Bool(strict_equals(lhs, rhs))),
        B::NotEq => Some(V::Bool(!strict_equals(lhs, rhs))),
        B::Less | B::LessEq | B::Greater | B::GreaterEq => {
            let ordering = match (lhs, rhs) {
                (V::Num(a), V::Num(b)) => a.partial_cmp(b),
                (V::Str(a), V::Str(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
                _ => return None,
            };
            // Comparisons involving NaN are always false.
            let result = match ordering {
                Some(ordering) => match op {
                    B::Less => ordering == Ordering::Less,
                    B::LessEq => ordering != Ordering::Greater,
                    B::Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
                None => false,
            };
            Some(V::Bool(result))
        }
        B::And => match (lhs, rhs) {
            (V::Bool(a), V::Bool(b)) => Some(V::Bool(*a && *b)),
            _ => None,
        },
        B::Or => match (lhs, rhs) {
            (V::Bool(a), V::Bool(b)) => Some(V::Bool(*a || *b)),
            _ => None,
        },
    }
}

/// Value of a logical operation that's decided by its left operand alone.
///
/// `false && e` is always `false` and `true || e` is always `true`,
/// without evaluating `e`.
pub fn short_circuit(op: BinaryOp, lhs: &LitValue) -> Option<LitValue> {
    match (op, lhs) {
        (BinaryOp::And, LitValue::Bool(false)) => Some(LitValue::Bool(false)),
        (BinaryOp::Or, LitValue::Bool(true)) => Some(LitValue::Bool(true)),
        _ => None,
    }
}

#[inline]
fn arithmetic(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        // Truncated remainder, sign follows the dividend, same as `%` in JavaScript.
        BinaryOp::Rem => a % b,
        _ => unreachable!("not an arithmetic operator: {}", op),
    }
}

/// Equality without type coercion, `===` in JavaScript.
fn strict_equals(lhs: &LitValue, rhs: &LitValue) -> bool {
    match (lhs, rhs) {
        (LitValue::Num(a), LitValue::Num(b)) => a == b,
        (LitValue::Str(a), LitValue::Str(b)) => a == b,
        (LitValue::Bool(a), LitValue::Bool(b)) => a == b,
        _ => false,
    }
}
