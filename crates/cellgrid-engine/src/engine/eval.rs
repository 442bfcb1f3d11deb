//! Formula evaluation.
//!
//! Pure structural recursion over an [`Expr`] against a caller-supplied
//! value lookup. Arithmetic follows IEEE-754 double semantics throughout:
//! division by zero yields signed infinity, `0/0` yields NaN, and NaN or
//! infinite results propagate through further operations as valid values.
//! Circular references are rejected structurally before evaluation ever
//! runs, so a NaN here is arithmetic, never a cycle.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::cell_id::CellId;

/// Evaluate an expression. The lookup supplies the current value of a
/// referenced cell; cells with no value resolve to 0 at the lookup.
pub fn evaluate<L>(expr: &Expr, lookup: &L) -> f64
where
    L: Fn(&CellId) -> f64,
{
    match expr {
        Expr::Number(value) => *value,
        Expr::Reference(id) => lookup(id),
        Expr::Unary(op, operand) => {
            let v = evaluate(operand, lookup);
            match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => -v,
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let a = evaluate(lhs, lookup);
            let b = evaluate(rhs, lookup);
            match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Min => a.min(b),
                BinaryOp::Max => a.max(b),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;
    use std::collections::BTreeMap;

    fn eval_with(text: &str, cells: &[(&str, f64)]) -> f64 {
        let values: BTreeMap<CellId, f64> = cells
            .iter()
            .map(|(name, v)| (CellId::parse(name).unwrap(), *v))
            .collect();
        let expr = parse(text).unwrap();
        evaluate(&expr, &|id| values.get(id).copied().unwrap_or(0.0))
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval_with("3+4", &[]), 7.0);
        assert_eq!(eval_with("10-3-2", &[]), 5.0);
        assert_eq!(eval_with("2*3+4", &[]), 10.0);
        assert_eq!(eval_with("8/2", &[]), 4.0);
    }

    #[test]
    fn test_unary_sign() {
        assert_eq!(eval_with("-5", &[]), -5.0);
        assert_eq!(eval_with("+5", &[]), 5.0);
        assert_eq!(eval_with("--5", &[]), 5.0);
        assert_eq!(eval_with("3--2", &[]), 5.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval_with("min(3, 7)", &[]), 3.0);
        assert_eq!(eval_with("max(3, 7)", &[]), 7.0);
        assert_eq!(eval_with("max(min(5, 2), 1)", &[]), 2.0);
    }

    #[test]
    fn test_reference_lookup() {
        assert_eq!(eval_with("a1*2", &[("a1", 21.0)]), 42.0);
    }

    #[test]
    fn test_unknown_reference_is_zero() {
        assert_eq!(eval_with("z9+1", &[]), 1.0);
    }

    #[test]
    fn test_division_by_zero_is_infinity_not_error() {
        assert_eq!(eval_with("1/0", &[]), f64::INFINITY);
        assert_eq!(eval_with("-1/0", &[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_zero_over_zero_is_nan_not_error() {
        assert!(eval_with("0/0", &[]).is_nan());
        // NaN propagates through further arithmetic.
        assert!(eval_with("0/0 + 1", &[]).is_nan());
    }
}
