//! Expression trees for cell formulas.
//!
//! A formula parses into an [`Expr`]: numeric literals, references to other
//! cells, and applications of the arithmetic operators. Unary and binary
//! applications are distinct node shapes, so operand count is structural
//! and never inferred at evaluation time.

use std::collections::BTreeSet;
use std::fmt;

use super::cell_id::CellId;

/// Operators taking a single operand (sign markers).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Operators taking exactly two operands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        };
        f.write_str(s)
    }
}

/// A parsed formula expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Reference(CellId),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Collect the set of distinct cells referenced anywhere in an expression.
/// This is the precedent set the store feeds to the dependency graph.
pub fn referenced_cells(expr: &Expr) -> BTreeSet<CellId> {
    let mut refs = BTreeSet::new();
    collect_refs(expr, &mut refs);
    refs
}

fn collect_refs(expr: &Expr, refs: &mut BTreeSet<CellId>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Reference(id) => {
            refs.insert(id.clone());
        }
        Expr::Unary(_, operand) => collect_refs(operand, refs),
        Expr::Binary(_, lhs, rhs) => {
            collect_refs(lhs, refs);
            collect_refs(rhs, refs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_cells_deduplicates() {
        // a1 + a1 * b2
        let a1 = CellId::parse("a1").unwrap();
        let b2 = CellId::parse("b2").unwrap();
        let expr = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Reference(a1.clone())),
            Box::new(Expr::Binary(
                BinaryOp::Mul,
                Box::new(Expr::Reference(a1.clone())),
                Box::new(Expr::Reference(b2.clone())),
            )),
        );
        let refs = referenced_cells(&expr);
        assert_eq!(refs.len(), 2);
        assert!(refs.contains(&a1));
        assert!(refs.contains(&b2));
    }

    #[test]
    fn test_referenced_cells_empty_for_literals() {
        let expr = Expr::Unary(UnaryOp::Minus, Box::new(Expr::Number(3.0)));
        assert!(referenced_cells(&expr).is_empty());
    }
}
