//! Tree-walking evaluation.

use super::{Attribute, BinaryOp, Expr, FormulaError, Subject};

/// Attribute source a formula reads from.
pub trait Scope {
    fn attribute(&self, attr: Attribute) -> f64;
}

pub(super) fn evaluate(
    expr: &Expr,
    user: &dyn Scope,
    target: &dyn Scope,
) -> Result<f64, FormulaError> {
    Ok(match expr {
        Expr::Number(n) => *n,
        Expr::Attr(Subject::User, attr) => user.attribute(*attr),
        Expr::Attr(Subject::Target, attr) => target.attribute(*attr),
        Expr::Neg(inner) => -evaluate(inner, user, target)?,
        Expr::Binary { op, lhs, rhs } => {
            let l = evaluate(lhs, user, target)?;
            let r = evaluate(rhs, user, target)?;
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => {
                    if r == 0.0 {
                        return Err(FormulaError::DivisionByZero);
                    }
                    l / r
                }
                BinaryOp::Pow => l.powf(r),
            }
        }
    })
}
