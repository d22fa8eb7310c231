//! Sandboxed arithmetic formulas for effect values.
//!
//! Effects declare their magnitude as a small expression such as
//! `4 + 2 * a.level` or `b.mhp * 0.3`. `a` is the acting battler and `b` the
//! target. The grammar supports numeric literals, attribute reads, `+ - * /`,
//! `^` (right-associative power), unary minus and parentheses. Nothing else is
//! reachable from a formula.
//!
//! Formulas are parsed once per source string and cached in a
//! [`FormulaCache`]; evaluation walks the cached tree.

mod evaluate;
mod parse;

pub use evaluate::Scope;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{BattleError, ErrorSeverity};

/// Battler attribute readable from a formula.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    Level,
    Exp,
    Hp,
    Mp,
    Mhp,
    Mmp,
    Atk,
    Def,
    Mat,
    Mdf,
    Agi,
    Luk,
    Cri,
    Eva,
    Hit,
    Power,
    Speed,
}

/// Which battler an attribute read refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject {
    /// `a`: the acting battler.
    User,
    /// `b`: the target.
    Target,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parsed formula tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Attr(Subject, Attribute),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Compiled formula: source text plus its tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let expr = parse::parse(source)?;
        Ok(Self {
            source: source.to_owned(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluates with `user` bound to `a` and `target` bound to `b`.
    pub fn evaluate(&self, user: &dyn Scope, target: &dyn Scope) -> Result<f64, FormulaError> {
        evaluate::evaluate(&self.expr, user, target).and_then(|value| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(FormulaError::NonFinite {
                    formula: self.source.clone(),
                })
            }
        })
    }
}

/// Errors raised while parsing or evaluating a formula.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("unexpected character '{found}' at {offset} in formula '{formula}'")]
    UnexpectedChar {
        formula: String,
        found: char,
        offset: usize,
    },

    #[error("unexpected {found} in formula '{formula}'")]
    UnexpectedToken { formula: String, found: String },

    #[error("unknown attribute '{name}' in formula '{formula}'")]
    UnknownAttribute { formula: String, name: String },

    #[error("unknown subject '{name}' in formula '{formula}' (expected 'a' or 'b')")]
    UnknownSubject { formula: String, name: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("formula '{formula}' produced a non-finite value")]
    NonFinite { formula: String },
}

impl BattleError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnexpectedChar { .. } | Self::UnexpectedToken { .. } => "FORMULA_SYNTAX",
            Self::UnknownAttribute { .. } | Self::UnknownSubject { .. } => "FORMULA_UNKNOWN_NAME",
            Self::DivisionByZero | Self::NonFinite { .. } => "FORMULA_ARITHMETIC",
        }
    }
}

/// Compile-once cache keyed by formula source. Parse failures are cached too.
#[derive(Debug, Default)]
pub struct FormulaCache {
    compiled: RwLock<HashMap<String, Result<Arc<Formula>, FormulaError>>>,
}

impl FormulaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&self, source: &str) -> Result<Arc<Formula>, FormulaError> {
        if let Some(hit) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source)
        {
            return hit.clone();
        }
        let compiled = Formula::parse(source).map(Arc::new);
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.to_owned(), compiled.clone());
        compiled
    }

    pub fn len(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
