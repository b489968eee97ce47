//! # Condition expressions
//!
//! A small sandboxed expression language used by `ConditionAction`. Source
//! strings are parsed into an AST (pest grammar in `expression.pest`) and
//! evaluated against the execution context. Only comparison, arithmetic and
//! logical operators, literals and context lookups exist, so a caller-supplied
//! expression can never run arbitrary code.
//!
//! ```
//! use decision_tree::expression::evaluate_condition;
//! use decision_tree::Context;
//!
//! let mut ctx = Context::new();
//! ctx.insert("age".to_string(), serde_json::json!(25));
//! assert!(evaluate_condition("age >= 18", &ctx).unwrap());
//! ```

pub mod ast;
pub mod eval;
pub mod parser;
pub mod value;


use thiserror::Error;

use crate::context::Context;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use eval::{eval_expr, EvalResult};
pub use parser::parse;
pub use value::Val;

/// Longest accepted expression source, in bytes
pub const MAX_SOURCE_LEN: usize = 4096;

/// Deepest accepted bracket/ternary nesting in the source text
pub const MAX_NESTING: usize = 16;

/// Tallest accepted expression tree
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("invalid expression: {0}")]
    Parse(String),

    #[error("{0} is not defined")]
    UnresolvedReference(String),

    #[error("cannot read property '{property}' of null")]
    NullAccess { property: String },

    #[error("expression longer than {limit} bytes")]
    TooLong { limit: usize },

    #[error("expression nested too deeply (limit {limit})")]
    NestedTooDeeply { limit: usize },
}

/// Parse and evaluate `source` against `context`
pub fn evaluate(source: &str, context: &Context) -> EvalResult {
    let expr = parse(source)?;
    eval_expr(&expr, context)
}

/// Parse and evaluate `source`, coercing the result to a boolean
pub fn evaluate_condition(source: &str, context: &Context) -> Result<bool, ExpressionError> {
    evaluate(source, context).map(|value| value.is_truthy())
}
