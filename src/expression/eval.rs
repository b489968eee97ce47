//! Expression evaluation
//!
//! Evaluates an [`Expr`] against a [`Context`]. The only names an expression
//! can see are the keys of the context; there are no globals and no calls.

use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::value::Val;
use super::{ExpressionError, MAX_DEPTH};
use crate::context::Context;

pub type EvalResult = Result<Val, ExpressionError>;

/// Evaluate an expression to a value
///
/// Trees taller than [`MAX_DEPTH`] are rejected, whether or not they came from
/// the parser.
pub fn eval_expr(expr: &Expr, context: &Context) -> EvalResult {
    eval_at(expr, context, 0)
}

fn eval_at(expr: &Expr, context: &Context, depth: usize) -> EvalResult {
    if depth >= MAX_DEPTH {
        return Err(ExpressionError::NestedTooDeeply { limit: MAX_DEPTH });
    }
    let depth = depth + 1;

    match expr {
        Expr::LitBool { v } => Ok(Val::Bool(*v)),

        Expr::LitNum { v } => Ok(Val::Num(*v)),

        Expr::LitStr { v } => Ok(Val::Str(v.clone())),

        Expr::LitNull => Ok(Val::Null),

        Expr::Ident { name } => context
            .get(name)
            .map(Val::from)
            .ok_or_else(|| ExpressionError::UnresolvedReference(name.clone())),

        Expr::Member { object, property } => {
            let object = eval_at(object, context, depth)?;
            read_property(&object, property)
        }

        Expr::Index { object, index } => {
            let object = eval_at(object, context, depth)?;
            let index = eval_at(index, context, depth)?;
            match (&object, &index) {
                (Val::List(items), Val::Num(n)) => Ok(list_element(items, *n)),
                (Val::Str(s), Val::Num(n)) => Ok(string_char(s, *n)),
                _ => read_property(&object, &index.to_display_string()),
            }
        }

        Expr::Unary { op, operand } => {
            let value = eval_at(operand, context, depth)?;
            Ok(match op {
                UnaryOp::Not => Val::Bool(!value.is_truthy()),
                UnaryOp::Neg => Val::Num(-value.to_number()),
            })
        }

        Expr::Binary { op, left, right } => eval_binary(*op, left, right, context, depth),

        Expr::Ternary {
            condition,
            consequent,
            alternate,
        } => {
            if eval_at(condition, context, depth)?.is_truthy() {
                eval_at(consequent, context, depth)
            } else {
                eval_at(alternate, context, depth)
            }
        }
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    context: &Context,
    depth: usize,
) -> EvalResult {
    // Short-circuit operators yield one of their operands
    match op {
        BinaryOp::And => {
            let l = eval_at(left, context, depth)?;
            return if l.is_truthy() {
                eval_at(right, context, depth)
            } else {
                Ok(l)
            };
        }
        BinaryOp::Or => {
            let l = eval_at(left, context, depth)?;
            return if l.is_truthy() {
                Ok(l)
            } else {
                eval_at(right, context, depth)
            };
        }
        _ => {}
    }

    let l = eval_at(left, context, depth)?;
    let r = eval_at(right, context, depth)?;

    let value = match op {
        BinaryOp::StrictEq => Val::Bool(strict_equals(&l, &r)),
        BinaryOp::StrictNe => Val::Bool(!strict_equals(&l, &r)),
        BinaryOp::Eq => Val::Bool(loose_equals(&l, &r)),
        BinaryOp::Ne => Val::Bool(!loose_equals(&l, &r)),
        BinaryOp::Lt => Val::Bool(compare(&l, &r) == Some(Ordering::Less)),
        BinaryOp::Lte => Val::Bool(matches!(
            compare(&l, &r),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Val::Bool(compare(&l, &r) == Some(Ordering::Greater)),
        BinaryOp::Gte => Val::Bool(matches!(
            compare(&l, &r),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Add => match (&l, &r) {
            (Val::Str(_), _) | (_, Val::Str(_)) => {
                Val::Str(format!("{}{}", l.to_display_string(), r.to_display_string()))
            }
            _ => Val::Num(l.to_number() + r.to_number()),
        },
        BinaryOp::Sub => Val::Num(l.to_number() - r.to_number()),
        BinaryOp::Mul => Val::Num(l.to_number() * r.to_number()),
        BinaryOp::Div => Val::Num(l.to_number() / r.to_number()),
        BinaryOp::Mod => Val::Num(l.to_number() % r.to_number()),
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit operators handled above"),
    };

    Ok(value)
}

/// `===`: same kind and same value; lists and objects compare structurally
fn strict_equals(l: &Val, r: &Val) -> bool {
    match (l, r) {
        (Val::Num(a), Val::Num(b)) => a == b,
        _ => l == r,
    }
}

/// `==`: like `===`, but numbers, strings and booleans are compared numerically
fn loose_equals(l: &Val, r: &Val) -> bool {
    match (l, r) {
        (Val::Null, Val::Null) => true,
        (Val::Null, _) | (_, Val::Null) => false,
        (Val::Num(_) | Val::Str(_) | Val::Bool(_), Val::Num(_) | Val::Str(_) | Val::Bool(_))
            if std::mem::discriminant(l) != std::mem::discriminant(r) =>
        {
            l.to_number() == r.to_number()
        }
        _ => strict_equals(l, r),
    }
}

/// Relational ordering: strings lexicographically, everything else numerically
///
/// `None` when the operands are unordered (any NaN).
fn compare(l: &Val, r: &Val) -> Option<Ordering> {
    match (l, r) {
        (Val::Str(a), Val::Str(b)) => Some(a.cmp(b)),
        _ => l.to_number().partial_cmp(&r.to_number()),
    }
}

fn read_property(object: &Val, property: &str) -> EvalResult {
    match object {
        Val::Null => Err(ExpressionError::NullAccess {
            property: property.to_string(),
        }),
        Val::Obj(map) => Ok(map.get(property).cloned().unwrap_or(Val::Null)),
        Val::List(items) if property == "length" => Ok(Val::Num(items.len() as f64)),
        Val::List(items) => Ok(property
            .parse::<f64>()
            .map(|n| list_element(items, n))
            .unwrap_or(Val::Null)),
        Val::Str(s) if property == "length" => Ok(Val::Num(s.chars().count() as f64)),
        _ => Ok(Val::Null),
    }
}

fn list_element(items: &[Val], n: f64) -> Val {
    if n.fract() != 0.0 || n < 0.0 {
        return Val::Null;
    }
    items.get(n as usize).cloned().unwrap_or(Val::Null)
}

fn string_char(s: &str, n: f64) -> Val {
    if n.fract() != 0.0 || n < 0.0 {
        return Val::Null;
    }
    s.chars()
        .nth(n as usize)
        .map(|c| Val::Str(c.to_string()))
        .unwrap_or(Val::Null)
}
