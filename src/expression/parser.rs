//! PEST-based parser for condition expressions
//!
//! Produces the [`Expr`] AST consumed by the evaluator. Any input outside the
//! grammar is rejected with [`ExpressionError::Parse`]. Source length, bracket
//! nesting and tree height are bounded so that neither the parser nor the
//! evaluator can exhaust the stack.

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::{ExpressionError, MAX_DEPTH, MAX_NESTING, MAX_SOURCE_LEN};

#[derive(Parser)]
#[grammar = "expression/expression.pest"]
struct ExpressionParser;

type ParseResult<T> = Result<T, ExpressionError>;

/// An AST node together with the height of the tree rooted at it
type Built = (Expr, usize);

impl From<pest::error::Error<Rule>> for ExpressionError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ExpressionError::Parse(err.to_string())
    }
}

/// Parse an expression source string into an AST
pub fn parse(source: &str) -> ParseResult<Expr> {
    check_limits(source)?;

    let mut pairs = ExpressionParser::parse(Rule::expression, source)?;

    // expression = { SOI ~ ternary_expr ~ EOI }
    let expression = next_pair(&mut pairs, "expression")?;
    let mut inner = expression.into_inner();
    let body = next_pair(&mut inner, "expression body")?;

    build_expression(body).map(|(expr, _)| expr)
}

/// Reject oversized or deeply bracketed input before pest recurses into it
///
/// Every `?` counts as one nesting level: the alternate of a ternary never
/// closes, so `a ? b : c ? d : e ...` nests as deeply as parentheses do.
fn check_limits(source: &str) -> ParseResult<()> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(ExpressionError::TooLong {
            limit: MAX_SOURCE_LEN,
        });
    }

    let mut brackets = 0usize;
    let mut ternaries = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in source.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => brackets += 1,
            ')' | ']' => brackets = brackets.saturating_sub(1),
            '?' => ternaries += 1,
            _ => continue,
        }

        if brackets + ternaries > MAX_NESTING {
            return Err(ExpressionError::NestedTooDeeply { limit: MAX_NESTING });
        }
    }

    Ok(())
}

/// Height of a node whose tallest child has height `child`
fn grow(child: usize) -> ParseResult<usize> {
    let height = child + 1;
    if height > MAX_DEPTH {
        return Err(ExpressionError::NestedTooDeeply { limit: MAX_DEPTH });
    }
    Ok(height)
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, what: &str) -> ParseResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| ExpressionError::Parse(format!("incomplete {}", what)))
}

/// Descend through wrapper pairs that hold a single child and add no node
///
/// Every parenthesised level produces one pair per precedence rule; skipping
/// them here keeps `build_expression` at one frame per level.
fn skip_wrappers(mut pair: Pair<Rule>) -> Pair<Rule> {
    loop {
        match pair.as_rule() {
            Rule::ternary_expr
            | Rule::logical_or_expr
            | Rule::logical_and_expr
            | Rule::equality_expr
            | Rule::comparison_expr
            | Rule::additive_expr
            | Rule::multiplicative_expr
            | Rule::unary_expr
            | Rule::member_expr
            | Rule::primary
            | Rule::literal => {
                let mut inner = pair.clone().into_inner();
                match (inner.next(), inner.next()) {
                    (Some(only), None) => pair = only,
                    _ => return pair,
                }
            }
            _ => return pair,
        }
    }
}

fn build_expression(pair: Pair<Rule>) -> ParseResult<Built> {
    let pair = skip_wrappers(pair);

    match pair.as_rule() {
        Rule::ternary_expr => {
            let mut inner = pair.into_inner();
            let (condition, c_height) =
                build_expression(next_pair(&mut inner, "ternary condition")?)?;

            match inner.next() {
                Some(consequent_pair) => {
                    let (consequent, t_height) = build_expression(consequent_pair)?;
                    let (alternate, f_height) =
                        build_expression(next_pair(&mut inner, "ternary alternate")?)?;
                    let height = grow(c_height.max(t_height).max(f_height))?;
                    Ok((
                        Expr::Ternary {
                            condition: Box::new(condition),
                            consequent: Box::new(consequent),
                            alternate: Box::new(alternate),
                        },
                        height,
                    ))
                }
                None => Ok((condition, c_height)),
            }
        }
        Rule::logical_or_expr
        | Rule::logical_and_expr
        | Rule::equality_expr
        | Rule::comparison_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => build_binary_expr(pair),
        Rule::unary_expr => {
            // unary_expr = { (op_not | op_neg)* ~ member_expr }
            let mut ops = Vec::new();
            let mut operand = None;
            for part in pair.into_inner() {
                match part.as_rule() {
                    Rule::op_not => ops.push(UnaryOp::Not),
                    Rule::op_neg => ops.push(UnaryOp::Neg),
                    _ => operand = Some(part),
                }
            }

            let operand = operand
                .ok_or_else(|| ExpressionError::Parse("incomplete unary operand".to_string()))?;
            let (mut expr, mut height) = build_expression(operand)?;

            // Innermost operator applies first
            for op in ops.into_iter().rev() {
                height = grow(height)?;
                expr = Expr::Unary {
                    op,
                    operand: Box::new(expr),
                };
            }

            Ok((expr, height))
        }
        Rule::member_expr => {
            let mut inner = pair.into_inner();
            let (mut expr, mut height) = build_expression(next_pair(&mut inner, "member object")?)?;

            // Chain accesses left-to-right
            for access in inner {
                let rule = access.as_rule();
                let target = next_pair(&mut access.into_inner(), "member access")?;
                (expr, height) = match rule {
                    Rule::dot_access => (
                        Expr::Member {
                            object: Box::new(expr),
                            property: target.as_str().to_string(),
                        },
                        grow(height)?,
                    ),
                    Rule::index_access => {
                        let (index, i_height) = build_expression(target)?;
                        (
                            Expr::Index {
                                object: Box::new(expr),
                                index: Box::new(index),
                            },
                            grow(height.max(i_height))?,
                        )
                    }
                    other => {
                        return Err(ExpressionError::Parse(format!(
                            "Unexpected access rule: {:?}",
                            other
                        )))
                    }
                };
            }

            Ok((expr, height))
        }
        Rule::primary | Rule::literal => {
            let inner = next_pair(&mut pair.into_inner(), "primary expression")?;
            build_expression(inner)
        }
        Rule::identifier => Ok((
            Expr::Ident {
                name: pair.as_str().to_string(),
            },
            1,
        )),
        Rule::number => {
            let num_str = pair.as_str();
            let value = num_str.parse::<f64>().map_err(|e| {
                ExpressionError::Parse(format!("Failed to parse number '{}': {}", num_str, e))
            })?;
            Ok((Expr::LitNum { v: value }, 1))
        }
        Rule::boolean => Ok((
            Expr::LitBool {
                v: pair.as_str() == "true",
            },
            1,
        )),
        Rule::string => {
            let content = next_pair(&mut pair.into_inner(), "string literal")?;
            Ok((
                Expr::LitStr {
                    v: unescape(content.as_str()),
                },
                1,
            ))
        }
        Rule::null_lit => Ok((Expr::LitNull, 1)),
        other => Err(ExpressionError::Parse(format!(
            "Unexpected expression rule: {:?}",
            other
        ))),
    }
}

/// Fold `operand (op operand)*` into a left-associative tree
fn build_binary_expr(pair: Pair<Rule>) -> ParseResult<Built> {
    let mut inner = pair.into_inner();
    let (mut left, mut height) = build_expression(next_pair(&mut inner, "left operand")?)?;

    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_rule() {
            Rule::op_or => BinaryOp::Or,
            Rule::op_and => BinaryOp::And,
            Rule::op_strict_eq => BinaryOp::StrictEq,
            Rule::op_strict_ne => BinaryOp::StrictNe,
            Rule::op_eq => BinaryOp::Eq,
            Rule::op_ne => BinaryOp::Ne,
            Rule::op_lt => BinaryOp::Lt,
            Rule::op_lte => BinaryOp::Lte,
            Rule::op_gt => BinaryOp::Gt,
            Rule::op_gte => BinaryOp::Gte,
            Rule::op_add => BinaryOp::Add,
            Rule::op_sub => BinaryOp::Sub,
            Rule::op_mul => BinaryOp::Mul,
            Rule::op_div => BinaryOp::Div,
            Rule::op_mod => BinaryOp::Mod,
            other => {
                return Err(ExpressionError::Parse(format!(
                    "Expected operator, got {:?}",
                    other
                )))
            }
        };

        let (right, r_height) = build_expression(next_pair(&mut inner, "right operand")?)?;
        height = grow(height.max(r_height))?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }

    Ok((left, height))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
