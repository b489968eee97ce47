//! Runtime value types for expression evaluation

use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Runtime value type
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
    Obj(HashMap<String, Val>),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    ///
    /// `false`, `0`, `NaN`, `""` and `null` are falsy; everything else,
    /// including empty lists and objects, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Null => false,
            Val::Bool(b) => *b,
            Val::Num(n) => *n != 0.0 && !n.is_nan(),
            Val::Str(s) => !s.is_empty(),
            Val::List(_) | Val::Obj(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic and relational operators
    pub fn to_number(&self) -> f64 {
        match self {
            Val::Null => 0.0,
            Val::Bool(true) => 1.0,
            Val::Bool(false) => 0.0,
            Val::Num(n) => *n,
            Val::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Val::List(_) | Val::Obj(_) => f64::NAN,
        }
    }

    /// String coercion used by `+` when either operand is a string
    pub fn to_display_string(&self) -> String {
        match self {
            Val::Null => "null".to_string(),
            Val::Bool(b) => b.to_string(),
            Val::Num(n) => format_number(*n),
            Val::Str(s) => s.clone(),
            Val::List(items) => items
                .iter()
                .map(|item| match item {
                    Val::Null => String::new(),
                    other => other.to_display_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Val::Obj(_) => "[object Object]".to_string(),
        }
    }
}

impl From<&JsonValue> for Val {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Val::Null,
            JsonValue::Bool(b) => Val::Bool(*b),
            JsonValue::Number(n) => Val::Num(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Val::Str(s.clone()),
            JsonValue::Array(items) => Val::List(items.iter().map(Val::from).collect()),
            JsonValue::Object(obj) => Val::Obj(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Val::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Integral numbers print without a fractional part (`3`, not `3.0`)
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() < 9.0e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
