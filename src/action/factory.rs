//! Reconstruction of action trees from JSON
//!
//! The factory is the single place that maps a `type` tag to a constructor
//! and checks the fields each action requires. Children of composites are
//! parsed recursively, so recursion depth equals tree depth.

use serde_json::Value as JsonValue;

use super::{
    Action, ActionType, ConditionAction, LoopAction, SendEmailAction, SendSmsAction,
};
use crate::error::MalformedActionError;

type FactoryResult<T> = Result<T, MalformedActionError>;

/// Stateless JSON → [`Action`] parser
pub struct ActionFactory;

impl ActionFactory {
    /// Build an action (and its children) from a JSON value
    pub fn from_json(value: &JsonValue) -> FactoryResult<Action> {
        let tag = match value.get("type") {
            None | Some(JsonValue::Null) => return Err(MalformedActionError::MissingType),
            Some(JsonValue::String(tag)) if tag.is_empty() => {
                return Err(MalformedActionError::MissingType)
            }
            Some(JsonValue::String(tag)) => tag.as_str(),
            Some(other) => return Err(MalformedActionError::UnknownType(other.to_string())),
        };

        let action_type = ActionType::from_tag(tag)
            .ok_or_else(|| MalformedActionError::UnknownType(tag.to_string()))?;

        match action_type {
            ActionType::SendSms => Self::create_send_sms(value).map(Action::from),
            ActionType::SendEmail => Self::create_send_email(value).map(Action::from),
            ActionType::Condition => Self::create_condition(value).map(Action::from),
            ActionType::Loop => Self::create_loop(value).map(Action::from),
        }
    }

    /// Parse and validate, treating any parse failure as invalid
    pub fn validate(value: &JsonValue) -> bool {
        Self::from_json(value)
            .map(|action| action.validate())
            .unwrap_or(false)
    }

    fn create_send_sms(value: &JsonValue) -> FactoryResult<SendSmsAction> {
        let action_type = ActionType::SendSms;
        let phone_number = required_str(value, "phoneNumber")
            .ok_or_else(|| MalformedActionError::missing(action_type, "phoneNumber"))?;
        let message = optional_str(value, action_type, "message")?;

        Ok(SendSmsAction::new(phone_number).with_optional(message))
    }

    fn create_send_email(value: &JsonValue) -> FactoryResult<SendEmailAction> {
        let action_type = ActionType::SendEmail;
        let (Some(sender), Some(receiver)) =
            (required_str(value, "sender"), required_str(value, "receiver"))
        else {
            return Err(MalformedActionError::missing(
                action_type,
                "sender and receiver",
            ));
        };
        let subject = optional_str(value, action_type, "subject")?;
        let body = optional_str(value, action_type, "body")?;

        Ok(SendEmailAction::new(sender, receiver).with_optional(subject, body))
    }

    fn create_condition(value: &JsonValue) -> FactoryResult<ConditionAction> {
        let expression = required_str(value, "expression")
            .ok_or_else(|| MalformedActionError::missing(ActionType::Condition, "expression"))?;

        let mut condition = ConditionAction::new(expression);

        if let Some(child) = child(value, "trueAction") {
            condition.set_true_action(Self::from_json(child)?);
        }
        if let Some(child) = child(value, "falseAction") {
            condition.set_false_action(Self::from_json(child)?);
        }

        Ok(condition)
    }

    /// `iterations` must be an integral number (`3.0` counts as 3)
    ///
    /// Zero and negative counts are accepted here and fail `validate()`. A
    /// fractional count such as `2.5` is rejected here as `InvalidField`
    /// instead, since no whole number of iterations corresponds to it.
    fn create_loop(value: &JsonValue) -> FactoryResult<LoopAction> {
        let action_type = ActionType::Loop;
        let iterations = match value.get("iterations") {
            Some(JsonValue::Number(n)) => integral(n)
                .ok_or_else(|| MalformedActionError::invalid(action_type, "iterations", "an integer"))?,
            _ => {
                return Err(MalformedActionError::missing(
                    action_type,
                    "iterations as a number",
                ))
            }
        };

        let mut repeat = LoopAction::new(iterations);

        if let Some(child) = child(value, "action") {
            repeat.set_action(Self::from_json(child)?);
        }

        Ok(repeat)
    }
}

/// Required string field; the empty string is accepted here and rejected by `validate()`
fn required_str<'a>(value: &'a JsonValue, field: &str) -> Option<&'a str> {
    value.get(field).and_then(JsonValue::as_str)
}

/// Optional string field; absent and `null` both mean "no value"
fn optional_str(
    value: &JsonValue,
    action_type: ActionType,
    field: &'static str,
) -> FactoryResult<Option<String>> {
    match value.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(MalformedActionError::invalid(action_type, field, "a string")),
    }
}

/// Child action field; absent and `null` both mean "no child"
fn child<'a>(value: &'a JsonValue, field: &str) -> Option<&'a JsonValue> {
    value.get(field).filter(|v| !v.is_null())
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}
