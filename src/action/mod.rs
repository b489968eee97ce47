//! # Actions
//!
//! A decision tree is built from four kinds of action:
//!
//! - [`SendSmsAction`] and [`SendEmailAction`] are leaves. They hand their
//!   parameters to the runtime's [`Notifier`](crate::notify::Notifier).
//! - [`ConditionAction`] evaluates an expression and runs one of two optional branches.
//! - [`LoopAction`] runs an optional inner action a fixed number of times.
//!
//! [`Action`] is the closed sum over these kinds. Every capability
//! (execute, validate, to_json) is dispatched by a single `match`, so adding a
//! kind is a compile error until the factory and the serializer handle it.

mod condition;
mod email;
pub mod factory;
mod loops;
mod sms;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::context::Context;
use crate::error::{MalformedActionError, Result};
use crate::runtime::Runtime;

pub use condition::ConditionAction;
pub use email::SendEmailAction;
pub use factory::ActionFactory;
pub use loops::LoopAction;
pub use sms::SendSmsAction;

/// Boxed future returned by [`Action::execute`]
///
/// Boxing breaks the type-level recursion between composites and their children.
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Wire tag of an action (`type` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SendSms,
    SendEmail,
    Condition,
    Loop,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::SendSms,
        ActionType::SendEmail,
        ActionType::Condition,
        ActionType::Loop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::SendSms => "send_sms",
            ActionType::SendEmail => "send_email",
            ActionType::Condition => "condition",
            ActionType::Loop => "loop",
        }
    }

    /// Name used in error messages (`SendSmsAction requires phoneNumber`)
    pub fn class_name(&self) -> &'static str {
        match self {
            ActionType::SendSms => "SendSmsAction",
            ActionType::SendEmail => "SendEmailAction",
            ActionType::Condition => "ConditionAction",
            ActionType::Loop => "LoopAction",
        }
    }

    pub fn from_tag(tag: &str) -> Option<ActionType> {
        ActionType::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a decision tree
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SendSms(SendSmsAction),
    SendEmail(SendEmailAction),
    Condition(ConditionAction),
    Loop(LoopAction),
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::SendSms(_) => ActionType::SendSms,
            Action::SendEmail(_) => ActionType::SendEmail,
            Action::Condition(_) => ActionType::Condition,
            Action::Loop(_) => ActionType::Loop,
        }
    }

    /// Execute this action against `context`
    ///
    /// The context is borrowed immutably; composites that need extra
    /// variables build derived copies for their children.
    pub fn execute<'a>(&'a self, context: &'a Context, runtime: &'a Runtime) -> ActionFuture<'a> {
        Box::pin(async move {
            match self {
                Action::SendSms(action) => action.execute(context, runtime).await,
                Action::SendEmail(action) => action.execute(context, runtime).await,
                Action::Condition(action) => action.execute(context, runtime).await,
                Action::Loop(action) => action.execute(context, runtime).await,
            }
        })
    }

    /// Structural check of this node only; children are not visited
    pub fn validate(&self) -> bool {
        match self {
            Action::SendSms(action) => action.validate(),
            Action::SendEmail(action) => action.validate(),
            Action::Condition(action) => action.validate(),
            Action::Loop(action) => action.validate(),
        }
    }

    /// Project back to the wire shape accepted by [`ActionFactory::from_json`]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Action::SendSms(action) => action.to_json(),
            Action::SendEmail(action) => action.to_json(),
            Action::Condition(action) => action.to_json(),
            Action::Loop(action) => action.to_json(),
        }
    }

    pub fn from_json(value: &JsonValue) -> std::result::Result<Action, MalformedActionError> {
        ActionFactory::from_json(value)
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<SendSmsAction> for Action {
    fn from(action: SendSmsAction) -> Self {
        Action::SendSms(action)
    }
}

impl From<SendEmailAction> for Action {
    fn from(action: SendEmailAction) -> Self {
        Action::SendEmail(action)
    }
}

impl From<ConditionAction> for Action {
    fn from(action: ConditionAction) -> Self {
        Action::Condition(action)
    }
}

impl From<LoopAction> for Action {
    fn from(action: LoopAction) -> Self {
        Action::Loop(action)
    }
}

/// Serialize an optional child, using `null` when absent
fn child_to_json(child: Option<&Action>) -> JsonValue {
    child.map(Action::to_json).unwrap_or(JsonValue::Null)
}
