use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use super::{child_to_json, Action, ActionType};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::expression;
use crate::runtime::Runtime;

/// Branch on a boolean expression over the context
///
/// The expression is parsed and evaluated at execution time, so an
/// unparsable expression passes `validate()` and fails in `execute()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionAction {
    expression: String,
    true_action: Option<Box<Action>>,
    false_action: Option<Box<Action>>,
}

impl ConditionAction {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            true_action: None,
            false_action: None,
        }
    }

    pub fn with_true_action(mut self, action: impl Into<Action>) -> Self {
        self.set_true_action(action);
        self
    }

    pub fn with_false_action(mut self, action: impl Into<Action>) -> Self {
        self.set_false_action(action);
        self
    }

    pub fn set_true_action(&mut self, action: impl Into<Action>) {
        self.true_action = Some(Box::new(action.into()));
    }

    pub fn set_false_action(&mut self, action: impl Into<Action>) {
        self.false_action = Some(Box::new(action.into()));
    }

    pub fn action_type(&self) -> ActionType {
        ActionType::Condition
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn true_action(&self) -> Option<&Action> {
        self.true_action.as_deref()
    }

    pub fn false_action(&self) -> Option<&Action> {
        self.false_action.as_deref()
    }

    /// Evaluate the expression and run the selected branch, if attached
    ///
    /// Only evaluation failures are wrapped in [`Error::Evaluation`]; errors
    /// raised by the branch propagate unchanged.
    pub async fn execute(&self, context: &Context, runtime: &Runtime) -> Result<()> {
        debug!(expression = %self.expression, "Evaluating condition");

        let outcome = expression::evaluate_condition(&self.expression, context).map_err(
            |source| Error::Evaluation {
                expression: self.expression.clone(),
                source,
            },
        )?;
        info!(expression = %self.expression, result = outcome, "Condition evaluated");

        let (label, branch) = if outcome {
            ("true", self.true_action())
        } else {
            ("false", self.false_action())
        };

        match branch {
            Some(action) => {
                debug!(branch = label, "Executing branch");
                action.execute(context, runtime).await
            }
            None => {
                debug!(branch = label, "No action attached to branch");
                Ok(())
            }
        }
    }

    pub fn validate(&self) -> bool {
        !self.expression.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "type": ActionType::Condition,
            "expression": self.expression,
            "trueAction": child_to_json(self.true_action()),
            "falseAction": child_to_json(self.false_action()),
        })
    }
}
