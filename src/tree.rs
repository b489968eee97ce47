//! Decision tree: a root action plus the context it runs against

use serde::{Serialize, Serializer};
use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::action::{Action, ActionFactory};
use crate::context::{self, Context};
use crate::error::{MalformedTreeError, Result};
use crate::runtime::Runtime;

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root_action: Action,
    context: Context,
}

impl DecisionTree {
    pub fn new(root_action: impl Into<Action>, context: Context) -> Self {
        Self {
            root_action: root_action.into(),
            context,
        }
    }

    pub fn root_action(&self) -> &Action {
        &self.root_action
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Replace the whole context
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    /// Execute the root action against the tree's context
    ///
    /// Failures propagate unchanged; the completion event is only emitted on success.
    pub async fn execute(&self, runtime: &Runtime) -> Result<()> {
        info!(
            root = %self.root_action.action_type(),
            variables = self.context.len(),
            "Starting decision tree execution"
        );

        self.root_action.execute(&self.context, runtime).await?;

        info!(root = %self.root_action.action_type(), "Decision tree execution completed");
        Ok(())
    }

    /// A tree is valid iff its root action validates
    pub fn validate(&self) -> bool {
        self.root_action.validate()
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "rootAction": self.root_action.to_json(),
            "context": context::to_json(&self.context),
        })
    }

    /// Parse `{ rootAction, context? }`
    ///
    /// A missing or `null` context becomes an empty one.
    pub fn from_json(value: &JsonValue) -> Result<DecisionTree> {
        let root_json = value
            .get("rootAction")
            .filter(|v| !v.is_null())
            .ok_or(MalformedTreeError::MissingRootAction)?;

        let root_action = ActionFactory::from_json(root_json)?;

        let context = match value.get("context") {
            None | Some(JsonValue::Null) => Context::new(),
            Some(ctx) => context::from_json(ctx).ok_or(MalformedTreeError::InvalidContext)?,
        };

        Ok(DecisionTree::new(root_action, context))
    }
}

impl Serialize for DecisionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
