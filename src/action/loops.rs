use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

use super::{child_to_json, Action, ActionType};
use crate::context::{self, Context};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Run an inner action a fixed number of times
///
/// Each iteration sees a fresh copy of the parent context extended with
/// `loopIndex` (0-based) and `loopIteration` (1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct LoopAction {
    iterations: i64,
    action: Option<Box<Action>>,
}

impl LoopAction {
    pub fn new(iterations: i64) -> Self {
        Self {
            iterations,
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<Action>) -> Self {
        self.set_action(action);
        self
    }

    pub fn set_action(&mut self, action: impl Into<Action>) {
        self.action = Some(Box::new(action.into()));
    }

    pub fn action_type(&self) -> ActionType {
        ActionType::Loop
    }

    pub fn iterations(&self) -> i64 {
        self.iterations
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_deref()
    }

    /// Run the inner action sequentially, aborting on the first failure
    ///
    /// The runtime's cancellation token is checked before every iteration.
    pub async fn execute(&self, context: &Context, runtime: &Runtime) -> Result<()> {
        info!(iterations = self.iterations, "Starting loop");

        let Some(action) = self.action() else {
            debug!("Loop has no action to execute");
            return Ok(());
        };

        for index in 0..self.iterations {
            if runtime.is_cancelled() {
                warn!(completed = index, iterations = self.iterations, "Loop cancelled");
                return Err(Error::Cancelled);
            }

            debug!(iteration = index + 1, iterations = self.iterations, "Loop iteration");
            let scoped = context::with_loop_counters(context, index);
            action.execute(&scoped, runtime).await?;
        }

        info!(iterations = self.iterations, "Loop completed");
        Ok(())
    }

    pub fn validate(&self) -> bool {
        self.iterations >= 1
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "type": ActionType::Loop,
            "iterations": self.iterations,
            "action": child_to_json(self.action()),
        })
    }
}
