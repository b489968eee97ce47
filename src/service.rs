//! Service layer: parse, validate, execute and shape the outcome
//!
//! Both entry points are total: every failure (malformed JSON, invalid
//! structure, evaluation error, delivery error) becomes a result value.

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tree::DecisionTree;

/// Outcome of [`DecisionTreeService::execute_decision_tree`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    /// Elapsed time from before parsing to completion or failure (milliseconds on the wire)
    #[serde(serialize_with = "serialize_millis")]
    pub execution_time: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    fn completed(execution_time: Duration) -> Self {
        Self {
            success: true,
            execution_time,
            error: None,
        }
    }

    fn failed(execution_time: Duration, error: &Error) -> Self {
        Self {
            success: false,
            execution_time,
            error: Some(error.to_string()),
        }
    }
}

/// Outcome of [`DecisionTreeService::validate_decision_tree`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn serialize_millis<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Service for decision tree operations
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeService {
    runtime: Runtime,
}

impl DecisionTreeService {
    pub fn new(runtime: Runtime) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Parse, validate and execute a tree, never returning an error
    ///
    /// A tree that parses but fails `validate()` is reported as
    /// `Invalid decision tree structure` without being executed.
    pub async fn execute_decision_tree(&self, tree_json: &JsonValue) -> ExecutionResult {
        let span = info_span!("execute_decision_tree", execution_id = %Uuid::new_v4());
        let started = Instant::now();

        let outcome = self.parse_and_execute(tree_json).instrument(span.clone()).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(()) => ExecutionResult::completed(elapsed),
            Err(err) => {
                span.in_scope(|| {
                    warn!(error = %err, structural = err.is_structural(), "Decision tree execution failed")
                });
                ExecutionResult::failed(elapsed, &err)
            }
        }
    }

    async fn parse_and_execute(&self, tree_json: &JsonValue) -> Result<()> {
        let tree = DecisionTree::from_json(tree_json)?;

        if !tree.validate() {
            return Err(Error::InvalidStructure);
        }

        tree.execute(&self.runtime).await
    }

    /// Parse and validate a tree without executing it
    pub fn validate_decision_tree(&self, tree_json: &JsonValue) -> ValidationResult {
        match DecisionTree::from_json(tree_json) {
            Ok(tree) if tree.validate() => ValidationResult {
                valid: true,
                error: None,
            },
            Ok(_) => ValidationResult {
                valid: false,
                error: Some(Error::InvalidStructure.to_string()),
            },
            Err(err) => ValidationResult {
                valid: false,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn serialize_decision_tree(&self, tree: &DecisionTree) -> JsonValue {
        tree.to_json()
    }

    pub fn deserialize_decision_tree(&self, tree_json: &JsonValue) -> Result<DecisionTree> {
        DecisionTree::from_json(tree_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Delivery, RecordingNotifier};
    use serde_json::json;
    use std::sync::Arc;

    fn recording_service() -> (DecisionTreeService, Arc<RecordingNotifier>) {
        let recorder = Arc::new(RecordingNotifier::new());
        let service = DecisionTreeService::new(Runtime::new(recorder.clone()));
        (service, recorder)
    }

    #[tokio::test]
    async fn test_execute_valid_tree() {
        let (service, recorder) = recording_service();

        let result = service
            .execute_decision_tree(&json!({
                "rootAction": {"type": "send_sms", "phoneNumber": "+1234567890", "message": "Test"}
            }))
            .await;

        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(recorder.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_condition_with_context() {
        let (service, recorder) = recording_service();

        let result = service
            .execute_decision_tree(&json!({
                "rootAction": {
                    "type": "condition",
                    "expression": "temperature > 30",
                    "trueAction": {"type": "send_sms", "phoneNumber": "+1", "message": "Hot"}
                },
                "context": {"temperature": 35}
            }))
            .await;

        assert!(result.success, "unexpected failure: {:?}", result.error);
        match recorder.deliveries().as_slice() {
            [Delivery::Sms { message, .. }] => assert_eq!(message.as_deref(), Some("Hot")),
            other => panic!("unexpected deliveries: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_loop() {
        let (service, recorder) = recording_service();

        let result = service
            .execute_decision_tree(&json!({
                "rootAction": {
                    "type": "loop",
                    "iterations": 3,
                    "action": {"type": "send_sms", "phoneNumber": "+1", "message": "Loop"}
                }
            }))
            .await;

        assert!(result.success);
        assert_eq!(recorder.len(), 3);
    }

    #[tokio::test]
    async fn test_execute_invalid_structure_is_not_run() {
        let (service, recorder) = recording_service();

        let result = service
            .execute_decision_tree(&json!({
                "rootAction": {"type": "send_sms", "phoneNumber": ""}
            }))
            .await;

        assert!(!result.success);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("Invalid decision tree structure"));
        assert!(recorder.is_empty());
    }

    #[tokio::test]
    async fn test_execute_missing_root_action() {
        let (service, _) = recording_service();

        let result = service.execute_decision_tree(&json!({})).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("missing rootAction"));
    }

    #[tokio::test]
    async fn test_execute_reports_evaluation_failure() {
        let (service, recorder) = recording_service();

        let result = service
            .execute_decision_tree(&json!({
                "rootAction": {
                    "type": "condition",
                    "expression": "invalid @#$%",
                    "falseAction": {"type": "send_sms", "phoneNumber": "+1"}
                }
            }))
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("failed to evaluate condition"));
        // No fallback to the false branch
        assert!(recorder.is_empty());
    }

    #[tokio::test]
    async fn test_execute_survives_deeply_nested_expressions() {
        let (service, recorder) = recording_service();
        let sources = [
            format!("{}1", "!".repeat(5000)),
            format!("{}1", "!".repeat(200)),
            format!("{}1{}", "(".repeat(100), ")".repeat(100)),
        ];

        for expression in sources {
            let result = service
                .execute_decision_tree(&json!({
                    "rootAction": {
                        "type": "condition",
                        "expression": expression,
                        "trueAction": {"type": "send_sms", "phoneNumber": "+1"}
                    }
                }))
                .await;

            assert!(!result.success);
            assert!(result.error.unwrap().contains("failed to evaluate condition"));
        }
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_validate_results() {
        let service = DecisionTreeService::default();

        let valid = service.validate_decision_tree(&json!({
            "rootAction": {"type": "send_sms", "phoneNumber": "+1234567890"}
        }));
        assert_eq!(
            valid,
            ValidationResult {
                valid: true,
                error: None
            }
        );

        let invalid = service.validate_decision_tree(&json!({
            "rootAction": {"type": "send_sms", "phoneNumber": ""}
        }));
        assert!(!invalid.valid);
        assert_eq!(invalid.error.as_deref(), Some("Invalid decision tree structure"));

        let missing = service.validate_decision_tree(&json!({}));
        assert!(!missing.valid);
        assert!(missing.error.unwrap().contains("missing rootAction"));
    }

    #[test]
    fn test_validate_does_not_execute() {
        let (service, recorder) = recording_service();

        let result = service.validate_decision_tree(&json!({
            "rootAction": {"type": "loop", "iterations": 5, "action": {"type": "send_sms", "phoneNumber": "+1"}}
        }));

        assert!(result.valid);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_result_wire_shape() {
        let ok = ExecutionResult::completed(Duration::from_millis(12));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"success": true, "executionTime": 12})
        );

        let failed = ExecutionResult::failed(Duration::from_millis(3), &Error::InvalidStructure);
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"success": false, "executionTime": 3, "error": "Invalid decision tree structure"})
        );
    }

    #[test]
    fn test_serialize_round_trip() {
        let service = DecisionTreeService::default();
        let tree_json = json!({
            "rootAction": {
                "type": "send_email",
                "sender": "a@example.com",
                "receiver": "b@example.com",
                "subject": "Hi",
                "body": null
            },
            "context": {}
        });

        let tree = service.deserialize_decision_tree(&tree_json).unwrap();
        assert_eq!(service.serialize_decision_tree(&tree), tree_json);
    }
}
