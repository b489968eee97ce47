//! Tests for LoopAction

use super::helpers::{parse_action, recording_runtime, run, FailingNotifier};
use crate::action::{Action, ConditionAction, LoopAction, SendSmsAction};
use crate::context::{Context, LOOP_INDEX, LOOP_ITERATION};
use crate::error::Error;
use crate::runtime::Runtime;
use maplit::hashmap;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn sms_loop(iterations: i64) -> Action {
    LoopAction::new(iterations)
        .with_action(SendSmsAction::new("+1").with_message("tick"))
        .into()
}

#[tokio::test]
async fn test_iterations_see_counters_in_order() {
    let (runtime, recorder) = recording_runtime();
    let context = hashmap! { "campaign".to_string() => json!("spring") };

    run(&sms_loop(3), &context, &runtime).await.unwrap();

    let deliveries = recorder.deliveries();
    assert_eq!(deliveries.len(), 3);
    for (index, delivery) in deliveries.iter().enumerate() {
        let ctx = delivery.context();
        assert_eq!(ctx.get(LOOP_INDEX), Some(&json!(index)));
        assert_eq!(ctx.get(LOOP_ITERATION), Some(&json!(index + 1)));
        assert_eq!(ctx.get("campaign"), Some(&json!("spring")));
    }
    // Parent context is untouched
    assert_eq!(context.len(), 1);
}

#[tokio::test]
async fn test_counters_shadow_parent_values() {
    let (runtime, recorder) = recording_runtime();
    let context = hashmap! { LOOP_INDEX.to_string() => json!("outer") };

    run(&sms_loop(1), &context, &runtime).await.unwrap();

    assert_eq!(recorder.deliveries()[0].context().get(LOOP_INDEX), Some(&json!(0)));
    assert_eq!(context.get(LOOP_INDEX), Some(&json!("outer")));
}

#[tokio::test]
async fn test_condition_on_loop_index() {
    let (runtime, recorder) = recording_runtime();
    let action = Action::from(LoopAction::new(10).with_action(
        ConditionAction::new("loopIndex % 2 === 0").with_true_action(SendSmsAction::new("+1")),
    ));

    run(&action, &Context::new(), &runtime).await.unwrap();

    assert_eq!(recorder.len(), 5);
}

#[tokio::test]
async fn test_nested_loops_use_innermost_counters() {
    let (runtime, recorder) = recording_runtime();
    let action = Action::from(LoopAction::new(2).with_action(LoopAction::new(3).with_action(SendSmsAction::new("+1"))));

    run(&action, &Context::new(), &runtime).await.unwrap();

    let indexes: Vec<_> = recorder
        .deliveries()
        .iter()
        .map(|d| d.context()[LOOP_INDEX].clone())
        .collect();
    assert_eq!(
        indexes,
        vec![json!(0), json!(1), json!(2), json!(0), json!(1), json!(2)]
    );
}

#[tokio::test]
async fn test_missing_action_is_a_no_op() {
    let (runtime, recorder) = recording_runtime();

    run(&Action::from(LoopAction::new(5)), &Context::new(), &runtime)
        .await
        .unwrap();

    assert!(recorder.is_empty());
}

#[tokio::test]
async fn test_aborts_on_first_failure() {
    let notifier = Arc::new(FailingNotifier::new(2));
    let runtime = Runtime::new(notifier.clone());

    let err = run(&sms_loop(5), &Context::new(), &runtime).await.unwrap_err();

    assert!(matches!(err, Error::Delivery { .. }));
    // Two successes, one failure, no further iterations
    assert_eq!(notifier.attempts(), 3);
}

#[tokio::test]
async fn test_cancelled_before_first_iteration() {
    let (runtime, recorder) = recording_runtime();
    let token = CancellationToken::new();
    let runtime = runtime.with_cancellation(token.clone());
    token.cancel();

    let err = run(&sms_loop(3), &Context::new(), &runtime).await.unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert!(recorder.is_empty());
}

#[test]
fn test_validate_requires_positive_iterations() {
    assert!(LoopAction::new(1).validate());
    assert!(!LoopAction::new(0).validate());
    assert!(!LoopAction::new(-3).validate());
}

#[test]
fn test_round_trip() {
    let original = json!({
        "type": "loop",
        "iterations": 3,
        "action": {"type": "send_sms", "phoneNumber": "+1", "message": "Loop message"}
    });

    let action = parse_action(&original);
    assert_eq!(action.to_json(), original);

    let empty = json!({"type": "loop", "iterations": 2, "action": null});
    assert_eq!(parse_action(&empty).to_json(), empty);
}
