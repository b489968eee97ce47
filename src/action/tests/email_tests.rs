//! Tests for SendEmailAction

use super::helpers::{parse_action, recording_runtime, run};
use crate::action::{Action, ActionType, SendEmailAction};
use crate::context::Context;
use crate::notify::Delivery;
use serde_json::json;

#[test]
fn test_accessors() {
    let email = SendEmailAction::new("noreply@example.com", "user@example.com")
        .with_subject("Welcome")
        .with_body("Thanks for signing up");

    assert_eq!(email.action_type(), ActionType::SendEmail);
    assert_eq!(email.sender(), "noreply@example.com");
    assert_eq!(email.receiver(), "user@example.com");
    assert_eq!(email.subject(), Some("Welcome"));
    assert_eq!(email.body(), Some("Thanks for signing up"));
}

#[test]
fn test_validate_requires_sender_and_receiver() {
    assert!(SendEmailAction::new("a@example.com", "b@example.com").validate());
    assert!(!SendEmailAction::new("", "b@example.com").validate());
    assert!(!SendEmailAction::new("a@example.com", "").validate());
}

#[test]
fn test_round_trip_with_null_optionals() {
    let original = json!({
        "type": "send_email",
        "sender": "a@example.com",
        "receiver": "b@example.com",
        "subject": null,
        "body": null
    });

    let action = parse_action(&original);
    assert_eq!(action.to_json(), original);
}

#[test]
fn test_absent_optionals_serialize_as_null() {
    let action = parse_action(&json!({
        "type": "send_email",
        "sender": "a@example.com",
        "receiver": "b@example.com",
        "subject": "Hi"
    }));

    assert_eq!(action.to_json()["body"], json!(null));
    assert_eq!(action.to_json()["subject"], json!("Hi"));
}

#[tokio::test]
async fn test_execute_delivers_once() {
    let (runtime, recorder) = recording_runtime();
    let action = Action::from(SendEmailAction::new("a@example.com", "b@example.com").with_subject("Hi"));

    run(&action, &Context::new(), &runtime).await.unwrap();

    match recorder.deliveries().as_slice() {
        [Delivery::Email {
            sender,
            receiver,
            subject,
            body,
            ..
        }] => {
            assert_eq!(sender, "a@example.com");
            assert_eq!(receiver, "b@example.com");
            assert_eq!(subject.as_deref(), Some("Hi"));
            assert_eq!(body, &None);
        }
        other => panic!("unexpected deliveries: {:?}", other),
    }
}
