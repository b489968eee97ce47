//! Built-in example trees, printed by `decision-tree examples`

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleTree {
    pub name: &'static str,
    pub description: &'static str,
    pub tree: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

pub fn examples() -> Vec<ExampleTree> {
    vec![
        ExampleTree {
            name: "New Year Greeting",
            description: "Check if the date is 2025-01-01 and send an SMS",
            tree: json!({
                "rootAction": {
                    "type": "condition",
                    "expression": "date === \"2025-01-01\"",
                    "trueAction": {
                        "type": "send_sms",
                        "phoneNumber": "+1234567890",
                        "message": "Happy New Year!"
                    }
                },
                "context": {"date": "2025-01-01"}
            }),
            note: Some("Change context.date to see the condition fail."),
        },
        ExampleTree {
            name: "Send Email",
            description: "Send a single email",
            tree: json!({
                "rootAction": {
                    "type": "send_email",
                    "sender": "service@example.com",
                    "receiver": "user@example.com",
                    "subject": "First Email",
                    "body": "This is the first email"
                },
                "context": {}
            }),
            note: Some("A tree has one root action; there is no sequence action."),
        },
        ExampleTree {
            name: "10 Optional SMS",
            description: "Loop 10 times, check a condition, send an SMS if true",
            tree: json!({
                "rootAction": {
                    "type": "loop",
                    "iterations": 10,
                    "action": {
                        "type": "condition",
                        "expression": "loopIndex % 2 === 0",
                        "trueAction": {
                            "type": "send_sms",
                            "phoneNumber": "+1234567890",
                            "message": "Condition met for iteration"
                        }
                    }
                },
                "context": {}
            }),
            note: None,
        },
    ]
}

/// Look up an example by name, ignoring ASCII case
pub fn find(name: &str) -> Option<ExampleTree> {
    examples()
        .into_iter()
        .find(|example| example.name.eq_ignore_ascii_case(name))
}
