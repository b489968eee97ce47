use serde_json::{json, Value as JsonValue};
use tracing::debug;

use super::ActionType;
use crate::context::Context;
use crate::error::Result;
use crate::runtime::Runtime;

/// Send an email from `sender` to `receiver`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEmailAction {
    sender: String,
    receiver: String,
    subject: Option<String>,
    body: Option<String>,
}

impl SendEmailAction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            subject: None,
            body: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub(crate) fn with_optional(mut self, subject: Option<String>, body: Option<String>) -> Self {
        self.subject = subject;
        self.body = body;
        self
    }

    pub fn action_type(&self) -> ActionType {
        ActionType::SendEmail
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub async fn execute(&self, context: &Context, runtime: &Runtime) -> Result<()> {
        debug!(sender = %self.sender, receiver = %self.receiver, "Dispatching email");
        runtime.notifier().send_email(self, context).await
    }

    /// Both addresses must be non-empty; subject and body are unconstrained
    pub fn validate(&self) -> bool {
        !self.sender.is_empty() && !self.receiver.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "type": ActionType::SendEmail,
            "sender": self.sender,
            "receiver": self.receiver,
            "subject": self.subject,
            "body": self.body,
        })
    }
}
