use serde_json::{json, Value as JsonValue};
use tracing::debug;

use super::ActionType;
use crate::context::Context;
use crate::error::Result;
use crate::runtime::Runtime;

/// Send an SMS to `phone_number`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendSmsAction {
    phone_number: String,
    message: Option<String>,
}

impl SendSmsAction {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub(crate) fn with_optional(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn action_type(&self) -> ActionType {
        ActionType::SendSms
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub async fn execute(&self, context: &Context, runtime: &Runtime) -> Result<()> {
        debug!(phone_number = %self.phone_number, "Dispatching SMS");
        runtime.notifier().send_sms(self, context).await
    }

    pub fn validate(&self) -> bool {
        !self.phone_number.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "type": ActionType::SendSms,
            "phoneNumber": self.phone_number,
            "message": self.message,
        })
    }
}
