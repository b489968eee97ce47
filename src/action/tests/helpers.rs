//! Test helpers for action tests
//!
//! Runtimes wired to notifiers that record or reject deliveries

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::action::{Action, ActionFactory, SendEmailAction, SendSmsAction};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::notify::{Notifier, RecordingNotifier};
use crate::runtime::Runtime;
use serde_json::Value as JsonValue;

/// Runtime whose notifier records every delivery
pub fn recording_runtime() -> (Runtime, Arc<RecordingNotifier>) {
    let recorder = Arc::new(RecordingNotifier::new());
    (Runtime::new(recorder.clone()), recorder)
}

/// Parse an action, panicking on malformed input
pub fn parse_action(value: &JsonValue) -> Action {
    ActionFactory::from_json(value).expect("Parse action failed")
}

/// Run an action to completion on the current test runtime
pub async fn run(action: &Action, context: &Context, runtime: &Runtime) -> Result<()> {
    action.execute(context, runtime).await
}

/// Notifier that accepts `fail_after` deliveries and rejects the rest
pub struct FailingNotifier {
    fail_after: usize,
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn new(fail_after: usize) -> Self {
        Self {
            fail_after,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn attempt(&self, channel: &'static str) -> Result<()> {
        let previous = self.attempts.fetch_add(1, Ordering::SeqCst);
        if previous < self.fail_after {
            Ok(())
        } else {
            Err(Error::Delivery {
                channel,
                message: "provider unavailable".to_string(),
            })
        }
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_sms(&self, _sms: &SendSmsAction, _context: &Context) -> Result<()> {
        self.attempt("sms")
    }

    async fn send_email(&self, _email: &SendEmailAction, _context: &Context) -> Result<()> {
        self.attempt("email")
    }
}
