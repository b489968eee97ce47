//! Delivery of leaf-action effects
//!
//! Leaf actions never talk to an SMS or email provider directly. They hand
//! their parameters to a [`Notifier`], which is the one point where tree
//! execution may suspend on I/O. The crate ships two notifiers: one that
//! only emits tracing events, and one that records what it was asked to send.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::action::{SendEmailAction, SendSmsAction};
use crate::context::{self, Context};
use crate::error::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_sms(&self, sms: &SendSmsAction, context: &Context) -> Result<()>;

    async fn send_email(&self, email: &SendEmailAction, context: &Context) -> Result<()>;
}

/// Notifier that records each delivery as a tracing event
#[derive(Debug, Clone)]
pub struct LogNotifier {
    log_context: bool,
}

impl LogNotifier {
    pub fn new(log_context: bool) -> Self {
        Self { log_context }
    }

    fn context_field(&self, context: &Context) -> Option<String> {
        if self.log_context && !context.is_empty() {
            Some(context::to_json(context).to_string())
        } else {
            None
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_sms(&self, sms: &SendSmsAction, context: &Context) -> Result<()> {
        info!(
            phone_number = %sms.phone_number(),
            text = sms.message(),
            context = self.context_field(context).as_deref(),
            "Sending SMS"
        );
        Ok(())
    }

    async fn send_email(&self, email: &SendEmailAction, context: &Context) -> Result<()> {
        info!(
            sender = %email.sender(),
            receiver = %email.receiver(),
            subject = email.subject(),
            body = email.body(),
            context = self.context_field(context).as_deref(),
            "Sending email"
        );
        Ok(())
    }
}

/// A delivery captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Sms {
        phone_number: String,
        message: Option<String>,
        context: Context,
    },
    Email {
        sender: String,
        receiver: String,
        subject: Option<String>,
        body: Option<String>,
        context: Context,
    },
}

impl Delivery {
    pub fn context(&self) -> &Context {
        match self {
            Delivery::Sms { context, .. } | Delivery::Email { context, .. } => context,
        }
    }
}

/// Notifier that keeps every delivery, in order, for later inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Delivery>> {
        // Poisoning is ignored: pushes leave the Vec consistent
        self.deliveries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_sms(&self, sms: &SendSmsAction, context: &Context) -> Result<()> {
        self.lock().push(Delivery::Sms {
            phone_number: sms.phone_number().to_string(),
            message: sms.message().map(str::to_string),
            context: context.clone(),
        });
        Ok(())
    }

    async fn send_email(&self, email: &SendEmailAction, context: &Context) -> Result<()> {
        self.lock().push(Delivery::Email {
            sender: email.sender().to_string(),
            receiver: email.receiver().to_string(),
            subject: email.subject().map(str::to_string),
            body: email.body().map(str::to_string),
            context: context.clone(),
        });
        Ok(())
    }
}
