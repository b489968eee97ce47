pub mod action;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod expression;
pub mod logging;
pub mod notify;
pub mod runtime;
pub mod service;
pub mod tree;

// Re-export main types
pub use action::{
    Action, ActionFactory, ActionType, ConditionAction, LoopAction, SendEmailAction,
    SendSmsAction,
};
pub use context::Context;
pub use error::{Error, MalformedActionError, MalformedTreeError, Result};
pub use notify::{Delivery, LogNotifier, Notifier, RecordingNotifier};
pub use runtime::Runtime;
pub use service::{DecisionTreeService, ExecutionResult, ValidationResult};
pub use tree::DecisionTree;
