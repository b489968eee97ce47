//! Per-execution environment shared by every action in a tree

use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::notify::{LogNotifier, Notifier};

/// Collaborators an executing tree needs besides its context
///
/// Cloning is cheap: the notifier is shared and clones of the cancellation
/// token observe the same cancellation.
#[derive(Clone)]
pub struct Runtime {
    notifier: Arc<dyn Notifier>,
    cancellation: CancellationToken,
}

impl Runtime {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            cancellation: CancellationToken::new(),
        }
    }

    /// Use an externally owned token, so the caller can cancel long loops
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(LogNotifier::default()))
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
