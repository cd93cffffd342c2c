//! Save notification bus.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HostError;

use super::handler::SaveOutcome;

/// Receives "document saved" notifications.
#[async_trait]
pub trait SaveListener: Send + Sync {
    async fn on_saved(&self, path: &Path) -> Result<SaveOutcome, HostError>;
}

/// Dispatches save notifications to listeners in registration order.
///
/// Listeners run one after another; a notification finishes before the next
/// listener sees it.
#[derive(Default)]
pub struct SaveBus {
    listeners: Vec<Arc<dyn SaveListener>>,
}

impl SaveBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn SaveListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver one notification. Returns each listener's result in order.
    pub async fn publish(&self, path: &Path) -> Vec<Result<SaveOutcome, HostError>> {
        let mut results = Vec::with_capacity(self.listeners.len());
        for listener in &self.listeners {
            results.push(listener.on_saved(path).await);
        }
        results
    }
}
