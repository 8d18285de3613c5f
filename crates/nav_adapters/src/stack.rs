use async_trait::async_trait;
use nav_core::{ModalPresenter, Presentable, StructuredPresenter};
use tokio::sync::Mutex;
use tracing::debug;

use crate::modal::ModalChain;

/// Linear push/pop navigation stack. `move_to` pops back to an entry already
/// on the stack instead of pushing a second copy of it.
pub struct StackPresenter {
    name: String,
    entries: Mutex<Vec<Presentable>>,
    modal: ModalChain,
}

impl StackPresenter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            modal: ModalChain::new(name.clone()),
            entries: Mutex::new(Vec::new()),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl StructuredPresenter for StackPresenter {
    fn should_animate(&self) -> bool {
        true
    }

    async fn all_structured_presented(&self) -> Vec<Presentable> {
        self.entries.lock().await.clone()
    }

    async fn reset_to(&self, presentables: Vec<Presentable>, animated: bool) {
        debug!(stack = %self.name, count = presentables.len(), animated, "reset");
        *self.entries.lock().await = presentables;
    }

    async fn move_to(&self, presentable: Presentable, animated: bool) {
        let mut entries = self.entries.lock().await;
        match entries.iter().position(|entry| entry == &presentable) {
            Some(index) => {
                debug!(stack = %self.name, target = %presentable, animated, "pop to existing entry");
                entries.truncate(index + 1);
            }
            None => {
                debug!(stack = %self.name, target = %presentable, animated, "push");
                entries.push(presentable);
            }
        }
    }

    async fn drop_last(&self, animated: bool) {
        match self.entries.lock().await.pop() {
            Some(dropped) => debug!(stack = %self.name, dropped = %dropped, animated, "dropped last entry"),
            None => debug!(stack = %self.name, "nothing to drop"),
        }
    }
}

#[async_trait]
impl ModalPresenter for StackPresenter {
    async fn current_modal_presented(&self) -> Option<Presentable> {
        self.modal.current().await
    }

    async fn show(&self, presentable: Presentable, animated: bool) {
        self.modal.present(presentable, animated).await;
    }

    async fn hide(&self, animated: bool) {
        self.modal.dismiss_top(animated).await;
    }
}

#[cfg(test)]
#[path = "tests/stack_tests.rs"]
mod tests;
