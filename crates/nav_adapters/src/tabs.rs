use async_trait::async_trait;
use nav_core::{ModalPresenter, Presentable, StructuredPresenter};
use tokio::sync::Mutex;
use tracing::debug;

use crate::modal::ModalChain;

/// Tab container. `move_to` selects a child already present instead of
/// adding it twice; unknown children are appended and selected.
pub struct TabsPresenter {
    name: String,
    state: Mutex<TabsState>,
    modal: ModalChain,
}

#[derive(Default)]
struct TabsState {
    children: Vec<Presentable>,
    selected: Option<usize>,
}

impl TabsPresenter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            modal: ModalChain::new(name.clone()),
            state: Mutex::new(TabsState::default()),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn selected(&self) -> Option<Presentable> {
        let state = self.state.lock().await;
        state
            .selected
            .and_then(|index| state.children.get(index).cloned())
    }
}

#[async_trait]
impl StructuredPresenter for TabsPresenter {
    fn should_animate(&self) -> bool {
        true
    }

    async fn all_structured_presented(&self) -> Vec<Presentable> {
        self.state.lock().await.children.clone()
    }

    async fn reset_to(&self, presentables: Vec<Presentable>, animated: bool) {
        debug!(tabs = %self.name, count = presentables.len(), animated, "reset children");
        let mut state = self.state.lock().await;
        state.selected = if presentables.is_empty() { None } else { Some(0) };
        state.children = presentables;
    }

    async fn move_to(&self, presentable: Presentable, animated: bool) {
        let mut state = self.state.lock().await;
        match state.children.iter().position(|child| child == &presentable) {
            Some(index) => {
                debug!(tabs = %self.name, target = %presentable, index, "selecting existing child");
                state.selected = Some(index);
            }
            None => {
                debug!(tabs = %self.name, target = %presentable, animated, "appending and selecting child");
                state.children.push(presentable);
                state.selected = Some(state.children.len() - 1);
            }
        }
    }

    async fn drop_last(&self, animated: bool) {
        let mut state = self.state.lock().await;
        match state.children.pop() {
            Some(dropped) => {
                debug!(tabs = %self.name, dropped = %dropped, animated, "dropped last child");
                state.selected = match state.children.len() {
                    0 => None,
                    len => state.selected.map(|index| index.min(len - 1)),
                };
            }
            None => debug!(tabs = %self.name, "no children to drop"),
        }
    }
}

#[async_trait]
impl ModalPresenter for TabsPresenter {
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
#[path = "tests/tabs_tests.rs"]
mod tests;
