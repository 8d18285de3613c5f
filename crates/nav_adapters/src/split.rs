use std::sync::Arc;

use async_trait::async_trait;
use nav_core::{ModalPresenter, Presentable, StructuredPresenter};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{modal::ModalChain, stack::StackPresenter};

pub type CollapsedPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Master/detail container routing over two nested stacks.
///
/// The collapsed predicate is consulted on every operation: when collapsed,
/// everything routes to the master stack; when expanded, `reset_to` splits
/// its input into master head and detail tail, and `move_to`/`drop_last`
/// prefer the detail stack. Missing children are constructed on first use,
/// never reported as an error.
pub struct SplitPresenter {
    name: String,
    collapsed: CollapsedPredicate,
    children: Mutex<SplitChildren>,
    modal: ModalChain,
}

#[derive(Default)]
struct SplitChildren {
    master: Option<Arc<StackPresenter>>,
    detail: Option<Arc<StackPresenter>>,
}

impl SplitPresenter {
    pub fn new(name: impl Into<String>, collapsed: CollapsedPredicate) -> Self {
        let name = name.into();
        Self {
            modal: ModalChain::new(name.clone()),
            collapsed,
            children: Mutex::new(SplitChildren::default()),
            name,
        }
    }

    /// A split that never collapses.
    pub fn expanded(name: impl Into<String>) -> Self {
        Self::new(name, Arc::new(|| false))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_collapsed(&self) -> bool {
        (self.collapsed)()
    }

    /// The master stack, constructed if missing.
    pub async fn master(&self) -> Arc<StackPresenter> {
        let mut children = self.children.lock().await;
        self.master_locked(&mut children)
    }

    /// The detail stack, constructed if missing. While collapsed there is no
    /// separate detail surface, so this is the master stack.
    pub async fn detail(&self) -> Arc<StackPresenter> {
        let mut children = self.children.lock().await;
        if self.is_collapsed() {
            return self.master_locked(&mut children);
        }
        self.detail_locked(&mut children)
    }

    fn master_locked(&self, children: &mut SplitChildren) -> Arc<StackPresenter> {
        children
            .master
            .get_or_insert_with(|| {
                debug!(split = %self.name, "constructing missing master stack");
                Arc::new(StackPresenter::new(format!("{}/master", self.name)))
            })
            .clone()
    }

    fn detail_locked(&self, children: &mut SplitChildren) -> Arc<StackPresenter> {
        children
            .detail
            .get_or_insert_with(|| {
                debug!(split = %self.name, "constructing missing detail stack");
                Arc::new(StackPresenter::new(format!("{}/detail", self.name)))
            })
            .clone()
    }

    async fn prepare(&self) -> (Arc<StackPresenter>, Arc<StackPresenter>) {
        let mut children = self.children.lock().await;
        let master = self.master_locked(&mut children);
        let detail = if self.is_collapsed() {
            master.clone()
        } else {
            self.detail_locked(&mut children)
        };
        (master, detail)
    }
}

#[async_trait]
impl StructuredPresenter for SplitPresenter {
    fn should_animate(&self) -> bool {
        self.is_collapsed()
    }

    async fn all_structured_presented(&self) -> Vec<Presentable> {
        let (master, detail) = {
            let children = self.children.lock().await;
            (children.master.clone(), children.detail.clone())
        };
        let mut all = Vec::new();
        if let Some(master) = master {
            all.extend(master.all_structured_presented().await);
        }
        if let Some(detail) = detail {
            all.extend(detail.all_structured_presented().await);
        }
        all
    }

    async fn reset_to(&self, presentables: Vec<Presentable>, animated: bool) {
        let (master, detail) = self.prepare().await;
        if self.is_collapsed() {
            debug!(split = %self.name, count = presentables.len(), animated, "collapsed reset to master");
            master.reset_to(presentables, animated).await;
            return;
        }

        let mut tail = presentables;
        if tail.is_empty() {
            debug!(split = %self.name, animated, "expanded reset clears both stacks");
            master.reset_to(Vec::new(), animated).await;
            detail.reset_to(Vec::new(), animated).await;
            return;
        }
        let head = tail.remove(0);
        debug!(split = %self.name, head = %head, tail = tail.len(), animated, "expanded reset splits head and tail");
        master.reset_to(vec![head], animated).await;
        detail.reset_to(tail, animated).await;
    }

    async fn move_to(&self, presentable: Presentable, animated: bool) {
        let (master, detail) = self.prepare().await;
        if self.is_collapsed() {
            debug!(split = %self.name, target = %presentable, "collapsed move routes to master");
            master.move_to(presentable, animated).await;
        } else {
            debug!(split = %self.name, target = %presentable, "expanded move routes to detail");
            detail.move_to(presentable, animated).await;
        }
    }

    async fn drop_last(&self, animated: bool) {
        let (master, detail) = self.prepare().await;
        if self.is_collapsed() {
            debug!(split = %self.name, "collapsed drop routes to master");
            master.drop_last(animated).await;
            return;
        }
        if detail.all_structured_presented().await.is_empty() {
            debug!(split = %self.name, "expanded drop falls back to master; detail is empty");
            master.drop_last(animated).await;
        } else {
            debug!(split = %self.name, "expanded drop routes to detail");
            detail.drop_last(animated).await;
        }
    }
}

#[async_trait]
impl ModalPresenter for SplitPresenter {
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
#[path = "tests/split_tests.rs"]
mod tests;
