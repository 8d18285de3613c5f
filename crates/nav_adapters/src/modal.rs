use nav_core::Presentable;
use tokio::sync::Mutex;
use tracing::debug;

/// Chain of modally presented surfaces owned by one adapter. The last entry
/// is the topmost layer.
pub(crate) struct ModalChain {
    owner: String,
    layers: Mutex<Vec<Presentable>>,
}

impl ModalChain {
    pub(crate) fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            layers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) async fn current(&self) -> Option<Presentable> {
        self.layers.lock().await.last().cloned()
    }

    pub(crate) async fn present(&self, presentable: Presentable, animated: bool) {
        debug!(owner = %self.owner, layer = %presentable, animated, "presenting modal layer");
        self.layers.lock().await.push(presentable);
    }

    pub(crate) async fn dismiss_top(&self, animated: bool) {
        match self.layers.lock().await.pop() {
            Some(layer) => debug!(owner = %self.owner, layer = %layer, animated, "dismissed modal layer"),
            None => debug!(owner = %self.owner, "nothing modal to dismiss"),
        }
    }
}
