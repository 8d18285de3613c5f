use std::sync::Arc;

use async_trait::async_trait;

use crate::presentable::Presentable;

/// Capability to show and hide a single modal overlay.
///
/// A presenter owns at most one directly presented modal layer at a time;
/// nested layers are reached by presenting from the layer already shown, so
/// the observable state is a chain that `hide_all` unwinds one layer per call.
#[async_trait]
pub trait ModalPresenter: Send + Sync {
    async fn current_modal_presented(&self) -> Option<Presentable>;

    async fn show(&self, presentable: Presentable, animated: bool);

    /// Hides the topmost modal layer. Resolves immediately when nothing is
    /// presented.
    async fn hide(&self, animated: bool);

    async fn is_presenting(&self) -> bool {
        self.current_modal_presented().await.is_some()
    }

    /// Hides the topmost layer, re-checks, and repeats until no modal layer
    /// remains. Exactly one `hide` per presented layer.
    async fn hide_all(&self, animated: bool) {
        while self.current_modal_presented().await.is_some() {
            self.hide(animated).await;
        }
    }
}

/// Capability over an ordered stack of presented surfaces.
#[async_trait]
pub trait StructuredPresenter: Send + Sync {
    /// Default animation policy, consulted when a transition carries no
    /// explicit animation override.
    fn should_animate(&self) -> bool;

    async fn all_structured_presented(&self) -> Vec<Presentable>;

    async fn reset_to(&self, presentables: Vec<Presentable>, animated: bool);

    async fn move_to(&self, presentable: Presentable, animated: bool);

    async fn drop_last(&self, animated: bool);
}

/// The composite capability a transition executes against.
pub trait Presenter: ModalPresenter + StructuredPresenter {}

impl<T: ModalPresenter + StructuredPresenter> Presenter for T {}

/// Composes a modal capability and a structured capability into one
/// `Presenter`, delegating each method to the side that owns it.
pub struct AnyPresenter {
    modal: Arc<dyn ModalPresenter>,
    structured: Arc<dyn StructuredPresenter>,
}

impl AnyPresenter {
    pub fn compose(
        modal: Arc<dyn ModalPresenter>,
        structured: Arc<dyn StructuredPresenter>,
    ) -> Self {
        Self { modal, structured }
    }

    pub fn from_presenter<P: Presenter + 'static>(presenter: Arc<P>) -> Self {
        Self {
            modal: Arc::clone(&presenter) as Arc<dyn ModalPresenter>,
            structured: presenter,
        }
    }
}

#[async_trait]
impl ModalPresenter for AnyPresenter {
    async fn current_modal_presented(&self) -> Option<Presentable> {
        self.modal.current_modal_presented().await
    }

    async fn show(&self, presentable: Presentable, animated: bool) {
        self.modal.show(presentable, animated).await;
    }

    async fn hide(&self, animated: bool) {
        self.modal.hide(animated).await;
    }
}

#[async_trait]
impl StructuredPresenter for AnyPresenter {
    fn should_animate(&self) -> bool {
        self.structured.should_animate()
    }

    async fn all_structured_presented(&self) -> Vec<Presentable> {
        self.structured.all_structured_presented().await
    }

    async fn reset_to(&self, presentables: Vec<Presentable>, animated: bool) {
        self.structured.reset_to(presentables, animated).await;
    }

    async fn move_to(&self, presentable: Presentable, animated: bool) {
        self.structured.move_to(presentable, animated).await;
    }

    async fn drop_last(&self, animated: bool) {
        self.structured.drop_last(animated).await;
    }
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
