use std::{fmt, future::Future, sync::Arc};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    presentable::{Presentable, PresentableId},
    presenter::Presenter,
};

pub type CustomAction = Arc<dyn Fn(Arc<dyn Presenter>) -> BoxFuture<'static, ()> + Send + Sync>;

/// The closed set of navigation intents.
#[derive(Clone)]
pub enum Category {
    ResetTo(Vec<Presentable>),
    ModalPresent(Presentable),
    MoveTo(Presentable),
    Dismiss { all: bool },
    Custom { tag: u64, action: CustomAction },
}

impl Category {
    /// A caller-defined action dispatched like any other transition. The tag
    /// is the action's dispatch identity: two customs with the same tag are
    /// coalesced regardless of their closures.
    pub fn custom<F, Fut>(tag: u64, action: F) -> Self
    where
        F: Fn(Arc<dyn Presenter>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Category::Custom {
            tag,
            action: Arc::new(move |presenter| action(presenter).boxed()),
        }
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::ResetTo(presentables) => f.debug_tuple("ResetTo").field(presentables).finish(),
            Category::ModalPresent(presentable) => {
                f.debug_tuple("ModalPresent").field(presentable).finish()
            }
            Category::MoveTo(presentable) => f.debug_tuple("MoveTo").field(presentable).finish(),
            Category::Dismiss { all } => f.debug_struct("Dismiss").field("all", all).finish(),
            Category::Custom { tag, .. } => f.debug_struct("Custom").field("tag", tag).finish(),
        }
    }
}

/// Dispatch identity of a transition: derived once from the category and the
/// animation override, stable for the transition's lifetime. Used only for
/// dispatcher-level coalescing, never inside `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionIdentity {
    category: CategoryIdentity,
    animation: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CategoryIdentity {
    ResetTo(Vec<PresentableId>),
    ModalPresent(PresentableId),
    MoveTo(PresentableId),
    Dismiss { all: bool },
    Custom(u64),
}

impl CategoryIdentity {
    fn of(category: &Category) -> Self {
        match category {
            Category::ResetTo(presentables) => {
                CategoryIdentity::ResetTo(presentables.iter().map(Presentable::id).collect())
            }
            Category::ModalPresent(presentable) => CategoryIdentity::ModalPresent(presentable.id()),
            Category::MoveTo(presentable) => CategoryIdentity::MoveTo(presentable.id()),
            Category::Dismiss { all } => CategoryIdentity::Dismiss { all: *all },
            Category::Custom { tag, .. } => CategoryIdentity::Custom(*tag),
        }
    }
}

/// An immutable navigation command.
///
/// `animation: None` delegates the decision to the presenter's
/// `should_animate`; `Some(_)` overrides it.
#[derive(Debug, Clone)]
pub struct Transition {
    category: Category,
    animation: Option<bool>,
    identity: TransitionIdentity,
}

impl Transition {
    pub fn new(category: Category) -> Self {
        Self::with_animation(category, None)
    }

    pub fn animated(category: Category) -> Self {
        Self::with_animation(category, Some(true))
    }

    pub fn non_animated(category: Category) -> Self {
        Self::with_animation(category, Some(false))
    }

    fn with_animation(category: Category, animation: Option<bool>) -> Self {
        let identity = TransitionIdentity {
            category: CategoryIdentity::of(&category),
            animation,
        };
        Self {
            category,
            animation,
            identity,
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn animation(&self) -> Option<bool> {
        self.animation
    }

    pub fn identity(&self) -> &TransitionIdentity {
        &self.identity
    }

    /// Runs this transition against a presenter.
    ///
    /// Dismissals prefer the modal layer; with nothing presented on either
    /// layer the call resolves immediately as a no-op.
    pub async fn execute(&self, presenter: Arc<dyn Presenter>) {
        let animated = match self.animation {
            Some(animated) => animated,
            None => presenter.should_animate(),
        };

        match &self.category {
            Category::ResetTo(presentables) => {
                presenter.reset_to(presentables.clone(), animated).await;
            }
            Category::ModalPresent(presentable) => {
                presenter.show(presentable.clone(), animated).await;
            }
            Category::MoveTo(presentable) => {
                presenter.move_to(presentable.clone(), animated).await;
            }
            Category::Custom { action, .. } => {
                action(Arc::clone(&presenter)).await;
            }
            Category::Dismiss { all } => {
                if presenter.current_modal_presented().await.is_some() {
                    if *all {
                        presenter.hide_all(animated).await;
                    } else {
                        presenter.hide(animated).await;
                    }
                } else if !presenter.all_structured_presented().await.is_empty() {
                    if *all {
                        presenter.reset_to(Vec::new(), animated).await;
                    } else {
                        presenter.drop_last(animated).await;
                    }
                }
            }
        }
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Transition {}

#[cfg(test)]
#[path = "tests/transition_tests.rs"]
mod tests;
