pub mod error;
mod handler;
mod presentable;
mod presenter;
mod transition;

pub use error::HandlerDropped;
pub use handler::{HandlerConfig, SerialHandler};
pub use presentable::{Presentable, PresentableId};
pub use presenter::{AnyPresenter, ModalPresenter, Presenter, StructuredPresenter};
pub use transition::{Category, CustomAction, Transition, TransitionIdentity};
