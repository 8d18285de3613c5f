use thiserror::Error;

/// The dispatcher was torn down before a submitted transition completed.
///
/// Callers must treat this as cancellation-by-abandonment: the transition may
/// or may not have reached the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("serial handler dropped before the transition completed")]
pub struct HandlerDropped;
