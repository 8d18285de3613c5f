use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

static NEXT_PRESENTABLE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PresentableId(pub u64);

/// Opaque handle to a displayable unit.
///
/// Equality is identity-based: two handles are equal iff they were cloned
/// from the same `new` call. The label is a human-readable tag used only for
/// logging; it never participates in identity.
#[derive(Debug, Clone)]
pub struct Presentable {
    id: PresentableId,
    label: Arc<str>,
}

impl Presentable {
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            id: PresentableId(NEXT_PRESENTABLE_ID.fetch_add(1, Ordering::Relaxed)),
            label: label.into(),
        }
    }

    pub fn id(&self) -> PresentableId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Presentable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Presentable {}

impl Hash for Presentable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Presentable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.id.0)
    }
}
