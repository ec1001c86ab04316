use std::sync::OnceLock;

/// A value computed at most once per owner.
///
/// The first [`get_or_init`](CachedProperty::get_or_init) stores the value in
/// place; later reads return it directly. [`reset`](CachedProperty::reset) drops
/// the stored value and restores lazy evaluation.
#[derive(Debug, Clone, Default)]
pub struct CachedProperty<T> {
    cell: OnceLock<T>,
}

impl<T> CachedProperty<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.cell.get_or_init(init)
    }

    /// The stored value, if it has been computed.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Forget the stored value, returning it.
    pub fn reset(&mut self) -> Option<T> {
        self.cell.take()
    }
}
