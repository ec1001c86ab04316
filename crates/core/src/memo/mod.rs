//! Result caches for deterministic computations.
//!
//! - [`Memo`] caches a pure function by its typed argument key.
//! - [`MethodMemo`] is the per-instance form: a field on the owning struct keyed by
//!   method name and arguments.
//! - [`CachedProperty`] is a value computed at most once per instance until reset.
//!
//! Entries are never evicted. Tables are guarded by a mutex that is released while
//! the value is computed, so a computation may itself consult other caches.

pub mod function;
pub mod method;
pub mod property;

pub use function::{CacheStats, Memo};
pub use method::MethodMemo;
pub use property::CachedProperty;
