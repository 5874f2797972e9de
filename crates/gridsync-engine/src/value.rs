//! Type-erased result values
//!
//! Result kinds carry different payload types; the cache stores them erased
//! behind an `Arc` and hands typed access back through downcasting.

use std::any::Any;
use std::sync::Arc;

/// A fetched result, cheap to clone
#[derive(Clone)]
pub struct ResultValue(Arc<dyn Any + Send + Sync>);

impl ResultValue {
    /// Wrap a concrete result payload
    #[inline]
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Typed clone of the payload, `None` on a type mismatch
    #[inline]
    #[must_use]
    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        self.0.downcast_ref::<T>().cloned()
    }

    /// Borrow the payload as `T`, `None` on a type mismatch
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether the payload is a `T`
    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl std::fmt::Debug for ResultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResultValue").finish()
    }
}
