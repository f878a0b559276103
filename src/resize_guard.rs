//! Debug-only guard against nested resizes.
//!
//! A resize re-places every entry through the probe primitive, which never
//! checks load factors. In debug builds, starting a resize while one is in
//! flight panics and names both target capacities. In release builds this
//! compiles to nothing.

#[cfg(debug_assertions)]
use core::cell::Cell;

/// Per-table resize tracker. Hold the returned guard for the whole resize:
/// `let _g = self.resize_guard.begin(new_capacity);`.
#[derive(Debug, Default)]
pub(crate) struct DebugResizeGuard {
    #[cfg(debug_assertions)]
    target: Cell<Option<usize>>,
}

impl DebugResizeGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            target: Cell::new(None),
        }
    }

    /// Marks a resize towards `target` as in flight. In debug builds, panics
    /// if another resize has not finished.
    #[inline]
    pub(crate) fn begin(&self, target: usize) -> ResizeInFlight<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.target.get() {
                panic!("nested resize to capacity {target} while resizing to {outer}");
            }
            self.target.set(Some(target));
            return ResizeInFlight { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = target;
            return ResizeInFlight {
                _owner: core::marker::PhantomData,
            };
        }
    }

    #[cfg(all(test, debug_assertions))]
    fn in_flight(&self) -> Option<usize> {
        self.target.get()
    }
}

/// RAII marker returned by `DebugResizeGuard::begin`.
pub(crate) struct ResizeInFlight<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugResizeGuard,
    #[cfg(not(debug_assertions))]
    _owner: core::marker::PhantomData<&'a ()>,
}

impl Drop for ResizeInFlight<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.target.set(None);
    }
}
