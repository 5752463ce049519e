//! Progress reporting
//!
//! Observers are best-effort telemetry. A panicking observer is caught and
//! logged; the upload carries on.

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Receives the fraction of the file transferred, in `[0.0, 1.0]`
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, fraction: f64);
}

impl<F> ProgressObserver for F
where
    F: Fn(f64) + Send + Sync,
{
    fn on_progress(&self, fraction: f64) {
        self(fraction)
    }
}

/// Isolating wrapper around an optional observer.
///
/// Values passed on are clamped to `[0.0, 1.0]` and never decrease.
pub(crate) struct ProgressReporter<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    last: f64,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(observer: Option<&'a dyn ProgressObserver>) -> Self {
        Self { observer, last: 0.0 }
    }

    pub(crate) fn report(&mut self, fraction: f64) {
        let fraction = if fraction.is_nan() { self.last } else { fraction };
        let fraction = fraction.clamp(self.last, 1.0);
        self.last = fraction;

        let Some(observer) = self.observer else {
            return;
        };

        if catch_unwind(AssertUnwindSafe(|| observer.on_progress(fraction))).is_err() {
            tracing::warn!(fraction, "Progress observer panicked; continuing upload");
        }
    }
}
