//! Shared ownership of the one meter a session owns.

use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::{DeltaOutcome, MeterSnapshot, StressMeter};
use crate::config::{MeterConfig, MeterConfigError};
use crate::events::{StressEvent, SubscriptionId};

/// Owning handle to the session's meter.
///
/// Every mutation takes the lock once and holds it across clamping and
/// notification, so concurrent callers serialize and each call's
/// notifications arrive together and in order. Callbacks run under that
/// lock and must not call back into the meter.
#[derive(Debug, Clone)]
pub struct SharedMeter {
    inner: Arc<Mutex<StressMeter>>,
}

impl SharedMeter {
    pub fn new(meter: StressMeter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(meter)),
        }
    }

    pub fn from_config(config: MeterConfig) -> Result<Self, MeterConfigError> {
        StressMeter::new(config).map(Self::new)
    }

    /// A non-owning handle for feeders.
    pub fn handle(&self) -> MeterHandle {
        MeterHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn increase(&self, amount: f32) -> DeltaOutcome {
        self.lock().increase(amount)
    }

    pub fn decrease(&self, amount: f32) -> DeltaOutcome {
        self.lock().decrease(amount)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Run `f` on the meter under one lock, unless it is exhausted.
    ///
    /// Returns `None` without calling `f` when the meter is exhausted, so
    /// no other caller can exhaust it between the check and the change.
    pub fn unless_exhausted<R>(&self, f: impl FnOnce(&mut StressMeter) -> R) -> Option<R> {
        let mut meter = self.lock();
        if meter.is_exhausted() {
            return None;
        }
        Some(f(&mut meter))
    }

    pub fn current(&self) -> f32 {
        self.lock().current()
    }

    pub fn max(&self) -> f32 {
        self.lock().max()
    }

    pub fn danger_threshold(&self) -> f32 {
        self.lock().danger_threshold()
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().is_exhausted()
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        self.lock().snapshot()
    }

    pub fn subscribe(
        &self,
        callback: impl FnMut(&StressEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.lock().subscribe(callback)
    }

    pub fn subscribe_channel(&self) -> (SubscriptionId, mpsc::Receiver<StressEvent>) {
        self.lock().subscribe_channel()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    // A callback that panicked leaves the meter's invariants intact, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, StressMeter> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Non-owning reference to a [`SharedMeter`].
///
/// Resolves to nothing once the owning session is gone, or if it was
/// never attached to one.
#[derive(Debug, Clone, Default)]
pub struct MeterHandle {
    inner: Weak<Mutex<StressMeter>>,
}

impl MeterHandle {
    /// A handle that is not attached to any meter.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Get the meter if it is still alive.
    pub fn get(&self) -> Option<SharedMeter> {
        self.inner.upgrade().map(|inner| SharedMeter { inner })
    }

    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
