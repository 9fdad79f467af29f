//! Data-ready latch shared between the interrupt context and the main loop.
//!
//! Exactly one writer (the data-ready handler) and one reader (the acquisition
//! step). The handler only ever sets the flag; the reader tests and clears it
//! in a single atomic swap, so a set that lands while the reader is consuming
//! is either observed now or left pending for the next cycle, never lost.
//!
//! There is no counting: two hardware events before one read collapse into a
//! single pending ready. That is the intended at-most-one-pending semantics.

use portable_atomic::{AtomicBool, Ordering};

/// What the sensor's interrupt line reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerKind {
    DataReady,
    Threshold,
    Tap,
}

/// Channel the trigger refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerChannel {
    All,
    Accel,
    Gyro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorTrigger {
    pub kind: TriggerKind,
    pub channel: TriggerChannel,
}

impl SensorTrigger {
    /// The only trigger the pipeline acts on.
    pub const DATA_READY_ALL: Self = Self {
        kind: TriggerKind::DataReady,
        channel: TriggerChannel::All,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadyState {
    Idle,
    Ready,
}

pub struct ReadySignal {
    pending: AtomicBool,
}

impl ReadySignal {
    /// Cleared at boot.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Interrupt-side entry point. Bounded, lock-free, allocation-free.
    ///
    /// Anything other than a data-ready trigger on all channels is ignored.
    /// Returns whether the trigger was accepted.
    pub fn on_trigger(&self, trigger: SensorTrigger) -> bool {
        if trigger != SensorTrigger::DATA_READY_ALL {
            return false;
        }
        self.set();
        true
    }

    /// IDLE -> READY.
    pub fn set(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Test-and-clear: READY -> IDLE, returning whether a ready was pending.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::Acquire)
    }

    pub fn state(&self) -> ReadyState {
        if self.pending.load(Ordering::Acquire) {
            ReadyState::Ready
        } else {
            ReadyState::Idle
        }
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}
