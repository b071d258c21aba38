// src/clock/mod.rs

use crate::common::{hal_traits::TickInterruptSource, Tick};
use core::sync::atomic::{AtomicU32, Ordering};

/// Abstraction for the millisecond time base used by the drivers and the loop.
pub trait MonotonicClock {
    /// Current tick count.
    fn now(&self) -> Tick;

    /// Busy-waits until at least `ms` ticks have elapsed.
    ///
    /// Cooperative spin, not a sleep; fine for a single-threaded control loop.
    fn delay_ms(&self, ms: u32) {
        let start = self.now();
        while self.now().elapsed_since(start) < ms {
            core::hint::spin_loop();
        }
    }
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now(&self) -> Tick {
        (**self).now()
    }

    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Free-running millisecond counter advanced by the tick interrupt.
///
/// Single writer: only [`TickCounter::on_interrupt`] modifies the count, and it
/// must only be called from the tick interrupt handler. Every other component
/// reads it through [`MonotonicClock::now`]. A single-word load needs no
/// further synchronization.
#[derive(Debug)]
pub struct TickCounter {
    ticks: AtomicU32,
}

/// Process-wide counter for boards with one tick interrupt.
pub static SYSTEM_TICKS: TickCounter = TickCounter::new();

impl TickCounter {
    pub const fn new() -> Self {
        TickCounter {
            ticks: AtomicU32::new(0),
        }
    }

    /// Interrupt handler body: advance one tick, then acknowledge the source.
    ///
    /// Load followed by store rather than `fetch_add`, so cores without atomic
    /// read-modify-write instructions are supported. Sound only because this is
    /// the sole writer and the handler is not re-entered.
    #[inline]
    pub fn on_interrupt<S: TickInterruptSource + ?Sized>(&self, source: &mut S) {
        let next = self.ticks.load(Ordering::Relaxed).wrapping_add(1);
        self.ticks.store(next, Ordering::Release);
        source.acknowledge();
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for TickCounter {
    #[inline]
    fn now(&self) -> Tick {
        Tick(self.ticks.load(Ordering::Acquire))
    }
}
