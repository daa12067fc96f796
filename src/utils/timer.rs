/*
 * Timing Services
 *
 * The session gate sleeps between acquisition attempts through the Delay
 * trait, so the host decides what sleeping means (scheduler sleep, timer
 * spin, or a test double).
 *
 * TickClock is the fallback for hosts without a scheduler sleep: the timer
 * interrupt handler advances it, and sleep_ms spins until enough uptime has
 * passed.
 */

use core::sync::atomic::{AtomicU64, Ordering};

/// Millisecond sleep provider
pub trait Delay: Sync {
    /// Sleep for approximately `ms` milliseconds
    fn sleep_ms(&self, ms: u64);
}

/// Uptime counter driven by a periodic timer interrupt
pub struct TickClock {
    uptime_ms: AtomicU64,
    ticks: AtomicU64,
}

impl TickClock {
    pub const fn new() -> Self {
        Self {
            uptime_ms: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
        }
    }

    /// Called from the timer interrupt handler, once per tick of `period_ms`
    pub fn on_tick(&self, period_ms: u64) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        self.uptime_ms.fetch_add(period_ms, Ordering::SeqCst);
    }

    /// Milliseconds since the clock started ticking
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_ms.load(Ordering::SeqCst)
    }

    /// Number of timer interrupts seen
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Delay for TickClock {
    fn sleep_ms(&self, ms: u64) {
        let start_time = self.uptime_ms();
        while self.uptime_ms().wrapping_sub(start_time) < ms {
            core::hint::spin_loop();
        }
    }
}
