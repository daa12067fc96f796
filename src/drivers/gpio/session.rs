/*
 * GPIO Session Gate
 *
 * Serialises access to the register window and both pins. At most one
 * session is open at any time; the session is the gate's lock guard, so
 * releasing or dropping it closes the session.
 *
 * States:
 * ```
 * CLOSED --acquire--> OPEN --release--> CLOSED
 * ```
 *
 * Acquisition polls: try the lock, and while it is held elsewhere sleep the
 * retry interval and try again. There is no fairness between waiters.
 * `acquire` waits indefinitely; `acquire_with` can give up after a timeout or
 * when a cancel flag is raised; `try_acquire` makes a single attempt.
 *
 * The gate is not re-entrant: a holder that acquires again waits for itself.
 */

use core::sync::atomic::{AtomicBool, Ordering};

use spin::{Mutex, MutexGuard};

use crate::io::Errno;
use crate::utils::timer::Delay;

/// Sleep between two acquisition attempts, in milliseconds
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 200;

/// Limits for a bounded acquisition
#[derive(Clone, Copy, Default)]
pub struct AcquireOptions<'a> {
    /// Give up once this many milliseconds were spent waiting
    pub timeout_ms: Option<u64>,
    /// Give up when this flag becomes true
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> AcquireOptions<'a> {
    pub const fn timeout(ms: u64) -> Self {
        Self {
            timeout_ms: Some(ms),
            cancel: None,
        }
    }

    pub const fn cancellable(flag: &'a AtomicBool) -> Self {
        Self {
            timeout_ms: None,
            cancel: Some(flag),
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Acquire))
    }
}

/// Exclusive session lock
pub struct SessionGate {
    lock: Mutex<()>,
    retry_interval_ms: u64,
}

/// An open session
///
/// Holding it grants full access to the register window.
#[must_use = "dropping the guard closes the session"]
pub struct SessionGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl SessionGuard<'_> {
    /// Close the session
    pub fn release(self) {
        drop(self);
    }
}

impl SessionGate {
    pub const fn new(retry_interval_ms: u64) -> Self {
        Self {
            lock: Mutex::new(()),
            retry_interval_ms,
        }
    }

    pub fn retry_interval_ms(&self) -> u64 {
        self.retry_interval_ms
    }

    /// Whether a session is currently open
    pub fn is_open(&self) -> bool {
        self.lock.is_locked()
    }

    /// Open a session if nobody holds one
    pub fn try_acquire(&self) -> Option<SessionGuard<'_>> {
        self.lock.try_lock().map(|guard| SessionGuard { _guard: guard })
    }

    /// Open a session, waiting as long as it takes
    pub fn acquire<D: Delay + ?Sized>(&self, delay: &D) -> SessionGuard<'_> {
        loop {
            if let Some(session) = self.try_acquire() {
                return session;
            }
            delay.sleep_ms(self.retry_interval_ms);
        }
    }

    /// Open a session, giving up on timeout (`ETIMEDOUT`) or cancel (`EINTR`)
    pub fn acquire_with<D: Delay + ?Sized>(
        &self,
        delay: &D,
        options: &AcquireOptions<'_>,
    ) -> Result<SessionGuard<'_>, Errno> {
        let mut waited_ms: u64 = 0;
        loop {
            if let Some(session) = self.try_acquire() {
                return Ok(session);
            }
            if options.cancelled() {
                return Err(Errno::EINTR);
            }
            if options.timeout_ms.is_some_and(|limit| waited_ms >= limit) {
                return Err(Errno::ETIMEDOUT);
            }
            delay.sleep_ms(self.retry_interval_ms);
            waited_ms = waited_ms.saturating_add(self.retry_interval_ms);
        }
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_INTERVAL_MS)
    }
}
