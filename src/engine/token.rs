// Licensed under the Apache-2.0 license

//! Per-engine ownership tokens
//!
//! A token is a binary semaphore that starts out available. Holding it means
//! a context owns the engine slot; nothing else about the engine is implied.

use core::sync::atomic::{AtomicBool, Ordering};
use embedded_hal::delay::DelayNs;
use fugit::{MicrosDurationU32, MillisDurationU32};

/// Blocking primitive guarding one physical engine slot
///
/// Implementations decide the wake-up order of blocked takers; the arbiter
/// adds no fairness policy on top.
pub trait EngineToken {
    /// Take the token if it is available, without waiting
    fn try_take(&self) -> bool;

    /// Take the token, waiting as long as needed
    fn take(&self);

    /// Take the token, giving up once `timeout` has elapsed
    ///
    /// The default implementation polls [`EngineToken::try_take`] every
    /// `poll` and sleeps on `delay` in between. A zero timeout is a single
    /// attempt.
    fn take_timeout<D: DelayNs>(
        &self,
        timeout: MillisDurationU32,
        poll: MicrosDurationU32,
        delay: &mut D,
    ) -> bool {
        let step = poll.ticks().max(1);
        let mut remaining_us = u64::from(timeout.ticks()) * 1_000;
        loop {
            if self.try_take() {
                return true;
            }
            if remaining_us == 0 {
                return false;
            }
            let wait = u32::try_from(remaining_us.min(u64::from(step))).unwrap_or(step);
            delay.delay_us(wait);
            remaining_us = remaining_us.saturating_sub(u64::from(wait));
        }
    }

    /// Make the token available again
    fn give(&self);

    /// Whether some context currently holds the token
    ///
    /// This is a snapshot and only meaningful as an ownership sanity check.
    fn is_taken(&self) -> bool;
}

/// Lock-free token for bare-metal and RTOS targets
///
/// Waiting spins on the flag, so `take` must only be used where the holder
/// can make progress while the waiter spins (preemptive scheduling or
/// another core).
pub struct SpinToken {
    taken: AtomicBool,
}

impl SpinToken {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            taken: AtomicBool::new(false),
        }
    }
}

impl Default for SpinToken {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineToken for SpinToken {
    fn try_take(&self) -> bool {
        self.taken
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn take(&self) {
        loop {
            if self.try_take() {
                return;
            }
            while self.taken.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
        }
    }

    fn give(&self) {
        self.taken.store(false, Ordering::Release);
    }

    fn is_taken(&self) -> bool {
        self.taken.load(Ordering::Relaxed)
    }
}

#[cfg(any(test, feature = "std"))]
pub use self::std_token::StdToken;

#[cfg(any(test, feature = "std"))]
mod std_token {
    use super::EngineToken;
    use embedded_hal::delay::DelayNs;
    use fugit::{MicrosDurationU32, MillisDurationU32};
    use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
    use std::time::{Duration, Instant};

    /// Token backed by a std mutex and condition variable
    ///
    /// Blocked takers sleep in the OS scheduler. Used on hosted builds and in
    /// tests.
    pub struct StdToken {
        taken: Mutex<bool>,
        released: Condvar,
    }

    impl StdToken {
        #[must_use]
        pub const fn new() -> Self {
            Self {
                taken: Mutex::new(false),
                released: Condvar::new(),
            }
        }

        fn state(&self) -> MutexGuard<'_, bool> {
            self.taken.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Default for StdToken {
        fn default() -> Self {
            Self::new()
        }
    }

    impl EngineToken for StdToken {
        fn try_take(&self) -> bool {
            let mut taken = self.state();
            if *taken {
                return false;
            }
            *taken = true;
            true
        }

        fn take(&self) {
            let mut taken = self.state();
            while *taken {
                taken = self
                    .released
                    .wait(taken)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            *taken = true;
        }

        // Sleeps on the condition variable; `poll` and `delay` are not needed.
        fn take_timeout<D: DelayNs>(
            &self,
            timeout: MillisDurationU32,
            _poll: MicrosDurationU32,
            _delay: &mut D,
        ) -> bool {
            let deadline = Instant::now() + Duration::from_millis(u64::from(timeout.ticks()));
            let mut taken = self.state();
            while *taken {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                taken = self
                    .released
                    .wait_timeout(taken, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            *taken = true;
            true
        }

        fn give(&self) {
            *self.state() = false;
            self.released.notify_one();
        }

        fn is_taken(&self) -> bool {
            *self.state()
        }
    }
}
