// Licensed under the Apache-2.0 license

//! Guard for the shared SHA staging memory
//!
//! All engines load input blocks into, and read digests out of, one scratch
//! memory bank. Access to that bank is serialized with interrupts masked
//! rather than with a blocking lock: each access lasts only as long as one
//! register block copy, and a waiter must never be descheduled in between.
//!
//! The guard does not authorize engine use. Callers must already hold the
//! engine token; the guard only orders bank accesses of different engines.
//! Nothing executed inside the guard may block or call back into the engine
//! lock protocol.

use core::sync::atomic::{AtomicBool, Ordering};
use critical_section::CriticalSection;

/// Process-wide exclusion for the staging memory bank
pub struct StagingMemory {
    active: AtomicBool,
}

/// Proof that the staging memory bank is exclusively owned
///
/// Only handed out by [`StagingMemory::with`] and only valid for the duration
/// of that call. Hardware code that touches the bank takes this as an
/// argument.
pub struct StagingBank<'cs> {
    cs: CriticalSection<'cs>,
}

impl<'cs> StagingBank<'cs> {
    /// The interrupt-masked section the bank is held under
    ///
    /// Lets hardware implementations borrow `critical_section::Mutex` state.
    #[must_use]
    pub fn critical_section(&self) -> CriticalSection<'cs> {
        self.cs
    }
}

impl StagingMemory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Run `f` with the staging memory bank held and interrupts masked
    ///
    /// # Panics
    /// Panics if called again from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&StagingBank<'_>) -> R) -> R {
        critical_section::with(|cs| {
            let reentered = self.active.swap(true, Ordering::Acquire);
            assert!(!reentered, "SHA staging memory guard re-entered");

            let result = f(&StagingBank { cs });

            self.active.store(false, Ordering::Release);
            result
        })
    }

    /// Whether the bank is held
    ///
    /// Exact when read inside a critical section; a snapshot otherwise.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Default for StagingMemory {
    fn default() -> Self {
        Self::new()
    }
}
