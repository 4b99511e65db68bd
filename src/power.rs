// Licensed under the Apache-2.0 license

//! Reference-counted clock gate for the shared SHA peripheral
//!
//! The peripheral clock runs while at least one engine slot is held. The
//! hold count and the clock collaborator sit behind one critical section, so
//! a concurrent release can never switch the clock off between another
//! context's enable and its increment.

use crate::engine::ENGINE_SLOTS;
use core::cell::RefCell;
use critical_section::{CriticalSection, Mutex};

/// Clock and reset control for the SHA peripheral
pub trait PeripheralClock {
    /// Ungate the clock and take the block out of reset
    fn enable(&mut self);

    /// Put the block back into reset and gate its clock
    fn disable(&mut self);
}

struct GateState<P> {
    held: u8,
    clock: P,
}

pub struct PowerGate<P> {
    state: Mutex<RefCell<GateState<P>>>,
}

impl<P: PeripheralClock> PowerGate<P> {
    #[must_use]
    pub const fn new(clock: P) -> Self {
        Self {
            state: Mutex::new(RefCell::new(GateState { held: 0, clock })),
        }
    }

    /// Record one more held slot, enabling the clock on the first
    ///
    /// Returns the new hold count.
    ///
    /// # Panics
    /// Panics if the count would exceed the number of physical slots.
    pub fn retain(&self, cs: CriticalSection<'_>) -> u8 {
        let mut state = self.state.borrow_ref_mut(cs);
        if state.held == 0 {
            state.clock.enable();
        }
        state.held += 1;
        assert!(
            usize::from(state.held) <= ENGINE_SLOTS,
            "SHA engine hold count exceeds physical slots"
        );
        state.held
    }

    /// Record one slot released, disabling the clock on the last
    ///
    /// Returns the new hold count.
    ///
    /// # Panics
    /// Panics if no slot is held.
    pub fn release(&self, cs: CriticalSection<'_>) -> u8 {
        let mut state = self.state.borrow_ref_mut(cs);
        assert!(state.held > 0, "SHA engine released while none is held");
        state.held -= 1;
        if state.held == 0 {
            state.clock.disable();
        }
        state.held
    }

    /// Number of slots currently held
    pub fn hold_count(&self) -> u8 {
        critical_section::with(|cs| self.state.borrow_ref(cs).held)
    }

    /// Whether the peripheral clock is currently running
    pub fn is_powered(&self) -> bool {
        self.hold_count() > 0
    }

    /// Inspect the clock collaborator
    pub fn with_clock<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        critical_section::with(|cs| f(&self.state.borrow_ref(cs).clock))
    }
}
