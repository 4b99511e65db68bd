// Licensed under the Apache-2.0 license

//! Engine lock protocol
//!
//! [`ShaArbiter`] ties together the per-slot tokens, the reference-counted
//! clock gate, the staging memory guard and the accelerator. It is meant to
//! live in a `static` shared by every task that hashes:
//!
//! ```no_run
//! use sha_arbiter::{ArbiterConfig, HashAlgo, ShaArbiter, SpinToken};
//! # use sha_arbiter::{PeripheralClock, ShaHardware, StagingBank};
//! # struct ShaClock;
//! # impl PeripheralClock for ShaClock { fn enable(&mut self) {} fn disable(&mut self) {} }
//! # struct ShaRegs;
//! # impl ShaHardware for ShaRegs {
//! #     fn wait_idle(&self) {}
//! #     fn hash_block(&self, _: &StagingBank<'_>, _: HashAlgo, _: &[u32], _: bool) {}
//! #     fn read_digest(&self, _: &StagingBank<'_>, _: HashAlgo, _: &mut [u32]) {}
//! # }
//!
//! static SHA: ShaArbiter<SpinToken, ShaClock, ShaRegs> = ShaArbiter::new(
//!     [SpinToken::new(), SpinToken::new(), SpinToken::new()],
//!     ShaClock,
//!     ShaRegs,
//!     ArbiterConfig::DEFAULT,
//! );
//!
//! # fn hash(block: &[u32; 16]) -> Result<[u32; 8], sha_arbiter::ArbiterError> {
//! let mut state = [0u32; 8];
//! let engine = SHA.acquire(HashAlgo::Sha256);
//! engine.hash_block(block, true)?;
//! engine.read_digest(&mut state)?;
//! # Ok(state)
//! # }
//! ```
//!
//! Acquiring an engine takes its token first and only then bumps the hold
//! count, so a context that is refused a busy engine leaves no trace.
//! Releasing runs the same steps in reverse.

mod lease;
mod ops;

pub use lease::EngineLease;

use crate::config::ArbiterConfig;
use crate::engine::{Engine, EngineRegistry, EngineToken, HashAlgo, ENGINE_SLOTS};
use crate::error::ArbiterError;
use crate::hardware::ShaHardware;
use crate::power::{PeripheralClock, PowerGate};
use crate::staging::StagingMemory;
use embedded_hal::delay::DelayNs;
use fugit::MillisDurationU32;

/// Arbitrates the SHA engines and their shared staging memory
pub struct ShaArbiter<T, P, H> {
    registry: EngineRegistry<T>,
    power: PowerGate<P>,
    staging: StagingMemory,
    hardware: H,
    config: ArbiterConfig,
}

impl<T, P, H> ShaArbiter<T, P, H>
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    /// Build an arbiter with every engine available and the clock gated
    ///
    /// `tokens` must all be available and are assigned in [`Engine::ALL`] order.
    #[must_use]
    pub const fn new(
        tokens: [T; ENGINE_SLOTS],
        clock: P,
        hardware: H,
        config: ArbiterConfig,
    ) -> Self {
        Self {
            registry: EngineRegistry::new(tokens),
            power: PowerGate::new(clock),
            staging: StagingMemory::new(),
            hardware,
            config,
        }
    }

    /// Take the engine for `algo` if it is free, without waiting
    ///
    /// Returns `false` if another context holds it; nothing changes then.
    pub fn try_lock(&self, algo: HashAlgo) -> bool {
        self.check_outside_staging();
        let engine = algo.engine();
        if !self.registry.token(engine).try_take() {
            return false;
        }
        self.engine_taken();
        true
    }

    /// Take the engine for `algo`, waiting as long as it takes
    pub fn lock(&self, algo: HashAlgo) {
        self.check_outside_staging();
        self.registry.token(algo.engine()).take();
        self.engine_taken();
    }

    /// Take the engine for `algo`, waiting at most `timeout`
    ///
    /// `delay` paces the polling of tokens that cannot sleep on their own.
    ///
    /// # Errors
    /// Returns `ArbiterError::Timeout` if the engine stayed busy. The caller
    /// holds nothing in that case.
    pub fn lock_timeout<D: DelayNs>(
        &self,
        algo: HashAlgo,
        timeout: MillisDurationU32,
        delay: &mut D,
    ) -> Result<(), ArbiterError> {
        self.check_outside_staging();
        let token = self.registry.token(algo.engine());
        if !token.take_timeout(timeout, self.config.poll_interval, delay) {
            return Err(ArbiterError::Timeout);
        }
        self.engine_taken();
        Ok(())
    }

    /// Non-blocking lock for use with `nb::block!`
    ///
    /// # Errors
    /// `nb::Error::WouldBlock` while another context holds the engine.
    pub fn poll_lock(&self, algo: HashAlgo) -> nb::Result<(), ArbiterError> {
        if self.try_lock(algo) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Release the engine for `algo`
    ///
    /// Must not be used on an engine held through an [`EngineLease`]; see
    /// [`EngineLease::detach`] for handing a lease over to manual unlocking.
    ///
    /// # Panics
    /// Panics if the engine is not locked.
    pub fn unlock(&self, algo: HashAlgo) {
        let engine = algo.engine();
        let token = self.registry.token(engine);

        // Check, release and give under one section so a double unlock
        // cannot slip past the check.
        critical_section::with(|cs| {
            self.assert_outside_staging();
            assert!(token.is_taken(), "SHA engine {engine} unlocked while not locked");
            self.power.release(cs);
            token.give();
        });
    }

    /// Take the engine for `algo` and release it when the lease drops
    pub fn acquire(&self, algo: HashAlgo) -> EngineLease<'_, T, P, H> {
        self.lock(algo);
        EngineLease::new(self, algo)
    }

    /// Take the engine for `algo` if it is free, releasing it when the lease drops
    pub fn try_acquire(&self, algo: HashAlgo) -> Option<EngineLease<'_, T, P, H>> {
        self.try_lock(algo).then(|| EngineLease::new(self, algo))
    }

    /// Number of engine slots currently held
    pub fn hold_count(&self) -> u8 {
        self.power.hold_count()
    }

    /// Whether the engine `algo` runs on is held by anyone
    pub fn is_locked(&self, algo: HashAlgo) -> bool {
        self.registry.token(algo.engine()).is_taken()
    }

    /// Whether the peripheral clock is running
    pub fn is_powered(&self) -> bool {
        self.power.is_powered()
    }

    /// Engine slots currently held
    pub fn held_engines(&self) -> heapless::Vec<Engine, ENGINE_SLOTS> {
        self.registry.held().collect()
    }

    /// Inspect the clock controller
    pub fn with_clock<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        self.power.with_clock(f)
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    // Second half of every successful acquisition.
    fn engine_taken(&self) {
        critical_section::with(|cs| {
            self.assert_outside_staging();
            self.power.retain(cs);
        });
    }

    // Runs before the token is touched: waiting on a busy engine with the
    // staging guard held would never return.
    fn check_outside_staging(&self) {
        critical_section::with(|_| self.assert_outside_staging());
    }

    // Exact inside a critical section: nobody else can hold the bank then.
    fn assert_outside_staging(&self) {
        assert!(
            !self.staging.is_active(),
            "SHA engine lock used inside the staging memory guard"
        );
    }
}
