// Licensed under the Apache-2.0 license

use super::ShaArbiter;
use crate::engine::{EngineToken, HashAlgo};
use crate::error::ArbiterError;
use crate::hardware::ShaHardware;
use crate::power::PeripheralClock;

/// Exclusive use of one engine, released on drop
///
/// Holding the lease is the ownership proof, so its operations skip the
/// lock check that [`ShaArbiter::hash_block`] performs.
///
/// The lease owns the unlock. Calling [`ShaArbiter::unlock`] for its engine
/// while it is alive makes the later drop release whoever took the engine
/// next. Use [`EngineLease::detach`] to switch to manual unlocking.
#[must_use = "the engine is released as soon as the lease is dropped"]
pub struct EngineLease<'a, T, P, H>
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    arbiter: &'a ShaArbiter<T, P, H>,
    algo: HashAlgo,
}

impl<'a, T, P, H> EngineLease<'a, T, P, H>
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    pub(super) fn new(arbiter: &'a ShaArbiter<T, P, H>, algo: HashAlgo) -> Self {
        Self { arbiter, algo }
    }

    #[must_use]
    pub fn algo(&self) -> HashAlgo {
        self.algo
    }

    /// # Errors
    /// See [`ShaArbiter::hash_block`].
    pub fn hash_block(&self, block: &[u32], first_block: bool) -> Result<(), ArbiterError> {
        self.arbiter.hash_block_held(self.algo, block, first_block)
    }

    /// # Errors
    /// See [`ShaArbiter::hash_blocks`].
    pub fn hash_blocks(&self, data: &[u32], first_block: bool) -> Result<(), ArbiterError> {
        self.arbiter.hash_blocks_held(self.algo, data, first_block)
    }

    /// # Errors
    /// See [`ShaArbiter::hash_block_bytes`].
    pub fn hash_block_bytes(&self, block: &[u8], first_block: bool) -> Result<(), ArbiterError> {
        self.arbiter
            .hash_block_bytes_held(self.algo, block, first_block)
    }

    /// # Errors
    /// See [`ShaArbiter::read_digest`].
    pub fn read_digest(&self, out: &mut [u32]) -> Result<(), ArbiterError> {
        self.arbiter.read_digest_held(self.algo, out)
    }

    /// # Errors
    /// See [`ShaArbiter::read_digest_bytes`].
    pub fn read_digest_bytes(&self, out: &mut [u8]) -> Result<(), ArbiterError> {
        self.arbiter.read_digest_bytes_held(self.algo, out)
    }

    /// Release the engine now
    pub fn release(self) {}

    /// Keep the engine locked and hand its release to [`ShaArbiter::unlock`]
    pub fn detach(self) -> HashAlgo {
        let algo = self.algo;
        core::mem::forget(self);
        algo
    }
}

impl<T, P, H> Drop for EngineLease<'_, T, P, H>
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    fn drop(&mut self) {
        self.arbiter.unlock(self.algo);
    }
}
