// Licensed under the Apache-2.0 license

//! Block and digest operations on a held engine
//!
//! Each operation waits for the accelerator to go idle, then performs exactly
//! one staging memory access inside the staging guard. The idle wait happens
//! before the guard so interrupts are never masked across a busy-wait; the
//! hardware is expected to still be idle once the guard is entered.

use super::ShaArbiter;
use crate::engine::{EngineToken, HashAlgo, MAX_BLOCK_WORDS, MAX_DIGEST_WORDS};
use crate::error::ArbiterError;
use crate::hardware::ShaHardware;
use crate::power::PeripheralClock;
use zerocopy::{FromBytes, IntoBytes};

impl<T, P, H> ShaArbiter<T, P, H>
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    /// Run one compression round of `algo` over `block`
    ///
    /// The caller must hold the engine for `algo`.
    ///
    /// # Errors
    /// `ArbiterError::InvalidBlockLength` unless `block` is exactly
    /// `algo.block_words()` long.
    ///
    /// # Panics
    /// With `verify_ownership` set, panics if the engine is not locked.
    pub fn hash_block(
        &self,
        algo: HashAlgo,
        block: &[u32],
        first_block: bool,
    ) -> Result<(), ArbiterError> {
        self.verify_held(algo);
        self.hash_block_held(algo, block, first_block)
    }

    /// Run consecutive compression rounds over `data`
    ///
    /// `first_block` applies to the first block only.
    ///
    /// # Errors
    /// `ArbiterError::InvalidBlockLength` unless `data` is a non-empty whole
    /// number of blocks. Nothing is hashed then.
    pub fn hash_blocks(
        &self,
        algo: HashAlgo,
        data: &[u32],
        first_block: bool,
    ) -> Result<(), ArbiterError> {
        self.verify_held(algo);
        self.hash_blocks_held(algo, data, first_block)
    }

    /// [`ShaArbiter::hash_block`] for a block given as bytes
    ///
    /// # Errors
    /// `ArbiterError::InvalidBlockLength` unless `block` is exactly
    /// `algo.block_size()` bytes.
    pub fn hash_block_bytes(
        &self,
        algo: HashAlgo,
        block: &[u8],
        first_block: bool,
    ) -> Result<(), ArbiterError> {
        self.verify_held(algo);
        self.hash_block_bytes_held(algo, block, first_block)
    }

    /// Read the digest state of `algo` into `out`
    ///
    /// Fills the first `algo.digest_words()` words of `out`.
    ///
    /// # Errors
    /// `ArbiterError::InvalidDigestLength` if `out` is shorter than that.
    ///
    /// # Panics
    /// With `verify_ownership` set, panics if the engine is not locked.
    pub fn read_digest(&self, algo: HashAlgo, out: &mut [u32]) -> Result<(), ArbiterError> {
        self.verify_held(algo);
        self.read_digest_held(algo, out)
    }

    /// [`ShaArbiter::read_digest`] into a byte buffer, in staging memory byte order
    ///
    /// # Errors
    /// `ArbiterError::InvalidDigestLength` if `out` is shorter than
    /// `algo.digest_size()`.
    pub fn read_digest_bytes(&self, algo: HashAlgo, out: &mut [u8]) -> Result<(), ArbiterError> {
        self.verify_held(algo);
        self.read_digest_bytes_held(algo, out)
    }

    pub(super) fn hash_block_held(
        &self,
        algo: HashAlgo,
        block: &[u32],
        first_block: bool,
    ) -> Result<(), ArbiterError> {
        if block.len() != algo.block_words() {
            return Err(ArbiterError::InvalidBlockLength);
        }

        self.hardware.wait_idle();
        self.staging
            .with(|bank| self.hardware.hash_block(bank, algo, block, first_block));
        Ok(())
    }

    pub(super) fn hash_blocks_held(
        &self,
        algo: HashAlgo,
        data: &[u32],
        first_block: bool,
    ) -> Result<(), ArbiterError> {
        let words = algo.block_words();
        if data.is_empty() || data.len() % words != 0 {
            return Err(ArbiterError::InvalidBlockLength);
        }

        for (i, block) in data.chunks_exact(words).enumerate() {
            self.hash_block_held(algo, block, first_block && i == 0)?;
        }
        Ok(())
    }

    pub(super) fn hash_block_bytes_held(
        &self,
        algo: HashAlgo,
        block: &[u8],
        first_block: bool,
    ) -> Result<(), ArbiterError> {
        if block.len() != algo.block_size() {
            return Err(ArbiterError::InvalidBlockLength);
        }

        if let Ok(words) = <[u32]>::ref_from_bytes(block) {
            return self.hash_block_held(algo, words, first_block);
        }

        // unaligned input
        let mut aligned = [0u32; MAX_BLOCK_WORDS];
        let words = aligned
            .get_mut(..algo.block_words())
            .ok_or(ArbiterError::InvalidBlockLength)?;
        words.as_mut_bytes().copy_from_slice(block);
        self.hash_block_held(algo, words, first_block)
    }

    pub(super) fn read_digest_held(
        &self,
        algo: HashAlgo,
        out: &mut [u32],
    ) -> Result<(), ArbiterError> {
        let out = out
            .get_mut(..algo.digest_words())
            .ok_or(ArbiterError::InvalidDigestLength)?;

        self.hardware.wait_idle();
        self.staging
            .with(|bank| self.hardware.read_digest(bank, algo, out));
        Ok(())
    }

    pub(super) fn read_digest_bytes_held(
        &self,
        algo: HashAlgo,
        out: &mut [u8],
    ) -> Result<(), ArbiterError> {
        let out = out
            .get_mut(..algo.digest_size())
            .ok_or(ArbiterError::InvalidDigestLength)?;

        let mut state = [0u32; MAX_DIGEST_WORDS];
        self.read_digest_held(algo, &mut state)?;

        let bytes = state
            .as_bytes()
            .get(..out.len())
            .ok_or(ArbiterError::InvalidDigestLength)?;
        out.copy_from_slice(bytes);
        Ok(())
    }

    fn verify_held(&self, algo: HashAlgo) {
        if self.config.verify_ownership {
            let engine = algo.engine();
            assert!(
                self.registry.token(engine).is_taken(),
                "SHA engine {engine} should be locked"
            );
        }
    }
}
