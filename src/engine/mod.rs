// Licensed under the Apache-2.0 license

//! Hash algorithm families and the physical engine slots they run on
//!
//! The accelerator has one engine per block geometry family. SHA-384 and
//! SHA-512 share the 1024-bit block engine, so both map to [`Engine::Sha512`]
//! and contend for the same token.

pub mod registry;
pub mod token;

pub use registry::EngineRegistry;
#[cfg(any(test, feature = "std"))]
pub use token::StdToken;
pub use token::{EngineToken, SpinToken};

use core::fmt;

/// Number of physical engine slots
pub const ENGINE_SLOTS: usize = 3;

/// Largest block any engine consumes, in 32-bit words
pub const MAX_BLOCK_WORDS: usize = 32;

/// Largest digest state any engine returns, in 32-bit words
pub const MAX_DIGEST_WORDS: usize = 16;

/// Hash algorithm requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgo {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgo {
    /// All algorithms the accelerator supports
    pub const ALL: [HashAlgo; 4] = [
        HashAlgo::Sha1,
        HashAlgo::Sha256,
        HashAlgo::Sha384,
        HashAlgo::Sha512,
    ];

    /// Physical slot this algorithm executes on
    #[must_use]
    pub const fn engine(self) -> Engine {
        match self {
            HashAlgo::Sha1 => Engine::Sha1,
            HashAlgo::Sha256 => Engine::Sha256,
            HashAlgo::Sha384 | HashAlgo::Sha512 => Engine::Sha512,
        }
    }

    /// Input block length in 32-bit words
    #[must_use]
    pub const fn block_words(self) -> usize {
        match self {
            HashAlgo::Sha1 | HashAlgo::Sha256 => 64 / 4,
            HashAlgo::Sha384 | HashAlgo::Sha512 => 128 / 4,
        }
    }

    /// Input block length in bytes
    #[must_use]
    pub const fn block_size(self) -> usize {
        self.block_words() * 4
    }

    /// Length of the digest state read back from the engine, in 32-bit words
    ///
    /// SHA-384 runs on the SHA-512 datapath and the engine exposes the whole
    /// 512-bit state; truncation to 384 bits is up to the caller.
    #[must_use]
    pub const fn digest_words(self) -> usize {
        match self {
            HashAlgo::Sha1 => 20 / 4,
            HashAlgo::Sha256 => 32 / 4,
            HashAlgo::Sha384 | HashAlgo::Sha512 => 64 / 4,
        }
    }

    /// Length of the digest state in bytes
    #[must_use]
    pub const fn digest_size(self) -> usize {
        self.digest_words() * 4
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            HashAlgo::Sha1 => "SHA-1",
            HashAlgo::Sha256 => "SHA-256",
            HashAlgo::Sha384 => "SHA-384",
            HashAlgo::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical engine slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Engine {
    /// SHA-1 engine
    Sha1 = 0,
    /// SHA-256 engine
    Sha256 = 1,
    /// SHA-384/SHA-512 engine
    Sha512 = 2,
}

impl Engine {
    pub const ALL: [Engine; ENGINE_SLOTS] = [Engine::Sha1, Engine::Sha256, Engine::Sha512];

    /// Slot ordinal in `0..ENGINE_SLOTS`
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Engine::Sha1 => "SHA1",
            Engine::Sha256 => "SHA2_256",
            Engine::Sha512 => "SHA2_384/512",
        }
    }
}

impl From<HashAlgo> for Engine {
    fn from(algo: HashAlgo) -> Self {
        algo.engine()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
