// Licensed under the Apache-2.0 license

use core::fmt;

/// Recoverable failures reported by the arbiter
///
/// Broken invariants (lock count overflow, unlock without lock, engine used
/// without holding it, staging guard re-entry) are not represented here: they
/// panic at the point of detection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    /// The engine is held by another context
    Busy,
    /// A bounded wait elapsed before the engine became available
    Timeout,
    /// Input block does not match the engine's block length
    InvalidBlockLength,
    /// Output buffer is too small for the engine's digest state
    InvalidDigestLength,
}

impl fmt::Display for ArbiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ArbiterError::Busy => "engine busy",
            ArbiterError::Timeout => "timed out waiting for engine",
            ArbiterError::InvalidBlockLength => "block length does not match engine",
            ArbiterError::InvalidDigestLength => "digest buffer too small",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for ArbiterError {}
