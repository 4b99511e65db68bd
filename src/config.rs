// Licensed under the Apache-2.0 license

//! Run-time arbiter settings

use fugit::MicrosDurationU32;

/// Default spacing between attempts of a bounded-wait lock
pub const DEFAULT_POLL_INTERVAL: MicrosDurationU32 = MicrosDurationU32::micros(10);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArbiterConfig {
    /// Spacing between attempts when a bounded-wait lock polls its token
    pub poll_interval: MicrosDurationU32,
    /// Check that the caller holds the engine before touching the hardware
    pub verify_ownership: bool,
}

impl ArbiterConfig {
    /// Ownership checks follow `debug_assertions`
    pub const DEFAULT: Self = ArbiterConfigBuilder::new().build();
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub struct ArbiterConfigBuilder {
    poll_interval: MicrosDurationU32,
    verify_ownership: bool,
}

impl Default for ArbiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbiterConfigBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            verify_ownership: cfg!(debug_assertions),
        }
    }
    #[must_use]
    pub const fn poll_interval(mut self, interval: MicrosDurationU32) -> Self {
        self.poll_interval = interval;
        self
    }
    #[must_use]
    pub const fn verify_ownership(mut self, enabled: bool) -> Self {
        self.verify_ownership = enabled;
        self
    }
    #[must_use]
    pub const fn build(self) -> ArbiterConfig {
        ArbiterConfig {
            poll_interval: self.poll_interval,
            verify_ownership: self.verify_ownership,
        }
    }
}
