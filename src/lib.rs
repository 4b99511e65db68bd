// Licensed under the Apache-2.0 license

//! Arbitration for a multi-engine SHA accelerator
//!
//! The accelerator has one engine per SHA block geometry, a shared clock
//! gate and a single staging memory bank all engines move data through.
//! [`ShaArbiter`] lets concurrent tasks share it. Engines are owned through
//! per-slot tokens and the clock runs while any engine is owned. Staging
//! memory is only touched with interrupts masked.
//!
//! All exclusion goes through [`critical_section`], and the firmware picks
//! its implementation. That section must exclude every core that can reach
//! the arbiter, so on multi-core parts it has to be a cross-core lock with
//! interrupts masked. Single-core Cortex-M firmware can enable the
//! `cortex-m-single-core` feature instead of providing one.

// Prevent panic-prone patterns in production code only
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::indexing_slicing))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod arbiter;
pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod hardware;
pub mod power;
pub mod staging;


pub use arbiter::{EngineLease, ShaArbiter};
pub use config::{ArbiterConfig, ArbiterConfigBuilder};
pub use engine::{Engine, EngineRegistry, EngineToken, HashAlgo, SpinToken, ENGINE_SLOTS};
#[cfg(any(test, feature = "std"))]
pub use engine::StdToken;
pub use error::ArbiterError;
pub use hardware::ShaHardware;
pub use power::{PeripheralClock, PowerGate};
pub use staging::{StagingBank, StagingMemory};
