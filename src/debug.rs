// Licensed under the Apache-2.0 license

//! Arbiter state dump over a serial console

use crate::arbiter::ShaArbiter;
use crate::engine::{Engine, EngineToken};
use crate::hardware::ShaHardware;
use crate::power::PeripheralClock;
use embedded_io::{Write, WriteFmtError};

/// Write the hold count, clock state and per-engine ownership to `out`
///
/// The values are a snapshot; other contexts may change them while printing.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn dump_state<W, T, P, H>(
    out: &mut W,
    arbiter: &ShaArbiter<T, P, H>,
) -> Result<(), WriteFmtError<W::Error>>
where
    W: Write,
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    let held = arbiter.held_engines();
    write!(
        out,
        "SHA arbiter: {} engine(s) held, clock {}\r\n",
        arbiter.hold_count(),
        if arbiter.is_powered() { "on" } else { "off" }
    )?;
    for engine in Engine::ALL {
        let state = if held.contains(&engine) { "locked" } else { "free" };
        write!(out, "  [{}] {:<12} {}\r\n", engine.index(), engine.name(), state)?;
    }
    Ok(())
}
