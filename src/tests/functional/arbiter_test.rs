// Licensed under the Apache-2.0 license

//! On-target arbiter checks against the real accelerator
//!
//! Run from firmware with the board's arbiter while no other task uses it.
//! Results are reported line by line on `out`.

use crate::arbiter::ShaArbiter;
use crate::engine::{EngineToken, HashAlgo, MAX_BLOCK_WORDS, MAX_DIGEST_WORDS};
use crate::error::ArbiterError;
use crate::hardware::ShaHardware;
use crate::power::PeripheralClock;
use embedded_io::{Write, WriteFmtError};

/// Run every functional check; returns the number of failures
///
/// # Errors
/// Propagates write errors from `out`. Checks after a failed write are not run.
pub fn run_arbiter_tests<W, T, P, H>(
    out: &mut W,
    arbiter: &ShaArbiter<T, P, H>,
) -> Result<u32, WriteFmtError<W::Error>>
where
    W: Write,
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    writeln!(out, "\r\n=== SHA Arbiter Tests ===\r")?;

    let checks: [(&str, fn(&ShaArbiter<T, P, H>) -> bool); 5] = [
        ("clock follows hold count", test_power_cycle),
        ("three engines at once", test_three_slots),
        ("busy engine refused without side effects", test_busy_refused),
        ("digest is repeatable", test_digest_repeatable),
        ("bad lengths rejected", test_length_errors),
    ];

    let mut failures = 0;
    for (name, check) in checks {
        write!(out, "Testing {name}... ")?;
        if check(arbiter) {
            writeln!(out, "PASSED\r")?;
        } else {
            failures += 1;
            writeln!(out, "FAILED\r")?;
        }
    }

    if failures == 0 {
        writeln!(out, "\r\n=== All SHA Arbiter Tests Passed ===\r")?;
    } else {
        writeln!(out, "\r\n=== {failures} SHA Arbiter Test(s) Failed ===\r")?;
    }
    Ok(failures)
}

fn test_power_cycle<T, P, H>(arbiter: &ShaArbiter<T, P, H>) -> bool
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    if arbiter.is_powered() {
        return false;
    }

    arbiter.lock(HashAlgo::Sha1);
    let on_first = arbiter.is_powered();
    arbiter.lock(HashAlgo::Sha256);
    arbiter.unlock(HashAlgo::Sha1);
    let on_with_one_left = arbiter.is_powered();
    arbiter.unlock(HashAlgo::Sha256);

    on_first && on_with_one_left && !arbiter.is_powered() && arbiter.hold_count() == 0
}

fn test_three_slots<T, P, H>(arbiter: &ShaArbiter<T, P, H>) -> bool
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    let mut locked: heapless::Vec<HashAlgo, 3> = heapless::Vec::new();
    for algo in [HashAlgo::Sha1, HashAlgo::Sha384, HashAlgo::Sha256] {
        if arbiter.try_lock(algo) {
            let _ = locked.push(algo);
        }
    }

    let all_held = locked.len() == 3 && arbiter.hold_count() == 3;
    let alias_refused = !arbiter.try_lock(HashAlgo::Sha512);

    for algo in locked {
        arbiter.unlock(algo);
    }
    all_held && alias_refused && arbiter.hold_count() == 0
}

fn test_busy_refused<T, P, H>(arbiter: &ShaArbiter<T, P, H>) -> bool
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    let Some(lease) = arbiter.try_acquire(HashAlgo::Sha256) else {
        return false;
    };
    let refused = !arbiter.try_lock(HashAlgo::Sha256);
    let polled = matches!(arbiter.poll_lock(HashAlgo::Sha256), Err(nb::Error::WouldBlock));
    let unchanged = arbiter.hold_count() == 1;
    lease.release();

    refused && polled && unchanged
}

fn test_digest_repeatable<T, P, H>(arbiter: &ShaArbiter<T, P, H>) -> bool
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    let digest_of = |msg: &[u8]| -> Result<[u32; MAX_DIGEST_WORDS], ArbiterError> {
        let block = padded_block(HashAlgo::Sha256, msg);
        let block = block
            .get(..HashAlgo::Sha256.block_size())
            .ok_or(ArbiterError::InvalidBlockLength)?;
        let mut state = [0u32; MAX_DIGEST_WORDS];
        let engine = arbiter.acquire(HashAlgo::Sha256);
        engine.hash_block_bytes(block, true)?;
        engine.read_digest(&mut state)?;
        Ok(state)
    };

    match (digest_of(b"abc"), digest_of(b"abc"), digest_of(b"abd")) {
        (Ok(first), Ok(second), Ok(other)) => first == second && first != other,
        _ => false,
    }
}

fn test_length_errors<T, P, H>(arbiter: &ShaArbiter<T, P, H>) -> bool
where
    T: EngineToken,
    P: PeripheralClock,
    H: ShaHardware,
{
    let engine = arbiter.acquire(HashAlgo::Sha512);
    let mut short = [0u32; 8];

    let block = engine.hash_block(&[0u32; 16], true) == Err(ArbiterError::InvalidBlockLength);
    let digest = engine.read_digest(&mut short) == Err(ArbiterError::InvalidDigestLength);
    block && digest
}

// Single-block message padding for short messages
fn padded_block(algo: HashAlgo, msg: &[u8]) -> [u8; MAX_BLOCK_WORDS * 4] {
    let mut block = [0u8; MAX_BLOCK_WORDS * 4];
    let mut len = 0;
    for (dst, src) in block.iter_mut().zip(msg.iter().chain(&[0x80])) {
        *dst = *src;
        len += 1;
    }
    let bits = ((len - 1) as u64) * 8;
    let tail = algo.block_size().saturating_sub(8);
    if let Some(field) = block.get_mut(tail..algo.block_size()) {
        field.copy_from_slice(&bits.to_be_bytes());
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArbiterConfig;
    use crate::engine::SpinToken;
    use crate::testing::{BrokenConsole, Console, CountingClock, SoftSha};
    use std::string::String;
    use std::vec::Vec;

    fn arbiter() -> ShaArbiter<SpinToken, CountingClock, SoftSha> {
        ShaArbiter::new(
            [SpinToken::new(), SpinToken::new(), SpinToken::new()],
            CountingClock::new(),
            SoftSha::new(),
            ArbiterConfig::DEFAULT,
        )
    }

    #[test]
    fn test_checks_pass_on_software_engine() {
        let arbiter = arbiter();
        let mut console = Console(Vec::new());

        assert_eq!(run_arbiter_tests(&mut console, &arbiter).unwrap(), 0);

        let text = String::from_utf8(console.0).unwrap();
        assert_eq!(text.matches("PASSED").count(), 5);
        assert!(text.contains("=== All SHA Arbiter Tests Passed ==="));
        assert_eq!(arbiter.hold_count(), 0);
    }

    #[test]
    fn test_console_failure_is_reported() {
        let arbiter = arbiter();

        let result = run_arbiter_tests(&mut BrokenConsole, &arbiter);

        assert!(matches!(
            result,
            Err(WriteFmtError::Other(embedded_io::ErrorKind::Other))
        ));
        assert_eq!(arbiter.hold_count(), 0);
    }
}
