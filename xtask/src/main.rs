// Licensed under the Apache-2.0 license

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

const DEFAULT_TARGET: &str = "thumbv7em-none-eabihf";

const USAGE: &str = "\
Usage: cargo xtask <task> [target]

Tasks:
  test            run the host unit tests
  check-target    build the library for a bare-metal target (default: thumbv7em-none-eabihf)
  clippy          lint host and bare-metal builds
  ci              all of the above";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let task = args.next();
    let target = args.next().unwrap_or_else(|| DEFAULT_TARGET.to_string());

    match task.as_deref() {
        Some("test") => test(),
        Some("check-target") => check_target(&target),
        Some("clippy") => clippy(&target),
        Some("ci") => {
            test()?;
            check_target(&target)?;
            clippy(&target)
        }
        Some(other) => bail!("unknown task `{other}`\n\n{USAGE}"),
        None => {
            println!("{USAGE}");
            Ok(())
        }
    }
}

/// Host tests need std for threads and the std critical-section implementation
fn test() -> Result<()> {
    println!("Running host unit tests...");
    cargo(&["test", "-p", "sha-arbiter", "--features", "std"])
}

/// The library must stay `no_std` for the firmware build, with and without
/// the bundled single-core critical section
fn check_target(target: &str) -> Result<()> {
    println!("Building for {target}...");
    cargo(&["build", "-p", "sha-arbiter", "--release", "--target", target])?;
    cargo(&[
        "build",
        "-p",
        "sha-arbiter",
        "--release",
        "--target",
        target,
        "--features",
        "cortex-m-single-core",
    ])
}

fn clippy(target: &str) -> Result<()> {
    println!("Running clippy...");
    cargo(&["clippy", "-p", "sha-arbiter", "--all-targets", "--features", "std", "--", "-D", "warnings"])?;
    cargo(&["clippy", "-p", "sha-arbiter", "--target", target, "--", "-D", "warnings"])
}

fn cargo(args: &[&str]) -> Result<()> {
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let status = Command::new(&cargo)
        .args(args)
        .current_dir(project_root())
        .status()
        .with_context(|| format!("Failed to run {cargo} {}", args.join(" ")))?;

    if !status.success() {
        bail!("{cargo} {} failed: {status}", args.join(" "));
    }
    Ok(())
}

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
