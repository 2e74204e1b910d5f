// SPDX-License-Identifier: GPL-3.0-only

//! Pre-flight disk inspection: SMART health and raw capacity

use crate::cmd::{render, Runner};
use crate::{Result, SysError};

/// Query SMART overall health. `Ok(true)` when the tool reports a pass.
///
/// A failing query (no SMART support, tool missing) is surfaced as `Err`;
/// the caller owns the fail-open policy for absent health data.
pub fn disk_healthy(runner: &dyn Runner, disk: &str) -> Result<bool> {
    let output = runner.run("smartctl", &["-H", disk])?;
    Ok(smart_passed(&output.stdout))
}

fn smart_passed(report: &str) -> bool {
    report.contains("PASSED")
}

/// Raw byte capacity of a single disk.
pub fn disk_size(runner: &dyn Runner, disk: &str) -> Result<u64> {
    let output = runner.run("blockdev", &["--getsize64", disk])?;
    output
        .stdout
        .trim()
        .parse()
        .map_err(|_| SysError::CommandFailed {
            command: render("blockdev", &["--getsize64", disk]),
            stderr: format!("unexpected size output: {}", output.stdout.trim()),
        })
}

/// Raw byte capacities, in input order.
pub fn disk_sizes(runner: &dyn Runner, disks: &[String]) -> Result<Vec<u64>> {
    disks.iter().map(|disk| disk_size(runner, disk)).collect()
}

/// True only when every capacity is bit-identical.
pub fn sizes_uniform(sizes: &[u64]) -> bool {
    sizes.windows(2).all(|pair| pair[0] == pair[1])
}

/// Fail-closed uniformity check: any capacity query error counts as a
/// mismatch, since capacity differences are safety-relevant.
pub fn uniform_size(runner: &dyn Runner, disks: &[String]) -> bool {
    disk_sizes(runner, disks)
        .map(|sizes| sizes_uniform(&sizes))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_smart_verdict_from_report() {
        assert!(smart_passed(
            "SMART overall-health self-assessment test result: PASSED\n"
        ));
        assert!(!smart_passed(
            "SMART overall-health self-assessment test result: FAILED!\n"
        ));
        assert!(!smart_passed(""));
    }

    #[test]
    fn uniformity_requires_identical_capacities() {
        assert!(sizes_uniform(&[]));
        assert!(sizes_uniform(&[4096]));
        assert!(sizes_uniform(&[4096, 4096, 4096]));
        assert!(!sizes_uniform(&[4096, 4096, 4097]));
    }
}
