// SPDX-License-Identifier: GPL-3.0-only

//! Building the on-disk topology of a new array
//!
//! Partition layout, array assembly and filesystem creation for a validated
//! [`ArraySpec`]. All three steps are destructive and none is idempotent;
//! callers gate them behind an explicit destructive-intent confirmation.

use raid_types::{ArraySpec, FILESYSTEM_TYPE};

use crate::cmd::Runner;
use crate::Result;

/// Label the disk GPT, create one partition spanning the whole disk and flag
/// it as a RAID member.
///
/// Re-running destroys whatever partition table the disk carried before.
pub fn create_partition(runner: &dyn Runner, disk: &str) -> Result<()> {
    runner.run("parted", &["-s", disk, "mklabel", "gpt"])?;
    runner.run("parted", &["-s", disk, "mkpart", "primary", "0%", "100%"])?;
    runner.run("parted", &["-s", disk, "set", "1", "raid", "on"])?;
    Ok(())
}

/// Assemble the member partitions into the array device.
///
/// Member order on the command line follows the caller-supplied disk order.
pub fn create_array(runner: &dyn Runner, spec: &ArraySpec) -> Result<()> {
    let members = spec.member_partitions();
    let level = spec.level.as_number().to_string();
    let count = spec.members.len().to_string();

    let mut args = vec![
        "--create",
        "--verbose",
        spec.device.as_str(),
        "--level",
        level.as_str(),
        "--raid-devices",
        count.as_str(),
    ];
    args.extend(members.iter().map(String::as_str));

    runner.run("mdadm", &args)?;
    Ok(())
}

/// Format the array device with the fixed filesystem type.
pub fn create_filesystem(runner: &dyn Runner, device: &str) -> Result<()> {
    runner.run(&format!("mkfs.{FILESYSTEM_TYPE}"), &[device])?;
    Ok(())
}
