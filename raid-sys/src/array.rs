// SPDX-License-Identifier: GPL-3.0-only

//! Querying and tearing down existing arrays
//!
//! Wraps `mdadm --detail` and its teardown operations. The detail output is
//! free text whose shape varies across mdadm versions; all parsing of it is
//! isolated here so the heuristics can change without touching the lifecycle
//! manager.

use std::path::Path;

use raid_types::{RaidLevel, RaidStatus};

use crate::cmd::Runner;
use crate::Result;

/// Raw `mdadm --detail` text for an array device.
pub fn detail(runner: &dyn Runner, device: &str) -> Result<String> {
    Ok(runner.run("mdadm", &["--detail", device])?.stdout)
}

/// Value of a `Key : value` field in detail output, keyed exactly.
fn detail_field(detail: &str, key: &str) -> Option<String> {
    detail.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim() == key {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

/// The array's level from its detail output, when the field is present and
/// names a supported level.
pub fn parse_raid_level(detail: &str) -> Option<RaidLevel> {
    let value = detail_field(detail, "Raid Level")?;
    RaidLevel::from_mdadm_name(&value.to_ascii_lowercase())
}

/// Member device paths from the indented device rows of detail output.
///
/// A member row is indented, has at least seven whitespace-separated fields,
/// and ends with the member's device path.
pub fn parse_member_devices(detail: &str) -> Vec<String> {
    detail
        .lines()
        .filter(|line| line.starts_with("    "))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 7 {
                return None;
            }
            let device = *fields.last()?;
            if device.starts_with("/dev/") {
                Some(device.to_string())
            } else {
                None
            }
        })
        .collect()
}

/// Health snapshot from detail output.
///
/// Unhealthy when the State field lacks "clean" or any device has failed.
pub fn parse_status(detail: &str) -> RaidStatus {
    let mut status = RaidStatus {
        healthy: true,
        message: "clean".to_string(),
        failed_devices: 0,
    };

    if let Some(state) = detail_field(detail, "State") {
        if !state.to_ascii_lowercase().contains("clean") {
            status.healthy = false;
            status.message = format!("array state: {state}");
        }
    }

    if let Some(failed) = detail_field(detail, "Failed Devices").and_then(|v| v.parse().ok()) {
        status.failed_devices = failed;
        if failed > 0 {
            status.healthy = false;
            status.message = format!("{failed} failed device(s)");
        }
    }

    status
}

/// Health snapshot of a live array.
pub fn array_status(runner: &dyn Runner, device: &str) -> Result<RaidStatus> {
    Ok(parse_status(&detail(runner, device)?))
}

/// Stop a running array, releasing its device node.
pub fn stop_array(runner: &dyn Runner, device: &str) -> Result<()> {
    runner.run("mdadm", &["--stop", device])?;
    Ok(())
}

/// Erase the member superblock, dissolving the partition's array membership.
pub fn zero_superblock(runner: &dyn Runner, member: &str) -> Result<()> {
    runner.run("mdadm", &["--zero-superblock", member])?;
    Ok(())
}

/// Overwrite the array-metadata config with a scan of all active arrays.
pub fn write_scan_config(runner: &dyn Runner, path: &Path) -> Result<()> {
    runner.run_with_stdout_file("mdadm", &["--detail", "--scan"], path)
}

/// Rebuild the boot image so arrays assemble during early boot.
pub fn update_boot_image(runner: &dyn Runner) -> Result<()> {
    runner.run("update-initramfs", &["-u"])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_RAID6: &str = "\
/dev/md0:
           Version : 1.2
     Creation Time : Tue Aug  4 21:10:13 2026
        Raid Level : raid6
        Array Size : 1953259520 (1862.89 GiB 2000.14 GB)
      Raid Devices : 4
     Total Devices : 4

             State : clean
    Active Devices : 4
   Working Devices : 4
    Failed Devices : 0
     Spare Devices : 0

    Number   Major   Minor   RaidDevice State
       0       8        1        0      active sync   /dev/sda1
       1       8       17        1      active sync   /dev/sdb1
       2       8       33        2      active sync   /dev/sdc1
       3       8       49        3      active sync   /dev/sdd1
";

    #[test]
    fn parses_raid_level_field() {
        assert_eq!(parse_raid_level(DETAIL_RAID6), Some(RaidLevel::Raid6));
        assert_eq!(parse_raid_level("State : clean\n"), None);
        assert_eq!(parse_raid_level(""), None);
    }

    #[test]
    fn parses_member_device_rows() {
        assert_eq!(
            parse_member_devices(DETAIL_RAID6),
            vec!["/dev/sda1", "/dev/sdb1", "/dev/sdc1", "/dev/sdd1"]
        );
    }

    #[test]
    fn member_rows_require_seven_fields_and_a_device_path() {
        let truncated = "    0       8        1        0      active   /dev/sda1\n";
        assert!(parse_member_devices(truncated).is_empty());

        let header = "    Number   Major   Minor   RaidDevice State Extra Column\n";
        assert!(parse_member_devices(header).is_empty());
    }

    #[test]
    fn clean_array_reports_healthy() {
        let status = parse_status(DETAIL_RAID6);
        assert!(status.healthy);
        assert_eq!(status.failed_devices, 0);
    }

    #[test]
    fn failed_devices_flip_the_snapshot() {
        let detail = DETAIL_RAID6.replace("Failed Devices : 0", "Failed Devices : 2");
        let status = parse_status(&detail);
        assert!(!status.healthy);
        assert_eq!(status.failed_devices, 2);
        assert!(status.message.contains("2 failed"));
    }

    #[test]
    fn non_clean_state_flips_the_snapshot() {
        let detail = DETAIL_RAID6.replace("State : clean", "State : active, resyncing");
        let status = parse_status(&detail);
        assert!(!status.healthy);
        assert!(status.message.contains("resyncing"));
    }
}
