// SPDX-License-Identifier: GPL-3.0-only

//! Mounting, unmounting and live mount-table inspection

use std::fs;

use raid_types::MountInfo;

use crate::cmd::Runner;
use crate::Result;

/// Create the mount point directory if it does not exist yet. Idempotent.
pub fn ensure_mount_point(path: &str) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

pub fn mount(runner: &dyn Runner, device: &str, mount_point: &str) -> Result<()> {
    runner.run("mount", &[device, mount_point])?;
    Ok(())
}

pub fn unmount(runner: &dyn Runner, device: &str) -> Result<()> {
    runner.run("umount", &[device])?;
    Ok(())
}

/// Mount everything the persistent table configures.
pub fn mount_all(runner: &dyn Runner) -> Result<()> {
    runner.run("mount", &["-a"])?;
    Ok(())
}

/// Live mount snapshot for a device, or `None` when it is not mounted.
///
/// Derived from `mount` output on every call; never cached.
pub fn mount_info(runner: &dyn Runner, device: &str) -> Result<Option<MountInfo>> {
    let output = runner.run("mount", &[])?;
    Ok(find_mount(&output.stdout, device))
}

/// First row of `mount` output whose device field matches exactly.
pub fn find_mount(table: &str, device: &str) -> Option<MountInfo> {
    table.lines().find_map(|line| {
        let info = parse_mount_line(line)?;
        if info.device == device {
            Some(info)
        } else {
            None
        }
    })
}

/// Parse one row of `mount` output: `<dev> on <dir> type <fs> (<options>)`.
fn parse_mount_line(line: &str) -> Option<MountInfo> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 || fields[1] != "on" || fields[3] != "type" {
        return None;
    }
    Some(MountInfo {
        device: fields[0].to_string(),
        mount_point: fields[2].to_string(),
        fs_type: fields[4].to_string(),
        options: fields[5]
            .trim_matches(|c| c == '(' || c == ')')
            .split(',')
            .map(str::to_string)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNT_OUTPUT: &str = "\
proc on /proc type proc (rw,nosuid,nodev,noexec,relatime)
/dev/nvme0n1p2 on / type ext4 (rw,relatime)
/dev/md0 on /mnt/raid type ext4 (rw,relatime,stripe=256)
";

    #[test]
    fn finds_the_matching_device_row() {
        let info = find_mount(MOUNT_OUTPUT, "/dev/md0").expect("md0 mount");
        assert_eq!(info.mount_point, "/mnt/raid");
        assert_eq!(info.fs_type, "ext4");
        assert_eq!(info.options, vec!["rw", "relatime", "stripe=256"]);
    }

    #[test]
    fn device_match_is_exact_not_substring() {
        assert!(find_mount(MOUNT_OUTPUT, "/dev/md").is_none());
        assert!(find_mount(MOUNT_OUTPUT, "/dev/nvme0n1").is_none());
    }

    #[test]
    fn malformed_rows_are_skipped() {
        assert!(find_mount("garbage line\n", "/dev/md0").is_none());
    }
}
