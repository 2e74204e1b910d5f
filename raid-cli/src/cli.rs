// SPDX-License-Identifier: GPL-3.0-only

//! Argument surface of the raidctl binary

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use raid_types::RaidLevel;

#[derive(Debug, Parser)]
#[command(name = "raidctl", version)]
#[command(about = "Set up, inspect and tear down Linux software RAID arrays")]
pub struct Cli {
    /// Persistent mount table to edit
    #[arg(long, global = true, default_value = raid_sys::fstab::SYSTEM_TABLE)]
    pub fstab: PathBuf,

    /// Backup slot overwritten before every mount-table edit
    #[arg(long, global = true, default_value = raid_sys::fstab::SYSTEM_BACKUP)]
    pub fstab_backup: PathBuf,

    /// Array-metadata config regenerated after a successful setup
    #[arg(long, global = true, default_value = "/etc/mdadm/mdadm.conf")]
    pub mdadm_conf: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List candidate disks
    List,

    /// Create an array: partition disks, assemble, format, mount, persist
    Setup {
        /// Member disks, in the order they join the array
        #[arg(required = true)]
        disks: Vec<String>,

        /// RAID level (0, 1, 5 or 6); recommended interactively when omitted
        #[arg(long, value_parser = parse_level)]
        level: Option<RaidLevel>,

        /// Array device to create
        #[arg(long, default_value = "/dev/md0")]
        device: String,

        /// Where the new filesystem gets mounted
        #[arg(long, default_value = "/mnt/raid")]
        mount_point: String,
    },

    /// Stop an array, dissolve its members and drop its table entry
    Remove {
        /// Array device to remove
        device: String,
    },

    /// Move an array's mount point and refresh its table entry
    ChangeMount {
        /// Mounted device to move
        device: String,

        /// New mount point
        mount_point: String,
    },

    /// Unmount and remount a device, refreshing its table entry
    Remount {
        /// Mounted device to cycle
        device: String,
    },

    /// One-shot health snapshot of an array
    Status {
        /// Array device to inspect
        device: String,
    },
}

fn parse_level(value: &str) -> Result<RaidLevel, String> {
    let number: u8 = value
        .parse()
        .map_err(|_| format!("not a RAID level: {value}"))?;
    RaidLevel::try_from(number).map_err(|error| error.to_string())
}

impl Command {
    /// Everything that touches devices or privileged files needs euid 0.
    pub fn requires_root(&self) -> bool {
        !matches!(self, Command::List)
    }

    /// Tools that must be present before the operation starts.
    pub fn required_tools(&self) -> &'static [&'static str] {
        match self {
            Command::List => &["lsblk"],
            Command::Setup { .. } => &[
                "parted",
                "mdadm",
                "mkfs.ext4",
                "mount",
                "blkid",
                "blockdev",
                "update-initramfs",
            ],
            Command::Remove { .. } => &["mdadm", "blkid"],
            Command::ChangeMount { .. } => &["mount", "umount", "blkid"],
            Command::Remount { .. } => &["mount", "umount", "blkid"],
            Command::Status { .. } => &["mdadm"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_argument_accepts_only_supported_levels() {
        assert_eq!(parse_level("5"), Ok(RaidLevel::Raid5));
        assert!(parse_level("4").unwrap_err().contains("unsupported"));
        assert!(parse_level("raid5").unwrap_err().contains("not a RAID level"));
    }

    #[test]
    fn only_listing_runs_unprivileged() {
        assert!(!Command::List.requires_root());
        assert!(Command::Remount {
            device: "/dev/md0".into()
        }
        .requires_root());
    }
}
