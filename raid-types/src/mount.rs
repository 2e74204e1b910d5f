// SPDX-License-Identifier: GPL-3.0-only

//! Persistent mount-table entries

use serde::{Deserialize, Serialize};

use crate::level::RaidLevel;

/// Filesystem type every array created here is formatted with.
pub const FILESYSTEM_TYPE: &str = "ext4";

/// A single UUID-keyed line of the persistent mount table.
///
/// Identity is the UUID: the table holds at most one live entry per UUID at
/// any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountEntry {
    pub uuid: String,
    pub mount_point: String,
    pub fs_type: String,
    pub options: String,
}

impl MountEntry {
    /// Entry with the mount-option profile of the given level.
    pub fn for_level(
        uuid: impl Into<String>,
        mount_point: impl Into<String>,
        level: RaidLevel,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            mount_point: mount_point.into(),
            fs_type: FILESYSTEM_TYPE.to_string(),
            options: format!(
                "defaults,nofail,x-systemd.device-timeout={}",
                level.device_timeout_secs()
            ),
        }
    }

    /// The table line for this entry, without a trailing newline.
    pub fn render(&self) -> String {
        format!(
            "UUID={} {} {} {} 0 0",
            self.uuid, self.mount_point, self.fs_type, self.options
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_string_follows_level_profile() {
        for level in [RaidLevel::Raid1, RaidLevel::Raid5, RaidLevel::Raid6] {
            let entry = MountEntry::for_level("abcd", "/mnt/raid", level);
            assert_eq!(entry.options, "defaults,nofail,x-systemd.device-timeout=5");
        }

        let entry = MountEntry::for_level("abcd", "/mnt/raid", RaidLevel::Raid0);
        assert_eq!(entry.options, "defaults,nofail,x-systemd.device-timeout=3");
    }

    #[test]
    fn renders_a_complete_table_line() {
        let entry = MountEntry::for_level("9f6c1482-3f1c", "/mnt/raid", RaidLevel::Raid1);
        assert_eq!(
            entry.render(),
            "UUID=9f6c1482-3f1c /mnt/raid ext4 defaults,nofail,x-systemd.device-timeout=5 0 0"
        );
    }
}
