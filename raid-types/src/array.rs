// SPDX-License-Identifier: GPL-3.0-only

//! Array creation parameters and transient array/mount snapshots

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::RaidLevel;

/// Fewer member disks than the level's fixed minimum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{level} requires at least {required} disks, got {actual}")]
pub struct InsufficientDisks {
    pub level: RaidLevel,
    pub required: usize,
    pub actual: usize,
}

/// Validated creation parameters for a new array.
///
/// Constructed only after the member count has been checked against the
/// level's minimum. Member order is the caller-supplied order and determines
/// the member order of the created array; it is never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraySpec {
    pub level: RaidLevel,
    pub members: Vec<String>,
    pub device: String,
}

impl ArraySpec {
    pub fn new(
        level: RaidLevel,
        members: Vec<String>,
        device: String,
    ) -> Result<Self, InsufficientDisks> {
        let required = level.min_disks();
        if members.len() < required {
            return Err(InsufficientDisks {
                level,
                required,
                actual: members.len(),
            });
        }
        Ok(Self {
            level,
            members,
            device,
        })
    }

    /// Member partition paths: partition index 1 appended to each disk path.
    pub fn member_partitions(&self) -> Vec<String> {
        self.members.iter().map(|disk| format!("{disk}1")).collect()
    }
}

/// One-shot health snapshot of an array. Recomputed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidStatus {
    pub healthy: bool,
    pub message: String,
    pub failed_devices: u64,
}

/// Live mount snapshot for a block device, derived from the mount table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountInfo {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_rejects_too_few_members() {
        let err = ArraySpec::new(
            RaidLevel::Raid6,
            vec!["/dev/sda".into(), "/dev/sdb".into(), "/dev/sdc".into()],
            "/dev/md0".into(),
        )
        .unwrap_err();

        assert_eq!(err.required, 4);
        assert_eq!(err.actual, 3);
    }

    #[test]
    fn status_serialization_round_trips() {
        let status = RaidStatus {
            healthy: false,
            message: "2 failed device(s)".to_string(),
            failed_devices: 2,
        };

        let json = serde_json::to_string(&status).unwrap();
        let deserialized: RaidStatus = serde_json::from_str(&json).unwrap();

        assert_eq!(status, deserialized);
    }

    #[test]
    fn member_partitions_preserve_order() {
        let spec = ArraySpec::new(
            RaidLevel::Raid1,
            vec!["/dev/sdb".into(), "/dev/sda".into()],
            "/dev/md0".into(),
        )
        .unwrap();

        assert_eq!(spec.member_partitions(), vec!["/dev/sdb1", "/dev/sda1"]);
    }
}
