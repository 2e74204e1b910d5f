// SPDX-License-Identifier: GPL-3.0-only

//! RAID level policy tables

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A RAID level the lifecycle manager knows how to build and persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaidLevel {
    Raid0,
    Raid1,
    Raid5,
    Raid6,
}

/// Requested level is outside the supported set {0, 1, 5, 6}.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unsupported RAID level: {0} (supported: 0, 1, 5, 6)")]
pub struct UnsupportedLevel(pub u8);

impl RaidLevel {
    pub const ALL: [RaidLevel; 4] = [
        RaidLevel::Raid0,
        RaidLevel::Raid1,
        RaidLevel::Raid5,
        RaidLevel::Raid6,
    ];

    /// Minimum number of member disks the kernel RAID driver accepts.
    pub fn min_disks(self) -> usize {
        match self {
            RaidLevel::Raid0 | RaidLevel::Raid1 => 2,
            RaidLevel::Raid5 => 3,
            RaidLevel::Raid6 => 4,
        }
    }

    /// systemd device timeout written into the persistent mount options.
    ///
    /// Redundant levels keep a longer timeout so a rebuilding array still
    /// comes up at boot; a striped array without redundancy gets a short one.
    pub fn device_timeout_secs(self) -> u32 {
        match self {
            RaidLevel::Raid1 | RaidLevel::Raid5 | RaidLevel::Raid6 => 5,
            RaidLevel::Raid0 => 3,
        }
    }

    /// Numeric form used on mdadm command lines.
    pub fn as_number(self) -> u8 {
        match self {
            RaidLevel::Raid0 => 0,
            RaidLevel::Raid1 => 1,
            RaidLevel::Raid5 => 5,
            RaidLevel::Raid6 => 6,
        }
    }

    /// Match a level name as it appears in mdadm detail output ("raid5").
    pub fn from_mdadm_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| name.contains(&format!("raid{}", level.as_number())))
    }

    /// Advisory level recommendation from disk count and capacities.
    ///
    /// Never applied automatically; callers surface it and ask.
    pub fn recommend(num_disks: usize, disk_sizes: &[u64]) -> Self {
        match num_disks {
            2 => RaidLevel::Raid1,
            3 => RaidLevel::Raid5,
            n if n >= 4 => {
                if disk_sizes.iter().min() == disk_sizes.iter().max() {
                    RaidLevel::Raid6
                } else {
                    RaidLevel::Raid5
                }
            }
            _ => RaidLevel::Raid0,
        }
    }

    /// Human-readable tradeoff summary.
    pub fn describe(self) -> &'static str {
        match self {
            RaidLevel::Raid0 => "striping - maximum performance, no redundancy",
            RaidLevel::Raid1 => "mirroring - maximum resilience, 50% capacity efficiency",
            RaidLevel::Raid5 => {
                "parity - balanced performance and resilience, tolerates one disk failure"
            }
            RaidLevel::Raid6 => "double parity - maximum resilience, tolerates two disk failures",
        }
    }
}

impl TryFrom<u8> for RaidLevel {
    type Error = UnsupportedLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RaidLevel::Raid0),
            1 => Ok(RaidLevel::Raid1),
            5 => Ok(RaidLevel::Raid5),
            6 => Ok(RaidLevel::Raid6),
            other => Err(UnsupportedLevel(other)),
        }
    }
}

impl fmt::Display for RaidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RAID {}", self.as_number())
    }
}
