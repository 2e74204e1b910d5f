// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for RAID lifecycle management
//!
//! Every externally-observable mutation - partition tables, array metadata,
//! filesystems, the mount table, boot-time persistence files - is applied by
//! shelling out to the privileged tools (parted, mdadm, mkfs, mount, blkid,
//! blockdev, smartctl, update-initramfs). All invocations pass through the
//! [`cmd::Runner`] seam so orchestration code and tests can observe or script
//! them.
//!
//! Everything here is synchronous and blocking: a call returns when the tool
//! exits, and no timeouts are applied. These operations require elevated
//! privileges and should only be called from a privileged process.

pub mod array;
pub mod cmd;
pub mod error;
pub mod fstab;
pub mod inspect;
pub mod mounts;
pub mod topology;

pub use cmd::{render, CommandOutput, Runner, SystemRunner};
pub use error::{Result, SysError};
pub use fstab::MountTable;
