// SPDX-License-Identifier: GPL-3.0-only

//! RAID lifecycle orchestration
//!
//! Sequences partitioning, array assembly, formatting, mounting and
//! persistent-table edits into whole operations. Each public operation traps
//! every failure at its top level, reports it, and collapses to a success
//! flag; destructive steps that already ran are never unwound. Recovery from
//! a partial setup is manual: the mount-table backup slot, or `remove`.

use std::path::PathBuf;

use thiserror::Error;

use raid_sys::cmd::Runner;
use raid_sys::{array, fstab, inspect, mounts, topology, MountTable, SysError};
use raid_types::{ArraySpec, InsufficientDisks, MountEntry, RaidLevel, RaidStatus};

use crate::prompt::Prompter;

#[derive(Error, Debug)]
enum OpError {
    #[error("aborted by user")]
    Aborted,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Spec(#[from] InsufficientDisks),

    #[error(transparent)]
    Sys(#[from] SysError),
}

type OpResult<T> = Result<T, OpError>;

/// Orchestrates the whole-array operations over injected collaborators.
///
/// Owns the sequence of mutations, not the underlying OS state: every
/// operation re-queries live state before acting on it.
pub struct RaidManager<'a> {
    runner: &'a dyn Runner,
    prompter: &'a dyn Prompter,
    table: MountTable,
    mdadm_conf: PathBuf,
}

impl<'a> RaidManager<'a> {
    pub fn new(
        runner: &'a dyn Runner,
        prompter: &'a dyn Prompter,
        table: MountTable,
        mdadm_conf: PathBuf,
    ) -> Self {
        Self {
            runner,
            prompter,
            table,
            mdadm_conf,
        }
    }

    /// Create an array end to end: validate, partition, assemble, format,
    /// mount, persist, sync boot configuration.
    pub fn setup_array(
        &self,
        disks: &[String],
        level: RaidLevel,
        device: &str,
        mount_point: &str,
    ) -> bool {
        self.report(
            self.try_setup(disks, level, device, mount_point),
            "RAID setup complete",
            "RAID setup failed",
        )
    }

    fn try_setup(
        &self,
        disks: &[String],
        level: RaidLevel,
        device: &str,
        mount_point: &str,
    ) -> OpResult<()> {
        self.confirm("All data on the selected disks will be destroyed. Continue?")?;

        for disk in disks {
            // Fail open: a disk that cannot answer a SMART query is not
            // treated as failing.
            let healthy = inspect::disk_healthy(self.runner, disk).unwrap_or(true);
            if !healthy {
                self.confirm(&format!(
                    "{disk} reports a failing health status. Continue anyway?"
                ))?;
            }
        }

        let spec = ArraySpec::new(level, disks.to_vec(), device.to_string())?;

        if !inspect::uniform_size(self.runner, disks) {
            self.confirm("The selected disks differ in capacity. Continue anyway?")?;
        }

        for disk in disks {
            tracing::info!("partitioning {disk}");
            topology::create_partition(self.runner, disk)?;
        }

        tracing::info!("creating {device} as {level}");
        topology::create_array(self.runner, &spec)?;

        tracing::info!("formatting {device}");
        topology::create_filesystem(self.runner, device)?;

        mounts::ensure_mount_point(mount_point)?;
        mounts::mount(self.runner, device, mount_point)?;

        self.persist_entry(device, mount_point)?;

        array::write_scan_config(self.runner, &self.mdadm_conf)?;
        array::update_boot_image(self.runner)?;
        Ok(())
    }

    /// Stop an array, dissolve its members and drop its table entry.
    pub fn remove_array(&self, device: &str) -> bool {
        self.report(
            self.try_remove(device),
            "RAID array removed",
            "RAID removal failed",
        )
    }

    fn try_remove(&self, device: &str) -> OpResult<()> {
        // Snapshot members and the UUID while the array still answers
        // queries; neither survives the stop.
        let detail = array::detail(self.runner, device)?;
        let members = array::parse_member_devices(&detail);
        let uuid = fstab::resolve_uuid(self.runner, device)?;

        array::stop_array(self.runner, device)?;
        for member in &members {
            tracing::info!("zeroing superblock on {member}");
            array::zero_superblock(self.runner, member)?;
        }

        self.table.remove_uuid(&uuid)?;
        Ok(())
    }

    /// Move a mounted device to a new mount point and refresh its entry.
    pub fn change_mount_point(&self, device: &str, new_mount_point: &str) -> bool {
        self.report(
            self.try_change(device, new_mount_point),
            "mount point changed",
            "mount point change failed",
        )
    }

    fn try_change(&self, device: &str, new_mount_point: &str) -> OpResult<()> {
        mounts::unmount(self.runner, device)?;
        mounts::ensure_mount_point(new_mount_point)?;
        mounts::mount(self.runner, device, new_mount_point)?;
        self.persist_entry(device, new_mount_point)?;
        Ok(())
    }

    /// Unmount and remount a device in place, refreshing its table entry.
    pub fn remount_device(&self, device: &str) -> bool {
        self.report(
            self.try_remount(device),
            "remount complete",
            "remount failed",
        )
    }

    fn try_remount(&self, device: &str) -> OpResult<()> {
        let info = mounts::mount_info(self.runner, device)?
            .ok_or_else(|| OpError::Validation(format!("no live mount found for {device}")))?;

        let is_raid = device.starts_with("/dev/md");
        if is_raid {
            let status = self.array_status(device);
            if !status.healthy {
                self.confirm(&format!(
                    "array is not healthy ({}). Continue anyway?",
                    status.message
                ))?;
            }
        }

        mounts::unmount(self.runner, device)?;
        self.persist_entry(device, &info.mount_point)?;

        if is_raid {
            mounts::mount(self.runner, device, &info.mount_point)?;
        } else {
            mounts::mount_all(self.runner)?;
        }
        Ok(())
    }

    /// One-shot health snapshot. A failed detail query is itself an
    /// unhealthy answer, not an error.
    pub fn array_status(&self, device: &str) -> RaidStatus {
        match array::detail(self.runner, device) {
            Ok(detail) => array::parse_status(&detail),
            Err(error) => RaidStatus {
                healthy: false,
                message: format!("status query failed: {error}"),
                failed_devices: 0,
            },
        }
    }

    /// Write the table entry for a device, keyed by the array level the
    /// system actually reports rather than the one that was requested.
    fn persist_entry(&self, device: &str, mount_point: &str) -> OpResult<()> {
        let uuid = fstab::resolve_uuid(self.runner, device)?;
        let level = self.observed_level(device);
        let entry = MountEntry::for_level(uuid, mount_point, level);
        self.table.upsert(&entry)?;
        tracing::info!(
            backup = %self.table.backup_path().display(),
            "mount table updated"
        );
        Ok(())
    }

    /// Fail open to RAID 0 when the detail query or its parse comes up empty.
    fn observed_level(&self, device: &str) -> RaidLevel {
        array::detail(self.runner, device)
            .ok()
            .and_then(|detail| array::parse_raid_level(&detail))
            .unwrap_or(RaidLevel::Raid0)
    }

    fn confirm(&self, message: &str) -> OpResult<()> {
        if self.prompter.confirm(message) {
            Ok(())
        } else {
            Err(OpError::Aborted)
        }
    }

    fn report(&self, result: OpResult<()>, success: &str, failure: &str) -> bool {
        match result {
            Ok(()) => {
                tracing::info!("{success}");
                true
            }
            Err(OpError::Aborted) => {
                tracing::warn!("{failure}: aborted by user");
                false
            }
            Err(error) => {
                tracing::error!("{failure}: {error}");
                false
            }
        }
    }
}
