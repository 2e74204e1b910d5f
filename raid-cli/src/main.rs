// SPDX-License-Identifier: GPL-3.0-only

//! raidctl - command-line manager for Linux software RAID arrays
//!
//! Orchestrates parted, mdadm, mkfs and the mount tooling into whole-array
//! lifecycle operations: create, remove, change mount point, remount. The
//! binary is presentation glue; the sequencing and safety policy live in
//! [`manager::RaidManager`].

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod disks;
mod manager;
mod prompt;

use cli::{Cli, Command};
use manager::RaidManager;
use prompt::{DialoguerPrompter, Prompter};
use raid_sys::cmd::Runner;
use raid_sys::{inspect, MountTable, SystemRunner};
use raid_types::RaidLevel;

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("raid_cli=info,raid_sys=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.command.requires_root() && unsafe { libc::geteuid() } != 0 {
        anyhow::bail!("this operation must run as root");
    }
    preflight(&cli.command)?;

    let runner = SystemRunner;
    let prompter = DialoguerPrompter;
    let table = MountTable::new(&cli.fstab, &cli.fstab_backup);
    let manager = RaidManager::new(&runner, &prompter, table, cli.mdadm_conf.clone());

    let ok = match cli.command {
        Command::List => {
            disks::print_disk_table(&runner)?;
            true
        }
        Command::Setup {
            disks,
            level,
            device,
            mount_point,
        } => match resolve_level(&runner, &prompter, &disks, level) {
            Some(level) => manager.setup_array(&disks, level, &device, &mount_point),
            None => {
                tracing::warn!("setup aborted: no RAID level agreed on");
                false
            }
        },
        Command::Remove { device } => manager.remove_array(&device),
        Command::ChangeMount {
            device,
            mount_point,
        } => manager.change_mount_point(&device, &mount_point),
        Command::Remount { device } => manager.remount_device(&device),
        Command::Status { device } => {
            let status = manager.array_status(&device);
            println!(
                "{device}: {} ({}, {} failed device(s))",
                if status.healthy { "healthy" } else { "DEGRADED" },
                status.message,
                status.failed_devices
            );
            status.healthy
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Fail fast when a required external tool is missing from PATH.
fn preflight(command: &Command) -> Result<()> {
    let missing: Vec<&str> = command
        .required_tools()
        .iter()
        .copied()
        .filter(|tool| which::which(tool).is_err())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("required tools not found in PATH: {}", missing.join(", "))
    }
}

/// Use the requested level, or recommend one and ask.
///
/// The recommendation is advisory and never applied without an explicit
/// confirmation.
fn resolve_level(
    runner: &dyn Runner,
    prompter: &dyn Prompter,
    disks: &[String],
    requested: Option<RaidLevel>,
) -> Option<RaidLevel> {
    if let Some(level) = requested {
        return Some(level);
    }

    let sizes = inspect::disk_sizes(runner, disks).unwrap_or_default();
    let recommended = RaidLevel::recommend(disks.len(), &sizes);
    println!(
        "Recommended for {} disk(s): {recommended} ({})",
        disks.len(),
        recommended.describe()
    );

    if prompter.confirm(&format!("Use {recommended}?")) {
        Some(recommended)
    } else {
        None
    }
}
