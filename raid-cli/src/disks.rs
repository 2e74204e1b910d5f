// SPDX-License-Identifier: GPL-3.0-only

//! Candidate disk discovery and the informational disk table

use serde::Deserialize;

use raid_sys::cmd::Runner;
use raid_sys::{Result, SysError};

#[derive(Debug, Clone, Deserialize)]
pub struct DiskRow {
    pub name: String,
    #[serde(default, deserialize_with = "de_size")]
    pub size: u64,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl DiskRow {
    pub fn device_path(&self) -> String {
        format!("/dev/{}", self.name)
    }
}

#[derive(Debug, Deserialize)]
struct LsblkReport {
    blockdevices: Vec<DiskRow>,
}

/// Whole physical disks as reported by lsblk. Read-only, informational.
pub fn list_disks(runner: &dyn Runner) -> Result<Vec<DiskRow>> {
    let output = runner.run(
        "lsblk",
        &[
            "--json",
            "--bytes",
            "--nodeps",
            "--output",
            "NAME,SIZE,MODEL,SERIAL,TYPE",
        ],
    )?;
    let report: LsblkReport =
        serde_json::from_str(&output.stdout).map_err(|error| SysError::CommandFailed {
            command: "lsblk --json".to_string(),
            stderr: format!("unparsable report: {error}"),
        })?;

    Ok(report
        .blockdevices
        .into_iter()
        .filter(|row| row.kind == "disk")
        .collect())
}

pub fn print_disk_table(runner: &dyn Runner) -> Result<()> {
    let disks = list_disks(runner)?;
    if disks.is_empty() {
        println!("no disks found");
        return Ok(());
    }

    println!(
        "{:<14} {:>10}  {:<28} {}",
        "DEVICE", "SIZE", "MODEL", "SERIAL"
    );
    for disk in &disks {
        println!(
            "{:<14} {:>10}  {:<28} {}",
            disk.device_path(),
            format_size(disk.size),
            disk.model.as_deref().unwrap_or("-"),
            disk.serial.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Human-readable base-2 size.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut unit_index = 0;
    let mut value = bytes as f64;

    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} {}", UNITS[unit_index])
    } else {
        format!("{value:.1} {}", UNITS[unit_index])
    }
}

/// lsblk emits sizes as numbers or quoted strings depending on version.
fn de_size<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    match Size::deserialize(deserializer)? {
        Size::Number(number) => Ok(number),
        Size::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lsblk_report_and_keeps_only_disks() {
        let report = r#"{
            "blockdevices": [
                {"name": "sda", "size": 1000204886016, "model": "WDC WD10EZEX", "serial": "WD-1", "type": "disk"},
                {"name": "sdb", "size": "1000204886016", "model": null, "serial": null, "type": "disk"},
                {"name": "sr0", "size": 1073741312, "model": "DVD-RW", "serial": null, "type": "rom"}
            ]
        }"#;

        let parsed: LsblkReport = serde_json::from_str(report).unwrap();
        let disks: Vec<DiskRow> = parsed
            .blockdevices
            .into_iter()
            .filter(|row| row.kind == "disk")
            .collect();

        assert_eq!(disks.len(), 2);
        assert_eq!(disks[0].device_path(), "/dev/sda");
        assert_eq!(disks[1].size, 1000204886016);
    }

    #[test]
    fn formats_sizes_in_base_two_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(1000204886016), "931.5 GiB");
    }
}
