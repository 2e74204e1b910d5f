// SPDX-License-Identifier: GPL-3.0-only

//! Persistent mount-table editing
//!
//! UUID-keyed entries with a backup-before-write policy: every mutation first
//! copies the table to a single backup slot, overwritten each time. The file
//! is edited in place with no locking; concurrent invocations against the
//! same table are unsupported and this tool assumes single-invocation use.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use raid_types::MountEntry;

use crate::cmd::Runner;
use crate::{Result, SysError};

pub const SYSTEM_TABLE: &str = "/etc/fstab";
pub const SYSTEM_BACKUP: &str = "/etc/fstab.backup";

/// Filesystem UUID of a block device, as reported by blkid.
pub fn resolve_uuid(runner: &dyn Runner, device: &str) -> Result<String> {
    let output = runner.run("blkid", &["-s", "UUID", "-o", "value", device])?;
    let uuid = output.stdout.trim();
    if uuid.is_empty() {
        return Err(SysError::UuidMissing(device.to_string()));
    }
    Ok(uuid.to_string())
}

/// Editor over the boot-time mount table.
#[derive(Debug, Clone)]
pub struct MountTable {
    path: PathBuf,
    backup_path: PathBuf,
}

impl MountTable {
    pub fn new(path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: backup_path.into(),
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_TABLE, SYSTEM_BACKUP)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Append exactly one rendered entry. Pre-existing bytes are untouched.
    pub fn append(&self, entry: &MountEntry) -> Result<()> {
        self.backup()?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry.render())?;
        Ok(())
    }

    /// Drop every line whose UUID field names `uuid`; all other lines
    /// survive in their original order.
    pub fn remove_uuid(&self, uuid: &str) -> Result<()> {
        self.backup()?;
        let contents = fs::read_to_string(&self.path)?;
        fs::write(&self.path, retain_lines(&contents, uuid))?;
        Ok(())
    }

    /// Replace whatever entry exists for the UUID with `entry`, leaving at
    /// most one line per UUID in the table.
    pub fn upsert(&self, entry: &MountEntry) -> Result<()> {
        self.backup()?;
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(error) => return Err(error.into()),
        };

        let mut rewritten = retain_lines(&contents, &entry.uuid);
        rewritten.push_str(&entry.render());
        rewritten.push('\n');
        fs::write(&self.path, rewritten)?;
        Ok(())
    }

    /// Copy the current table over the single backup slot.
    fn backup(&self) -> Result<()> {
        if self.path.exists() {
            fs::copy(&self.path, &self.backup_path)?;
            tracing::debug!(backup = %self.backup_path.display(), "mount table backed up");
        }
        Ok(())
    }
}

/// Keep every line whose UUID field does not name `uuid`.
///
/// The match is a structured parse of the line's first field: only lines
/// whose first token is exactly `UUID=<uuid>` are dropped. Comments and
/// entries whose UUID merely contains the needle are untouched.
fn retain_lines(contents: &str, uuid: &str) -> String {
    let needle = format!("UUID={uuid}");
    let mut kept = String::with_capacity(contents.len());
    for line in contents.lines() {
        if line.split_whitespace().next() == Some(needle.as_str()) {
            continue;
        }
        kept.push_str(line);
        kept.push('\n');
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use raid_types::RaidLevel;
    use tempfile::TempDir;

    const BASE_TABLE: &str = "\
# /etc/fstab: static file system information.
UUID=1111-aaaa / ext4 errors=remount-ro 0 1
UUID=2222-bbbb /home ext4 defaults 0 2
";

    fn table_in(dir: &TempDir) -> MountTable {
        let table = MountTable::new(dir.path().join("fstab"), dir.path().join("fstab.backup"));
        fs::write(table.path(), BASE_TABLE).unwrap();
        table
    }

    #[test]
    fn append_preserves_existing_lines_and_adds_one() {
        let dir = TempDir::new().unwrap();
        let table = table_in(&dir);
        let entry = MountEntry::for_level("3333-cccc", "/mnt/raid", RaidLevel::Raid5);

        table.append(&entry).unwrap();

        let contents = fs::read_to_string(table.path()).unwrap();
        assert!(contents.starts_with(BASE_TABLE));
        assert_eq!(
            contents.lines().last().unwrap(),
            "UUID=3333-cccc /mnt/raid ext4 defaults,nofail,x-systemd.device-timeout=5 0 0"
        );
        assert_eq!(contents.lines().count(), BASE_TABLE.lines().count() + 1);
    }

    #[test]
    fn remove_keeps_only_non_matching_lines() {
        let dir = TempDir::new().unwrap();
        let table = table_in(&dir);

        table.remove_uuid("2222-bbbb").unwrap();

        let contents = fs::read_to_string(table.path()).unwrap();
        assert!(contents.contains("UUID=1111-aaaa"));
        assert!(!contents.contains("UUID=2222-bbbb"));
        assert_eq!(contents.lines().count(), BASE_TABLE.lines().count() - 1);
    }

    #[test]
    fn append_then_remove_round_trips() {
        let dir = TempDir::new().unwrap();
        let table = table_in(&dir);
        let entry = MountEntry::for_level("3333-cccc", "/mnt/raid", RaidLevel::Raid1);

        table.append(&entry).unwrap();
        table.remove_uuid(&entry.uuid).unwrap();

        assert_eq!(fs::read_to_string(table.path()).unwrap(), BASE_TABLE);
    }

    #[test]
    fn removal_matches_the_uuid_field_not_substrings() {
        let dir = TempDir::new().unwrap();
        let table = MountTable::new(dir.path().join("fstab"), dir.path().join("fstab.backup"));
        fs::write(
            table.path(),
            "# keep: mentions 2222-bbbb in a comment\nUUID=2222-bbbb-extended /data ext4 defaults 0 2\nUUID=2222-bbbb /home ext4 defaults 0 2\n",
        )
        .unwrap();

        table.remove_uuid("2222-bbbb").unwrap();

        let contents = fs::read_to_string(table.path()).unwrap();
        assert!(contents.contains("# keep"));
        assert!(contents.contains("UUID=2222-bbbb-extended"));
        assert!(!contents.contains("UUID=2222-bbbb /home"));
    }

    #[test]
    fn upsert_leaves_one_entry_per_uuid() {
        let dir = TempDir::new().unwrap();
        let table = table_in(&dir);

        let first = MountEntry::for_level("3333-cccc", "/mnt/raid", RaidLevel::Raid1);
        let moved = MountEntry::for_level("3333-cccc", "/srv/storage", RaidLevel::Raid1);
        table.upsert(&first).unwrap();
        table.upsert(&moved).unwrap();

        let contents = fs::read_to_string(table.path()).unwrap();
        let matching: Vec<&str> = contents
            .lines()
            .filter(|line| line.starts_with("UUID=3333-cccc"))
            .collect();
        assert_eq!(matching, vec![
            "UUID=3333-cccc /srv/storage ext4 defaults,nofail,x-systemd.device-timeout=5 0 0"
        ]);
    }

    #[test]
    fn backup_slot_holds_the_previous_generation() {
        let dir = TempDir::new().unwrap();
        let table = table_in(&dir);
        let entry = MountEntry::for_level("3333-cccc", "/mnt/raid", RaidLevel::Raid1);

        table.append(&entry).unwrap();
        assert_eq!(
            fs::read_to_string(table.backup_path()).unwrap(),
            BASE_TABLE
        );

        table.remove_uuid("1111-aaaa").unwrap();
        let backup = fs::read_to_string(table.backup_path()).unwrap();
        assert!(backup.contains("UUID=1111-aaaa"));
        assert!(backup.contains("UUID=3333-cccc"));
    }
}
