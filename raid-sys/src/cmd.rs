// SPDX-License-Identifier: GPL-3.0-only

//! The command execution seam
//!
//! Every external tool invocation in this workspace goes through [`Runner`].
//! The production [`SystemRunner`] spawns the child synchronously and blocks
//! until it exits; test runners script outcomes and record invocations.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::{Result, SysError};

/// Captured output of a completed external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Render a command line for logs and error messages.
pub fn render(command: &str, args: &[&str]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// Seam through which every external tool invocation passes.
pub trait Runner {
    /// Run a command and capture its output. A non-zero exit becomes
    /// [`SysError::CommandFailed`] carrying the child's stderr; the caller
    /// decides whether that is fatal or recoverable.
    fn run(&self, command: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run a command with stdout redirected to `path`, replacing the file's
    /// previous contents. Used to regenerate the array-metadata config.
    fn run_with_stdout_file(&self, command: &str, args: &[&str], path: &Path) -> Result<()>;
}

/// Production runner backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, command: &str, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!(command = %render(command, args), "running external tool");
        let output = Command::new(command).args(args).output()?;
        if !output.status.success() {
            return Err(SysError::CommandFailed {
                command: render(command, args),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn run_with_stdout_file(&self, command: &str, args: &[&str], path: &Path) -> Result<()> {
        tracing::debug!(
            command = %render(command, args),
            path = %path.display(),
            "running external tool with redirected stdout"
        );
        let file = File::create(path)?;
        let output = Command::new(command)
            .args(args)
            .stdout(Stdio::from(file))
            .output()?;
        if !output.status.success() {
            return Err(SysError::CommandFailed {
                command: render(command, args),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::render;

    #[test]
    fn formats_command_context() {
        assert_eq!(render("mount", &[]), "mount");
        assert_eq!(
            render("parted", &["-s", "/dev/sda", "mklabel", "gpt"]),
            "parted -s /dev/sda mklabel gpt"
        );
    }
}
