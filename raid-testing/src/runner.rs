use std::cell::RefCell;
use std::fs;
use std::path::Path;

use raid_sys::cmd::{render, CommandOutput, Runner};
use raid_sys::{Result, SysError};

enum Outcome {
    Stdout(String),
    Failure(String),
}

struct Rule {
    prefix: String,
    outcome: Outcome,
}

/// Scripted stand-in for the system runner.
///
/// Invocations are matched against scripted rules by rendered-command prefix;
/// unmatched commands succeed with empty output. Every invocation is recorded
/// in order, so tests can assert exactly which external mutations an
/// operation attempted and in what sequence.
#[derive(Default)]
pub struct RecordingRunner {
    rules: Vec<Rule>,
    calls: RefCell<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to commands starting with `prefix` with the given stdout.
    pub fn with_stdout(mut self, prefix: &str, stdout: &str) -> Self {
        self.rules.push(Rule {
            prefix: prefix.to_string(),
            outcome: Outcome::Stdout(stdout.to_string()),
        });
        self
    }

    /// Fail commands starting with `prefix` with the given stderr.
    pub fn with_failure(mut self, prefix: &str, stderr: &str) -> Self {
        self.rules.push(Rule {
            prefix: prefix.to_string(),
            outcome: Outcome::Failure(stderr.to_string()),
        });
        self
    }

    /// Every rendered command line, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of recorded invocations starting with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Position of the first recorded invocation starting with `prefix`.
    pub fn position_of(&self, prefix: &str) -> Option<usize> {
        self.calls
            .borrow()
            .iter()
            .position(|call| call.starts_with(prefix))
    }

    fn outcome_for(&self, rendered: &str) -> Result<CommandOutput> {
        for rule in &self.rules {
            if rendered.starts_with(&rule.prefix) {
                return match &rule.outcome {
                    Outcome::Stdout(stdout) => Ok(CommandOutput {
                        stdout: stdout.clone(),
                        stderr: String::new(),
                    }),
                    Outcome::Failure(stderr) => Err(SysError::CommandFailed {
                        command: rendered.to_string(),
                        stderr: stderr.clone(),
                    }),
                };
            }
        }
        Ok(CommandOutput::default())
    }
}

impl Runner for RecordingRunner {
    fn run(&self, command: &str, args: &[&str]) -> Result<CommandOutput> {
        let rendered = render(command, args);
        self.calls.borrow_mut().push(rendered.clone());
        self.outcome_for(&rendered)
    }

    fn run_with_stdout_file(&self, command: &str, args: &[&str], path: &Path) -> Result<()> {
        let rendered = render(command, args);
        self.calls
            .borrow_mut()
            .push(format!("{rendered} > {}", path.display()));
        let output = self.outcome_for(&rendered)?;
        fs::write(path, output.stdout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_and_matches_rules_by_prefix() {
        let runner = RecordingRunner::new()
            .with_stdout("blkid", "abcd-1234\n")
            .with_failure("mdadm --stop", "mdadm: stop failed");

        let output = runner.run("blkid", &["-s", "UUID"]).unwrap();
        assert_eq!(output.stdout, "abcd-1234\n");

        assert!(runner.run("mdadm", &["--stop", "/dev/md0"]).is_err());
        assert!(runner.run("mount", &["-a"]).unwrap().stdout.is_empty());

        assert_eq!(runner.calls().len(), 3);
        assert_eq!(runner.call_count("mdadm"), 1);
        assert_eq!(runner.position_of("mount -a"), Some(2));
    }
}
