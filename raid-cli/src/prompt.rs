// SPDX-License-Identifier: GPL-3.0-only

//! Confirmation prompts
//!
//! The lifecycle manager never talks to a terminal directly; it asks through
//! this trait, so tests can script the answers.

use dialoguer::Confirm;

/// Confirmation callback asked before destructive or overridden steps.
pub trait Prompter {
    fn confirm(&self, message: &str) -> bool;
}

/// Interactive prompter for terminal sessions. Declines by default, and
/// treats a prompt that cannot be shown (no tty) as a decline.
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn confirm(&self, message: &str) -> bool {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
