// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for RAID lifecycle management
//!
//! This crate defines the single source of truth for the domain types shared
//! across the stack:
//!
//! - **raid-sys**: consumes these types in its tool wrappers and parsers
//! - **raid-cli**: the lifecycle manager sequences operations over them
//!
//! Everything here is a projection of external system state. Instances are
//! derived on demand from tool output and never cached across operations; the
//! lifecycle manager re-queries before every mutation.

pub mod array;
pub mod level;
pub mod mount;

pub use array::{ArraySpec, InsufficientDisks, MountInfo, RaidStatus};
pub use level::{RaidLevel, UnsupportedLevel};
pub use mount::{MountEntry, FILESYSTEM_TYPE};
