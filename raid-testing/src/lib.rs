//! Test support for exercising RAID lifecycle orchestration without
//! touching real disks.

mod runner;

pub use runner::RecordingRunner;
