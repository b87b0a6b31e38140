//! CLI command implementations.

pub mod init;
pub mod proposal;
pub mod setup;
