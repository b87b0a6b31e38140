//! Adapters implementing the repository ports.

pub mod http;
pub mod memory;
pub mod sqlite;
