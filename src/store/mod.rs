//! Backends for the leave engine's storage and directory contracts.

pub mod memory;
pub mod mysql;

pub use memory::{MemoryCommitments, MemoryDirectory, MemoryStore};
pub use mysql::MySqlStore;
