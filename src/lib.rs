//! Crate root.

pub mod config;
pub mod database;
pub mod dfs;
pub mod error;
pub mod types;

pub use error::{DfsError, Result};
