//! I/O helpers for pack runs.

pub mod actions;
pub mod archive;
pub mod config;
pub mod process;
pub mod shell;
pub mod staging;
pub mod walker;
