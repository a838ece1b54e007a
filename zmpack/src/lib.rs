//! Timestamped project packaging.
//!
//! `zmpack` reads `zmpack.json`, runs configurable delete/command actions
//! around a copy of selected files into a staging directory, and zips that
//! directory into `{targetPath}/{name}.{timestamp}.zip`.
//!
//! - **[`core`]**: Pure, deterministic logic (action decoding, naming, path checks).
//! - **[`io`]**: Side-effecting operations (config, filesystem walking, shell, zip).
//!
//! [`pipeline`] coordinates the two to implement a pack run.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
