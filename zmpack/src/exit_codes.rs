//! Exit codes for the zmpack CLI.

/// The command completed; for `pack`, the archive was written.
pub const OK: i32 = 0;
/// Any failure: missing or invalid config, failed action, archive error.
pub const FAILED: i32 = 1;
