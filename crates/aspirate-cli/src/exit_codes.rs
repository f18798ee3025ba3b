//! Process exit codes
//!
//! Build aborts keep the orchestrator's own codes
//! (see `aspirate_build::exit_codes`).

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Manifest or configuration error - unreadable manifest, bad resource, bad image
pub const MANIFEST_ERROR: i32 = 2;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
