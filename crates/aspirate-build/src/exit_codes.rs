//! Exit codes surfaced by the build orchestrator

/// Registry access denied and no login possible (non-interactive)
pub const REGISTRY_ACCESS_DENIED: i32 = 1000;

/// Registry address unknown or unreachable
pub const UNKNOWN_REGISTRY_ADDRESS: i32 = 1013;

/// Any other unrecoverable build failure, or a declined retry/login
pub const UNRECOVERABLE: i32 = 9999;
