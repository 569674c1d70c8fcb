//! Stable exit codes for siteup CLI commands.

/// Run completed (including an empty-instruction abort) or check passed.
pub const OK: i32 = 0;
/// Fatal error: endpoint, config, or page I/O failure.
pub const FAILED: i32 = 1;
