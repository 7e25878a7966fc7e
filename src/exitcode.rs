//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Generic failure (delegated program died without an exit code)
pub const FAILURE: i32 = 1;

/// Command line usage error (no command matched the given tokens)
pub const USAGE: i32 = 64;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// System error (e.g., can't fork or exec a delegated program)
pub const OSERR: i32 = 71;

/// Can't create output file
pub const CANTCREAT: i32 = 73;

/// Configuration error (settings or logging configuration)
pub const CONFIG: i32 = 78;
