//! Exit codes for the `nodetree` binary (BSD sysexits.h values)

/// Successful termination
pub const OK: i32 = 0;

/// Malformed script or a tree operation the script asked for failed
pub const DATAERR: i32 = 65;

/// Script file could not be opened
pub const NOINPUT: i32 = 66;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
