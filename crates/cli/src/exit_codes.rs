//! CLI exit code registry. Exit codes are part of the shell contract —
//! scripts rely on them.

/// Success.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Invalid or unparseable config file.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Runtime failure: unreadable source table, missing column, write error.
pub const EXIT_RUNTIME: u8 = 4;
