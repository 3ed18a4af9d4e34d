//! Library defaults for `FileConfig`.

/// Permission bits for files created through `GvtFile::create`.
pub const OPEN_MODE: u32 = 0o644;

/// Add O_CLOEXEC to every open.
pub const CLOEXEC: bool = true;

/// Log channel open/attach/close/detach at info instead of debug.
pub const LOG_LIFECYCLE: bool = false;
