use thiserror::Error;

/// Everything that can go wrong turning the compiled-in bytes into a
/// [`crate::Table`], plus the malformed-leaf conditions the resolver can
/// run into at lookup time.
///
/// Only the build-time variants (`Io`, `InvalidCountryCode`, `Truncated`,
/// `UnknownLeafTag`, `WrongZoomLevelCount`) can actually be returned from
/// [`crate::Table::build`]; a correctly generated table never exercises
/// `LeafIndexOutOfRange` or `RecursionOverflow` at runtime (see invariant 4
/// in the design notes). Those two variants exist so the resolver has a
/// named, loggable value instead of matching a silent wildcard arm before
/// degrading to `None`.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("io/gzip error while decoding packed table data: {0}")]
    Io(#[from] std::io::Error),

    #[error("country code bytes are not valid utf-8")]
    InvalidCountryCode,

    #[error("packed blob ended mid-record while reading {context}")]
    Truncated { context: &'static str },

    #[error("unknown leaf tag {tag:#04x}")]
    UnknownLeafTag { tag: u8 },

    #[error("expected exactly 6 zoom levels, found {found}")]
    WrongZoomLevelCount { found: usize },

    #[error("leaf index {index} out of range ({len} leaves)")]
    LeafIndexOutOfRange { index: u16, len: usize },

    #[error("leaf resolution exceeded recursion cap of {cap}")]
    RecursionOverflow { cap: u32 },
}
