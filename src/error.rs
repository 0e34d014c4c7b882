use std::io;

/// Everything that can go wrong while loading or running a libretro core.
///
/// Environment-command handlers never produce an `Error` — per the libretro
/// ABI they report success/failure as a `bool` return value (see
/// `environment::Dispatcher`). This enum is only for the public, fallible
/// entry points: construction, (de)serialization, and memory-map
/// preprocessing's internal diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load core library: {0}")]
    ModuleLoadFailed(#[source] libloading::Error),

    #[error("core is missing required symbol `{symbol}`")]
    ModuleSymbolMissing {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("core was compiled against libretro api version `{found}`, expected `{expected}`")]
    ApiVersionMismatch { expected: u32, found: u32 },

    #[error("core does not support running without game data")]
    NoGameData,

    #[error("I/O error loading game data from `{path}`: {source}")]
    IoError {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("short read loading `{path}`: expected {expected} bytes, read {actual}")]
    ShortRead {
        path: std::path::PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("core's retro_load_game returned false")]
    LoadGameFailed,

    /// Reserved for a peripheral write-direction mismatch in a BDF-style
    /// host this core does not implement. Never constructed by this crate;
    /// kept so exhaustive downstream `match`es stay stable.
    #[error("unsupported write direction")]
    UnsupportedWriteDirection,

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
