//! Crate-wide error taxonomy.
//!
//! Mirrors the failure semantics described for the browser: an image that
//! cannot be opened is fatal, a short read folds into end-of-stream rather
//! than surfacing as an error, and a bad interactive selection is
//! recoverable.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure to open or mount the volume image.
#[derive(Debug, Error)]
pub enum ImageOpenError {
    #[error("could not open image file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("boot sector read returned {bytes_read} bytes, expected 512")]
    ShortBootSectorRead { bytes_read: usize },
}

/// The boot sector was read but describes a volume this reader cannot use.
#[derive(Debug, Error)]
pub enum MountError {
    #[error(transparent)]
    Open(#[from] ImageOpenError),
    #[error("bytes_per_sector is zero")]
    ZeroBytesPerSector,
    #[error("sectors_per_cluster is zero")]
    ZeroSectorsPerCluster,
    #[error("FAT read returned {bytes_read} bytes, expected at least {expected}")]
    ShortFatRead { bytes_read: usize, expected: usize },
}

/// A recoverable problem with interactive input at the CLI boundary.
#[derive(Debug, Error)]
pub enum InvalidInput {
    #[error("Invalid syntax")]
    NotANumber,
    #[error("Invalid syntax")]
    OutOfRange,
}
