/// Error types for index decoding and archive extraction
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a FAT index or extracting from a MIX/XA archive
#[derive(Debug, Error)]
pub enum Error {
    /// The index or archive file does not exist
    #[error("file not found: {}", path.display())]
    NotFound {
        /// The path that was opened
        path: PathBuf,
    },

    /// The index is too short to hold the header and a single entry
    #[error("not a FAT file or contains zero entries: {} ({length} bytes)", path.display())]
    Format {
        /// Where the index bytes came from
        path: PathBuf,
        /// Length of the index in bytes
        length: usize,
    },

    /// The archive ends before the requested range does
    #[error("archive is {archive_len} bytes, cannot read {size} bytes at offset {offset}")]
    TruncatedRead {
        /// Byte offset of the requested range
        offset: u64,
        /// Length of the requested range
        size: u64,
        /// Total archive length
        archive_len: u64,
    },

    /// Any other I/O failure from the underlying file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being read or written
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A single entry failed to extract
    #[error("failed to extract {name}: {source}")]
    Extract {
        /// Display key of the entry
        name: String,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },

    /// An entry name can't be used as a file name inside the output directory
    #[error("entry name {name:?} is not a plain file name")]
    UnsafeName {
        /// The offending display key
        name: String,
    },

    /// A name pattern could not be compiled
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        /// The pattern as supplied
        pattern: String,
        /// The regex compiler error
        #[source]
        source: regex::Error,
    },

    /// Settings could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Classify an I/O error raised while opening `path`
    pub fn from_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound { path },
            _ => Error::Io { path, source },
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn missing_file_is_not_found() {
        let err = Error::from_open("DATA.FAT", io::Error::from(io::ErrorKind::NotFound));
        match err {
            Error::NotFound { path } => assert_eq!(path, PathBuf::from("DATA.FAT")),
            e => panic!("Expected NotFound, got {:?}", e),
        }
    }

    #[test]
    fn other_open_failures_are_io() {
        let err = Error::from_open(
            "DATA.MIX",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().starts_with("I/O error on DATA.MIX"));
    }

    #[test]
    fn truncated_read_message_has_range() {
        let err = Error::TruncatedRead {
            offset: 4096,
            size: 100,
            archive_len: 4100,
        };
        assert_eq!(
            err.to_string(),
            "archive is 4100 bytes, cannot read 100 bytes at offset 4096"
        );
    }
}
