/// Random-access reads from a MIX/XA data archive
///
/// The archive is an opaque blob, members are located with offsets
/// from a decoded FAT index.
use log::{debug, info};

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::entry_table::IndexEntry;
use crate::error::{Error, Result};

/// An open data archive.
/// The underlying source is owned by the archive and closed when it is dropped.
/// A failed read leaves the archive usable for further reads.
#[derive(Debug)]
pub struct MixArchive<R> {
    reader: R,
    path: PathBuf,
    len: u64,
}

impl MixArchive<File> {
    /// Open an archive file read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::from_open(path, e))?;
        let archive = MixArchive::from_reader(file, path)?;
        info!("Opened {}: {} bytes", path.display(), archive.len());

        Ok(archive)
    }
}

impl<R: Read + Seek> MixArchive<R> {
    /// Wrap any seekable byte source.
    /// `path` is only used in error messages.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use mix_fat::archive::MixArchive;
    ///
    /// let data = Cursor::new(b"HELLOWORLD".to_vec());
    /// let mut archive = MixArchive::from_reader(data, "DATA.MIX").unwrap();
    /// assert_eq!(archive.read_range(5, 5).unwrap(), b"WORLD");
    /// ```
    pub fn from_reader(mut reader: R, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let len = reader.seek(SeekFrom::End(0)).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;

        Ok(MixArchive { reader, path, len })
    }

    /// Read exactly `size` bytes starting at `offset`.
    /// Fails with [`Error::TruncatedRead`] if the archive ends first.
    pub fn read_range(&mut self, offset: u64, size: u32) -> Result<Vec<u8>> {
        let archive_len = self.len;
        let truncated = || Error::TruncatedRead {
            offset,
            size: u64::from(size),
            archive_len,
        };

        match offset.checked_add(u64::from(size)) {
            Some(end) if end <= archive_len => (),
            _ => return Err(truncated()),
        }

        debug!("Reading {} bytes at offset {}", size, offset);
        self.reader
            .seek(SeekFrom::Start(offset))
            .map_err(|source| Error::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut data = vec![0_u8; size as usize];
        match self.reader.read_exact(&mut data) {
            Ok(()) => Ok(data),
            // The source shrank since it was opened
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(truncated()),
            Err(source) => Err(Error::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read the bytes of a single index entry
    pub fn read_entry(&mut self, entry: &IndexEntry) -> Result<Vec<u8>> {
        self.read_range(entry.offset_bytes, entry.size_bytes)
    }
}

impl<R> MixArchive<R> {
    /// Total archive length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True if the archive has no bytes at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Where the archive was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the archive, returning the underlying source
    pub fn into_inner(self) -> R {
        self.reader
    }
}
