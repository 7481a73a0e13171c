/// Extract selected members of an archive
///
/// The archive is opened once by the caller and borrowed for the whole batch.
/// What happens to the extracted bytes is up to the sink.
use log::{debug, error, info, warn};

use std::fs;
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

use crate::archive::MixArchive;
use crate::entry_table::{IndexEntry, IndexTable};
use crate::error::{Error, Result};
use crate::filter::EntryFilter;

/// What to do when a single entry fails to extract
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnError {
    /// Stop the batch and return the error
    #[default]
    Abort,
    /// Record the failure and carry on with the next entry
    Continue,
}

/// The outcome of an extraction batch
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Display keys of the entries that were extracted, in order
    pub extracted: Vec<String>,
    /// Number of entries the filter rejected
    pub skipped: usize,
    /// Entries that failed, each wrapped in [`Error::Extract`]
    pub failures: Vec<Error>,
}

impl ExtractionReport {
    /// True if no entry failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Extract every entry the filter selects, in index order.
///
/// Each selected entry's bytes are handed to `sink` along with its display key.
/// Entries are filtered on their stored name, not their display key.
/// With [`OnError::Abort`] the first failure is returned; with
/// [`OnError::Continue`] failures are collected in the report.
/// Either way the archive stays usable.
pub fn extract_entries<R, F>(
    archive: &mut MixArchive<R>,
    table: &IndexTable,
    filter: &EntryFilter,
    on_error: OnError,
    mut sink: F,
) -> Result<ExtractionReport>
where
    R: Read + Seek,
    F: FnMut(&str, &IndexEntry, Vec<u8>) -> Result<()>,
{
    let mut report = ExtractionReport::default();

    for entry in table.entries() {
        if !filter.selects(&entry.name) {
            debug!("Skipping {}", entry.display_key);
            report.skipped += 1;
            continue;
        }

        let result = archive
            .read_entry(entry)
            .and_then(|data| sink(&entry.display_key, entry, data));

        match result {
            Ok(()) => report.extracted.push(entry.display_key.clone()),
            Err(e) => {
                let e = Error::Extract {
                    name: entry.display_key.clone(),
                    source: Box::new(e),
                };
                match on_error {
                    OnError::Abort => {
                        error!("{}", e);
                        return Err(e);
                    }
                    OnError::Continue => {
                        warn!("{}", e);
                        report.failures.push(e);
                    }
                }
            }
        }
    }

    info!(
        "Extracted {} entries from {}, skipped {}, {} failed",
        report.extracted.len(),
        archive.path().display(),
        report.skipped,
        report.failures.len()
    );

    Ok(report)
}

/// Write a member to `dir`, named by its display key.
/// Keys that aren't a single plain file name, such as absolute paths,
/// names with `..` or empty names, fail with [`Error::UnsafeName`].
pub fn write_member(dir: &Path, key: &str, data: &[u8]) -> Result<PathBuf> {
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => (),
        _ => {
            return Err(Error::UnsafeName {
                name: String::from(key),
            })
        }
    }

    let path = dir.join(key);
    fs::write(&path, data).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// A progress line for an extracted entry, e.g.
/// `SCORES.MIX  : Read 00000100 bytes from offset 00004096`
pub fn progress_line(key: &str, entry: &IndexEntry) -> String {
    format!(
        "{:<12}: Read {:08} bytes from offset {:08}",
        key, entry.size_bytes, entry.offset_bytes
    )
}

/// Build a sink that writes every member into `dir`.
/// The directory is created up front.
pub fn extract_to_directory(
    dir: &Path,
) -> Result<impl FnMut(&str, &IndexEntry, Vec<u8>) -> Result<()> + '_> {
    fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    Ok(move |key: &str, entry: &IndexEntry, data: Vec<u8>| -> Result<()> {
        let path = write_member(dir, key, &data)?;
        debug!(
            "Wrote {} bytes from offset {} to {}",
            entry.size_bytes,
            entry.offset_bytes,
            path.display()
        );
        Ok(())
    })
}
