/// Parse a FAT archive index
///
/// A FAT index is the table of contents for a MIX/XA data archive.
/// It is an eight byte header followed by fixed-size 28 byte records.
/// All integers are little-endian.
///
/// Record layout:
/// offset 0:  twelve byte name, NUL padded
/// offset 12: four reserved bytes
/// offset 16: start of the member in 2048 byte sectors
/// offset 20: size of the member in bytes
/// offset 24: four bytes of padding
use log::{debug, info, warn};
use nom::bytes::complete::take;
use nom::combinator::complete;
use nom::multi::many0;
use nom::number::complete::le_u32;
use nom::IResult;

use std::fs;
use std::path::{Path, PathBuf};

use crate::entry_table::IndexTable;
use crate::error::{Error, Result};

/// Size of the file-level header, the fields are unused
pub const HEADER_SIZE: usize = 8;

/// Size of a single index record
pub const RECORD_SIZE: usize = 28;

/// Width of the name field at the start of a record
pub const NAME_SIZE: usize = 12;

/// CD-ROM logical sector size, sector numbers are multiplied by this
pub const SECTOR_SIZE: u64 = 2048;

/// A raw index record before it is placed into a table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRecord {
    /// offset 0
    /// Name with every NUL byte removed
    pub name: String,
    /// offset 16
    /// Start of the member in sectors
    pub sector: u32,
    /// offset 20
    /// Size of the member in bytes
    pub size: u32,
}

/// Decode a fixed-width ASCII name field.
/// Every NUL byte is dropped, wherever it sits in the field.
/// Bytes outside the ASCII range become '?'.
///
/// # Examples
///
/// ```
/// use mix_fat::fat_index::parse_padded_name;
///
/// assert_eq!(parse_padded_name(b"SCORES.MIX\0\0"), "SCORES.MIX");
/// assert_eq!(parse_padded_name(b"A\0B.XA\0\0\0\0\0\0"), "AB.XA");
/// ```
pub fn parse_padded_name(field: &[u8]) -> String {
    field
        .iter()
        .filter(|b| **b != 0)
        .map(|b| if b.is_ascii() { *b as char } else { '?' })
        .collect()
}

/// Skip the file-level header
pub fn index_header_parser(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take(HEADER_SIZE)(i)
}

/// Parse a single 28 byte index record
///
/// # Examples
///
/// ```
/// use mix_fat::fat_index::index_record_parser;
///
/// let mut record = [0_u8; 28];
/// record[..6].copy_from_slice(b"MUS.XA");
/// record[16] = 0x10;
/// record[20] = 0x00;
/// record[21] = 0x01;
///
/// let (rest, record) = index_record_parser(&record).unwrap();
/// assert!(rest.is_empty());
/// assert_eq!(record.name, "MUS.XA");
/// assert_eq!(record.sector, 16);
/// assert_eq!(record.size, 256);
/// ```
pub fn index_record_parser(i: &[u8]) -> IResult<&[u8], IndexRecord> {
    let (i, name) = take(NAME_SIZE)(i)?;
    let (i, _reserved) = take(4_usize)(i)?;
    let (i, sector) = le_u32(i)?;
    let (i, size) = le_u32(i)?;
    let (i, _padding) = take(4_usize)(i)?;

    let name = parse_padded_name(name);
    debug!("Read record: {} sector {} size {}", name, sector, size);

    Ok((i, IndexRecord { name, sector, size }))
}

/// Parse every complete record, leaving any short trailing record unconsumed
pub fn index_records_parser(i: &[u8]) -> IResult<&[u8], Vec<IndexRecord>> {
    many0(complete(index_record_parser))(i)
}

/// Decode a fully buffered FAT index into an entry table.
///
/// `source_path` is only used for diagnostics.
/// Fails with [`Error::Format`] if the data can't hold the header and
/// at least one record.
/// A partial record at the end of the data is dropped.
///
/// # Examples
///
/// ```
/// use mix_fat::fat_index::decode;
///
/// let mut data = vec![0_u8; 8 + 28];
/// data[8..13].copy_from_slice(b"A.MIX");
/// data[24] = 1;
///
/// let table = decode(&data, "DATA.FAT").unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.get("A.MIX").unwrap().offset_bytes, 2048);
/// ```
pub fn decode(data: &[u8], source_path: impl Into<PathBuf>) -> Result<IndexTable> {
    let path = source_path.into();
    let length = data.len();

    if length < HEADER_SIZE + RECORD_SIZE {
        return Err(Error::Format { path, length });
    }

    // Unreachable after the length check, the parsers can't fail on this input
    let format_error = |_| Error::Format {
        path: path.clone(),
        length,
    };
    let (i, _header) = index_header_parser(data).map_err(format_error)?;
    let (rest, records) = index_records_parser(i).map_err(format_error)?;

    if !rest.is_empty() {
        warn!(
            "{}: dropping {} trailing bytes, short of a full record",
            path.display(),
            rest.len()
        );
    }

    let mut table = IndexTable::new(path);
    for record in records {
        table.insert(record);
    }

    info!(
        "Decoded {}: {} entries ({} MIX, {} XA)",
        table.source_path().display(),
        table.len(),
        table.mix_entries().count(),
        table.xa_entries().count()
    );

    Ok(table)
}

/// Read a FAT index file from disk and decode it
pub fn read_index(path: impl AsRef<Path>) -> Result<IndexTable> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| Error::from_open(path, e))?;
    info!("Read {}: {} bytes", path.display(), data.len());

    decode(&data, path)
}
