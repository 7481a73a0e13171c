/// The decoded index as an ordered table of entries
use indexmap::IndexMap;
use log::debug;

use std::{
    fmt::{Display, Formatter, Result},
    io::Write,
    path::{Path, PathBuf},
};

use crate::fat_index::{IndexRecord, SECTOR_SIZE};

/// Names ending in this suffix are XA audio tracks, everything else is MIX data
pub const XA_SUFFIX: &str = ".XA";

/// The two logical groups of an index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryGroup {
    /// Data members stored in the MIX portion of the archive
    Mix,
    /// XA audio tracks
    Xa,
}

/// A single member of the archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// The name as stored in the index
    pub name: String,
    /// The key this entry is stored under in its table.
    /// Differs from `name` when an earlier entry already used the name.
    pub display_key: String,
    /// Start of the member in sectors, as stored
    pub sector: u32,
    /// Absolute byte offset of the member in the archive
    pub offset_bytes: u64,
    /// Size of the member in bytes
    pub size_bytes: u32,
}

impl IndexEntry {
    /// Which logical group this entry falls in, decided by the name suffix
    pub fn group(&self) -> EntryGroup {
        let name = self.name.as_bytes();
        let suffix = XA_SUFFIX.as_bytes();
        if name.len() >= suffix.len()
            && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
        {
            EntryGroup::Xa
        } else {
            EntryGroup::Mix
        }
    }

    /// One past the last byte of this member in the archive
    pub fn end_bytes(&self) -> u64 {
        self.offset_bytes + u64::from(self.size_bytes)
    }
}

/// Display an entry as a fixed-width listing row
impl Display for IndexEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{:<12} ", self.display_key)?;
        write!(f, "{:>10} ", self.size_bytes)?;
        write!(f, "{:>12} ", self.offset_bytes)?;
        write!(f, "sector: 0x{:<8X}", self.sector)
    }
}

/// The decoded index.
/// Entries are kept in on-disk order and keyed by their display key.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexTable {
    source_path: PathBuf,
    entries: IndexMap<String, IndexEntry>,
}

impl IndexTable {
    pub(crate) fn new(source_path: PathBuf) -> Self {
        IndexTable {
            source_path,
            entries: IndexMap::new(),
        }
    }

    /// Add a record, renaming it if its name is already taken.
    /// The rename only ever produces one variant: the first '.' becomes "-1.".
    /// A third record with the same name replaces the "-1." entry.
    pub(crate) fn insert(&mut self, record: IndexRecord) {
        let display_key = if self.entries.contains_key(&record.name) {
            let renamed = record.name.replacen('.', "-1.", 1);
            debug!("Duplicate entry {} stored as {}", record.name, renamed);
            renamed
        } else {
            record.name.clone()
        };

        let entry = IndexEntry {
            name: record.name,
            display_key: display_key.clone(),
            sector: record.sector,
            offset_bytes: u64::from(record.sector) * SECTOR_SIZE,
            size_bytes: record.size,
        };

        if let Some(previous) = self.entries.insert(display_key, entry) {
            debug!("Entry {} replaced", previous.display_key);
        }
    }

    /// Where the index was read from
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by display key
    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    /// Display keys in on-disk order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All entries in on-disk order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Entries in one logical group, in on-disk order
    pub fn group(&self, group: EntryGroup) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values().filter(move |e| e.group() == group)
    }

    /// MIX data entries
    pub fn mix_entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.group(EntryGroup::Mix)
    }

    /// XA audio track entries
    pub fn xa_entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.group(EntryGroup::Xa)
    }

    /// Write a CSV listing, one `key,offset,size` line per entry
    pub fn write_listing<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for entry in self.entries() {
            writeln!(
                writer,
                "{},{},{}",
                entry.display_key, entry.offset_bytes, entry.size_bytes
            )?;
        }
        Ok(())
    }

    /// Build a structured dump of the table.
    /// MIX and XA entries go in separate `mix` and `xa` tables keyed by display key.
    pub fn to_toml(&self) -> toml::Table {
        fn group_table<'a>(entries: impl Iterator<Item = &'a IndexEntry>) -> toml::Table {
            let mut table = toml::Table::new();
            for entry in entries {
                let mut fields = toml::Table::new();
                // sector * 2048 always fits in an i64
                fields.insert(
                    String::from("offset"),
                    toml::Value::Integer(entry.offset_bytes as i64),
                );
                fields.insert(
                    String::from("size"),
                    toml::Value::Integer(i64::from(entry.size_bytes)),
                );
                table.insert(entry.display_key.clone(), toml::Value::Table(fields));
            }
            table
        }

        let mut dump = toml::Table::new();
        dump.insert(
            String::from("path"),
            toml::Value::String(self.source_path.display().to_string()),
        );
        dump.insert(
            String::from("mix"),
            toml::Value::Table(group_table(self.mix_entries())),
        );
        dump.insert(
            String::from("xa"),
            toml::Value::Table(group_table(self.xa_entries())),
        );
        dump
    }
}

impl Display for IndexTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "{}:", self.source_path.display())?;
        writeln!(f, "{:<12} {:>10} {:>12}", "name", "size", "offset")?;
        for entry in self.entries() {
            writeln!(f, "{}", entry)?;
        }
        writeln!(
            f,
            "{} entries, {} MIX, {} XA",
            self.len(),
            self.mix_entries().count(),
            self.xa_entries().count()
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use super::{EntryGroup, IndexEntry, IndexTable};
    use crate::fat_index::IndexRecord;

    fn record(name: &str, sector: u32, size: u32) -> IndexRecord {
        IndexRecord {
            name: String::from(name),
            sector,
            size,
        }
    }

    /// Build a table with a mix of data and audio entries
    fn build_table() -> IndexTable {
        let mut table = IndexTable::new(PathBuf::from("DATA.FAT"));
        table.insert(record("SCORES.MIX", 2, 100));
        table.insert(record("TRACK1.XA", 10, 4096));
        table.insert(record("SPEECH.MIX", 20, 50));
        table.insert(record("track2.xa", 30, 2048));
        table.insert(record("SCORES.MIX", 40, 70));
        table.insert(record("XA", 50, 1));
        table
    }

    #[test]
    fn groups_are_decided_by_suffix() {
        let entry = |name: &str| IndexEntry {
            name: String::from(name),
            display_key: String::from(name),
            sector: 0,
            offset_bytes: 0,
            size_bytes: 0,
        };

        assert_eq!(entry("TRACK.XA").group(), EntryGroup::Xa);
        assert_eq!(entry("track.Xa").group(), EntryGroup::Xa);
        assert_eq!(entry("TRACK.MIX").group(), EntryGroup::Mix);
        assert_eq!(entry("XA").group(), EntryGroup::Mix);
        assert_eq!(entry("TRACK.XAX").group(), EntryGroup::Mix);
        assert_eq!(entry("").group(), EntryGroup::Mix);
    }

    #[test]
    fn groups_partition_the_table() {
        let table = build_table();

        let mix: HashSet<&str> = table
            .mix_entries()
            .map(|e| e.display_key.as_str())
            .collect();
        let xa: HashSet<&str> = table
            .xa_entries()
            .map(|e| e.display_key.as_str())
            .collect();
        let all: HashSet<&str> = table.keys().collect();

        assert!(mix.is_disjoint(&xa));
        assert_eq!(mix.union(&xa).cloned().collect::<HashSet<&str>>(), all);
        assert_eq!(table.xa_entries().count(), 2);
        assert_eq!(table.mix_entries().count(), 4);
    }

    #[test]
    fn groups_keep_on_disk_order() {
        let table = build_table();

        let xa: Vec<&str> = table.xa_entries().map(|e| e.name.as_str()).collect();
        assert_eq!(xa, vec!["TRACK1.XA", "track2.xa"]);
    }

    #[test]
    fn offsets_are_in_bytes() {
        let table = build_table();
        let entry = table.get("SCORES-1.MIX").unwrap();

        assert_eq!(entry.offset_bytes, 40 * 2048);
        assert_eq!(entry.end_bytes(), 40 * 2048 + 70);
    }

    #[test]
    fn listing_is_csv_in_order() {
        let table = build_table();
        let mut out = Vec::new();

        table.write_listing(&mut out).unwrap();

        let listing = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "SCORES.MIX,4096,100");
        assert_eq!(lines[4], "SCORES-1.MIX,81920,70");
    }

    #[test]
    fn toml_dump_splits_groups() {
        let table = build_table();
        let dump = table.to_toml();

        assert_eq!(dump["path"].as_str(), Some("DATA.FAT"));

        let mix = dump["mix"].as_table().unwrap();
        let xa = dump["xa"].as_table().unwrap();
        assert_eq!(mix.len(), 4);
        assert_eq!(xa.len(), 2);
        assert_eq!(xa["TRACK1.XA"]["offset"].as_integer(), Some(20480));
        assert_eq!(xa["TRACK1.XA"]["size"].as_integer(), Some(4096));

        // The dump should be parseable TOML
        let text = dump.to_string();
        let parsed: toml::Table = text.parse().unwrap();
        assert_eq!(parsed, dump);
    }

    #[test]
    fn display_lists_every_entry() {
        let table = build_table();
        let text = format!("{}", table);

        assert!(text.starts_with("DATA.FAT:\n"));
        assert!(text.contains("SCORES-1.MIX"));
        assert!(text.ends_with("6 entries, 4 MIX, 2 XA\n"));
    }
}
