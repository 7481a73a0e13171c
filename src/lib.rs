#![warn(missing_docs)]
#![warn(unsafe_code)]
//! PlayStation FAT index parser and MIX/XA archive extractor
//!
//! A FAT index lists the members of a companion MIX/XA data archive.
//! Decode the index with [`fat_index::read_index`], open the archive with
//! [`archive::MixArchive::open`] and pull members out with
//! [`extract::extract_entries`].

/// FAT index decoder
pub mod fat_index;

/// The decoded index table and its MIX / XA groups
pub mod entry_table;

/// Random-access reads from the data archive
pub mod archive;

/// Include / exclude patterns
pub mod filter;

/// Batch extraction
/// This module combines the index table with the archive
/// to pull out member files
pub mod extract;

/// Settings for the command line tools
pub mod settings;

/// Error types
pub mod error;

pub use archive::MixArchive;
pub use entry_table::{EntryGroup, IndexEntry, IndexTable};
pub use error::{Error, Result};
pub use extract::{extract_entries, ExtractionReport, OnError};
pub use fat_index::{decode, read_index};
pub use filter::{EntryFilter, NameMatcher, PatternSet, Wildcard};
