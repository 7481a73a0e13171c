/// Extract member files from a MIX/XA archive using its FAT index
/// Usage: mix-extractor --mix DATA.MIX [--fat DATA.FAT] [--include PATTERN...] [--exclude PATTERN...]
///
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use log::{error, info};

use mix_fat::extract::{extract_entries, extract_to_directory, progress_line, OnError};
use mix_fat::settings::{Settings, DEFAULT_CONFIG};
use mix_fat::{read_index, EntryFilter, ExtractionReport, MixArchive, PatternSet, Result};

/// Command line arguments to extract an archive
#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
    /// MIX/XA archive to extract from
    #[clap(short, long)]
    mix: String,

    /// FAT index for the archive
    /// Defaults to the archive path with a .FAT extension
    #[clap(short, long)]
    fat: Option<String>,

    /// Directory to write extracted files to
    #[clap(short, long)]
    output: Option<String>,

    /// Only extract names matching one of these patterns (default: everything)
    #[clap(short, long, num_args = 1..)]
    include: Vec<String>,

    /// Never extract names matching one of these patterns
    #[clap(short = 'x', long, num_args = 1..)]
    exclude: Vec<String>,

    /// Treat patterns as regular expressions instead of wildcards
    #[clap(long)]
    regex: bool,

    /// Keep going when an entry fails to extract
    #[clap(long)]
    continue_on_error: bool,

    /// Settings file
    #[clap(long, default_value = DEFAULT_CONFIG)]
    config: String,
}

/// The index path to use when none is given
fn default_fat_path(mix: &str) -> PathBuf {
    Path::new(mix).with_extension("FAT")
}

/// Build the include / exclude filter from the command line patterns
fn build_filter(args: &Args) -> Result<EntryFilter> {
    let include = if args.include.is_empty() {
        vec![String::from(if args.regex { ".*" } else { "*" })]
    } else {
        args.include.clone()
    };

    if args.regex {
        Ok(EntryFilter::new(
            PatternSet::regexes(&include)?,
            PatternSet::regexes(&args.exclude)?,
        ))
    } else {
        Ok(EntryFilter::new(
            PatternSet::wildcards(&include),
            PatternSet::wildcards(&args.exclude),
        ))
    }
}

/// Decode the index and extract every selected entry
fn run(args: &Args, settings: &Settings) -> Result<ExtractionReport> {
    let fat_path = match &args.fat {
        Some(path) => PathBuf::from(path),
        None => default_fat_path(&args.mix),
    };
    let output_path = match &args.output {
        Some(path) => PathBuf::from(path),
        None => settings.output_path.clone(),
    };
    let on_error = if args.continue_on_error {
        OnError::Continue
    } else {
        settings.on_error()
    };

    let table = read_index(&fat_path)?;
    let filter = build_filter(args)?;
    let mut write = extract_to_directory(&output_path)?;

    // The archive is closed when it goes out of scope, whatever happens
    let mut archive = MixArchive::open(&args.mix)?;
    extract_entries(
        &mut archive,
        &table,
        &filter,
        on_error,
        |key, entry, data| {
            write(key, entry, data)?;
            println!("{}", progress_line(key, entry));
            Ok(())
        },
    )
}

/// Extract an archive
fn main() {
    // Initialize logger
    if let Err(e) = env_logger::try_init() {
        panic!("couldn't initialize logger: {:?}", e);
    }

    // Parse command line arguments
    let args = Args::parse();

    let settings = match Settings::load(&args.config) {
        Ok(settings) => {
            info!("merged in config");
            settings
        }
        Err(e) => {
            error!("error loading config: {}", e);
            Settings::default()
        }
    };

    match run(&args, &settings) {
        Ok(report) if report.is_success() => exit(0),
        Ok(report) => {
            for failure in &report.failures {
                eprintln!("{}", failure);
            }
            eprintln!(
                "{} extracted, {} failed",
                report.extracted.len(),
                report.failures.len()
            );
            exit(1);
        }
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;

    use super::{build_filter, default_fat_path, Args};

    #[test]
    fn fat_path_defaults_to_mix_path() {
        assert_eq!(default_fat_path("cd/DATA.MIX"), PathBuf::from("cd/DATA.FAT"));
    }

    #[test]
    fn no_include_pattern_selects_everything() {
        let args = Args::parse_from(["mix-extractor", "--mix", "DATA.MIX"]);
        let filter = build_filter(&args).unwrap();

        assert!(filter.selects("TRACK.XA"));
        assert!(filter.selects("SCORES.MIX"));
    }

    #[test]
    fn wildcard_patterns_are_used_by_default() {
        let args = Args::parse_from([
            "mix-extractor",
            "--mix",
            "DATA.MIX",
            "--include",
            "*.XA",
            "--exclude",
            "TRACK.*",
        ]);
        let filter = build_filter(&args).unwrap();

        assert!(!filter.selects("TRACK.XA"));
        assert!(filter.selects("MUSIC.XA"));
        assert!(!filter.selects("SCORES.MIX"));
    }

    #[test]
    fn regex_patterns_are_used_on_request() {
        let args = Args::parse_from([
            "mix-extractor",
            "--mix",
            "DATA.MIX",
            "--regex",
            "--include",
            r"\.MIX$",
        ]);
        let filter = build_filter(&args).unwrap();

        assert!(filter.selects("SCORES.MIX"));
        assert!(!filter.selects("TRACK.XA"));
    }
}
