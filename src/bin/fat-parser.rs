/// Parse a FAT index file and print its entries
/// Usage: fat-parser --input DATA.FAT [--format table|csv|toml] [--output FILE]
///
use std::fs;
use std::process::exit;

use clap::{Parser, ValueEnum};
use log::{error, info};

use mix_fat::fat_index::read_index;
use mix_fat::settings::{Settings, DEFAULT_CONFIG};
use mix_fat::IndexTable;

/// How to render the decoded index
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Fixed-width table
    Table,
    /// One `name,offset,size` line per entry
    Csv,
    /// TOML document with separate MIX and XA tables
    Toml,
}

/// Command line arguments to parse an index file
#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
    /// FAT index to parse
    #[clap(short, long)]
    input: String,

    /// Output format
    #[clap(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write the listing to a file instead of stdout
    #[clap(short, long)]
    output: Option<String>,

    /// Settings file
    #[clap(long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Verbose mode will print a summary of the index groups
    #[clap(short, long)]
    verbose: bool,
}

/// Render the table in the requested format
fn render(table: &IndexTable, format: Format) -> String {
    match format {
        Format::Table => format!("{}", table),
        Format::Csv => {
            let mut listing = Vec::new();
            // Writing into a Vec can't fail
            let _ = table.write_listing(&mut listing);
            String::from_utf8_lossy(&listing).into_owned()
        }
        Format::Toml => table.to_toml().to_string(),
    }
}

/// Parse an index file
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
    let verbose = args.verbose || settings.verbose;

    let table = match read_index(&args.input) {
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            exit(1);
        }
        Ok(table) => table,
    };

    if verbose {
        eprintln!(
            "{}: {} entries, {} MIX, {} XA",
            table.source_path().display(),
            table.len(),
            table.mix_entries().count(),
            table.xa_entries().count()
        );
    }

    let rendered = render(&table, args.format);

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, rendered) {
                error!("Error writing {}: {}", path, e);
                eprintln!("Error writing {}: {}", path, e);
                exit(1);
            }
        }
        None => print!("{}", rendered),
    }

    exit(0);
}
