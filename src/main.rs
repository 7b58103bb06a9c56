//! usnscope CLI
//!
//! Command-line interface for dumping USN journals and building timelines
//! from an extracted `$J` stream plus a directory walk listing.

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use usnscope::logging::{self, LogLevel};
use usnscope::{
    format_optional_size, timeline_from_source, usn_journal, JournalEntry, ListingSource,
    RootStat, TimelineConfig,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// usnscope - NTFS USN journal timelines
///
/// Decodes `$UsnJrnl:$J` streams and correlates them with a directory walk
/// to rebuild what happened to which file, including deleted ones.
#[derive(Parser)]
#[command(name = "usnscope")]
#[command(author = "usnscope Contributors")]
#[command(version)]
#[command(about = "NTFS USN journal timeline builder", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode every record of a journal file
    Journal {
        /// Extracted $UsnJrnl:$J file
        file: PathBuf,

        /// Fail on the first corrupted record
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Build the change timeline of a volume
    Timeline {
        /// Extracted $UsnJrnl:$J file
        #[arg(short, long)]
        journal: PathBuf,

        /// JSON-lines directory walk, one entry per line
        #[arg(short, long)]
        listing: PathBuf,

        /// Inode of the volume root
        #[arg(long, default_value = "5")]
        root_inode: u64,

        /// Path of the volume root as used in the listing
        #[arg(long, default_value = "/")]
        root_path: String,

        /// Fail if any record is corrupted or any event is unresolved
        #[arg(long)]
        strict: bool,

        /// Only parse this many leading journal bytes
        #[arg(long)]
        max_bytes: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

fn main() {
    let cli = Cli::parse();

    logging::init(LogLevel::from_verbosity(cli.verbose));
    logging::info("MAIN", "usnscope starting up");

    let result = match cli.command {
        Commands::Journal {
            file,
            strict,
            output,
        } => cmd_journal(&file, strict, output),

        Commands::Timeline {
            journal,
            listing,
            root_inode,
            root_path,
            strict,
            max_bytes,
            output,
        } => {
            let source = ListingSource::new(journal, listing, RootStat::new(root_inode, 0, root_path));
            let mut config = TimelineConfig::default().with_strict(strict);
            config.max_journal_bytes = max_bytes;
            cmd_timeline(&source, &config, output)
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// Journal command implementation
fn cmd_journal(file: &Path, strict: bool, output: OutputFormat) -> usnscope::Result<()> {
    let entries = usn_journal(file)?;
    let mut stdout = std::io::stdout().lock();
    let mut corrupted = 0u64;

    for entry in entries {
        if strict {
            if let JournalEntry::Corrupted(record) = &entry {
                return Err(record.to_error());
            }
        }

        match output {
            OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string(&entry)?)?,
            OutputFormat::Text => match &entry {
                JournalEntry::Record(record) => writeln!(
                    stdout,
                    "{} {:>12} {:>8} {} [{}] [{}]",
                    style(record.timestamp.format("%Y-%m-%d %H:%M:%S%.6f")).cyan(),
                    record.usn,
                    record.file_id,
                    record.file_name,
                    record.reasons.join(", "),
                    record.attributes.join(", ")
                )?,
                JournalEntry::Corrupted(record) => {
                    corrupted += 1;
                    writeln!(
                        stdout,
                        "{} #{} at offset {}: {}",
                        style("corrupted").red(),
                        record.index,
                        record.offset,
                        record.kind
                    )?
                }
            },
        }
    }

    if corrupted > 0 {
        eprintln!(
            "{} {} corrupted records, some events might be missing",
            style("Warning:").yellow().bold(),
            corrupted
        );
    }

    Ok(())
}

/// Timeline command implementation
fn cmd_timeline(
    source: &ListingSource,
    config: &TimelineConfig,
    output: OutputFormat,
) -> usnscope::Result<()> {
    let report = timeline_from_source(source, config)?;
    let mut stdout = std::io::stdout().lock();

    match output {
        OutputFormat::Json => {
            for event in &report.events {
                writeln!(stdout, "{}", serde_json::to_string(event)?)?;
            }
        }
        OutputFormat::Text => {
            for event in &report.events {
                let path = if event.allocated {
                    style(event.path.as_str()).green()
                } else {
                    style(event.path.as_str()).red()
                };
                writeln!(
                    stdout,
                    "{} {:>10} {} [{}]",
                    style(event.timestamp.format("%Y-%m-%d %H:%M:%S%.6f")).cyan(),
                    format_optional_size(event.size),
                    path,
                    event.changes.join(", ")
                )?;
            }
        }
    }

    let stats = report.stats;
    eprintln!(
        "{} {} events ({} records, {} corrupted, {} unresolved)",
        style("✓").green().bold(),
        stats.emitted,
        stats.journal.records,
        stats.journal.corrupted,
        stats.dropped
    );

    Ok(())
}
