//! Classical Tagger CLI - review and correct tags of a classical FLAC library
//!
//! # Main Commands
//!
//! ```bash
//! classical-tagger read /music/Classical --output tags.csv     # Tags -> review sheet
//! classical-tagger write tags.csv --output failed.csv          # Review sheet -> tags
//! classical-tagger validate tags.csv                           # Check a review sheet
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! classical-tagger parse-title "Symphony No 41 in C, 'Jupiter', K 551 - I. Allegro vivace"
//! classical-tagger parse-album "[1971] Concerti Grossi (Munchener Bach-Orchester with Karl Richter)"
//! classical-tagger compose-title --work Symphony --work-number "No 41" --initial-key C
//! ```

use clap::{Args, Parser, Subcommand};
use classical_tagger::{
    check_read_inputs, check_write_inputs, compose_title, extract_title, parse_album,
    read_library, read_sheet, suggested_stem, validate_record, write_failure_sheet,
    write_library, write_sheet, ConsoleSink, FileSink, FlacTagStore, MultiSink,
    PipelineError, ReadOptions, TagArchive, TaggerConfig, TitleFields, ValidationError,
    WriteOptions,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "classical-tagger")]
#[command(about = "Parse, review and rewrite tags of classical music recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read tags and folder names into a review sheet
    Read {
        /// Library directory
        input: PathBuf,

        /// Review sheet to create (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Archive the original tags
        #[arg(long)]
        store_data: bool,
    },

    /// Write a corrected review sheet back to the files
    Write {
        /// Corrected review sheet (CSV)
        input: PathBuf,

        /// Sheet receiving the rows that failed (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Archive the corrected tags
        #[arg(long)]
        store_data: bool,

        /// Keep file names unchanged
        #[arg(long)]
        no_rename: bool,

        /// Show what would happen without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Skip schema validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Validate a review sheet against the track schema
    Validate {
        /// Review sheet (CSV)
        input: PathBuf,
    },

    /// Parse one title and print its fields as JSON
    ParseTitle {
        title: String,
    },

    /// Parse one album folder name and print its fields as JSON
    ParseAlbum {
        album: String,
    },

    /// Compose a canonical title from fields
    ComposeTitle(ComposeArgs),
}

#[derive(Args)]
struct ComposeArgs {
    #[arg(long)]
    work: String,
    #[arg(long)]
    work_number: Option<String>,
    #[arg(long)]
    initial_key: Option<String>,
    #[arg(long)]
    catalog_number: Option<String>,
    #[arg(long)]
    opus: Option<String>,
    #[arg(long)]
    opus_number: Option<String>,
    #[arg(long)]
    epithet: Option<String>,
    #[arg(long)]
    movement: Option<String>,
    /// Track number used for the suggested file name
    #[arg(long)]
    track_number: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Read {
            input,
            output,
            store_data,
        } => cmd_read(&input, &output, store_data),

        Commands::Write {
            input,
            output,
            store_data,
            no_rename,
            dry_run,
            no_validate,
        } => {
            let options = WriteOptions {
                validate: !no_validate,
                rename: !no_rename,
                dry_run,
            };
            cmd_write(&input, &output, store_data, &options)
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::ParseTitle { title } => cmd_parse_title(&title),

        Commands::ParseAlbum { album } => cmd_parse_album(&album),

        Commands::ComposeTitle(args) => cmd_compose_title(args),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Console output, plus a run log file when the log directory is usable.
fn build_sink(config: &TaggerConfig) -> MultiSink {
    let sink = MultiSink::new().with(ConsoleSink);
    match FileSink::create_in(&config.log_dir) {
        Ok(file) => {
            eprintln!("📝 Log: {}", file.path().display());
            sink.with(file)
        }
        Err(e) => {
            eprintln!("⚠️  Cannot create log in {}: {}", config.log_dir.display(), e);
            sink
        }
    }
}

fn open_archive(
    config: &TaggerConfig,
    store_data: bool,
) -> Result<Option<TagArchive>, Box<dyn std::error::Error>> {
    if !store_data {
        return Ok(None);
    }
    let archive = TagArchive::open(&config.archive_path)?;
    eprintln!("🗄️  Archive: {} ({} tracks)", archive.path().display(), archive.len());
    Ok(Some(archive))
}

fn cmd_read(input: &Path, output: &Path, store_data: bool) -> Result<(), Box<dyn std::error::Error>> {
    check_read_inputs(input, output)?;
    let config = TaggerConfig::from_env()?;
    config.apply_threads();

    eprintln!("📂 Reading: {}", input.display());
    let sink = build_sink(&config);
    let mut archive = open_archive(&config, store_data)?;

    let options = ReadOptions {
        extensions: config.extensions.clone(),
    };
    let report = read_library(input, &FlacTagStore, &options, archive.as_mut(), &sink)?;

    write_sheet(output, &report.records)?;
    eprintln!("\n💾 Review sheet: {} ({} rows)", output.display(), report.records.len());

    if !report.failed.is_empty() {
        eprintln!("⚠️  {} tracks could not be read:", report.failed.len());
        for failed in report.failed.iter().take(10) {
            eprintln!("   - {}: {}", failed.record.path, failed.reason);
        }
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_write(
    input: &Path,
    output: &Path,
    store_data: bool,
    options: &WriteOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    check_write_inputs(input, output)?;
    let config = TaggerConfig::from_env()?;

    eprintln!("📄 Review sheet: {}", input.display());
    let sheet = read_sheet(input)?;
    eprintln!("   Encoding: {}", sheet.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(sheet.delimiter));
    eprintln!("   Rows: {}", sheet.records.len());

    let sink = build_sink(&config);
    let mut archive = open_archive(&config, store_data)?;

    let report = write_library(&sheet.records, &FlacTagStore, options, archive.as_mut(), &sink)?;

    write_failure_sheet(output, &report.failed)?;
    eprintln!("\n✅ Written: {}", report.successful.len());
    if !report.failed.is_empty() {
        eprintln!("❌ Failed: {} (see {})", report.failed.len(), output.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let sheet = read_sheet(input)?;

    let mut valid = 0;
    let mut invalid = 0;

    for record in &sheet.records {
        match validate_record(record) {
            Ok(()) => valid += 1,
            Err(ValidationError::SchemaError { errors }) => {
                invalid += 1;
                if invalid <= 5 {
                    eprintln!("\n❌ {}:", record.path);
                    for err in errors.iter().take(3) {
                        eprintln!("   - {}", err);
                    }
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_parse_title(title: &str) -> Result<(), Box<dyn std::error::Error>> {
    let fields = extract_title(title)?;
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn cmd_parse_album(album: &str) -> Result<(), Box<dyn std::error::Error>> {
    let fields = parse_album(album).ok_or_else(|| {
        PipelineError::InvalidInput(format!(
            "'{}' does not follow the [YYYY] Album (Performers) convention",
            album
        ))
    })?;
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn cmd_compose_title(args: ComposeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fields = TitleFields {
        work: args.work,
        work_number: args.work_number,
        initial_key: args.initial_key,
        catalog_number: args.catalog_number,
        opus: args.opus,
        opus_number: args.opus_number,
        epithet: args.epithet,
        movement: args.movement,
    };

    let title = compose_title(&fields)?;
    println!("{}", title);
    println!("{}", suggested_stem(args.track_number.as_deref(), &title));
    Ok(())
}
