//! sigprobe CLI
//!
//! Compare the leading bytes of sample files and print their shared signature.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use sigprobe::{
    render, CollectOptions, ColumnAnalyzer, OutputFormat, RenderOptions, SampleCollector,
    ShortSamplePolicy, DEFAULT_COLUMNS, DEFAULT_PROBE_LENGTH,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sigprobe")]
#[command(disable_version_flag = true)]
#[command(about = "Infer a shared magic-byte signature from sample files")]
struct Cli {
    /// Sample files to compare
    files: Vec<PathBuf>,

    /// Number of leading bytes to compare
    #[arg(
        short = 'n',
        short_alias = 'b',
        long = "bytes",
        default_value_t = DEFAULT_PROBE_LENGTH,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    bytes: usize,

    /// Output format: hex, json or regex
    #[arg(short, long, default_value = "hex")]
    format: String,

    /// Bytes per line in hex output (0 for a single line)
    #[arg(short = 'c', long = "columns", visible_alias = "cols", default_value_t = DEFAULT_COLUMNS)]
    columns: usize,

    /// Print hex output on one line with unpadded digits
    #[arg(long)]
    legacy: bool,

    /// Omit the regex `s` flag and spell wildcards as `(?:.|[^\0])`
    #[arg(long)]
    no_dotall: bool,

    /// Resolve offsets past the end of short samples from the samples that reach them
    #[arg(long)]
    present_only: bool,

    /// Descend into directories
    #[arg(short, long)]
    recursive: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-V info, -VV debug)
    #[arg(short = 'V', long, action = ArgAction::Count)]
    verbose: u8,

    /// Print version and exit
    #[arg(short = 'v', long)]
    version: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    init_logging(cli.verbose);

    // Reject a bad format before touching any file
    let format: OutputFormat = cli.format.parse()?;
    let options = RenderOptions::default()
        .with_columns(cli.columns)
        .with_legacy_hex(cli.legacy)
        .with_single_line(!cli.no_dotall);

    let collector = SampleCollector::with_options(CollectOptions {
        probe_length: cli.bytes,
        recursive: cli.recursive,
    });
    let collection = collector.collect(&cli.files);

    let policy = if cli.present_only {
        ShortSamplePolicy::PresentOnly
    } else {
        ShortSamplePolicy::Strict
    };
    let resolved = ColumnAnalyzer::new(cli.bytes)
        .with_policy(policy)
        .resolve(&collection.samples)?;

    let output = render(&resolved, format, &options)?;
    write_output(&output, cli.output.as_deref())?;

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}: {}",
                record.level().as_str().to_lowercase(),
                record.args()
            )
        })
        .init();
}

fn write_output(rendered: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        fs::write(path, format!("{}\n", rendered))
            .with_context(|| format!("Failed to write: {}", path.display()))?;
        log::info!("Wrote signature to {}", path.display());
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", rendered)?;
    }

    Ok(())
}
