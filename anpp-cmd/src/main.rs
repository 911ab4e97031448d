mod decode;
mod filter;
mod info;
mod request;

use std::path::PathBuf;
use std::{fs::File, io::stderr};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raw ANPP log file
    Info {
        /// Input ANPP log file
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,

        /// Skip frames whose id is not declared by the protocol.
        ///
        /// Skipped frames are reported as unknown ids rather than per id.
        #[arg(short, long, action)]
        known_only: bool,
    },
    /// Decode frames and print one JSON object per frame.
    ///
    /// Frames for packets without a codec are still printed, with an error in place
    /// of the decoded packet.
    Decode {
        /// Include these packet ids or id ranges.
        ///
        /// This accepts a CSV of ids as well as ranges of the format <start>-<end>
        /// where start and end are inclusive. For example, --include 20-23,28
        #[arg(short, long, value_name = "csv", value_delimiter = ',')]
        include: Vec<String>,

        /// Exclude these packet ids or id ranges.
        #[arg(short, long, value_name = "csv", value_delimiter = ',')]
        exclude: Vec<String>,

        /// Input ANPP log file
        input: PathBuf,
    },
    /// Copy selected frames from an ANPP log file.
    ///
    /// Bytes that are not part of a valid frame are dropped.
    Filter {
        /// Include these packet ids or id ranges.
        ///
        /// This accepts a CSV of ids as well as ranges of the format <start>-<end>
        /// where start and end are inclusive. For example, you can specify
        /// --include 20,21,22,23,28 or --include 20-23,28
        ///
        /// If used with --exclude, values are first included, then excluded.
        #[arg(short, long, value_name = "csv", value_delimiter = ',')]
        include: Vec<String>,

        /// Exclude these packet ids or id ranges.
        ///
        /// If used with --include, values are first included, then excluded.
        #[arg(short, long, value_name = "csv", value_delimiter = ',')]
        exclude: Vec<String>,

        /// Delete output file if it already exists
        #[arg(long, action)]
        clobber: bool,

        /// Output file path.
        #[arg(short, long, default_value = "filtered.anpp", value_name = "path")]
        output: PathBuf,

        /// Input ANPP log file.
        input: PathBuf,
    },
    /// Encode a request packet asking a device for the given packet ids.
    ///
    /// The encoded frame is printed as hex unless --output is given.
    Request {
        /// Write raw frame bytes to this file rather than hex to stdout.
        #[arg(short, long, value_name = "path")]
        output: Option<PathBuf>,

        /// Delete output file if it already exists
        #[arg(long, action)]
        clobber: bool,

        /// Packet ids or id ranges to request, e.g., 3,20-22
        #[arg(value_name = "csv", value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },
}

/// Parse numbers and inclusive ranges, rejecting any value greater than `max` before
/// a range is expanded.
fn parse_number_ranges(list: Vec<String>, max: u32) -> Result<Vec<u32>> {
    let rx = regex::Regex::new(r"^(?:(\d+)|(\d+)-(\d+))$").expect("regex to compile");
    let mut values = Vec::default();
    for (i, s) in list.into_iter().enumerate() {
        let Some(cap) = rx.captures(s.trim()) else {
            bail!("invalid number or range at {i}: {s:?}");
        };

        if cap.get(1).is_some() {
            let x = &cap[1]
                .parse::<u32>()
                .map_err(|_| anyhow!("invalid number value"))?;
            if *x > max {
                bail!("value {x} is out of range 0-{max}");
            }
            values.push(*x);
        } else {
            let start = &cap[2]
                .parse::<u32>()
                .map_err(|_| anyhow!("invalid range value"))?;
            let end = &cap[3]
                .parse::<u32>()
                .map_err(|_| anyhow!("invalid range value"))?;
            if start >= end {
                bail!("invalid range {s:?}")
            }
            if *end > max {
                bail!("range {s:?} is out of range 0-{max}");
            }
            values.extend(*start..=*end);
        }
    }

    Ok(values)
}

/// Parse a list of id ranges, rejecting values that cannot be packet ids.
fn parse_ids(list: Vec<String>) -> Result<Vec<u8>> {
    parse_number_ranges(list, u32::from(u8::MAX))?
        .into_iter()
        .map(|v| u8::try_from(v).map_err(|_| anyhow!("packet id {v} is out of range 0-255")))
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("ANPP_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Info {
            input,
            format,
            known_only,
        } => info::info(input, format, *known_only),
        Commands::Decode {
            include,
            exclude,
            input,
        } => {
            let src = File::open(input).context("opening input")?;
            let ids = filter::IdFilter::new(
                &parse_ids(include.clone())?,
                &parse_ids(exclude.clone())?,
            );
            debug!("{ids:?}");
            decode::decode(src, std::io::stdout().lock(), &ids)
        }
        Commands::Filter {
            include,
            exclude,
            clobber,
            output,
            input,
        } => {
            if !clobber && output.exists() {
                bail!("{output:?} exists; use --clobber");
            }
            let include = parse_ids(include.clone())?;
            let exclude = parse_ids(exclude.clone())?;
            if include.is_empty() && exclude.is_empty() {
                bail!("no filters specified");
            }
            let src = File::open(input).context("opening input")?;
            let dest = File::create(output)
                .with_context(|| format!("failed to create output {output:?}"))?;

            let ids = filter::IdFilter::new(&include, &exclude);
            debug!("{ids:?}");
            let stats = filter::filter(src, dest, &ids)?;
            info!(
                kept = stats.kept,
                skipped = stats.skipped,
                crc_errors = stats.crc_errors,
                "filtered {input:?} to {output:?}"
            );
            Ok(())
        }
        Commands::Request {
            output,
            clobber,
            ids,
        } => {
            let ids = parse_ids(ids.clone())?;
            match output {
                Some(output) => {
                    if !clobber && output.exists() {
                        bail!("{output:?} exists; use --clobber");
                    }
                    let dest = File::create(output)
                        .with_context(|| format!("failed to create output {output:?}"))?;
                    request::write_raw(&ids, dest)
                }
                None => request::write_hex(&ids, std::io::stdout().lock()),
            }
        }
    }
}
