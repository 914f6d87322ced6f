//! Inspect encoded timetable files.
//!
//! Usage:
//!   ttdump dump FILE       print the decoded `types.Data` tree
//!   ttdump stats FILE      print route and stop counts
//!   ttdump stream FILE     decode a length-delimited stream of `types.Data` messages
//!
//! Add `-v` (debug) or `-vv` (trace) for library logging.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::collections::BTreeMap;
use std::path::PathBuf;
use ttproto::dump::{record_summary_line, record_to_dump};
use ttproto::transit::{Data, TransitSchemas};
use ttproto::{decode, decode_delimited, OperatingDays};

#[derive(Parser)]
#[command(name = "ttdump")]
#[command(about = "Decode and inspect protobuf timetable files", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded record tree
    Dump {
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Only print one summary line per route
        #[arg(short, long)]
        summary: bool,
    },
    /// Print route, stop and operating-day counts
    Stats {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Decode a length-delimited stream and report rejected frames
    Stream {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("initializing logger")?;

    let schemas = TransitSchemas::new().context("building timetable schemas")?;
    match cli.command {
        Commands::Dump { path, summary } => {
            let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let record = decode(&bytes, &schemas.data)
                .with_context(|| format!("decoding {}", path.display()))?;
            if summary {
                for route in record.messages(ttproto::transit::data::ROUTES)? {
                    println!("{}", record_summary_line(route));
                }
            } else {
                println!("{}", record_to_dump(&record, 0));
            }
        }
        Commands::Stats { path } => {
            let data = ttproto::transit::read_data_file(&path, &schemas)
                .with_context(|| format!("loading {}", path.display()))?;
            print_stats(&data);
        }
        Commands::Stream { path } => {
            let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let result = decode_delimited(&bytes, &schemas.data)
                .with_context(|| format!("decoding stream {}", path.display()))?;
            let mut routes = 0usize;
            for decoded in &result.records {
                let data = Data::from_record(&decoded.record, &schemas)?;
                routes += data.routes.len();
            }
            println!("frames:   {}", result.records.len());
            println!("routes:   {}", routes);
            println!("rejected: {}", result.rejected.len());
            for r in &result.rejected {
                println!("  bytes {}..{}: {}", r.byte_range.0, r.byte_range.1, r.error);
            }
        }
    }
    Ok(())
}

fn print_stats(data: &Data) {
    println!("routes: {}", data.routes.len());
    println!("stops:  {}", data.stop_count());
    let mut by_days: BTreeMap<u32, usize> = BTreeMap::new();
    for route in &data.routes {
        *by_days.entry(route.days).or_default() += 1;
    }
    for (days, count) in by_days {
        println!("  {} {:>8}", OperatingDays(days), count);
    }
}
