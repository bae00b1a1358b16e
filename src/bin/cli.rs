//! Binary entry point for the baraja workload CLI.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use baraja::cards::CardinalityLog;
use baraja::harness::report::RowWriter;
use baraja::harness::{run_bench, BenchConfig, BenchSummary, TimeSource};
use baraja::logging::init_logging;
use baraja::rewrite::{run_rewrite, RewriteConfig, RewriteSummary};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "baraja",
    version,
    about = "Workload rewriting and benchmarking for SQL query engines",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        default_value = "warn",
        help = "Tracing filter for diagnostics on stderr (e.g. info, baraja=debug)"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RewriteCmd {
    #[arg(
        long,
        value_name = "DIR",
        env = "BARAJA_QUERIES",
        help = "Directory containing the base .sql workload"
    )]
    queries: PathBuf,

    #[arg(
        long,
        value_name = "FILE",
        env = "BARAJA_CARDS",
        help = "Cardinality log produced by the engine"
    )]
    cards: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        help = "Output root for the four variant directories"
    )]
    out: PathBuf,

    #[arg(
        long,
        value_name = "N",
        help = "Seed for the random orderings (entropy when omitted)"
    )]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct BenchCmd {
    #[arg(long, help = "Label recorded in the first CSV column")]
    label: String,

    #[arg(long, help = "Benchmark family recorded in the second CSV column")]
    benchmark: String,

    #[arg(
        long,
        value_name = "DIR",
        env = "BARAJA_QUERIES",
        help = "Directory containing .sql query files"
    )]
    queries: PathBuf,

    #[arg(
        long,
        value_enum,
        default_value_t = TimeSourceArg::Stderr,
        help = "Captured stream to scrape for timing values"
    )]
    time_source: TimeSourceArg,

    #[arg(
        long,
        value_name = "N",
        default_value_t = 1,
        help = "Launches per query (0 counts as 1)"
    )]
    runs: usize,

    #[arg(
        long,
        value_name = "FILE",
        help = "Write CSV rows to FILE instead of stdout"
    )]
    output: Option<PathBuf>,

    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true,
        help = "Engine command; {query} expands to the query file path"
    )]
    command: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Rewrite a workload into original/increasing/decreasing/random variants")]
    Rewrite(RewriteCmd),

    #[command(about = "Run an engine command over query files and emit timing rows")]
    Bench(BenchCmd),

    #[command(about = "Validate a cardinality log and summarize its entries")]
    Cards {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum TimeSourceArg {
    Stderr,
    Stdout,
}

impl From<TimeSourceArg> for TimeSource {
    fn from(source: TimeSourceArg) -> Self {
        match source {
            TimeSourceArg::Stderr => TimeSource::Stderr,
            TimeSourceArg::Stdout => TimeSource::Stdout,
        }
    }
}

#[derive(Debug, Serialize)]
struct CardsReport {
    entries: usize,
    queries: Vec<CardsEntry>,
}

#[derive(Debug, Serialize)]
struct CardsEntry {
    file: String,
    aliases: usize,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Rewrite(cmd) => {
            let mut rng = match cmd.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let cfg = RewriteConfig {
                queries_dir: cmd.queries,
                cards_path: cmd.cards,
                out_dir: cmd.out,
            };
            let summary = run_rewrite(&cfg, &mut rng)?;
            emit(&cli.format, &summary, |_| print_rewrite_text(&summary))?;
        }
        Command::Bench(cmd) => {
            let to_file = cmd.output.is_some();
            let cfg = BenchConfig {
                label: cmd.label,
                benchmark: cmd.benchmark,
                queries_dir: cmd.queries,
                command: cmd.command,
                time_source: cmd.time_source.into(),
                runs: cmd.runs,
            };
            let summary = match cmd.output {
                Some(path) => {
                    let file = File::create(&path)?;
                    let mut writer = RowWriter::new(file);
                    run_bench(&cfg, &mut writer)?
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = RowWriter::new(stdout.lock());
                    run_bench(&cfg, &mut writer)?
                }
            };
            // Rows own stdout when no output file is given; the summary
            // then lives in the logs only.
            if to_file {
                emit(&cli.format, &summary, |_| print_bench_text(&summary))?;
            }
        }
        Command::Cards { path } => {
            let log = CardinalityLog::load(&path)?;
            let mut queries: Vec<CardsEntry> = log
                .iter()
                .map(|(file, map)| CardsEntry {
                    file: file.clone(),
                    aliases: map.len(),
                })
                .collect();
            queries.sort_by(|a, b| a.file.cmp(&b.file));
            let report = CardsReport {
                entries: queries.len(),
                queries,
            };
            emit(&cli.format, &report, |_| print_cards_text(&report))?;
        }
    }

    Ok(())
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_rewrite_text(summary: &RewriteSummary) {
    println!(
        "Rewrote {} of {} queries (skipped {} without cardinalities, {} failed)",
        summary.rewritten,
        summary.queries_seen,
        summary.skipped_missing_cards,
        summary.failed
    );
}

fn print_bench_text(summary: &BenchSummary) {
    println!(
        "Ran {} queries, emitted {} timing rows ({} failures)",
        summary.queries_run, summary.rows_emitted, summary.failures
    );
}

fn print_cards_text(report: &CardsReport) {
    println!("Cardinality log: {} entries", report.entries);
    for entry in &report.queries {
        println!("  {} ({} aliases)", entry.file, entry.aliases);
    }
}
