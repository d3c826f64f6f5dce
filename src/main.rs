use std::path::PathBuf;
use std::process;
use std::time::Duration;
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use indoc::indoc;
use tracing::level_filters::LevelFilter;

use imx93_vv::core::config::TestConfig;
use imx93_vv::core::logging::{LogConfig, Logger};
use imx93_vv::core::probe::ProbeContext;
use imx93_vv::core::runner::{self, Mode, Runner, Selection};
use imx93_vv::reporters::{json::JsonReporter, text::TextReporter, Reporter};

const AFTER_HELP: &str = indoc! {"
    Examples:
      imx93-vv list
      imx93-vv test --all
      imx93-vv test cpu gpio memory
      imx93-vv monitor --duration 60 cpu
      imx93-vv --json --output report.json test --all
"};

#[derive(Parser)]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
struct Cli {
    /// Emit a JSON summary instead of log lines
    #[arg(long, global = true)]
    json: bool,

    /// JSON destination with --json, log file otherwise
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// TOML or JSON file overriding thresholds and intervals
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List peripherals and whether they are present
    List,

    /// Run the short test of each selected peripheral
    Test {
        #[arg(long)]
        all: bool,

        peripherals: Vec<String>,
    },

    /// Monitor each selected peripheral for a fixed duration
    Monitor {
        #[arg(long)]
        all: bool,

        /// Seconds, or a duration such as "2m"
        #[arg(short, long, default_value = "10", value_parser = TestConfig::parse_monitor_duration)]
        duration: Duration,

        peripherals: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) => command,
        None => {
            Cli::command().print_help().context("Failed to print help")?;
            process::exit(1);
        }
    };

    let logger = Logger::new(&LogConfig {
        level: if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO },
        console: !cli.json,
        file: if cli.json { None } else { cli.output.clone() },
    })
    .context("Failed to open log file")?;

    let config = match &cli.config {
        Some(path) => TestConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TestConfig::default(),
    };
    let ctx = ProbeContext::host(config, logger.clone());

    let (selection, mode) = match command {
        Commands::List => {
            list_peripherals(&ctx);
            return Ok(());
        }
        Commands::Test { all, peripherals } => (select(all, peripherals, "test"), Mode::Short),
        Commands::Monitor { all, duration, peripherals } => {
            (select(all, peripherals, "monitor"), Mode::Monitor(duration))
        }
    };

    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::new(cli.output.clone()))
    } else {
        Box::new(TextReporter::new(logger))
    };

    let suite = Runner::new(ctx, reporter).run(&selection, mode);
    if !suite.all_passed() {
        process::exit(1);
    }

    Ok(())
}

fn select(all: bool, peripherals: Vec<String>, command: &str) -> Selection {
    if all {
        Selection::All
    } else if !peripherals.is_empty() {
        Selection::Named(peripherals)
    } else {
        eprintln!(
            "Error: Specify --all or provide peripheral names for {} command",
            command
        );
        process::exit(1);
    }
}

fn list_peripherals(ctx: &ProbeContext) {
    println!("Available Peripherals:");
    println!("=====================");

    for name in runner::names() {
        let available = runner::create(name, ctx.clone())
            .map(|tester| tester.is_available())
            .unwrap_or(false);
        println!(
            "{}: {}",
            name,
            if available { "Available" } else { "Not Available" }
        );
    }
}
