use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use metavars_lib::{Clock, InputFormat, MetavarsConfig, Registry, run_with_registry};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Fill `{today()}` and `{yearsSince(date)}` placeholders in documents
#[derive(Parser)]
#[command(name = "metavars", version, about, after_help = AFTER_HELP)]
struct Cli {
    /// Output format pandoc passes to JSON filters (accepted and ignored)
    target_format: Option<String>,

    /// Input document format
    #[arg(long, value_enum, default_value_t = Source::Json)]
    from: Source,

    /// Read the document from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD) for reproducible output
    #[arg(long, env = "METAVARS_TODAY", value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// List available placeholder functions and exit
    #[arg(long)]
    list_functions: bool,

    /// Increase verbosity (-v INFO, -vv DEBUG, -vvv TRACE, -vvvv TRACE with file/line)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Pandoc JSON AST
    Json,
    /// CommonMark/GFM markdown
    Markdown,
}

impl Source {
    fn input_format(self) -> InputFormat {
        match self {
            Source::Json => InputFormat::PandocJson,
            Source::Markdown => InputFormat::Markdown,
        }
    }
}

const AFTER_HELP: &str = "\
PLACEHOLDERS:
  A placeholder is a whole word of the form {name()} or {name(argument)}.
  Placeholders glued to other text, such as ({today()}), are left as is.

  Examples:
    pandoc report.md --filter metavars -o report.html
    metavars --from markdown --input README.md
    metavars --from markdown --today 2024-01-01 < notes.md
";

/// Parses a `YYYY-MM-DD` date argument.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Initialize tracing subscriber based on verbosity level.
///
/// Logs always go to stderr; stdout carries only the document, so a
/// verbose run stays usable inside a pandoc pipeline.
///
/// Verbosity levels:
/// - 0 (default): silent, errors surface through the exit report
/// - 1 (-v): INFO (pinned date, replacements per document)
/// - 2 (-vv): DEBUG (each substitution and its result kind)
/// - 3 (-vvv): TRACE (every word the recognizer skips, evaluator spans)
/// - 4+ (-vvvv): TRACE with file/line numbers
fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    // RUST_LOG wins over -v so a single module can be singled out.
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            // -v: one summary line per document
            1 => "warn,metavars=info,metavars_lib=info".to_string(),
            // -vv: one line per substitution
            2 => "warn,metavars=debug,metavars_lib=debug".to_string(),
            // -vvv+: every text unit, including misses
            _ => "warn,metavars=trace,metavars_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = MetavarsConfig::new().format(cli.from.input_format());
    if let Some(date) = cli.today {
        config = config.reference_date(date);
    }

    let registry = Registry::builtin(config.clock.clone());

    if cli.list_functions {
        for signature in registry.signatures() {
            println!("{signature}");
        }
        return Ok(());
    }

    if let Some(target) = &cli.target_format {
        tracing::debug!(target_format = %target, "Invoked as pandoc filter");
    }
    if let Clock::Fixed(moment) = &config.clock {
        tracing::info!(today = %moment.date(), "Using pinned date");
    }

    let input = match &cli.input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let output = run_with_registry(&input, config.format, &registry)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
