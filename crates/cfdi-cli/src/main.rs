#![forbid(unsafe_code)]

mod cmd;
mod money;
mod opener;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cfdi: review folders of CFDI tax invoices",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and the FORMAT env var).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Review",
        about = "Open the interactive review console",
        long_about = "Load every invoice in a folder and browse it with live filters and totals. \
                      This is the default when no subcommand is given.",
        after_help = "EXAMPLES:\n    # Review the configured folder (cfdis by default)\n    cfdi\n\n    # Review another folder\n    cfdi review ~/facturas/2024"
    )]
    Review(cmd::review::ReviewArgs),

    #[command(
        next_help_heading = "Reports",
        about = "Filter invoices and print totals",
        long_about = "Apply the same filters as the review console and print the matching \
                      invoices, their totals, and a count per payment form.",
        after_help = "EXAMPLES:\n    # Totals for every invoice\n    cfdi summary\n\n    # Cash and debit card invoices only\n    cfdi summary --payment-form 01 --payment-form 28\n\n    # Emit machine-readable output\n    cfdi summary --usage G03 --json"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        next_help_heading = "Reports",
        about = "List payment complements by month",
        long_about = "Read payment receipts (type P) and group their payments by calendar month.",
        after_help = "EXAMPLES:\n    # Payments in the configured folder\n    cfdi payments\n\n    # Emit machine-readable output\n    cfdi payments cfdis --json"
    )]
    Payments(cmd::payments::PaymentsArgs),

    #[command(
        next_help_heading = "Reports",
        about = "List filterable catalog codes",
        after_help = "EXAMPLES:\n    # Every dimension\n    cfdi catalog\n\n    # Payment forms only\n    cfdi catalog --dimension payment-form"
    )]
    Catalog(cmd::catalog::CatalogArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    cfdi completions bash > ~/.local/share/bash-completion/completions/cfdi"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CFDI_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "cfdi=debug,cfdi_core=debug,info"
        } else {
            "cfdi=info,cfdi_core=info,warn"
        })
    });

    let format = env::var("CFDI_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;

    match cli.command {
        None => cmd::review::run_review(&cmd::review::ReviewArgs::default(), &project_root),
        Some(Commands::Review(args)) => cmd::review::run_review(&args, &project_root),
        Some(Commands::Summary(args)) => cmd::summary::run_summary(&args, output, &project_root),
        Some(Commands::Payments(args)) => {
            cmd::payments::run_payments(&args, output, &project_root)
        }
        Some(Commands::Catalog(args)) => cmd::catalog::run_catalog(&args, output),
        Some(Commands::Completions(args)) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    debug!(?output, "output mode resolved");

    match run(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            if let Err(write_err) = render_error(output, &CliError::from(&err)) {
                tracing::warn!(error = %write_err, "could not report fatal error");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_review() {
        let cli = Cli::parse_from(["cfdi"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn review_takes_a_folder() {
        let cli = Cli::parse_from(["cfdi", "review", "facturas"]);
        match cli.command {
            Some(Commands::Review(args)) => {
                assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("facturas")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["cfdi", "summary", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_is_global() {
        let cli = Cli::parse_from(["cfdi", "catalog", "--format", "text"]);
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn verbose_flag_parsed() {
        let cli = Cli::parse_from(["cfdi", "-v", "payments"]);
        assert!(cli.verbose);
    }

    #[test]
    fn summary_filters_parse() {
        let cli = Cli::parse_from([
            "cfdi",
            "summary",
            "cfdis",
            "--payment-method",
            "PUE",
            "--ignore-filters",
        ]);
        match cli.command {
            Some(Commands::Summary(args)) => {
                assert_eq!(args.payment_method, vec!["PUE".to_string()]);
                assert!(args.ignore_filters);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_catalog_code_is_a_usage_error() {
        assert!(Cli::try_parse_from(["cfdi", "summary", "--document-type", "X"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
