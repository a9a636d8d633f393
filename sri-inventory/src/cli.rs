use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, prelude::*};

use crate::config::{Config, CrossOrigin, ProjectConfig};
use crate::inventory::InventoryReport;
use crate::sri::SriFileReport;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

#[derive(Parser, Debug)]
#[command(name = "sri-inventory", version, about = "Script inventory and Subresource Integrity for web build output")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    /// The build output directory.
    #[arg(long, global = true)]
    pub target: Option<PathBuf>,
    /// TOML config file with predefined scripts and HTML files to process.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// `crossorigin` value set next to new `integrity` attributes; default
    /// value is anonymous.
    #[arg(long, global = true, value_enum)]
    pub crossorigin: Option<CrossOrigin>,
    /// Increase log verbosity (-v, -vv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Generate the inventory, then add SRI hashes (the default).
    All,
    /// Only generate `scripts-inventory.json`.
    Inventory,
    /// Only add `integrity` attributes to HTML files.
    Sri,
}

impl Cli {
    pub fn init_tracing(&self) {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,sri_inventory={level}")));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    /// Resolves the configuration once; both phases share it.
    pub fn load_config(&self) -> crate::Result<Config> {
        let (project, config_dir) = match &self.config {
            Some(path) => {
                let project = crate::config::load_project_config(path)?;
                let dir = path.parent().map(PathBuf::from).unwrap_or_default();
                (project, dir)
            }
            None => (ProjectConfig::default(), PathBuf::new()),
        };
        project.into_config(config_dir, self.target.clone(), self.crossorigin)
    }
    pub fn execute(self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        match self.command.unwrap_or(Command::All) {
            Command::All => {
                run(&config);
            }
            Command::Inventory => {
                report_inventory(&crate::inventory::generate(&config));
            }
            Command::Sri => {
                report_sri(&crate::sri::inject(&config));
            }
        }
        Ok(())
    }
}

/// Results of both phases.
#[derive(Debug)]
pub struct RunOutcome {
    pub inventory: crate::Result<InventoryReport>,
    pub sri: Vec<SriFileReport>,
}

/// Runs the inventory phase, then the SRI phase. Each phase reports its own
/// failure; neither stops the other.
pub fn run(config: &Config) -> RunOutcome {
    let inventory = crate::inventory::generate(config);
    report_inventory(&inventory);
    let sri = crate::sri::inject(config);
    report_sri(&sri);
    RunOutcome { inventory, sri }
}

fn report_inventory(result: &crate::Result<InventoryReport>) {
    match result {
        Ok(report) => {
            println!("{GREEN}Script inventory generated at {}{RESET}", report.output_path.display());
            println!("{YELLOW}{report}{RESET}");
            println!("Inventory generation completed successfully.");
        }
        Err(error) => {
            error!("script inventory phase failed: {error}");
            eprintln!("{RED}Error generating script inventory: {error}{RESET}");
        }
    }
}

fn report_sri(reports: &[SriFileReport]) {
    let mut failed = 0usize;
    for report in reports {
        match &report.outcome {
            Ok(_) => println!("SRI hashes added to {}", report.path.display()),
            Err(error) => {
                failed += 1;
                eprintln!("{RED}Error processing {}: {error}{RESET}", report.path.display());
            }
        }
    }
    if failed == 0 {
        println!("{GREEN}SRI hashes added successfully.{RESET}");
    } else {
        error!(failed, files = reports.len(), "SRI phase failed");
        eprintln!("{RED}Error adding SRI hashes: {failed} of {} files failed{RESET}", reports.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_target_and_defaults_to_both_phases() {
        let cli = Cli::parse_from(["sri-inventory", "--target=dist"]);
        assert_eq!(cli.target, Some(PathBuf::from("dist")));
        assert_eq!(cli.command, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_subcommand_with_global_flags() {
        let cli = Cli::parse_from(["sri-inventory", "sri", "--target", "out", "--crossorigin", "use-credentials", "-vv"]);
        assert_eq!(cli.command, Some(Command::Sri));
        assert_eq!(cli.crossorigin, Some(CrossOrigin::UseCredentials));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn missing_target_is_a_config_error() {
        let cli = Cli::parse_from(["sri-inventory"]);
        assert!(matches!(cli.load_config(), Err(crate::Error::MissingTarget)));
    }

    #[test]
    fn quoted_values_are_normalized_before_parsing() {
        let args = crate::args::normalize_args(["sri-inventory", "--target=\"dist/app\""]);
        let cli = Cli::parse_from(args);
        assert_eq!(cli.target, Some(PathBuf::from("dist/app")));
    }
}
