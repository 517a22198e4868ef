//! Fabric CLI: command-line access to the architecture backend.
//!
//! Provides `fabric info` for a summary of a chip database, `fabric pin` and
//! `fabric bel` for name resolution, `fabric estimate` for the router's delay
//! estimate between two wires, and `fabric check-config` for validating a
//! run directory's `fabric.toml`.

#![warn(missing_docs)]

mod check;
mod inspect;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use fabric_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticRenderer, TerminalRenderer};

/// Fabric: FPGA architecture backend tools.
#[derive(Parser, Debug)]
#[command(name = "fabric", version, about = "Fabric FPGA architecture backend")]
pub struct Cli {
    /// Suppress all output except results and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Run directory whose `fabric.toml` tunes the estimator.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a chip database.
    Info {
        /// Path to the chip database.
        chipdb: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Resolve a package pin to its site and bels.
    Pin {
        /// Path to the chip database.
        chipdb: PathBuf,
        /// Package pin name (e.g., `E3`).
        pin: String,
    },
    /// Describe a bel by `<site>/<bel>` name.
    Bel {
        /// Path to the chip database.
        chipdb: PathBuf,
        /// Bel name (e.g., `SLICE_X0Y0/A6LUT`).
        name: String,
    },
    /// Estimate the routing delay between two wires.
    Estimate(EstimateArgs),
    /// Validate a run directory's `fabric.toml` and open its chip database.
    CheckConfig {
        /// Directory containing `fabric.toml`.
        dir: PathBuf,
    },
}

/// Arguments for the `fabric estimate` subcommand.
#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Path to the chip database.
    pub chipdb: PathBuf,
    /// Source wire as `<tile>/<wire>`.
    pub src: String,
    /// Destination wire as `<tile>/<wire>`.
    pub dst: String,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress progress output.
    pub quiet: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional run directory with a `fabric.toml`.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Info { ref chipdb, format } => inspect::run_info(chipdb, format, &global),
        Command::Pin { ref chipdb, ref pin } => inspect::run_pin(chipdb, pin, &global),
        Command::Bel { ref chipdb, ref name } => inspect::run_bel(chipdb, name, &global),
        Command::Estimate(ref args) => inspect::run_estimate(args, &global),
        Command::CheckConfig { ref dir } => check::run(dir, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 1), e.to_string());
            eprint!("{}", TerminalRenderer::new(global.color).render(&diag));
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_info_default_format() {
        let cli = Cli::parse_from(["fabric", "info", "xc7a35t.bin"]);
        match cli.command {
            Command::Info { chipdb, format } => {
                assert_eq!(chipdb, PathBuf::from("xc7a35t.bin"));
                assert_eq!(format, ReportFormat::Text);
            }
            _ => panic!("expected Info command"),
        }
    }

    #[test]
    fn parse_info_json() {
        let cli = Cli::parse_from(["fabric", "info", "db.bin", "--format", "json"]);
        match cli.command {
            Command::Info { format, .. } => assert_eq!(format, ReportFormat::Json),
            _ => panic!("expected Info command"),
        }
    }

    #[test]
    fn parse_pin_and_bel() {
        let cli = Cli::parse_from(["fabric", "pin", "db.bin", "E3"]);
        assert!(matches!(cli.command, Command::Pin { ref pin, .. } if pin == "E3"));

        let cli = Cli::parse_from(["fabric", "bel", "db.bin", "SLICE_X0Y0/A6LUT"]);
        assert!(matches!(cli.command, Command::Bel { ref name, .. } if name == "SLICE_X0Y0/A6LUT"));
    }

    #[test]
    fn parse_estimate() {
        let cli = Cli::parse_from([
            "fabric",
            "estimate",
            "db.bin",
            "INT_L_X0Y0/SINGLE",
            "INT_L_X4Y0/FEED",
        ]);
        match cli.command {
            Command::Estimate(ref args) => {
                assert_eq!(args.src, "INT_L_X0Y0/SINGLE");
                assert_eq!(args.dst, "INT_L_X4Y0/FEED");
            }
            _ => panic!("expected Estimate command"),
        }
    }

    #[test]
    fn parse_check_config() {
        let cli = Cli::parse_from(["fabric", "check-config", "runs/top"]);
        assert!(matches!(cli.command, Command::CheckConfig { ref dir } if dir == &PathBuf::from("runs/top")));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "fabric", "--quiet", "--color", "never", "--config", "runs/top", "info", "db.bin",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.config, Some(PathBuf::from("runs/top")));
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["fabric", "estimate", "db.bin", "only_one"]).is_err());
        assert!(Cli::try_parse_from(["fabric", "place"]).is_err());
    }
}
