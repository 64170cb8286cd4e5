//! SICSim CLI - infection/callose lattice simulator with drug treatments.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sicsim_logic::treatment::Scenario;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sicsim")]
#[command(author, version, about = "SICSim - infection vs. callose defense under drug treatment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario, or all of them in sequence
    Run {
        /// Scenario to run
        #[arg(value_enum)]
        scenario: ScenarioArg,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Choose scenarios interactively
    Menu {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the default parameters as TOML
    Params,
}

/// Options shared by every command that runs the engine.
#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// TOML parameter file (defaults are used for anything it omits)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// RNG seed (random if omitted; the chosen seed is logged)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Directory for summary, frame and report files
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Write a frame every N steps
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub frame_interval: u32,

    /// Skip per-step frame files
    #[arg(long)]
    pub no_frames: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScenarioArg {
    Control,
    Ctx,
    Tetra,
    All,
}

impl ScenarioArg {
    pub fn scenarios(self) -> Vec<Scenario> {
        match self {
            ScenarioArg::Control => vec![Scenario::Control],
            ScenarioArg::Ctx => vec![Scenario::Ctx],
            ScenarioArg::Tetra => vec![Scenario::Tetra],
            ScenarioArg::All => Scenario::ALL.to_vec(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { scenario, output } => commands::run::run(scenario.scenarios(), &output),
        Commands::Menu { output } => commands::menu::run(&output),
        Commands::Params => commands::params::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "sicsim",
            "run",
            "all",
            "--seed",
            "7",
            "--frame-interval",
            "10",
            "--no-frames",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { scenario, output } => {
                assert_eq!(scenario.scenarios(), Scenario::ALL.to_vec());
                assert_eq!(output.seed, Some(7));
                assert_eq!(output.frame_interval, 10);
                assert!(output.no_frames);
                assert_eq!(output.out, PathBuf::from("."));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        assert!(Cli::try_parse_from(["sicsim", "run", "penicillin"]).is_err());
        assert!(Cli::try_parse_from(["sicsim", "run", "ctx", "--frame-interval", "0"]).is_err());
    }
}
