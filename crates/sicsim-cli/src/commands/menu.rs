//! Interactive scenario selection.

use anyhow::{Context, Result};
use colored::Colorize;
use sicsim_logic::treatment::Scenario;
use std::io::{self, BufRead, Write};

use crate::commands::run::{recorder_options, resolve_seed, run_scenario};
use crate::config;
use crate::OutputArgs;

/// A valid menu answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Run(Vec<Scenario>),
    Exit,
}

pub fn run(args: &OutputArgs) -> Result<()> {
    let params = config::load(args.config.as_deref())?;
    let seed = resolve_seed(args.seed);

    print_banner();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    loop {
        let choice = prompt(&mut input, &mut output).context("Failed to read menu input")?;
        let Some(Choice::Run(scenarios)) = choice else {
            break;
        };
        println!("\nInput accepted! This may take a moment.\n");
        for scenario in scenarios {
            let outcome = run_scenario(&params, scenario, seed, &args.out, recorder_options(args));
            println!(
                "{} {} done ({} steps)\n",
                "✓".green(),
                outcome.scenario.name().cyan(),
                outcome.steps
            );
        }
    }

    println!("Program finished. Thank you for using the model!");
    Ok(())
}

fn print_banner() {
    println!("{}", "SIC + Treatment Simulator".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("Models an infection spreading through host tissue against the");
    println!("host's callose defense, optionally under a drug treatment.");
    println!();
}

/// Parse one line of menu input.
pub fn parse_choice(line: &str) -> Option<Choice> {
    let word = line.trim().to_ascii_lowercase();
    match word.as_str() {
        "exit" | "quit" => Some(Choice::Exit),
        "all" => Some(Choice::Run(Scenario::ALL.to_vec())),
        other => other.parse().ok().map(|s| Choice::Run(vec![s])),
    }
}

/// Ask until a valid answer arrives. Returns `None` at end of input.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<Choice>> {
    loop {
        writeln!(output, "Please select a treatment scenario to run:")?;
        for scenario in Scenario::ALL {
            writeln!(
                output,
                "  {:<8} -> {}",
                format!("'{}'", scenario.name()),
                scenario.description()
            )?;
        }
        writeln!(output, "  'all'    -> Every scenario in sequence")?;
        writeln!(output, "  'exit'   -> Leave the menu")?;
        write!(output, "Enter your choice: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_choice(&line) {
            Some(choice) => return Ok(Some(choice)),
            None => writeln!(output, "\n--- Invalid choice. Please try again. ---\n")?,
        }
    }
}
