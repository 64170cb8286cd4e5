//! Run scenarios and write their output.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use sicsim_core::prelude::*;
use sicsim_logic::constants::output::EFFECT_WINDOW_STEPS;
use std::path::{Path, PathBuf};

use crate::config;
use crate::OutputArgs;

/// Result of one scenario run, as shown to the user.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub steps: usize,
    pub report: Option<RunReport>,
    pub report_path: Option<PathBuf>,
    pub stats: RecorderStats,
}

#[derive(Serialize)]
struct ReportFile<'a> {
    scenario: Scenario,
    seed: u64,
    seeded_cell: (usize, usize),
    params: &'a Params,
    report: &'a RunReport,
}

pub fn run(scenarios: Vec<Scenario>, args: &OutputArgs) -> Result<()> {
    let params = config::load(args.config.as_deref())?;
    let seed = resolve_seed(args.seed);

    for scenario in scenarios {
        let outcome = run_scenario(&params, scenario, seed, &args.out, recorder_options(args));
        print_outcome(&outcome);
    }
    Ok(())
}

/// The explicit seed, or a fresh one that is logged so the run can be repeated.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random();
            log::info!("No seed given, using {}", seed);
            seed
        }
    }
}

pub fn recorder_options(args: &OutputArgs) -> RecorderOptions {
    RecorderOptions {
        write_frames: !args.no_frames,
        frame_interval: args.frame_interval,
    }
}

/// Run one scenario to completion. Output failures are logged, not returned.
pub fn run_scenario(
    params: &Params,
    scenario: Scenario,
    seed: u64,
    out_dir: &Path,
    options: RecorderOptions,
) -> ScenarioOutcome {
    println!(
        "{} Running scenario '{}' ({})",
        "→".blue(),
        scenario.name().cyan(),
        scenario.description()
    );

    let mut engine = SimulationEngine::new(params.clone(), scenario, seed);
    let mut recorder = CsvRecorder::new(out_dir, scenario, params.total_steps(), options);
    let summaries = engine.run(&mut recorder);
    let stats = recorder.finish();

    let report =
        RunReport::from_summaries(&summaries, params.treatment_start(), EFFECT_WINDOW_STEPS);
    let report_path = report.as_ref().and_then(|report| {
        let file = ReportFile {
            scenario,
            seed,
            seeded_cell: engine.seeded_cell(),
            params,
            report,
        };
        match write_report(out_dir, &file) {
            Ok(path) => Some(path),
            Err(err) => {
                log::warn!("Report not written: {:#}", err);
                None
            }
        }
    });

    ScenarioOutcome {
        scenario,
        steps: summaries.len(),
        report,
        report_path,
        stats,
    }
}

fn write_report(out_dir: &Path, file: &ReportFile<'_>) -> Result<PathBuf> {
    let path = out_dir.join(format!("report_{}.json", file.scenario.name()));
    let content = serde_json::to_string_pretty(file).context("Failed to serialize report")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(path)
}

fn print_outcome(outcome: &ScenarioOutcome) {
    println!(
        "{} {} finished: {} steps, {} summary rows, {} frames",
        "✓".green(),
        outcome.scenario.name().cyan(),
        outcome.steps,
        outcome.stats.rows_written,
        outcome.stats.frames_written
    );
    if outcome.stats.failed_sinks > 0 {
        println!(
            "  {} {} output sink(s) failed, see warnings above",
            "!".yellow(),
            outcome.stats.failed_sinks
        );
    }

    let Some(report) = &outcome.report else {
        return;
    };
    println!(
        "  Peak infection:   {:.4} (step {})",
        report.peak_infection, report.peak_infection_step
    );
    println!("  Final infection:  {:.4}", report.final_infection);
    println!("  Final callose:    {:.4}", report.final_defense);
    if let (Some(before), Some(window)) = (
        report.pre_treatment_infection,
        report.effect_window_mean_infection,
    ) {
        println!(
            "  Treatment window: {:.4} -> {:.4} (first {} steps)",
            before, window, report.effect_window_steps
        );
    }
    if let Some(step) = report.cleared_at {
        println!("  Cleared at step:  {}", step.to_string().green());
    }
    if let (Some(peak), Some(step)) = (report.peak_drug, report.peak_drug_step) {
        println!("  Peak drug:        {:.4} (step {})", peak, step);
    }
    if let Some(path) = &outcome.report_path {
        println!("  Report:           {}", path.display().to_string().dimmed());
    }
}
