//! SICSim Headless Simulation Harness
//!
//! Validates the model logic and the engine's whole-run invariants.
//! Runs entirely in-process with no file output.
//!
//! Usage:
//!   cargo run -p sicsim-simtest
//!   cargo run -p sicsim-simtest -- --verbose

use sicsim_core::output::MemoryRecorder;
use sicsim_core::prelude::*;
use sicsim_logic::constants::{defense, output};
use sicsim_logic::lattice::Lattice;
use sicsim_logic::pharmacokinetics::{self, DoseSchedule};
use sicsim_logic::topology::{hill, Topology};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== SICSim Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Lattice topology
    results.extend(validate_topology(verbose));

    // 2. Hill dose-response
    results.extend(validate_hill(verbose));

    // 3. Pharmacokinetic curves
    results.extend(validate_pharmacokinetics(verbose));

    // 4. Parameter handling
    results.extend(validate_params(verbose));

    // 5. Engine invariants over whole runs
    results.extend(validate_engine(verbose));

    // 6. Scenario comparison
    results.extend(validate_scenarios(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn small_params(steps: u32, extra_steps: u32) -> Params {
    Params {
        grid_size: 16,
        steps,
        extra_steps,
        signal_radius: 3,
        beta: 0.2,
        ..Default::default()
    }
}

fn record(params: &Params, scenario: Scenario, seed: u64) -> MemoryRecorder {
    let mut engine = SimulationEngine::new(params.clone(), scenario, seed);
    let mut recorder = MemoryRecorder::with_frames(1);
    engine.run(&mut recorder);
    recorder
}

// ── 1. Topology ─────────────────────────────────────────────────────────

fn validate_topology(_verbose: bool) -> Vec<TestResult> {
    println!("--- Topology ---");
    let mut results = Vec::new();

    let topo = Topology::new(10, 2);
    let n = topo.neighbors(0, 0);
    results.push(TestResult {
        name: "topology_torus_corner".into(),
        passed: n == [(1, 0), (9, 0), (0, 1), (0, 9)],
        detail: format!("neighbors(0,0) on 10x10 = {:?}", n),
    });

    // Every cell has four distinct neighbors on a grid of at least 3
    let all_distinct = (0..10).all(|i| {
        (0..10).all(|j| {
            let n = topo.neighbors(i, j);
            (0..4).all(|a| (a + 1..4).all(|b| n[a] != n[b]))
        })
    });
    results.push(TestResult {
        name: "topology_four_distinct".into(),
        passed: all_distinct,
        detail: "4 distinct neighbors for every cell of 10x10".into(),
    });

    // The signal ball is clipped, not wrapped
    let mut field = Lattice::zeros(10);
    field.set(9, 0, 1.0);
    let corner = topo.local_signal(0, 0, &field);
    results.push(TestResult {
        name: "topology_signal_clipped".into(),
        passed: corner == 0.0,
        detail: format!("signal at (0,0) with only (9,0) infected = {}", corner),
    });

    let mut field = Lattice::zeros(10);
    field.set(0, 0, 1.0);
    let s = topo.local_signal(0, 0, &field);
    // Clipped R=2 diamond at a corner holds 6 cells
    results.push(TestResult {
        name: "topology_signal_corner_count".into(),
        passed: (s - 1.0 / 6.0).abs() < 1e-12,
        detail: format!("corner signal = {:.4} (expected 1/6)", s),
    });

    results
}

// ── 2. Hill ─────────────────────────────────────────────────────────────

fn validate_hill(_verbose: bool) -> Vec<TestResult> {
    println!("--- Hill Dose-Response ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "hill_zero".into(),
        passed: hill(0.0, 0.5, 2.0) == 0.0,
        detail: "hill(0) = 0".into(),
    });

    let half = hill(defense::SIGNAL_EC50, defense::SIGNAL_EC50, defense::HILL_COEFFICIENT);
    results.push(TestResult {
        name: "hill_half_at_ec50".into(),
        passed: (half - 0.5).abs() < 1e-12,
        detail: format!("hill(EC50) = {}", half),
    });

    let high = hill(1e6, 0.5, 2.0);
    results.push(TestResult {
        name: "hill_saturates".into(),
        passed: high > 0.999_999 && high <= 1.0,
        detail: format!("hill(1e6) = {}", high),
    });

    let ctx = DrugParams::CTX;
    let capped = ctx.effect(100.0);
    results.push(TestResult {
        name: "drug_effect_capped".into(),
        passed: capped == 1.0 && ctx.effect(0.0) == 0.0,
        detail: format!("ctx effect at 0 = {}, at 100 = {}", ctx.effect(0.0), capped),
    });

    results
}

// ── 3. Pharmacokinetics ─────────────────────────────────────────────────

fn validate_pharmacokinetics(verbose: bool) -> Vec<TestResult> {
    println!("--- Pharmacokinetics ---");
    let mut results = Vec::new();

    for drug in [DrugParams::CTX, DrugParams::TETRACYCLINE] {
        let c = |t: f64| pharmacokinetics::concentration(drug.dose, t, drug.t_max, drug.half_life);

        results.push(TestResult {
            name: format!("pk_zero_before_dose_{}", drug.half_life),
            passed: c(-1.0) == 0.0 && c(0.0) == 0.0,
            detail: "no drug before or at administration".into(),
        });

        let below = c(drug.t_max - 1e-9);
        let above = c(drug.t_max + 1e-9);
        results.push(TestResult {
            name: format!("pk_continuous_at_tmax_{}", drug.half_life),
            passed: (c(drug.t_max) - drug.dose).abs() < 1e-12
                && (below - above).abs() < 1e-6,
            detail: format!("C(Tmax) = {:.6}, dose = {:.6}", c(drug.t_max), drug.dose),
        });

        let half = c(drug.t_max + drug.half_life);
        results.push(TestResult {
            name: format!("pk_half_life_{}", drug.half_life),
            passed: (half - drug.dose / 2.0).abs() < 1e-12,
            detail: format!("C(Tmax + t½) = {:.6}", half),
        });

        let decays = (0..500).all(|k| {
            let t = drug.t_max + k as f64;
            c(t + 1.0) < c(t)
        });
        results.push(TestResult {
            name: format!("pk_monotone_decay_{}", drug.half_life),
            passed: decays,
            detail: "strictly decreasing for 500 steps after Tmax".into(),
        });
    }

    // Two doses superpose
    let drug = DrugParams::CTX;
    let mut schedule = DoseSchedule::new();
    let ok = schedule.administer(0).is_ok() && schedule.administer(30).is_ok();
    let single = |t: f64| pharmacokinetics::concentration(drug.dose, t, drug.t_max, drug.half_life);
    let total = schedule.total_concentration(&drug, 100 + 50, 100);
    let expected = single(50.0) + single(20.0);
    if verbose {
        println!("    two-dose total at +50: {:.6} (expected {:.6})", total, expected);
    }
    results.push(TestResult {
        name: "pk_doses_superpose".into(),
        passed: ok && (total - expected).abs() < 1e-12,
        detail: format!("C = {:.6} for doses at +0 and +30", total),
    });

    results.push(TestResult {
        name: "pk_schedule_rejects_out_of_order".into(),
        passed: schedule.administer(10).is_err(),
        detail: "dose at +10 after +30 rejected".into(),
    });

    results
}

// ── 4. Parameters ───────────────────────────────────────────────────────

fn validate_params(_verbose: bool) -> Vec<TestResult> {
    println!("--- Parameters ---");
    let mut results = Vec::new();

    let defaults = Params::default();
    results.push(TestResult {
        name: "params_defaults_valid".into(),
        passed: defaults.validate().is_ok(),
        detail: format!(
            "L={} steps={}+{} R={}",
            defaults.grid_size, defaults.steps, defaults.extra_steps, defaults.signal_radius
        ),
    });

    let bad = [
        Params {
            grid_size: 0,
            ..Default::default()
        },
        Params {
            beta: -0.1,
            ..Default::default()
        },
        Params {
            carrying_capacity: 0.0,
            ..Default::default()
        },
        Params {
            growth_rate: f64::INFINITY,
            ..Default::default()
        },
    ];
    let rejected = bad.iter().filter(|p| p.validate().is_err()).count();
    results.push(TestResult {
        name: "params_invalid_rejected".into(),
        passed: rejected == bad.len(),
        detail: format!("{}/{} invalid parameter sets rejected", rejected, bad.len()),
    });

    let parsed: Result<Params, _> = serde_json::from_str(r#"{"grid_size": 20, "beta": 0.3}"#);
    results.push(TestResult {
        name: "params_partial_config".into(),
        passed: matches!(&parsed, Ok(p) if p.grid_size == 20 && p.steps == defaults.steps),
        detail: "missing keys fall back to defaults".into(),
    });

    results
}

// ── 5. Engine ───────────────────────────────────────────────────────────

fn validate_engine(_verbose: bool) -> Vec<TestResult> {
    println!("--- Engine ---");
    let mut results = Vec::new();

    let params = small_params(60, 60);

    // Step by hand so the bounds come from the fields themselves
    let mut violations = 0;
    for scenario in Scenario::ALL {
        let mut engine = SimulationEngine::new(params.clone(), scenario, 7);
        while engine.step().is_some() {
            let cap = engine.infection().carrying_capacity();
            let limit = engine.defense().limit();
            let infection = engine.infection().lattice();
            let defense = engine.defense().lattice();
            if infection.min() < 0.0
                || infection.max() > cap
                || defense.min() < 0.0
                || defense.max() > limit
            {
                violations += 1;
            }
        }
    }
    results.push(TestResult {
        name: "engine_fields_clamped".into(),
        passed: violations == 0,
        detail: format!("{} out-of-range frames over 3 scenarios", violations),
    });

    let a = record(&params, Scenario::Tetra, 123);
    let b = record(&params, Scenario::Tetra, 123);
    results.push(TestResult {
        name: "engine_deterministic".into(),
        passed: a.summaries == b.summaries && a.frames == b.frames,
        detail: "same seed, same trajectory".into(),
    });

    let control = record(&params, Scenario::Control, 9);
    results.push(TestResult {
        name: "engine_control_no_drug".into(),
        passed: control
            .summaries
            .iter()
            .all(|s| s.drug_concentration == 0.0),
        detail: "drug concentration 0 on every control step".into(),
    });

    let ctx = record(&params, Scenario::Ctx, 9);
    let start = params.treatment_start() as usize;
    let peak = start + params.ctx.t_max as usize;
    let c: Vec<f64> = ctx.summaries.iter().map(|s| s.drug_concentration).collect();
    let shape = c[start] == 0.0
        && (start..peak).all(|t| c[t + 1] > c[t])
        && (peak..c.len() - 1).all(|t| c[t + 1] < c[t]);
    results.push(TestResult {
        name: "engine_ctx_curve".into(),
        passed: shape,
        detail: format!("0 at step {}, peak {:.4} at step {}", start, c[peak], peak),
    });

    let still = Params {
        beta: 0.0,
        ..small_params(40, 0)
    };
    let rec = record(&still, Scenario::Control, 4);
    let loads: Vec<f64> = rec.frames.iter().map(|f| f.infection.max()).collect();
    let single_cell = rec.frames.iter().all(|f| f.infection.count_positive() == 1);
    let approach = loads.windows(2).all(|w| w[1] >= w[0] && w[1] <= 1.0);
    results.push(TestResult {
        name: "engine_zero_beta_kinetics".into(),
        passed: single_cell && approach,
        detail: format!(
            "seed load {:.3} → {:.3}",
            loads.first().copied().unwrap_or(0.0),
            loads.last().copied().unwrap_or(0.0)
        ),
    });

    results
}

// ── 6. Scenario comparison ──────────────────────────────────────────────

fn validate_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Scenario Comparison ---");
    let mut results = Vec::new();

    let params = Params {
        grid_size: 30,
        steps: 300,
        extra_steps: 400,
        ..Default::default()
    };

    let mut reports = Vec::new();
    for scenario in Scenario::ALL {
        let rec = record(&params, scenario, 2024);
        let report = RunReport::from_summaries(
            &rec.summaries,
            params.treatment_start(),
            output::EFFECT_WINDOW_STEPS,
        );
        if verbose {
            if let Some(report) = &report {
                match serde_json::to_string_pretty(report) {
                    Ok(json) => println!("    [{}] {}", scenario, json),
                    Err(e) => println!("    [{}] report not serializable: {}", scenario, e),
                }
            }
        }
        reports.push((scenario, report));
    }

    results.push(TestResult {
        name: "scenario_reports_present".into(),
        passed: reports.iter().all(|(_, r)| r.is_some()),
        detail: format!("{} reports", reports.len()),
    });

    // Same seed: identical history up to treatment start
    let pre: Vec<Option<f64>> = reports
        .iter()
        .map(|(_, r)| r.as_ref().and_then(|r| r.pre_treatment_infection))
        .collect();
    results.push(TestResult {
        name: "scenario_shared_pre_treatment".into(),
        passed: pre.windows(2).all(|w| w[0] == w[1]),
        detail: format!("pre-treatment mean infection {:?}", pre),
    });

    let final_of = |s: Scenario| {
        reports
            .iter()
            .find(|(sc, _)| *sc == s)
            .and_then(|(_, r)| r.as_ref())
            .map(|r| r.final_infection)
    };
    let (control, ctx, tetra) = (
        final_of(Scenario::Control),
        final_of(Scenario::Ctx),
        final_of(Scenario::Tetra),
    );
    results.push(TestResult {
        name: "scenario_treatment_not_worse".into(),
        passed: matches!((control, ctx, tetra), (Some(c), Some(x), Some(t)) if x <= c && t <= c),
        detail: format!(
            "final infection control={:?} ctx={:?} tetra={:?}",
            control, ctx, tetra
        ),
    });

    results
}
