//! Whole-run invariants of the engine.
//!
//! Every test drives a real `SimulationEngine` on a small lattice and checks
//! a property that must hold on every step, not just at the end.

use sicsim_core::output::MemoryRecorder;
use sicsim_core::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

fn small(steps: u32, extra_steps: u32) -> Params {
    Params {
        grid_size: 12,
        steps,
        extra_steps,
        signal_radius: 3,
        beta: 0.3,
        ..Default::default()
    }
}

fn record(params: Params, scenario: Scenario, seed: u64) -> MemoryRecorder {
    let mut engine = SimulationEngine::new(params, scenario, seed);
    let mut recorder = MemoryRecorder::with_frames(1);
    engine.run(&mut recorder);
    recorder
}

// ── Bounds ─────────────────────────────────────────────────────────────

#[test]
fn fields_stay_clamped_on_every_step() {
    for scenario in Scenario::ALL {
        let params = small(40, 40);
        let rec = record(params.clone(), scenario, 17);
        assert_eq!(rec.frames.len(), 80);
        for f in &rec.frames {
            assert!(f.infection.min() >= 0.0, "{scenario} step {}", f.step);
            assert!(f.infection.max() <= params.carrying_capacity);
            assert!(f.defense.min() >= 0.0);
            assert!(f.defense.max() <= params.defense_limit);
        }
    }
}

#[test]
fn zero_beta_grows_seed_toward_capacity() {
    let params = Params {
        beta: 0.0,
        ..small(30, 30)
    };
    let rec = record(params, Scenario::Control, 5);

    for f in &rec.frames {
        assert_eq!(f.infection.count_positive(), 1, "no spread with beta 0");
    }
    let loads: Vec<f64> = rec.frames.iter().map(|f| f.infection.max()).collect();
    for w in loads.windows(2) {
        assert!(w[1] >= w[0]);
        assert!(w[1] <= 1.0);
    }
    assert!(loads[loads.len() - 1] > 0.9);
}

// ── Reproducibility ────────────────────────────────────────────────────

#[test]
fn same_seed_same_run() {
    for scenario in Scenario::ALL {
        let a = record(small(25, 25), scenario, 99);
        let b = record(small(25, 25), scenario, 99);
        assert_eq!(a.summaries, b.summaries);
        assert_eq!(a.frames, b.frames);
    }
}

// ── Treatment ──────────────────────────────────────────────────────────

#[test]
fn control_never_has_drug() {
    let rec = record(small(20, 20), Scenario::Control, 3);
    assert!(rec.summaries.iter().all(|s| s.drug_concentration == 0.0));
}

#[test]
fn ctx_concentration_ramps_then_decays() {
    let params = small(20, 60);
    let start = params.treatment_start() as usize;
    let peak = start + params.ctx.t_max as usize;
    let rec = record(params.clone(), Scenario::Ctx, 21);
    let c: Vec<f64> = rec.summaries.iter().map(|s| s.drug_concentration).collect();

    assert!(c[..=start].iter().all(|&v| v == 0.0));
    for t in start..peak {
        assert!(c[t + 1] > c[t], "ramp at {t}");
    }
    assert!((c[peak] - params.ctx.dose).abs() < 1e-12);
    for t in peak..c.len() - 1 {
        assert!(c[t + 1] < c[t], "decay at {t}");
    }
}

#[test]
fn ctx_curve_with_default_treatment_start() {
    let params = Params {
        grid_size: 6,
        signal_radius: 1,
        steps: 1000,
        extra_steps: 200,
        ..Default::default()
    };
    let rec = record(params, Scenario::Ctx, 31);
    let c: Vec<f64> = rec.summaries.iter().map(|s| s.drug_concentration).collect();

    assert_eq!(c.len(), 1200);
    assert!(c[..=1000].iter().all(|&v| v == 0.0));
    for t in 1000..1014 {
        assert!(c[t + 1] > c[t], "ramp at {t}");
    }
    assert!((c[1014] - 0.1875).abs() < 1e-12);
    for t in 1014..c.len() - 1 {
        assert!(c[t + 1] < c[t], "decay at {t}");
    }
}

#[test]
fn tetra_reports_concentration_from_start() {
    let params = small(10, 30);
    let rec = record(params.clone(), Scenario::Tetra, 8);
    let start = params.treatment_start() as usize;
    assert!(rec.summaries[..=start]
        .iter()
        .all(|s| s.drug_concentration == 0.0));
    assert!(rec.summaries[start + 1..]
        .iter()
        .all(|s| s.drug_concentration > 0.0));
}

// ── Callose ────────────────────────────────────────────────────────────

#[test]
fn infected_cells_only_decay_callose() {
    let params = small(40, 0);
    let keep = 1.0 - params.defense_decay;
    let rec = record(params, Scenario::Control, 13);

    for pair in rec.frames.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        for ((i, j), load) in cur.infection.indexed_iter() {
            if load > 0.0 {
                let expected = prev.defense[(i, j)] * keep;
                assert!(
                    (cur.defense[(i, j)] - expected).abs() < 1e-12,
                    "production inside infected cell ({i}, {j}) at step {}",
                    cur.step
                );
            }
        }
    }
}
