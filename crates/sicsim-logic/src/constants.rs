//! Model constants: fixed hypotheses and numerical parameters.
//!
//! These values are intrinsic to the model and are not exposed through the
//! run configuration. Adjustable experiment parameters live in [`crate::params`].

pub mod loads {
    /// Infection load placed on the single seeded cell at the start of a run.
    pub const INITIAL_INFECTION_LOAD: f64 = 0.1;
    /// Infection load given to a neighbor by a successful spread event.
    pub const SPREAD_INFECTION_LOAD: f64 = 0.05;
    /// Loads below this are snapped to exactly zero after the kinetic update.
    pub const NUMERICAL_EXTINCTION_THRESHOLD: f64 = 1e-3;
}

pub mod defense {
    /// Half-activation point of callose production against the local signal.
    pub const SIGNAL_EC50: f64 = 0.5;
    /// Steepness of callose production against the local signal.
    pub const HILL_COEFFICIENT: f64 = 2.0;
    /// Exponential attenuation of spread probability by neighbor callose.
    pub const SPREAD_ATTENUATION: f64 = 5.0;
}

pub mod drug {
    /// Concentrations below this count as "no drug present".
    pub const PRESENCE_EPSILON: f64 = 1e-9;
    /// Extra clearance per unit inhibition under bacteriostatic treatment.
    pub const BACTERIOSTATIC_ACTIVE_CLEARING: f64 = 0.015;
}

pub mod output {
    /// Zero-pad width of the step index in frame file names.
    pub const FRAME_INDEX_WIDTH: usize = 5;
    /// Steps between progress log lines.
    pub const PROGRESS_INTERVAL: u32 = 500;
    /// Steps after treatment start averaged for the report's effect window.
    pub const EFFECT_WINDOW_STEPS: u32 = 150;
}
