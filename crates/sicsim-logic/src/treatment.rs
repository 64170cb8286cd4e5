//! Treatment scenarios and the drug variant they apply.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::params::{DrugParams, Params};

/// The closed set of runnable scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// No drug treatment.
    Control,
    /// Bactericidal treatment (CTX).
    Ctx,
    /// Bacteriostatic treatment (oxytetracycline).
    Tetra,
}

impl Scenario {
    /// Every scenario, in batch-mode order.
    pub const ALL: [Scenario; 3] = [Scenario::Control, Scenario::Ctx, Scenario::Tetra];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Control => "control",
            Scenario::Ctx => "ctx",
            Scenario::Tetra => "tetra",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::Control => "No drug treatment",
            Scenario::Ctx => "CTX (bactericidal) treatment",
            Scenario::Tetra => "Oxytetracycline (bacteriostatic) treatment",
        }
    }

    /// The treatment this scenario applies, with drug parameters from `params`.
    pub fn treatment(self, params: &Params) -> Treatment {
        match self {
            Scenario::Control => Treatment::None,
            Scenario::Ctx => Treatment::Bactericidal(params.ctx),
            Scenario::Tetra => Treatment::Bacteriostatic(params.tetracycline),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scenario '{0}' (expected control, ctx or tetra)")]
pub struct UnknownScenario(pub String);

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control" => Ok(Scenario::Control),
            "ctx" => Ok(Scenario::Ctx),
            "tetra" => Ok(Scenario::Tetra),
            _ => Err(UnknownScenario(s.trim().to_string())),
        }
    }
}

/// Which drug acts on the infection from treatment start onward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Treatment {
    None,
    /// Kills a fraction of the load each step.
    Bactericidal(DrugParams),
    /// Inhibits growth and spread, with a small active clearance.
    Bacteriostatic(DrugParams),
}

impl Treatment {
    /// Drug parameters, if any drug is given.
    pub fn drug(&self) -> Option<&DrugParams> {
        match self {
            Treatment::None => None,
            Treatment::Bactericidal(d) | Treatment::Bacteriostatic(d) => Some(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenarios() {
        assert_eq!("control".parse::<Scenario>(), Ok(Scenario::Control));
        assert_eq!(" CTX ".parse::<Scenario>(), Ok(Scenario::Ctx));
        assert_eq!("tetra".parse::<Scenario>(), Ok(Scenario::Tetra));
        assert_eq!(
            "aspirin".parse::<Scenario>(),
            Err(UnknownScenario("aspirin".into()))
        );
    }

    #[test]
    fn test_name_roundtrips() {
        for s in Scenario::ALL {
            assert_eq!(s.name().parse::<Scenario>(), Ok(s));
            assert_eq!(s.to_string(), s.name());
        }
    }

    #[test]
    fn test_treatment_mapping() {
        let p = Params::default();
        assert_eq!(Scenario::Control.treatment(&p).drug(), None);
        assert_eq!(
            Scenario::Ctx.treatment(&p),
            Treatment::Bactericidal(DrugParams::CTX)
        );
        assert_eq!(
            Scenario::Tetra.treatment(&p).drug(),
            Some(&DrugParams::TETRACYCLINE)
        );
    }
}
