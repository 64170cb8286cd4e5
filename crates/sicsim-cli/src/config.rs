//! Parameter file loading for the SICSim CLI.
//!
//! A config file is a TOML rendering of [`Params`]; every key is optional and
//! falls back to the built-in default.

use anyhow::{Context, Result};
use sicsim_logic::params::Params;
use std::path::Path;

/// Load parameters from `path`, or the defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<Params> {
    let params = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let params: Params = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            log::debug!("Loaded parameters from {}", path.display());
            params
        }
        None => Params::default(),
    };
    params
        .validate()
        .context("Invalid simulation parameters")?;
    Ok(params)
}

/// Default parameters as a TOML document.
pub fn default_toml() -> Result<String> {
    toml::to_string_pretty(&Params::default()).context("Failed to serialize default parameters")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_no_file_gives_defaults() {
        assert_eq!(load(None).unwrap(), Params::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sicsim.toml");
        fs::write(
            &path,
            "grid_size = 20\nbeta = 0.2\n\n[ctx]\ndose = 0.5\nec50 = 0.4\nhill_n = 2.0\nkill_scale = 3.0\nt_max = 10.0\nhalf_life = 50.0\n",
        )
        .unwrap();

        let params = load(Some(&path)).unwrap();
        assert_eq!(params.grid_size, 20);
        assert_eq!(params.beta, 0.2);
        assert_eq!(params.ctx.t_max, 10.0);
        assert_eq!(params.steps, Params::default().steps);
        assert_eq!(params.tetracycline, Params::default().tetracycline);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = default_toml().unwrap();
        let parsed: Params = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Params::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "beta = 1.5\n").unwrap();
        let err = load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("beta"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
