//! Print the default parameter file.

use anyhow::Result;

use crate::config;

pub fn run() -> Result<()> {
    print!("{}", config::default_toml()?);
    Ok(())
}
