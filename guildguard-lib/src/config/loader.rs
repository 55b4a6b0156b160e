use std::fs;
use std::path::Path;

use crate::config::{validator, Config};
use crate::error::{GuardError, Result};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| GuardError::Config(format!("Failed to read config file: {e}")))?;
    load_from_str(&txt)
}

pub fn load_from_str(txt: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(txt)
        .map_err(|e| GuardError::Config(format!("Failed to parse config: {e}")))?;

    validator::validate(&cfg)?;

    Ok(cfg)
}
