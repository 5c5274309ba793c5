use std::fs;

use mazin_core::settings::{self, Settings};

use crate::CliError;

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

/// Parse and validate a settings file, returning a one-line summary.
pub fn check_settings(content: &str) -> Result<String, CliError> {
    let s: Settings = settings::parse_settings_toml(content)?;
    Ok(format!(
        "OK: dictionary.dicdir={}, analysis.nbest={}, analysis.maze_penalty={}, unknown.max_grouping_size={}",
        s.dictionary.dicdir.display(),
        s.analysis.nbest,
        s.analysis.maze_penalty,
        s.unknown.max_grouping_size
    ))
}

pub fn settings_validate(file: &str) {
    let content = crate::die!(fs::read_to_string(file), "Error reading {file}: {}");
    println!("{}", crate::die!(check_settings(&content), "Error: {}"));
}
