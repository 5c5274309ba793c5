//! Analyzer settings loaded from TOML.
//!
//! - `Settings::default()` equals the embedded `default_settings.toml`
//! - `Settings::load(path)` reads and validates a custom file
//! - Settings are passed explicitly to constructors; there is no global

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analyzer::NBEST_MAX;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub dictionary: DictionarySettings,
    pub analysis: AnalysisSettings,
    pub unknown: UnknownSettings,
    pub lattice: LatticeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionarySettings {
    pub dicdir: PathBuf,
    pub userdic: String,
    pub non_terminal_cost: i32,
    pub ignore_eos: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub nbest: usize,
    pub maze_penalty: i32,
    pub maze_conn_penalty: i32,
    pub allow_non_terminal: bool,
    pub cost_factor: i32,
    pub theta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownSettings {
    pub max_grouping_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeSettings {
    pub geta_cost: i32,
    pub geta_rc_attr: i16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dictionary: DictionarySettings {
                dicdir: PathBuf::from("."),
                userdic: String::new(),
                non_terminal_cost: 10000,
                ignore_eos: false,
            },
            analysis: AnalysisSettings {
                nbest: 1,
                maze_penalty: 1000,
                maze_conn_penalty: 1000,
                allow_non_terminal: false,
                cost_factor: 800,
                theta: 0.75,
            },
            unknown: UnknownSettings {
                max_grouping_size: 24,
            },
            lattice: LatticeSettings {
                geta_cost: -1,
                geta_rc_attr: 1285,
            },
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        parse_settings_toml(&fs::read_to_string(path)?)
    }

    /// The geta BOS node, when enabled: `(wcost, rc_attr)`.
    pub fn geta(&self) -> Option<(i32, i16)> {
        (self.lattice.geta_cost >= 0).then_some((self.lattice.geta_cost, self.lattice.geta_rc_attr))
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        validate(self)
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if s.$section.$field < 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field <= 0 as _ {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_non_negative!(dictionary.non_terminal_cost);
    check_positive!(analysis.cost_factor);
    check_positive!(unknown.max_grouping_size);
    check_non_negative!(lattice.geta_rc_attr);

    if !(s.analysis.theta.is_finite() && s.analysis.theta > 0.0) {
        return Err(SettingsError::InvalidValue {
            field: "analysis.theta".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if s.analysis.nbest >= NBEST_MAX {
        return Err(SettingsError::InvalidValue {
            field: "analysis.nbest".to_string(),
            reason: format!("must be less than {NBEST_MAX}"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.dictionary.dicdir, PathBuf::from("."));
        assert_eq!(s.dictionary.userdic, "");
        assert_eq!(s.dictionary.non_terminal_cost, 10000);
        assert!(!s.dictionary.ignore_eos);
        assert_eq!(s.analysis.nbest, 1);
        assert_eq!(s.analysis.maze_penalty, 1000);
        assert_eq!(s.analysis.maze_conn_penalty, 1000);
        assert!(!s.analysis.allow_non_terminal);
        assert_eq!(s.analysis.cost_factor, 800);
        assert!((s.analysis.theta - 0.75).abs() < f64::EPSILON);
        assert_eq!(s.unknown.max_grouping_size, 24);
        assert_eq!(s.lattice.geta_cost, -1);
        assert_eq!(s.lattice.geta_rc_attr, 1285);
        assert_eq!(s.geta(), None);
    }

    #[test]
    fn default_matches_embedded_toml() {
        assert_eq!(
            Settings::default(),
            parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap()
        );
    }

    #[test]
    fn export_roundtrip() {
        let mut s = Settings::default();
        s.analysis.nbest = 5;
        s.lattice.geta_cost = 0;
        let exported = s.to_toml().unwrap();
        let parsed = parse_settings_toml(&exported).unwrap();
        assert_eq!(parsed, s);
        assert_eq!(parsed.geta(), Some((0, 1285)));
    }

    #[test]
    fn error_nbest_too_large() {
        let toml = DEFAULT_SETTINGS_TOML.replace("nbest = 1", "nbest = 512");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("analysis.nbest"));
    }

    #[test]
    fn error_negative_non_terminal_cost() {
        let toml = DEFAULT_SETTINGS_TOML.replace("non_terminal_cost = 10000", "non_terminal_cost = -1");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("dictionary.non_terminal_cost"));
    }

    #[test]
    fn error_zero_grouping_size() {
        let toml = DEFAULT_SETTINGS_TOML.replace("max_grouping_size = 24", "max_grouping_size = 0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("unknown.max_grouping_size"));
    }

    #[test]
    fn error_zero_theta() {
        let toml = DEFAULT_SETTINGS_TOML.replace("theta = 0.75", "theta = 0.0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("theta"));
    }

    #[test]
    fn negative_maze_penalty_is_allowed() {
        let toml = DEFAULT_SETTINGS_TOML.replace("maze_penalty = 1000", "maze_penalty = -500");
        let s = parse_settings_toml(&toml).unwrap();
        assert_eq!(s.analysis.maze_penalty, -500);
    }

    #[test]
    fn error_missing_section() {
        let err = parse_settings_toml("[dictionary]\ndicdir = \".\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mazin.toml");
        let toml = DEFAULT_SETTINGS_TOML.replace("dicdir = \".\"", "dicdir = \"/opt/dic\"");
        std::fs::write(&path, toml).unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.dictionary.dicdir, PathBuf::from("/opt/dic"));

        assert!(matches!(
            Settings::load(&dir.path().join("missing.toml")),
            Err(SettingsError::Io(_))
        ));
    }
}
