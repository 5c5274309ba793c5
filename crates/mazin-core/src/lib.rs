#[cfg(not(target_endian = "little"))]
compile_error!("mazin-core requires a little-endian platform");

pub mod analyzer;
pub mod dict;
pub mod settings;
pub mod trie;

pub use analyzer::{Analysis, AnalyzeError, Analyzer};
pub use settings::Settings;
