//! Morphological analysis via lattice construction and Viterbi search.
//!
//! The tokenizer proposes dictionary and unknown-word nodes at every
//! reachable offset, the Viterbi pass links each node to its cheapest
//! predecessor, and the N-best generator enumerates further solutions by
//! A* search over the recorded paths.

pub mod feature;
mod lattice;
mod nbest;
mod node;
#[cfg(test)]
pub(crate) mod testutil;
mod tokenizer;
mod viterbi;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::dict::builder::MATRIX_FILE;
use crate::dict::{ConnectionMatrix, Connector, DictError};
use crate::settings::{Settings, SettingsError};

pub use lattice::{Lattice, DUMMY_BOS_FEATURE, GETA_BOS_FEATURE, NBEST_MAX, SENTINEL_FEATURE};
pub use nbest::NBestGenerator;
pub use node::{Node, NodeId, NodeKind, Path, PathId};
pub use tokenizer::{DictionarySet, Tokenizer};
pub use viterbi::{link_best_path, Viterbi};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("nbest must be less than {NBEST_MAX}, got {0}")]
    InvalidNBest(usize),

    #[error("{surface}: no left node found")]
    NoPathFound { surface: String },

    #[error(transparent)]
    Dict(#[from] DictError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Result of analyzing one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Total cost of the best solution.
    pub cost: i32,
    /// Rendered solutions, best first.
    pub solutions: Vec<String>,
}

/// Sentence analyzer over a shared, read-only dictionary set.
#[derive(Debug)]
pub struct Analyzer {
    viterbi: Viterbi,
    settings: Settings,
}

impl Analyzer {
    /// Open the dictionaries under `settings.dictionary.dicdir`.
    pub fn open(settings: Settings) -> Result<Self, AnalyzeError> {
        settings.validate()?;
        let dicdir = settings.dictionary.dicdir.clone();
        let tokenizer = Tokenizer::open(&dicdir, &settings)?;
        let matrix =
            ConnectionMatrix::open_with(&dicdir.join(MATRIX_FILE), settings.dictionary.ignore_eos)?;

        let dics = tokenizer.snapshot();
        let system = dics.system();
        if system.lsize() != u32::from(matrix.lsize()) || system.rsize() != u32::from(matrix.rsize())
        {
            return Err(DictError::Incompatible(format!(
                "system dictionary is {}x{} but the matrix is {}x{}",
                system.lsize(),
                system.rsize(),
                matrix.lsize(),
                matrix.rsize()
            ))
            .into());
        }

        Ok(Self::new(tokenizer, Arc::new(matrix), settings))
    }

    pub fn new(tokenizer: Tokenizer, connector: Arc<dyn Connector>, settings: Settings) -> Self {
        Self {
            viterbi: Viterbi::new(tokenizer, connector),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        self.viterbi.tokenizer()
    }

    /// Build and solve the lattice of one sentence.
    ///
    /// A zero `maze_penalty` or `maze_conn_penalty` falls back to the
    /// configured value.
    pub fn build_lattice(
        &self,
        sentence: &str,
        nbest: usize,
        maze_penalty: i32,
        maze_conn_penalty: i32,
        allow_non_terminal: bool,
    ) -> Result<Lattice, AnalyzeError> {
        let analysis = &self.settings.analysis;
        let maze_penalty = if maze_penalty == 0 {
            analysis.maze_penalty
        } else {
            maze_penalty
        };
        let maze_conn_penalty = if maze_conn_penalty == 0 {
            analysis.maze_conn_penalty
        } else {
            maze_conn_penalty
        };

        let mut lattice = Lattice::new(sentence, nbest, self.settings.geta())?;
        self.viterbi
            .analyze(&mut lattice, maze_penalty, maze_conn_penalty, allow_non_terminal)?;
        Ok(lattice)
    }

    /// Analyze one sentence and render its solutions.
    pub fn analyze(
        &self,
        sentence: &str,
        nbest: usize,
        maze_penalty: i32,
        maze_conn_penalty: i32,
        allow_non_terminal: bool,
    ) -> Result<Analysis, AnalyzeError> {
        let _span = debug_span!("analyze", nbest, chars = sentence.chars().count()).entered();
        let mut lattice = self.build_lattice(
            sentence,
            nbest,
            maze_penalty,
            maze_conn_penalty,
            allow_non_terminal,
        )?;
        let solutions = lattice.solutions();
        let cost = lattice.best_cost();
        debug!(cost, solutions = solutions.len());
        Ok(Analysis { cost, solutions })
    }

    /// Analyze with every option taken from the settings.
    pub fn analyze_default(&self, sentence: &str) -> Result<Analysis, AnalyzeError> {
        let analysis = &self.settings.analysis;
        self.analyze(
            sentence,
            analysis.nbest,
            analysis.maze_penalty,
            analysis.maze_conn_penalty,
            analysis.allow_non_terminal,
        )
    }

    /// Reload the user dictionaries named in the settings.
    pub fn reload_user_dics(&self) -> usize {
        self.tokenizer().reload(&self.settings.dictionary.userdic)
    }

    /// Replace the user dictionaries with a comma-separated file list.
    pub fn load_user_dics(&self, userdic: &str) -> usize {
        self.tokenizer().reload(userdic)
    }

    pub fn reset_user_dics(&self) {
        self.tokenizer().reset();
    }
}
