use std::io::{BufRead, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use mazin_core::{Analysis, Analyzer, Settings};

use crate::CliError;

/// Options shared by every sentence of one `mazin` run. Zero penalties fall
/// back to the configured values.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub dicdir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub userdic: Option<String>,
    pub nbest: Option<usize>,
    pub maze_penalty: i32,
    pub maze_conn_penalty: i32,
    pub allow_non_terminal: bool,
    pub json: bool,
}

impl AnalyzeOptions {
    /// Settings from `--config` (or the defaults) with the command-line
    /// overrides applied.
    pub fn settings(&self) -> Result<Settings, CliError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(dicdir) = &self.dicdir {
            settings.dictionary.dicdir = dicdir.clone();
        }
        if let Some(userdic) = &self.userdic {
            settings.dictionary.userdic = userdic.clone();
        }
        if let Some(nbest) = self.nbest {
            settings.analysis.nbest = nbest;
        }
        if self.allow_non_terminal {
            settings.analysis.allow_non_terminal = true;
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    sentence: &'a str,
    #[serde(rename = "totalCost")]
    total_cost: i32,
    solutions: &'a [String],
}

/// Text output: every solution followed by the total cost line.
pub fn render_text(analysis: &Analysis) -> String {
    let mut out = String::new();
    for solution in &analysis.solutions {
        out.push_str(solution);
    }
    out.push_str(&format!("totalCost: {}\n", analysis.cost));
    out
}

/// One JSON object per sentence.
pub fn render_json(sentence: &str, analysis: &Analysis) -> Result<String, CliError> {
    Ok(serde_json::to_string(&JsonResult {
        sentence,
        total_cost: analysis.cost,
        solutions: &analysis.solutions,
    })?)
}

pub fn analyze_one(
    analyzer: &Analyzer,
    opts: &AnalyzeOptions,
    sentence: &str,
) -> Result<String, CliError> {
    let settings = analyzer.settings();
    let analysis = analyzer.analyze(
        sentence,
        settings.analysis.nbest,
        opts.maze_penalty,
        opts.maze_conn_penalty,
        settings.analysis.allow_non_terminal,
    )?;
    if opts.json {
        let mut line = render_json(sentence, &analysis)?;
        line.push('\n');
        Ok(line)
    } else {
        Ok(render_text(&analysis))
    }
}

/// Analyze `sentences`, or every line of `input` when none are given.
pub fn run<R: BufRead, W: Write>(
    opts: &AnalyzeOptions,
    sentences: &[String],
    input: R,
    out: &mut W,
) -> Result<usize, CliError> {
    let analyzer = Analyzer::open(opts.settings()?)?;
    debug!(dics = analyzer.tokenizer().snapshot().len(), "analyzer ready");

    let mut count = 0;
    if sentences.is_empty() {
        for line in input.lines() {
            let line = line?;
            out.write_all(analyze_one(&analyzer, opts, &line)?.as_bytes())?;
            count += 1;
        }
    } else {
        for sentence in sentences {
            out.write_all(analyze_one(&analyzer, opts, sentence)?.as_bytes())?;
            count += 1;
        }
    }
    out.flush()?;
    Ok(count)
}
