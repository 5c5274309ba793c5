use std::io;
use std::path::PathBuf;

use clap::Parser;

use mazin_cli::commands::analyze_ops::{self, AnalyzeOptions};
use mazin_cli::{die, init_tracing};

#[derive(Parser)]
#[command(name = "mazin", about = "Japanese morphological analyzer")]
struct Cli {
    /// Sentences to analyze (read from stdin, one per line, when omitted)
    sentences: Vec<String>,
    /// Directory holding sys.dic, unk.dic, char.bin and matrix.bin
    #[arg(short, long)]
    dicdir: Option<PathBuf>,
    /// Settings TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of solutions (0 = every solution tied with the best)
    #[arg(short, long)]
    nbest: Option<usize>,
    /// Cost multiplier for mixed-writing words (0 = configured value)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    maze_penalty: i32,
    /// Connection cost between mixed-writing words (0 = configured value)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    maze_conn_penalty: i32,
    /// Propose non-terminal nodes for strict prefixes of dictionary words
    #[arg(long)]
    allow_non_terminal: bool,
    /// Comma-separated user dictionary files
    #[arg(short, long)]
    userdic: Option<String>,
    /// Print one JSON object per sentence (logs are JSON too)
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let opts = AnalyzeOptions {
        dicdir: cli.dicdir,
        config: cli.config,
        userdic: cli.userdic,
        nbest: cli.nbest,
        maze_penalty: cli.maze_penalty,
        maze_conn_penalty: cli.maze_conn_penalty,
        allow_non_terminal: cli.allow_non_terminal,
        json: cli.json,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    die!(
        analyze_ops::run(&opts, &cli.sentences, stdin.lock(), &mut stdout.lock()),
        "Error: {}"
    );
}
