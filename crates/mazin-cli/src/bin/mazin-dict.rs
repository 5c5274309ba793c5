use clap::{Parser, Subcommand};

use mazin_cli::commands::{config_ops, dict_ops};
use mazin_cli::init_tracing;

#[derive(Parser)]
#[command(name = "mazin-dict", about = "mazin dictionary build tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build char.bin, unk.dic, sys.dic and matrix.bin from a source directory
    Build {
        /// Directory with char.def, unk.def, matrix.def and *.csv
        dicdir: String,
        /// Output directory
        outdir: String,
        /// Drop features from every entry
        #[arg(long)]
        wakati: bool,
    },
    /// Compile a user dictionary against a dictionary directory's matrix
    BuildUser {
        /// Dictionary directory (matrix.bin or matrix.def)
        #[arg(short, long, default_value = ".")]
        dicdir: String,
        /// Output file
        output_file: String,
        /// Source CSV files
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Look up a surface in a dictionary (exact match)
    Lookup {
        /// Dictionary file
        dict_file: String,
        /// Surface to look up
        surface: String,
    },
    /// Common-prefix search (all surfaces that are prefixes of the query)
    Prefix {
        /// Dictionary file
        dict_file: String,
        /// Query string
        query: String,
    },
    /// Show dictionary, char property or matrix info (auto-detected by magic bytes)
    Info {
        /// Compiled file
        file: String,
    },
    /// Look up a connection cost
    ConnCost {
        /// Compiled connection matrix file
        matrix_file: String,
        /// Right attribute of the left morpheme
        left: i16,
        /// Left attribute of the right morpheme
        right: i16,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    init_tracing(false);
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            dicdir,
            outdir,
            wakati,
        } => dict_ops::build(&dicdir, &outdir, wakati),
        Command::BuildUser {
            dicdir,
            output_file,
            sources,
        } => dict_ops::build_user(&dicdir, &output_file, &sources),
        Command::Lookup { dict_file, surface } => dict_ops::lookup(&dict_file, &surface),
        Command::Prefix { dict_file, query } => dict_ops::prefix(&dict_file, &query),
        Command::Info { file } => dict_ops::info(&file),
        Command::ConnCost {
            matrix_file,
            left,
            right,
        } => dict_ops::conn_cost(&matrix_file, left, right),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
