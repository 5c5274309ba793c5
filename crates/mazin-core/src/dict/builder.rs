//! Index building: turns a directory of definition sources into the binary
//! files the analyzer loads.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, info_span};

use super::compiler::{self, read_or_default, CompileOptions, UNK_DEF_DEFAULT};
use super::{CharProperty, ConnectionMatrix, DictError, DictType, Dictionary};

pub const CHAR_DEF_FILE: &str = "char.def";
pub const UNK_DEF_FILE: &str = "unk.def";
pub const MATRIX_DEF_FILE: &str = "matrix.def";
pub const MATRIX_EOS_PENALTY_FILE: &str = "matrix-eos-penalty.def";
pub const CHAR_PROPERTY_FILE: &str = "char.bin";
pub const UNK_DIC_FILE: &str = "unk.dic";
pub const SYS_DIC_FILE: &str = "sys.dic";
pub const MATRIX_FILE: &str = "matrix.bin";

/// Summary of a system index build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub categories: usize,
    pub unknown_tokens: usize,
    pub system_tokens: usize,
    pub lsize: u32,
    pub rsize: u32,
}

/// Attribute counts for a dictionary directory. A compiled `matrix.bin`
/// wins over `matrix.def`.
pub fn attr_size(dicdir: &Path) -> Result<(u32, u32), DictError> {
    let compiled = dicdir.join(MATRIX_FILE);
    if compiled.exists() {
        let matrix = ConnectionMatrix::open(&compiled)?;
        return Ok((matrix.lsize() as u32, matrix.rsize() as u32));
    }
    compiler::matrix_size(&dicdir.join(MATRIX_DEF_FILE))
}

/// Dictionary sources (`*.csv`) of a directory in file-name order.
pub fn source_files(dicdir: &Path) -> Result<Vec<PathBuf>, DictError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dicdir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();
    Ok(files)
}

/// Build `char.bin`, `unk.dic`, `sys.dic` and `matrix.bin` from the sources
/// in `dicdir` into `outdir`.
pub fn build_system_index(
    dicdir: &Path,
    outdir: &Path,
    wakati: bool,
) -> Result<BuildReport, DictError> {
    let _span = info_span!("build_system_index", dicdir = %dicdir.display()).entered();
    fs::create_dir_all(outdir)?;

    let (lsize, rsize) = compiler::matrix_size(&dicdir.join(MATRIX_DEF_FILE))?;

    let char_property =
        CharProperty::compile(&dicdir.join(CHAR_DEF_FILE), &dicdir.join(UNK_DEF_FILE))?;
    char_property.save(&outdir.join(CHAR_PROPERTY_FILE))?;

    let unk_text = read_or_default(&dicdir.join(UNK_DEF_FILE), UNK_DEF_DEFAULT)?;
    let unk = compiler::compile_lines(
        unk_text.lines(),
        UNK_DEF_FILE,
        &CompileOptions {
            dic_type: DictType::Unknown,
            lsize,
            rsize,
            wakati,
        },
    )?;
    unk.save(&outdir.join(UNK_DIC_FILE))?;

    let sources = source_files(dicdir)?;
    if sources.is_empty() {
        return Err(DictError::Parse(format!(
            "no dictionary sources (*.csv) in {}",
            dicdir.display()
        )));
    }
    let sys = compiler::compile_files(
        &sources,
        &CompileOptions {
            dic_type: DictType::System,
            lsize,
            rsize,
            wakati,
        },
    )?;
    sys.save(&outdir.join(SYS_DIC_FILE))?;

    let matrix = ConnectionMatrix::compile(
        &dicdir.join(MATRIX_DEF_FILE),
        &dicdir.join(MATRIX_EOS_PENALTY_FILE),
    )?;
    matrix.save(&outdir.join(MATRIX_FILE))?;

    let report = BuildReport {
        categories: char_property.len(),
        unknown_tokens: unk.size(),
        system_tokens: sys.size(),
        lsize,
        rsize,
    };
    info!(?report, outdir = %outdir.display(), "system index built");
    Ok(report)
}

fn user_options(dicdir: &Path) -> Result<CompileOptions, DictError> {
    let (lsize, rsize) = attr_size(dicdir)?;
    Ok(CompileOptions {
        dic_type: DictType::User,
        lsize,
        rsize,
        wakati: false,
    })
}

/// Compile user dictionary sources against the matrix of `dicdir` and save
/// the result to `output`.
pub fn build_user_dictionary<P: AsRef<Path>>(
    dicdir: &Path,
    sources: &[P],
    output: &Path,
) -> Result<Dictionary, DictError> {
    if sources.is_empty() {
        return Err(DictError::Parse("no dictionary sources given".to_string()));
    }
    let dict = compiler::compile_files(sources, &user_options(dicdir)?)?;
    dict.save(output)?;
    info!(output = %output.display(), tokens = dict.size(), "user dictionary built");
    Ok(dict)
}

/// Like [`build_user_dictionary`], with the source given as lines.
pub fn build_user_dictionary_from_lines<'a>(
    dicdir: &Path,
    lines: impl IntoIterator<Item = &'a str>,
    output: &Path,
) -> Result<Dictionary, DictError> {
    let filename = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dict = compiler::compile_lines(lines, &filename, &user_options(dicdir)?)?;
    dict.save(output)?;
    info!(output = %output.display(), tokens = dict.size(), "user dictionary built");
    Ok(dict)
}
