//! Dictionary source parsing.
//!
//! Each source line is `surface,lc_attr,rc_attr,cost,feature`. The feature
//! is the remainder of the line and may itself contain commas.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use super::{DictError, DictType, Dictionary};

/// Minimal unknown-word definitions used when `unk.def` is missing.
pub const UNK_DEF_DEFAULT: &str = "DEFAULT,0,0,0,*\nSPACE,0,0,0,*\n";

const FIELDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub surface: String,
    pub lc_attr: i16,
    pub rc_attr: i16,
    pub wcost: i32,
    pub feature: String,
}

#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub dic_type: DictType,
    /// Left attribute count of the connection matrix.
    pub lsize: u32,
    /// Right attribute count of the connection matrix.
    pub rsize: u32,
    /// Drop feature text and keep segmentation data only.
    pub wakati: bool,
}

/// Split a CSV line into at most `max_fields` fields.
///
/// Double quotes group commas into a field and `""` inside quotes is a
/// literal quote. The last field takes the rest of the line.
pub fn split_csv(line: &str, max_fields: usize) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if fields.len() + 1 == max_fields {
            let rest = &line[pos..];
            let rest = rest
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .map(|r| r.replace("\"\"", "\""))
                .unwrap_or_else(|| rest.to_string());
            field.push_str(&rest);
            break;
        }
        match c {
            '"' if quoted && chars.peek().is_some_and(|&(_, n)| n == '"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn parse_attr(value: &str, name: &str, lineno: usize) -> Result<i16, DictError> {
    value
        .trim()
        .parse()
        .map_err(|e| DictError::Parse(format!("line {lineno}: invalid {name} '{value}': {e}")))
}

/// Parse one source line. Comment, blank and empty-surface lines yield `None`.
pub fn parse_line(
    line: &str,
    lineno: usize,
    opts: &CompileOptions,
) -> Result<Option<DictEntry>, DictError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let items = split_csv(line, FIELDS);
    if items.len() != FIELDS {
        return Err(DictError::Parse(format!("line {lineno}: format error: {line}")));
    }

    let surface = &items[0];
    if surface.is_empty() {
        warn!(lineno, line, "empty surface, line skipped");
        return Ok(None);
    }

    let lc_attr = parse_attr(&items[1], "left attribute", lineno)?;
    let rc_attr = parse_attr(&items[2], "right attribute", lineno)?;
    let in_range = (0..opts.lsize as i64).contains(&(lc_attr as i64))
        && (0..opts.rsize as i64).contains(&(rc_attr as i64));
    if !in_range {
        let msg = format!(
            "line {lineno}: attributes ({lc_attr}, {rc_attr}) outside matrix {}x{}",
            opts.lsize, opts.rsize
        );
        if opts.dic_type == DictType::User {
            warn!("{msg}");
        } else {
            return Err(DictError::Parse(msg));
        }
    }

    let cost = items[3].trim();
    if cost.is_empty() {
        return Err(DictError::Parse(format!("line {lineno}: cost field is empty")));
    }
    let wcost: i32 = cost
        .parse()
        .map_err(|e| DictError::Parse(format!("line {lineno}: invalid cost '{cost}': {e}")))?;

    Ok(Some(DictEntry {
        surface: surface.clone(),
        lc_attr,
        rc_attr,
        wcost,
        feature: if opts.wakati {
            String::new()
        } else {
            items[4].clone()
        },
    }))
}

pub fn parse_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    opts: &CompileOptions,
) -> Result<Vec<DictEntry>, DictError> {
    let mut entries = Vec::new();
    for (i, line) in lines.into_iter().enumerate() {
        if let Some(entry) = parse_line(line, i + 1, opts)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Compile source lines into a dictionary named `filename`.
pub fn compile_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    filename: &str,
    opts: &CompileOptions,
) -> Result<Dictionary, DictError> {
    let entries = parse_lines(lines, opts)?;
    Dictionary::build(entries, opts.dic_type, filename, opts.lsize, opts.rsize)
}

/// Compile source files into one dictionary named after the first file.
pub fn compile_files<P: AsRef<Path>>(
    paths: &[P],
    opts: &CompileOptions,
) -> Result<Dictionary, DictError> {
    let mut entries = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let parsed = parse_lines(text.lines(), opts)
            .map_err(|e| DictError::Parse(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), count = parsed.len(), "read dictionary source");
        entries.extend(parsed);
    }
    let filename = paths
        .first()
        .and_then(|p| p.as_ref().file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Dictionary::build(entries, opts.dic_type, &filename, opts.lsize, opts.rsize)
}

/// Read a definition file, falling back to `default` when it does not exist.
pub(super) fn read_or_default(path: &Path, default: &str) -> Result<String, DictError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "not found, minimum setting is used");
            Ok(default.to_string())
        }
        Err(e) => Err(e.into()),
    }
}

/// Attribute counts from the first line of a `matrix.def`.
///
/// A missing file falls back to a 1x1 matrix.
pub fn matrix_size(path: &Path) -> Result<(u32, u32), DictError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "matrix definition not found, using 1x1");
            return Ok((1, 1));
        }
        Err(e) => return Err(e.into()),
    };
    let header = text
        .lines()
        .next()
        .ok_or_else(|| DictError::Parse("empty matrix definition".to_string()))?;
    let mut parts = header.split_whitespace().map(str::parse::<u32>);
    match (parts.next(), parts.next()) {
        (Some(Ok(lsize)), Some(Ok(rsize))) => Ok((lsize, rsize)),
        _ => Err(DictError::Parse(format!("invalid matrix header: {header}"))),
    }
}
