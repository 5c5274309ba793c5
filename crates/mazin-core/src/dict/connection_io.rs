use std::collections::HashSet;
use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, info};

use super::compiler::read_or_default;
use super::connection::{
    ConnectionMatrix, CostStorage, HEADER_SIZE, MAGIC, MATRIX_DEF_DEFAULT, VERSION,
};
use super::DictError;

fn parse_num<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, DictError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| DictError::Parse(format!("invalid {what} '{value}': {e}")))
}

/// Parse `matrix-eos-penalty.def`: the first value is the penalty, every
/// following line a left-node right attribute that receives it.
fn parse_eos_penalty(text: &str) -> Result<(i32, HashSet<i16>), DictError> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));
    let Some(first) = lines.next() else {
        return Ok((0, HashSet::new()));
    };
    let penalty = parse_num(first, "EOS penalty")?;
    let attrs = lines
        .map(|l| parse_num(l, "attribute"))
        .collect::<Result<HashSet<i16>, _>>()?;
    Ok((penalty, attrs))
}

impl ConnectionMatrix {
    /// Build from `matrix.def` text: an `lsize rsize` header followed by
    /// `lr rl cost` lines.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        Self::from_text_with_penalty(text, None)
    }

    /// Build from `matrix.def` text, adding the EOS penalty described by
    /// `eos_penalty` to the listed attributes' connections into EOS.
    pub fn from_text_with_penalty(text: &str, eos_penalty: Option<&str>) -> Result<Self, DictError> {
        let (penalty, penalized) = match eos_penalty {
            Some(p) => parse_eos_penalty(p)?,
            None => (0, HashSet::new()),
        };

        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| DictError::Parse("empty file".to_string()))?;
        let parts: Vec<&str> = header.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(DictError::Parse(format!("format error: {header}")));
        }
        let lsize: u16 = parse_num(parts[0], "lsize")?;
        let rsize: u16 = parse_num(parts[1], "rsize")?;
        if lsize == 0 || rsize == 0 {
            return Err(DictError::Parse(format!("format error: {header}")));
        }

        let mut costs = vec![0i16; lsize as usize * rsize as usize];
        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(DictError::Parse(format!("format error: {line}")));
            }
            let lr: i16 = parse_num(fields[0], "lr")?;
            let rl: i16 = parse_num(fields[1], "rl")?;
            let mut cost: i32 = parse_num(fields[2], "cost")?;
            if rl == 0 && penalized.contains(&lr) {
                cost += penalty;
            }
            if lr < 0 || rl < 0 || lr as u16 >= lsize || rl as u16 >= rsize {
                return Err(DictError::Parse(format!(
                    "index values are out of range: lr={lr}, rl={rl}"
                )));
            }
            costs[lr as usize + lsize as usize * rl as usize] =
                cost.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }

        debug!(lsize, rsize, penalized = penalized.len(), "matrix parsed");
        Ok(Self::new_owned(lsize, rsize, costs))
    }

    /// Compile `matrix.def` plus the optional `matrix-eos-penalty.def`.
    /// A missing `matrix.def` falls back to a 1x1 matrix.
    pub fn compile(matrix_def: &Path, eos_penalty_def: &Path) -> Result<Self, DictError> {
        let text = read_or_default(matrix_def, MATRIX_DEF_DEFAULT)?;
        let penalty = match fs::read_to_string(eos_penalty_def) {
            Ok(p) => Some(p),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let matrix = Self::from_text_with_penalty(&text, penalty.as_deref())?;
        info!(
            path = %matrix_def.display(),
            lsize = matrix.lsize,
            rsize = matrix.rsize,
            "matrix compiled"
        );
        Ok(matrix)
    }

    /// Validate a binary header and return `(lsize, rsize)`.
    pub(super) fn validate_header(data: &[u8]) -> Result<(u16, u16), DictError> {
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        let version = data[4];
        if version != VERSION {
            return Err(DictError::UnsupportedVersion(version));
        }
        let lsize = u16::from_le_bytes([data[5], data[6]]);
        let rsize = u16::from_le_bytes([data[7], data[8]]);
        let expected_bytes = lsize as usize * rsize as usize * 2;
        let actual_bytes = data.len() - HEADER_SIZE;
        if actual_bytes != expected_bytes {
            return Err(DictError::Parse(format!(
                "expected {expected_bytes} bytes of cost data, got {actual_bytes}",
            )));
        }
        Ok((lsize, rsize))
    }

    /// Load from the compiled binary format using memory-mapped I/O.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // The Mmap is held for the lifetime of this struct. The file should
        // not be modified while the analyzer is running.
        let mmap = unsafe { Mmap::map(&file)? };
        let (lsize, rsize) = Self::validate_header(&mmap)?;
        info!(path = %path.display(), lsize, rsize, "matrix loaded");
        Ok(Self {
            lsize,
            rsize,
            storage: CostStorage::Mapped(mmap),
        })
    }

    /// Load a compiled matrix; with `ignore_eos` every connection into EOS
    /// costs 0.
    pub fn open_with(path: &Path, ignore_eos: bool) -> Result<Self, DictError> {
        let mut matrix = Self::open(path)?;
        if ignore_eos {
            matrix.clear_eos_costs();
            info!("EOS connection costs cleared");
        }
        Ok(matrix)
    }

    /// Parse from the compiled binary format into an owned representation.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let (lsize, rsize) = Self::validate_header(data)?;
        let costs: Vec<i16> = data[HEADER_SIZE..]
            .chunks_exact(2)
            .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        Ok(Self::new_owned(lsize, rsize, costs))
    }

    /// Serialize to the compiled binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.lsize as usize * self.rsize as usize;
        let mut buf = Vec::with_capacity(HEADER_SIZE + n * 2);
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&self.lsize.to_le_bytes());
        buf.extend_from_slice(&self.rsize.to_le_bytes());
        match &self.storage {
            CostStorage::Owned(costs) => {
                for &cost in costs {
                    buf.extend_from_slice(&cost.to_le_bytes());
                }
            }
            CostStorage::Mapped(mmap) => buf.extend_from_slice(&mmap[HEADER_SIZE..]),
        }
        buf
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, self.to_bytes())?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
