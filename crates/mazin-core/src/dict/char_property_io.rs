use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::char_property::{Category, CharProperty, CharRange, CHAR_PROPERTY_DEF_DEFAULT};
use super::compiler::{read_or_default, UNK_DEF_DEFAULT};
use super::DictError;

const MAGIC: &[u8; 4] = b"MZCP";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 4 + 1;

#[derive(Serialize)]
struct TablesRef<'a> {
    categories: &'a [Category],
    ranges: &'a [CharRange],
}

#[derive(Deserialize)]
struct Tables {
    categories: Vec<Category>,
    ranges: Vec<CharRange>,
}

impl CharProperty {
    /// Compile `char.def` and `unk.def` files. Missing files fall back to
    /// the built-in minimal definitions.
    pub fn compile(char_def: &Path, unk_def: &Path) -> Result<Self, DictError> {
        let char_text = read_or_default(char_def, CHAR_PROPERTY_DEF_DEFAULT)?;
        let unk_text = read_or_default(unk_def, UNK_DEF_DEFAULT)?;
        let property = Self::parse(&char_text, &unk_text)?;
        info!(
            path = %char_def.display(),
            categories = property.len(),
            ranges = property.ranges.len(),
            "char property compiled"
        );
        Ok(property)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let data = bincode::serialize(&TablesRef {
            categories: &self.categories,
            ranges: &self.ranges,
        })
        .map_err(DictError::Serialize)?;
        let mut buf = Vec::with_capacity(HEADER_SIZE + data.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&data);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(DictError::UnsupportedVersion(data[4]));
        }
        let tables: Tables =
            bincode::deserialize(&data[HEADER_SIZE..]).map_err(DictError::Deserialize)?;
        Self::from_parts(tables.categories, tables.ranges)
    }

    pub fn open(path: &Path) -> Result<Self, DictError> {
        let property = Self::from_bytes(&fs::read(path)?)?;
        info!(path = %path.display(), categories = property.len(), "char property loaded");
        Ok(property)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
