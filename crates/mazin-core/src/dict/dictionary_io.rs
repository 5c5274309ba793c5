use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::dictionary::{non_terminal_token, DEFAULT_NON_TERMINAL_COST, DIC_VERSION};
use super::{DictError, DictType, Dictionary, DictionaryInfo, FeatureTable, Token};
use crate::trie::DoubleArray;

const MAGIC: &[u8; 4] = b"MZDC";
/// magic + header_len + body_len + body_crc32
const PREAMBLE_SIZE: usize = 4 + 4 + 4 + 4;

#[derive(Serialize)]
struct BodyRef<'a> {
    trie: &'a DoubleArray,
    tokens: &'a [Token],
    features: &'a FeatureTable,
}

#[derive(Deserialize)]
struct Body {
    trie: DoubleArray,
    tokens: Vec<Token>,
    features: FeatureTable,
}

fn read_u32(data: &[u8], at: usize) -> Result<usize, DictError> {
    data.get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(|b| u32::from_le_bytes(b) as usize)
        .ok_or(DictError::InvalidHeader)
}

impl Dictionary {
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let header = bincode::serialize(&self.info).map_err(DictError::Serialize)?;
        let body = bincode::serialize(&BodyRef {
            trie: &self.trie,
            tokens: &self.tokens,
            features: &self.features,
        })
        .map_err(DictError::Serialize)?;

        let header_len: u32 = header
            .len()
            .try_into()
            .map_err(|_| DictError::Parse("header exceeds u32::MAX".to_string()))?;
        let body_len: u32 = body
            .len()
            .try_into()
            .map_err(|_| DictError::Parse("body exceeds u32::MAX".to_string()))?;

        let mut buf = Vec::with_capacity(PREAMBLE_SIZE + header.len() + body.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&header_len.to_le_bytes());
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        buf.extend_from_slice(&header);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Read only the header of a serialized dictionary.
    pub fn info_from_bytes(data: &[u8]) -> Result<DictionaryInfo, DictError> {
        if data.len() < MAGIC.len() {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        let header_len = read_u32(data, 4)?;
        let header = data
            .get(PREAMBLE_SIZE..PREAMBLE_SIZE + header_len)
            .ok_or(DictError::InvalidHeader)?;
        let info: DictionaryInfo = bincode::deserialize(header).map_err(DictError::Deserialize)?;
        if info.version != DIC_VERSION {
            return Err(DictError::IncompatibleVersion {
                found: info.version,
                expected: DIC_VERSION,
            });
        }
        Ok(info)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let info = Self::info_from_bytes(data)?;
        let header_len = read_u32(data, 4)?;
        let body_len = read_u32(data, 8)?;
        let crc = read_u32(data, 12)? as u32;

        let body_start = PREAMBLE_SIZE + header_len;
        let body = data
            .get(body_start..body_start + body_len)
            .ok_or(DictError::InvalidHeader)?;
        if crc32fast::hash(body) != crc {
            return Err(DictError::ChecksumMismatch);
        }
        let body: Body = bincode::deserialize(body).map_err(DictError::Deserialize)?;

        if !body.trie.is_well_formed() {
            return Err(DictError::Parse("malformed trie".to_string()));
        }
        if body.tokens.len() != info.size {
            return Err(DictError::Parse(format!(
                "header declares {} tokens, body has {}",
                info.size,
                body.tokens.len()
            )));
        }

        Ok(Self {
            info,
            trie: body.trie,
            tokens: body.tokens,
            features: body.features,
            non_terminal: non_terminal_token(DEFAULT_NON_TERMINAL_COST),
        })
    }

    /// Open a dictionary file through a read-only memory map.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is only read
        // while decoding; nothing borrows from it afterwards.
        let mmap = unsafe { Mmap::map(&file)? };
        let dict = Self::from_bytes(&mmap)?;
        info!(
            path = %path.display(),
            dic_type = ?dict.dic_type(),
            tokens = dict.size(),
            "dictionary loaded"
        );
        Ok(dict)
    }

    /// Open a dictionary file and require its type to be `expected`.
    pub fn open_as(path: &Path, expected: DictType) -> Result<Self, DictError> {
        let dict = Self::open(path)?;
        if dict.dic_type() != expected {
            return Err(DictError::WrongType {
                expected,
                found: dict.dic_type(),
            });
        }
        Ok(dict)
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
