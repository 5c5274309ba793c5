//! Dictionary storage and the definition files that go with it.
//!
//! `Dictionary` maps surfaces to `Token` runs through a double-array trie.
//! `CharProperty` classifies characters for unknown-word synthesis and
//! `ConnectionMatrix` scores adjacent morphemes.

pub mod builder;
pub mod char_property;
mod char_property_io;
pub mod compiler;
pub mod connection;
mod connection_io;
mod dictionary;
mod dictionary_io;
mod feature;
#[cfg(test)]
mod tests;

pub use char_property::{CharInfo, CharProperty};
pub use compiler::DictEntry;
pub use connection::{ConnectionMatrix, Connector};
pub use dictionary::{
    Dictionary, DictionaryInfo, PrefixMatch, DIC_VERSION, NON_TERMINAL_ATTR,
    NON_TERMINAL_FEATURE,
};
pub use feature::FeatureTable;

use std::io;

use serde::{Deserialize, Serialize};

use crate::trie::TrieError;

/// Error type for dictionary, char property and connection-matrix files.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected MZDC, MZCP or MZCX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("incompatible dictionary version {found} (expected {expected})")]
    IncompatibleVersion { found: u16, expected: u16 },

    #[error("wrong dictionary type: expected {expected:?}, found {found:?}")]
    WrongType { expected: DictType, found: DictType },

    #[error("incompatible dictionary: {0}")]
    Incompatible(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("trie error: {0}")]
    Trie(#[from] TrieError),

    #[error("no unknown-word entry for category {0}")]
    MissingCategory(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DictType {
    System = 1,
    User = 2,
    Unknown = 3,
}

/// One dictionary entry as stored: connection attributes, word cost and
/// the offset of its feature text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub lc_attr: i16,
    pub rc_attr: i16,
    pub wcost: i32,
    pub feature_offset: usize,
}
