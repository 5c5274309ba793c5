use std::collections::HashMap;
use std::slice;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use super::{DictEntry, DictError, DictType, FeatureTable, Token};
use crate::trie::DoubleArray;

/// Format version written into every dictionary header.
pub const DIC_VERSION: u16 = 102;
/// Connection attribute of the synthetic non-terminal token.
pub const NON_TERMINAL_ATTR: i16 = 1285;
pub const NON_TERMINAL_FEATURE: &str = "非終端,*";
pub const DEFAULT_NON_TERMINAL_COST: i32 = 10000;

/// Offset marking a token whose feature is not in the table.
pub(super) const NO_FEATURE: usize = usize::MAX;
const MAX_HOMOGRAPHS: usize = 0xff;
const MAX_TOKEN_INDEX: usize = (i32::MAX >> 8) as usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryInfo {
    pub filename: String,
    /// Number of tokens.
    pub size: usize,
    pub dic_type: DictType,
    /// Number of left connection attributes.
    pub lsize: u32,
    /// Number of right connection attributes.
    pub rsize: u32,
    pub version: u16,
}

impl DictionaryInfo {
    /// Two dictionaries can be used together when they share the format
    /// version and the connection matrix shape.
    pub fn is_compatible(&self, other: &DictionaryInfo) -> bool {
        self.version == other.version && self.lsize == other.lsize && self.rsize == other.rsize
    }
}

/// Tokens registered for a surface that is a prefix of the searched text.
#[derive(Debug, Clone, Copy)]
pub struct PrefixMatch<'a> {
    pub tokens: &'a [Token],
    /// Surface length in characters.
    pub length: usize,
}

#[derive(Debug)]
pub struct Dictionary {
    pub(super) info: DictionaryInfo,
    pub(super) trie: DoubleArray,
    pub(super) tokens: Vec<Token>,
    pub(super) features: FeatureTable,
    pub(super) non_terminal: Token,
}

pub(super) fn non_terminal_token(wcost: i32) -> Token {
    Token {
        lc_attr: NON_TERMINAL_ATTR,
        rc_attr: NON_TERMINAL_ATTR,
        wcost,
        feature_offset: NO_FEATURE,
    }
}

impl Dictionary {
    /// Build a dictionary from parsed entries.
    ///
    /// Entries are stably sorted by surface; entries sharing a surface keep
    /// their input order and occupy one contiguous token run.
    pub fn build(
        mut entries: Vec<DictEntry>,
        dic_type: DictType,
        filename: &str,
        lsize: u32,
        rsize: u32,
    ) -> Result<Self, DictError> {
        let _span = debug_span!("build_dictionary", filename, entries = entries.len()).entered();
        entries.sort_by(|a, b| a.surface.cmp(&b.surface));

        let mut features = FeatureTable::new();
        let mut feature_offsets: HashMap<&str, usize> = HashMap::new();
        let mut tokens = Vec::with_capacity(entries.len());
        for entry in &entries {
            let feature_offset = *feature_offsets
                .entry(entry.feature.as_str())
                .or_insert_with(|| features.push(&entry.feature));
            tokens.push(Token {
                lc_attr: entry.lc_attr,
                rc_attr: entry.rc_attr,
                wcost: entry.wcost,
                feature_offset,
            });
        }

        let mut keys: Vec<&str> = Vec::new();
        let mut values: Vec<i32> = Vec::new();
        let mut idx = 0;
        for run in entries.chunk_by(|a, b| a.surface == b.surface) {
            let surface = run[0].surface.as_str();
            if run.len() > MAX_HOMOGRAPHS {
                return Err(DictError::Parse(format!(
                    "{surface}: {} entries share one surface (max {MAX_HOMOGRAPHS})",
                    run.len()
                )));
            }
            if idx > MAX_TOKEN_INDEX {
                return Err(DictError::Parse(format!(
                    "too many tokens (max {MAX_TOKEN_INDEX})"
                )));
            }
            keys.push(surface);
            values.push(((idx << 8) | run.len()) as i32);
            idx += run.len();
        }

        let trie = DoubleArray::build(&keys, &values, false)?;
        debug!(
            surfaces = keys.len(),
            tokens = tokens.len(),
            features = features.len()
        );

        Ok(Self {
            info: DictionaryInfo {
                filename: filename.to_string(),
                size: tokens.len(),
                dic_type,
                lsize,
                rsize,
                version: DIC_VERSION,
            },
            trie,
            tokens,
            features,
            non_terminal: non_terminal_token(DEFAULT_NON_TERMINAL_COST),
        })
    }

    pub fn info(&self) -> &DictionaryInfo {
        &self.info
    }

    pub fn dic_type(&self) -> DictType {
        self.info.dic_type
    }

    pub fn filename(&self) -> &str {
        &self.info.filename
    }

    /// Number of tokens.
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    pub fn lsize(&self) -> u32 {
        self.info.lsize
    }

    pub fn rsize(&self) -> u32 {
        self.info.rsize
    }

    pub fn version(&self) -> u16 {
        self.info.version
    }

    pub fn is_compatible(&self, other: &Dictionary) -> bool {
        self.info.is_compatible(&other.info)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn trie(&self) -> &DoubleArray {
        &self.trie
    }

    pub fn non_terminal_cost(&self) -> i32 {
        self.non_terminal.wcost
    }

    pub fn set_non_terminal_cost(&mut self, cost: i32) {
        self.non_terminal.wcost = cost;
    }

    fn decode(&self, value: i32) -> &[Token] {
        if value < 0 {
            return slice::from_ref(&self.non_terminal);
        }
        let idx = (value >> 8) as usize;
        let count = (value & 0xff) as usize;
        self.tokens.get(idx..idx + count).unwrap_or(&[])
    }

    /// Tokens of every surface that is a prefix of `text`, shortest first.
    ///
    /// With `allow_non_terminal`, a text that is a strict prefix of some
    /// surface yields the non-terminal token for its full length.
    pub fn common_prefix_search<I>(&self, text: I, allow_non_terminal: bool) -> Vec<PrefixMatch<'_>>
    where
        I: IntoIterator<Item = char>,
    {
        let hits = self.trie.common_prefix_search(text, allow_non_terminal);
        let mut matches: Vec<PrefixMatch<'_>> = Vec::with_capacity(hits.len());
        for hit in hits {
            let tokens = self.decode(hit.value);
            if !tokens.is_empty() {
                matches.push(PrefixMatch {
                    tokens,
                    length: hit.length,
                });
            }
        }
        matches
    }

    /// Tokens registered for exactly `key`.
    pub fn exact_match(&self, key: &str) -> &[Token] {
        self.trie
            .exact_match(key)
            .map(|m| self.decode(m.value))
            .unwrap_or(&[])
    }

    /// Feature text of a token of this dictionary.
    pub fn feature(&self, token: &Token) -> &str {
        if token.feature_offset == NO_FEATURE {
            NON_TERMINAL_FEATURE
        } else {
            self.features.get(token.feature_offset)
        }
    }
}
