//! Character categories for unknown-word synthesis.
//!
//! `char.def` defines categories (`NAME invoke group length`) and maps code
//! point ranges onto them (`0xLLLL..0xHHHH NAME [NAME ...]`). The first name
//! of a range is the primary category; the others are added to its type set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::DictError;

/// Minimal definitions used when `char.def` is missing.
pub const CHAR_PROPERTY_DEF_DEFAULT: &str = "DEFAULT 1 0 0\nSPACE 0 1 0\n0x0020 SPACE\n";

/// Category count must stay below this.
pub const MAX_CATEGORIES: usize = 18;
/// Highest code point with its own table entry. Anything above is DEFAULT.
pub const MAX_CHAR: u32 = 0xFFFF;

pub const DEFAULT_CATEGORY: &str = "DEFAULT";
pub const SPACE_CATEGORY: &str = "SPACE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharInfo {
    /// Bit set of every category the character belongs to.
    pub char_types: u32,
    /// Id of the primary category.
    pub primary: u8,
    /// Unknown words of 1 to `span_limit` characters are proposed.
    pub span_limit: u8,
    /// Also propose the whole run of same-kind characters.
    pub group: bool,
    /// Propose unknown words even when the dictionary has a match.
    pub invoke: bool,
}

impl CharInfo {
    /// The same info restricted to its primary category.
    pub fn primarize(self) -> Self {
        Self {
            char_types: 1 << self.primary,
            ..self
        }
    }

    /// Whether the two share at least one category.
    pub fn is_kind_of(&self, other: &CharInfo) -> bool {
        self.char_types & other.char_types != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct Category {
    pub(super) name: String,
    pub(super) info: CharInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct CharRange {
    pub(super) low: u32,
    pub(super) high: u32,
    pub(super) info: CharInfo,
}

#[derive(Debug, Clone)]
pub struct CharProperty {
    pub(super) categories: Vec<Category>,
    pub(super) ranges: Vec<CharRange>,
    table: Vec<CharInfo>,
    default: CharInfo,
}

fn parse_flag(value: &str, line: &str) -> Result<u8, DictError> {
    value
        .parse()
        .map_err(|_| DictError::Parse(format!("invalid number '{value}' in: {line}")))
}

/// `0xLLLL` or `0xLLLL..0xHHHH`.
fn parse_hex_range(item: &str) -> Option<Result<(u32, u32), DictError>> {
    fn hex(s: &str) -> Option<u32> {
        let digits = s.strip_prefix("0x")?;
        if digits.is_empty() || digits.len() > 4 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok()
    }
    if !item.starts_with("0x") {
        return None;
    }
    let (low, high) = match item.split_once("..") {
        Some((l, h)) => (hex(l), hex(h)),
        None => (hex(item), hex(item)),
    };
    Some(match (low, high) {
        (Some(low), Some(high)) if low <= high && high <= MAX_CHAR => Ok((low, high)),
        _ => Err(DictError::Parse(format!("range error: {item}"))),
    })
}

impl CharProperty {
    /// Compile `char.def` text, checked against the `unk.def` text.
    pub fn parse(char_def: &str, unk_def: &str) -> Result<Self, DictError> {
        let mut categories: Vec<Category> = Vec::new();
        let mut raw_ranges: Vec<(u32, u32, Vec<&str>)> = Vec::new();

        for line in char_def.lines() {
            let content = line.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let items: Vec<&str> = content.split_whitespace().collect();
            if items.len() < 2 {
                return Err(DictError::Parse(format!("format error: {line}")));
            }

            if let Some(range) = parse_hex_range(items[0]) {
                let (low, high) = range?;
                raw_ranges.push((low, high, items[1..].to_vec()));
                continue;
            }

            if items.len() < 4 {
                return Err(DictError::Parse(format!("format error: {line}")));
            }
            let name = items[0];
            if categories.iter().any(|c| c.name == name) {
                return Err(DictError::Parse(format!("category {name} is already defined")));
            }
            let id = categories.len();
            if id + 1 >= MAX_CATEGORIES {
                return Err(DictError::Parse(format!(
                    "too many categories (>= {MAX_CATEGORIES})"
                )));
            }
            categories.push(Category {
                name: name.to_string(),
                info: CharInfo {
                    char_types: 1 << id,
                    primary: id as u8,
                    invoke: parse_flag(items[1], line)? != 0,
                    group: parse_flag(items[2], line)? != 0,
                    span_limit: parse_flag(items[3], line)?,
                },
            });
        }

        for required in [DEFAULT_CATEGORY, SPACE_CATEGORY] {
            if !categories.iter().any(|c| c.name == required) {
                return Err(DictError::MissingCategory(required.to_string()));
            }
        }
        check_unknown_def(&categories, unk_def)?;

        let lookup = |name: &str| {
            categories
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.info)
                .ok_or_else(|| DictError::Parse(format!("category [{name}] is undefined")))
        };
        let mut ranges = Vec::with_capacity(raw_ranges.len());
        for (low, high, names) in raw_ranges {
            let mut info = lookup(names[0])?;
            for name in &names[1..] {
                info.char_types |= 1 << lookup(name)?.primary;
            }
            ranges.push(CharRange { low, high, info });
        }

        Self::from_parts(categories, ranges)
    }

    /// Assemble from parsed or deserialized parts, expanding the lookup table.
    pub(super) fn from_parts(
        categories: Vec<Category>,
        ranges: Vec<CharRange>,
    ) -> Result<Self, DictError> {
        let default = categories
            .iter()
            .find(|c| c.name == DEFAULT_CATEGORY)
            .map(|c| c.info)
            .ok_or_else(|| DictError::MissingCategory(DEFAULT_CATEGORY.to_string()))?;
        let mut table = vec![default; MAX_CHAR as usize + 1];
        for range in &ranges {
            if range.low > range.high || range.high > MAX_CHAR {
                return Err(DictError::Parse(format!(
                    "range error: {:#x}..{:#x}",
                    range.low, range.high
                )));
            }
            table[range.low as usize..=range.high as usize].fill(range.info);
        }
        Ok(Self {
            categories,
            ranges,
            table,
            default,
        })
    }

    pub fn char_info(&self, c: char) -> CharInfo {
        self.table.get(c as usize).copied().unwrap_or(self.default)
    }

    /// Info of a category by name.
    pub fn category_info(&self, name: &str) -> Option<CharInfo> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.info)
    }

    /// Name of the category with id `id`.
    pub fn category_name(&self, id: usize) -> Option<&str> {
        self.categories.get(id).map(|c| c.name.as_str())
    }

    /// Category names in id order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// First offset at or after `from` whose character shares no category
    /// with `info`, or `chars.len()`.
    pub fn seek_to_other_type(&self, chars: &[char], from: usize, info: CharInfo) -> usize {
        let mut pos = from;
        while pos < chars.len() && info.is_kind_of(&self.char_info(chars[pos])) {
            pos += 1;
        }
        pos
    }
}

/// Every `unk.def` entry must name a category and every category needs an
/// `unk.def` entry.
fn check_unknown_def(categories: &[Category], unk_def: &str) -> Result<(), DictError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for line in unk_def.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let name = line.split(',').next().unwrap_or("");
        if !categories.iter().any(|c| c.name == name) {
            return Err(DictError::Parse(format!(
                "category [{name}] in unk.def is undefined in char.def"
            )));
        }
        seen.insert(name);
    }
    match categories.iter().find(|c| !seen.contains(c.name.as_str())) {
        Some(missing) => Err(DictError::MissingCategory(missing.name.clone())),
        None => Ok(()),
    }
}
