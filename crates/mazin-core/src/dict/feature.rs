use serde::{Deserialize, Serialize};

const SEPARATOR: char = '\0';

/// Feature strings packed into one buffer, each terminated by `\0`.
/// Tokens refer to their feature by byte offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTable {
    data: String,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature and return its offset.
    pub fn push(&mut self, feature: &str) -> usize {
        let offset = self.data.len();
        // a separator inside the text would cut the entry short
        self.data
            .extend(feature.chars().filter(|&c| c != SEPARATOR));
        self.data.push(SEPARATOR);
        offset
    }

    /// Feature starting at `offset`, or `""` for an offset outside the table.
    pub fn get(&self, offset: usize) -> &str {
        let Some(rest) = self.data.get(offset..) else {
            return "";
        };
        match rest.find(SEPARATOR) {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    /// Size of the packed buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
