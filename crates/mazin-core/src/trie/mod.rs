//! Double-array trie over Unicode code points.
//!
//! `base` holds either the shift to a state's children or, at a terminal
//! cell, the stored value. `check` holds the parent index of a state. Cells
//! holding extra values for a duplicated key are chained through negative
//! `check` deltas and end with [`LAST_ENTRY`].

mod builder;

use serde::{Deserialize, Serialize};

/// Index of the root state. Cells below it are reserved.
pub const ROOT_INDEX: i32 = 1;
/// The arrays grow in blocks of this many cells.
pub const ALIGN_SIZE: usize = 1024;
/// `check` value terminating a duplicate-entry chain.
pub const LAST_ENTRY: i32 = i32::MIN;
/// Value reported for a key that is only a prefix of longer entries.
pub const NON_TERMINAL_VALUE: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    #[error("no entries found")]
    NoEntry,

    #[error("duplicated entry at index {0}")]
    DuplicateEntry(usize),

    #[error("disordered entry at index {0}")]
    NotSorted(usize),

    #[error("negative value at index {0}")]
    NegativeValue(usize),

    #[error("{keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },
}

/// One search hit: the stored value and the number of characters consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub value: i32,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleArray {
    dup_allowed: bool,
    base: Vec<i32>,
    check: Vec<i32>,
}

/// Transition code of a character. Code 0 is the end-of-key transition.
#[inline]
pub(crate) fn code_of(c: char) -> i32 {
    c as i32 + 1
}

impl DoubleArray {
    /// Number of cells in the arrays.
    pub fn size(&self) -> usize {
        self.base.len()
    }

    /// Number of occupied cells.
    pub fn nonzero_size(&self) -> usize {
        self.check.iter().filter(|&&c| c != 0).count()
    }

    pub fn dup_allowed(&self) -> bool {
        self.dup_allowed
    }

    /// Shape check for arrays read from disk.
    pub fn is_well_formed(&self) -> bool {
        self.base.len() == self.check.len() && self.base.len() > ROOT_INDEX as usize
    }

    #[inline]
    fn is_prefix_matched(&self, idx: i32, pid: i32) -> bool {
        idx > ROOT_INDEX && (idx as usize) < self.check.len() && self.check[idx as usize] == pid
    }

    /// Follow one transition from `pid`, returning the child state.
    #[inline]
    fn step(&self, pid: i32, c: char) -> Option<i32> {
        let idx = self.base[pid as usize].checked_add(code_of(c))?;
        self.is_prefix_matched(idx, pid).then_some(idx)
    }

    /// Terminal cell of state `pid`, if the state ends a key.
    #[inline]
    fn terminal(&self, pid: i32) -> Option<usize> {
        let idx = self.base[pid as usize];
        self.is_prefix_matched(idx, pid).then_some(idx as usize)
    }

    /// Walk `key` from the root and return the final state.
    fn walk(&self, key: &str) -> Option<i32> {
        let mut pid = ROOT_INDEX;
        for c in key.chars() {
            pid = self.step(pid, c)?;
        }
        Some(pid)
    }

    /// Push every value stored at terminal cell `term` into `out`.
    fn collect_values(&self, term: usize, mut out: impl FnMut(i32)) {
        let pv = self.base[term];
        if pv >= 0 || !self.dup_allowed {
            out(pv);
            return;
        }
        let mut cell = -(pv as i64);
        while let (Some(&value), Some(&delta)) = (
            self.base.get(cell as usize),
            self.check.get(cell as usize),
        ) {
            out(value);
            if delta == LAST_ENTRY || delta >= 0 {
                break;
            }
            cell -= delta as i64;
        }
    }

    /// Exact match. For a duplicated key the first value is returned.
    pub fn exact_match(&self, key: &str) -> Option<Match> {
        if key.is_empty() {
            return None;
        }
        let pid = self.walk(key)?;
        let term = self.terminal(pid)?;
        let mut first = None;
        self.collect_values(term, |v| {
            first.get_or_insert(v);
        });
        first.map(|value| Match {
            value,
            length: key.chars().count(),
        })
    }

    /// Every value stored for `key`, in insertion order.
    pub fn exact_match_all(&self, key: &str) -> Vec<i32> {
        let mut values = Vec::new();
        if key.is_empty() {
            return values;
        }
        if let Some(term) = self.walk(key).and_then(|pid| self.terminal(pid)) {
            self.collect_values(term, |v| values.push(v));
        }
        values
    }

    /// All entries that are prefixes of `key`, shortest first.
    ///
    /// With `allow_non_terminal`, a walk that consumes the whole key (at
    /// least two characters) without reaching a terminal reports
    /// [`NON_TERMINAL_VALUE`] for the full length.
    pub fn common_prefix_search<I>(&self, key: I, allow_non_terminal: bool) -> Vec<Match>
    where
        I: IntoIterator<Item = char>,
    {
        let mut results = Vec::new();
        let mut chars = key.into_iter().peekable();
        let mut pid = ROOT_INDEX;
        let mut length = 0;
        while let Some(c) = chars.next() {
            let Some(next) = self.step(pid, c) else {
                break;
            };
            pid = next;
            length += 1;
            if let Some(term) = self.terminal(pid) {
                self.collect_values(term, |value| results.push(Match { value, length }));
            } else if allow_non_terminal && length > 1 && chars.peek().is_none() {
                results.push(Match {
                    value: NON_TERMINAL_VALUE,
                    length,
                });
            }
        }
        results
    }
}
