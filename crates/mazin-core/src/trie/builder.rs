use tracing::{debug, debug_span};

use super::{code_of, DoubleArray, TrieError, ALIGN_SIZE, LAST_ENTRY, ROOT_INDEX};

/// Code given to the root so it is never taken for a terminal.
const ROOT_CODE: i32 = -1;

/// A run of keys `[left, right)` sharing the same prefix up to `depth`,
/// whose last transition is `code`.
#[derive(Debug, Clone)]
struct TrieNode {
    code: i32,
    depth: usize,
    left: usize,
    right: usize,
    index: usize,
}

struct Builder<'a> {
    keys: Vec<Vec<i32>>,
    values: &'a [i32],
    dup_allowed: bool,
    base: Vec<i32>,
    check: Vec<i32>,
    first_unchecked: usize,
}

impl DoubleArray {
    /// Build a trie from keys sorted by code point.
    ///
    /// `values[i]` is stored for `keys[i]`. Repeated keys are accepted only
    /// with `dup_allowed`; every value of a repeated key is then kept in a
    /// chain in insertion order.
    pub fn build<K: AsRef<str>>(
        keys: &[K],
        values: &[i32],
        dup_allowed: bool,
    ) -> Result<Self, TrieError> {
        if keys.is_empty() {
            return Err(TrieError::NoEntry);
        }
        if keys.len() != values.len() {
            return Err(TrieError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        let _span = debug_span!("build_double_array", keys = keys.len(), dup_allowed).entered();

        let mut builder = Builder {
            keys: keys
                .iter()
                .map(|k| k.as_ref().chars().map(code_of).collect())
                .collect(),
            values,
            dup_allowed,
            base: Vec::new(),
            check: Vec::new(),
            first_unchecked: 0,
        };
        builder.ensure(ROOT_INDEX as usize);
        for cell in builder.check.iter_mut().take(ROOT_INDEX as usize + 1) {
            *cell = -1;
        }
        builder.first_unchecked = ROOT_INDEX as usize + 1;

        let root = TrieNode {
            code: ROOT_CODE,
            depth: 0,
            left: 0,
            right: keys.len(),
            index: ROOT_INDEX as usize,
        };
        builder.put_node(&root)?;

        let trie = DoubleArray {
            dup_allowed,
            base: builder.base,
            check: builder.check,
        };
        debug!(size = trie.size(), used = trie.nonzero_size());
        Ok(trie)
    }
}

impl Builder<'_> {
    /// Grow the arrays so that `pos` is a valid index.
    fn ensure(&mut self, pos: usize) {
        if pos >= self.base.len() {
            let aligned = (pos + ALIGN_SIZE) / ALIGN_SIZE * ALIGN_SIZE;
            self.base.resize(aligned, 0);
            self.check.resize(aligned, 0);
        }
    }

    fn put_node(&mut self, node: &TrieNode) -> Result<(), TrieError> {
        if node.code == 0 {
            self.put_term_node(node)
        } else {
            self.put_siblings(node)
        }
    }

    fn put_term_node(&mut self, node: &TrieNode) -> Result<(), TrieError> {
        let count = node.right - node.left;
        if count == 1 {
            let value = self.values[node.left];
            if value < 0 && self.dup_allowed {
                return Err(TrieError::NegativeValue(node.left));
            }
            self.base[node.index] = value;
            return Ok(());
        }
        if !self.dup_allowed {
            return Err(TrieError::DuplicateEntry(node.left + 1));
        }

        let cells = self.find_free_cells(count);
        self.base[node.index] = -(cells[0] as i32);
        for (k, &cell) in cells.iter().enumerate() {
            self.base[cell] = self.values[node.left + k];
            self.check[cell] = match cells.get(k + 1) {
                Some(&next) => -((next - cell) as i32),
                None => LAST_ENTRY,
            };
        }
        Ok(())
    }

    fn put_siblings(&mut self, node: &TrieNode) -> Result<(), TrieError> {
        let mut siblings = self.expand_node(node)?;
        let Some(last_code) = siblings.last().map(|s| s.code) else {
            return Ok(());
        };

        let begin = self.find_first_room(&siblings);
        self.base[node.index] = begin;
        self.ensure((begin + last_code) as usize);
        for sib in &mut siblings {
            sib.index = (begin + sib.code) as usize;
            self.check[sib.index] = node.index as i32;
        }
        for sib in &siblings {
            self.put_node(sib)?;
        }
        Ok(())
    }

    /// Split `parent`'s key range by the character at `parent.depth`.
    fn expand_node(&self, parent: &TrieNode) -> Result<Vec<TrieNode>, TrieError> {
        let mut siblings: Vec<TrieNode> = Vec::new();
        let mut prev_code = 0;
        for i in parent.left..parent.right {
            let key = &self.keys[i];
            if parent.depth > key.len() {
                continue;
            }
            let code = key.get(parent.depth).copied().unwrap_or(0);
            if prev_code > code {
                return Err(TrieError::NotSorted(i));
            }
            if code != prev_code || siblings.is_empty() {
                if let Some(last) = siblings.last_mut() {
                    last.right = i;
                }
                siblings.push(TrieNode {
                    code,
                    depth: parent.depth + 1,
                    left: i,
                    right: 0,
                    index: 0,
                });
            }
            prev_code = code;
        }
        if let Some(last) = siblings.last_mut() {
            last.right = parent.right;
        }
        Ok(siblings)
    }

    fn find_uncheck_pos(&mut self, from: usize) -> usize {
        let mut pos = from;
        self.ensure(pos);
        while self.check[pos] != 0 {
            pos += 1;
            self.ensure(pos);
        }
        pos
    }

    /// `num` free cells in ascending order, starting the scan at the first
    /// unchecked cell.
    fn find_free_cells(&mut self, num: usize) -> Vec<usize> {
        let mut cells = Vec::with_capacity(num);
        let mut from = self.first_unchecked;
        for _ in 0..num {
            let pos = self.find_uncheck_pos(from);
            cells.push(pos);
            from = pos + 1;
        }
        cells
    }

    /// Smallest `begin` such that `begin + code` is free for every sibling.
    fn find_first_room(&mut self, siblings: &[TrieNode]) -> i32 {
        self.first_unchecked = self.find_uncheck_pos(self.first_unchecked);

        let front = siblings[0].code;
        let mut next_unchecked = self.first_unchecked;
        let mut begin = next_unchecked as i32 - front;
        // The first sibling lands on `next_unchecked`, which is known to be free.
        let mut ni = 1;
        while ni < siblings.len() {
            let pos = (begin + siblings[ni].code) as usize;
            self.ensure(pos);
            if self.check[pos] == 0 {
                ni += 1;
            } else {
                next_unchecked = self.find_uncheck_pos(next_unchecked + 1);
                begin = next_unchecked as i32 - front;
                ni = 1;
            }
        }

        // When the room is far past the first unchecked cell and the gap is
        // almost full (under 5% free), stop rescanning the gap.
        let begin_pos = next_unchecked;
        let gap = begin_pos - self.first_unchecked;
        if gap >= 200 {
            let mut required = gap / 20;
            let mut pos = self.first_unchecked;
            while required > 0 && pos + required < begin_pos {
                if self.check[pos] == 0 {
                    required -= 1;
                }
                pos += 1;
            }
            if required > 0 {
                self.first_unchecked = begin_pos;
            }
        }

        begin
    }
}
