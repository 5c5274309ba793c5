use memmap2::Mmap;

pub(super) const MAGIC: &[u8; 4] = b"MZCX";
pub(super) const VERSION: u8 = 1;
/// magic(4) + version(1) + lsize(2) + rsize(2).
pub(super) const HEADER_SIZE: usize = 4 + 1 + 2 + 2;

/// Minimal matrix used when `matrix.def` is missing.
pub const MATRIX_DEF_DEFAULT: &str = "1 1\n0 0 0\n";

/// Scores the junction between two adjacent morphemes.
pub trait Connector: Send + Sync {
    /// Cost of a node with right attribute `lr` followed by a node with
    /// left attribute `rl`.
    fn cost(&self, lr: i16, rl: i16) -> i32;
}

/// Backing storage for cost data: either owned or memory-mapped.
pub(super) enum CostStorage {
    Owned(Vec<i16>),
    Mapped(Mmap),
}

/// Connection costs indexed by `lr + lsize * rl`.
pub struct ConnectionMatrix {
    pub(super) lsize: u16,
    pub(super) rsize: u16,
    pub(super) storage: CostStorage,
}

impl ConnectionMatrix {
    /// Create an owned matrix. `costs` is padded with zeros to
    /// `lsize * rsize` entries if shorter.
    pub(crate) fn new_owned(lsize: u16, rsize: u16, mut costs: Vec<i16>) -> Self {
        costs.resize(lsize as usize * rsize as usize, 0);
        Self {
            lsize,
            rsize,
            storage: CostStorage::Owned(costs),
        }
    }

    fn index(&self, lr: i16, rl: i16) -> Option<usize> {
        if lr < 0 || rl < 0 || lr as u16 >= self.lsize || rl as u16 >= self.rsize {
            return None;
        }
        Some(lr as usize + self.lsize as usize * rl as usize)
    }

    /// Look up a connection cost. Out-of-range attributes cost 0.
    pub fn cost(&self, lr: i16, rl: i16) -> i16 {
        let Some(idx) = self.index(lr, rl) else {
            return 0;
        };
        match &self.storage {
            CostStorage::Owned(costs) => costs.get(idx).copied().unwrap_or(0),
            CostStorage::Mapped(mmap) => {
                let byte_offset = HEADER_SIZE + idx * 2;
                mmap.get(byte_offset..byte_offset + 2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .unwrap_or(0)
            }
        }
    }

    /// Number of right attributes of left nodes.
    pub fn lsize(&self) -> u16 {
        self.lsize
    }

    /// Number of left attributes of right nodes.
    pub fn rsize(&self) -> u16 {
        self.rsize
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, CostStorage::Mapped(_))
    }

    /// Copy mapped costs into an owned buffer so they can be edited.
    pub(crate) fn make_owned(&mut self) {
        if let CostStorage::Mapped(_) = self.storage {
            let n = self.lsize as usize * self.rsize as usize;
            let mut costs = Vec::with_capacity(n);
            for rl in 0..self.rsize {
                for lr in 0..self.lsize {
                    costs.push(self.cost(lr as i16, rl as i16));
                }
            }
            self.storage = CostStorage::Owned(costs);
        }
    }

    /// Zero every connection into EOS (left attribute 0 of the right node).
    pub fn clear_eos_costs(&mut self) {
        self.make_owned();
        if let CostStorage::Owned(costs) = &mut self.storage {
            let lsize = self.lsize as usize;
            for cost in costs.iter_mut().take(lsize) {
                *cost = 0;
            }
        }
    }
}

impl Connector for ConnectionMatrix {
    fn cost(&self, lr: i16, rl: i16) -> i32 {
        ConnectionMatrix::cost(self, lr, rl) as i32
    }
}
