/// Index of a node in its lattice's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a path in its lattice's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub(crate) usize);

impl PathId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Dictionary word.
    Normal,
    /// Synthesized from the character class.
    Unknown,
    Bos,
    Eos,
    /// Sentinel every sentence-initial word connects to (plain or geta).
    DummyBos,
    /// Appended once an N-best listing is complete.
    EndOfNBest,
}

/// One candidate morpheme occurrence.
///
/// The lattice range is `[begin, end)`; `begin` is where lookup started and
/// `start` is the first character of the surface after skipped whitespace.
#[derive(Debug, Clone)]
pub struct Node {
    pub begin: usize,
    pub start: usize,
    pub end: usize,
    pub surface: String,
    pub feature: String,
    pub lc_attr: i16,
    pub rc_attr: i16,
    pub wcost: i32,
    /// Primary character category of the first surface character.
    pub char_type: u8,
    pub kind: NodeKind,
    /// Cost of the best path from BOS through this node.
    pub accum_cost: i32,
    /// Cost of the current solution up to this node.
    pub accum_cost2: i32,
    pub is_best: bool,
    /// Feature tagged as a mixed-writing entry.
    pub is_maze: bool,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    /// Head of the incoming path list (N-best only).
    pub lpath: Option<PathId>,
    /// Head of the outgoing path list (N-best only).
    pub rpath: Option<PathId>,
}

impl Node {
    pub(crate) fn new(begin: usize, start: usize, end: usize, surface: String) -> Self {
        Self {
            begin,
            start,
            end,
            surface,
            feature: String::new(),
            lc_attr: 0,
            rc_attr: 0,
            wcost: 0,
            char_type: 0,
            kind: NodeKind::Normal,
            accum_cost: 0,
            accum_cost2: 0,
            is_best: false,
            is_maze: false,
            prev: None,
            next: None,
            lpath: None,
            rpath: None,
        }
    }

    /// Surface length in characters.
    pub fn length(&self) -> usize {
        self.end - self.start
    }

    /// Lattice length in characters, including skipped whitespace.
    pub fn rlength(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_bos(&self) -> bool {
        self.kind == NodeKind::Bos
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Bos | NodeKind::Eos | NodeKind::DummyBos | NodeKind::EndOfNBest
        )
    }
}

/// Connection between two adjacent nodes, kept for N-best enumeration.
///
/// `lnext` threads the right node's incoming list and `rnext` the left
/// node's outgoing list.
#[derive(Debug, Clone)]
pub struct Path {
    pub lnode: NodeId,
    pub rnode: NodeId,
    /// Connection cost, without either node's word cost.
    pub cost: i32,
    pub lnext: Option<PathId>,
    pub rnext: Option<PathId>,
}
