use std::collections::VecDeque;

use tracing::{debug, debug_span};

use super::nbest::NBestGenerator;
use super::node::{Node, NodeId, NodeKind, Path, PathId};
use super::AnalyzeError;

/// Upper bound (exclusive) on the requested solution count.
pub const NBEST_MAX: usize = 512;

pub const SENTINEL_FEATURE: &str = "BOS/EOS";
pub const DUMMY_BOS_FEATURE: &str = "BOS";
pub const GETA_BOS_FEATURE: &str = "GETA";

/// Candidate nodes of one sentence, indexed by start and end offsets.
///
/// `begin_nodes[p]` holds nodes whose lattice range starts at `p` and
/// `end_nodes[p]` those ending at `p`. EOS is the only node in
/// `begin_nodes[len]`; `end_nodes[0]` holds the dummy BOS nodes.
#[derive(Debug)]
pub struct Lattice {
    sentence: Vec<char>,
    begin_nodes: Vec<Vec<NodeId>>,
    end_nodes: Vec<VecDeque<NodeId>>,
    nodes: Vec<Node>,
    paths: Vec<Path>,
    bos: NodeId,
    eos: NodeId,
    eon: Option<NodeId>,
    nbest: usize,
}

impl Lattice {
    /// `geta` is the `(wcost, rc_attr)` of an extra dummy BOS node.
    pub fn new(sentence: &str, nbest: usize, geta: Option<(i32, i16)>) -> Result<Self, AnalyzeError> {
        if nbest >= NBEST_MAX {
            return Err(AnalyzeError::InvalidNBest(nbest));
        }
        let sentence: Vec<char> = sentence.chars().collect();
        let len = sentence.len();
        let mut lattice = Self {
            sentence,
            begin_nodes: vec![Vec::new(); len + 1],
            end_nodes: vec![VecDeque::new(); len + 1],
            nodes: Vec::new(),
            paths: Vec::new(),
            bos: NodeId(0),
            eos: NodeId(0),
            eon: None,
            nbest,
        };

        lattice.bos = lattice.new_sentinel(0, NodeKind::Bos, SENTINEL_FEATURE);

        let dummy = lattice.new_sentinel(0, NodeKind::DummyBos, DUMMY_BOS_FEATURE);
        lattice.end_nodes[0].push_back(dummy);
        if let Some((wcost, rc_attr)) = geta {
            let node = lattice.new_sentinel(0, NodeKind::DummyBos, GETA_BOS_FEATURE);
            let n = &mut lattice.nodes[node.0];
            n.rc_attr = rc_attr;
            n.wcost = wcost;
            n.is_best = false;
            lattice.end_nodes[0].push_back(node);
        }

        lattice.eos = lattice.new_sentinel(len, NodeKind::Eos, SENTINEL_FEATURE);
        lattice.begin_nodes[len].push(lattice.eos);
        Ok(lattice)
    }

    fn new_sentinel(&mut self, pos: usize, kind: NodeKind, feature: &str) -> NodeId {
        let id = self.new_node(pos, pos, pos);
        let node = &mut self.nodes[id.0];
        node.kind = kind;
        node.feature = feature.to_string();
        node.is_best = true;
        id
    }

    /// Allocate a node over `[begin, end)` whose surface starts at `start`.
    pub fn new_node(&mut self, begin: usize, start: usize, end: usize) -> NodeId {
        let surface: String = self.sentence[start..end].iter().collect();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(begin, start, end, surface));
        id
    }

    /// Record a connection and push it on both nodes' path lists.
    pub fn new_path(&mut self, lnode: NodeId, rnode: NodeId, cost: i32) -> PathId {
        let id = PathId(self.paths.len());
        let lnext = self.nodes[rnode.0].lpath.replace(id);
        let rnext = self.nodes[lnode.0].rpath.replace(id);
        self.paths.push(Path {
            lnode,
            rnode,
            cost,
            lnext,
            rnext,
        });
        id
    }

    /// The end-of-N-best node, once [`Lattice::solutions`] has listed more
    /// than the single best solution.
    pub fn end_of_nbest(&self) -> Option<NodeId> {
        self.eon
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn path(&self, id: PathId) -> &Path {
        &self.paths[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn sentence(&self) -> &[char] {
        &self.sentence
    }

    /// Sentence length in characters.
    pub fn len(&self) -> usize {
        self.sentence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentence.is_empty()
    }

    pub fn set_begin_nodes(&mut self, pos: usize, nodes: Vec<NodeId>) {
        self.begin_nodes[pos] = nodes;
    }

    pub fn begin_nodes(&self, pos: usize) -> &[NodeId] {
        &self.begin_nodes[pos]
    }

    pub fn add_end_node(&mut self, id: NodeId) {
        let end = self.nodes[id.0].end;
        self.end_nodes[end].push_front(id);
    }

    pub fn end_nodes(&self, pos: usize) -> &VecDeque<NodeId> {
        &self.end_nodes[pos]
    }

    /// Nodes ending at the last offset any node ends at. Trailing whitespace
    /// leaves the offsets after it empty.
    pub fn last_non_empty_end_nodes(&self) -> &VecDeque<NodeId> {
        self.end_nodes
            .iter()
            .rev()
            .find(|nodes| !nodes.is_empty())
            .unwrap_or(&self.end_nodes[0])
    }

    pub fn bos(&self) -> NodeId {
        self.bos
    }

    pub fn eos(&self) -> NodeId {
        self.eos
    }

    pub fn dummy_bos_nodes(&self) -> &VecDeque<NodeId> {
        &self.end_nodes[0]
    }

    pub fn nbest(&self) -> usize {
        self.nbest
    }

    /// Whether connections are recorded as paths.
    pub fn is_nbest(&self) -> bool {
        self.nbest != 1
    }

    pub fn best_cost(&self) -> i32 {
        self.nodes[self.eos.0].accum_cost
    }

    /// Word nodes of the current solution, following `next` from BOS.
    pub fn best_path(&self) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut cur = self.nodes[self.bos.0].next;
        while let Some(id) = cur {
            let node = &self.nodes[id.0];
            if node.kind == NodeKind::Eos {
                break;
            }
            if !node.is_sentinel() {
                result.push(id);
            }
            cur = node.next;
        }
        result
    }

    /// `surface\tfeature` per node of the current solution, then `EOS`.
    pub fn write(&self) -> String {
        let mut out = String::new();
        for id in self.best_path() {
            let node = &self.nodes[id.0];
            out.push_str(&node.surface);
            out.push('\t');
            out.push_str(&node.feature);
            out.push('\n');
        }
        out.push_str("EOS\n");
        out
    }

    /// Render the requested solutions.
    ///
    /// `nbest == 1` yields the best solution. `nbest == 0` yields every
    /// solution tied with the best cost, up to `NBEST_MAX`. Otherwise up to
    /// `nbest` solutions in non-decreasing cost order.
    pub fn solutions(&mut self) -> Vec<String> {
        if !self.is_nbest() {
            return vec![self.write()];
        }
        let _span = debug_span!("nbest", nbest = self.nbest).entered();
        let limit = if self.nbest == 0 { NBEST_MAX } else { self.nbest };
        let mut generator = NBestGenerator::new(self.eos);
        let mut results = Vec::new();
        let mut min_cost: Option<i32> = None;
        while results.len() < limit {
            let Some(cost) = generator.next(self) else {
                break;
            };
            if self.nbest == 0 {
                if min_cost.is_some_and(|min| cost > min) {
                    break;
                }
                min_cost = Some(cost);
            }
            results.push(self.write());
        }
        let eon = self.new_sentinel(self.len(), NodeKind::EndOfNBest, SENTINEL_FEATURE);
        self.eon = Some(eon);
        debug!(solutions = results.len());
        results
    }
}
