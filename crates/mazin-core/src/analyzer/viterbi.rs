use std::sync::Arc;

use tracing::{debug, debug_span};

use super::lattice::Lattice;
use super::node::NodeId;
use super::tokenizer::Tokenizer;
use super::AnalyzeError;
use crate::dict::Connector;

/// Forward dynamic programming over the lattice.
pub struct Viterbi {
    tokenizer: Tokenizer,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for Viterbi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viterbi")
            .field("tokenizer", &self.tokenizer)
            .finish_non_exhaustive()
    }
}

impl Viterbi {
    pub fn new(tokenizer: Tokenizer, connector: Arc<dyn Connector>) -> Self {
        Self {
            tokenizer,
            connector,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    /// Fill the lattice and link the best path from BOS to EOS.
    pub fn analyze(
        &self,
        lattice: &mut Lattice,
        maze_penalty: i32,
        maze_conn_penalty: i32,
        allow_non_terminal: bool,
    ) -> Result<(), AnalyzeError> {
        let _span = debug_span!("viterbi", len = lattice.len()).entered();
        let dics = self.tokenizer.snapshot();
        let conn = Connect {
            connector: self.connector.as_ref(),
            maze_penalty,
            maze_conn_penalty,
        };

        connect_sentinels(lattice);

        for pos in 0..lattice.len() {
            if lattice.end_nodes(pos).is_empty() {
                continue;
            }
            let begin = self
                .tokenizer
                .lookup_in(&dics, lattice, pos, maze_penalty, allow_non_terminal);
            lattice.set_begin_nodes(pos, begin.clone());
            for &id in &begin {
                lattice.add_end_node(id);
            }
            let left: Vec<NodeId> = lattice.end_nodes(pos).iter().copied().collect();
            conn.connect(lattice, &begin, &left)?;
        }

        let eos = [lattice.eos()];
        let left: Vec<NodeId> = lattice.last_non_empty_end_nodes().iter().copied().collect();
        conn.connect(lattice, &eos, &left)?;

        link_best_path(lattice);
        debug!(
            nodes = lattice.node_count(),
            paths = lattice.path_count(),
            cost = lattice.best_cost()
        );
        Ok(())
    }
}

struct Connect<'a> {
    connector: &'a dyn Connector,
    maze_penalty: i32,
    maze_conn_penalty: i32,
}

impl Connect<'_> {
    /// Link every right node to its cheapest left node. The first left node
    /// wins ties. In N-best mode every pair is recorded as a path.
    fn connect(
        &self,
        lattice: &mut Lattice,
        right: &[NodeId],
        left: &[NodeId],
    ) -> Result<(), AnalyzeError> {
        let nbest = lattice.is_nbest();
        for &r in right {
            let rnode = lattice.node(r);
            let (r_lc, r_wcost, r_maze) = (rnode.lc_attr, rnode.wcost, rnode.is_maze);
            let mut best: Option<(NodeId, i32)> = None;

            for &l in left {
                let lnode = lattice.node(l);
                let mut conn_cost = self.connector.cost(lnode.rc_attr, r_lc);
                if self.maze_penalty < 0 && lnode.is_maze && r_maze {
                    conn_cost = conn_cost.saturating_add(self.maze_conn_penalty);
                }
                let cost = lnode
                    .accum_cost
                    .saturating_add(conn_cost)
                    .saturating_add(r_wcost);
                if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                    best = Some((l, cost));
                }
                if nbest {
                    lattice.new_path(l, r, conn_cost);
                }
            }

            let Some((prev, cost)) = best else {
                return Err(AnalyzeError::NoPathFound {
                    surface: lattice.node(r).surface.clone(),
                });
            };
            let node = lattice.node_mut(r);
            node.prev = Some(prev);
            node.next = None;
            node.accum_cost = cost;
        }
        Ok(())
    }
}

/// Hang the dummy BOS nodes off BOS. The link itself is free.
fn connect_sentinels(lattice: &mut Lattice) {
    let bos = lattice.bos();
    let dummies: Vec<NodeId> = lattice.dummy_bos_nodes().iter().copied().collect();
    for id in dummies {
        if lattice.is_nbest() {
            lattice.new_path(bos, id, 0);
        }
        let node = lattice.node_mut(id);
        node.prev = Some(bos);
        node.accum_cost = node.wcost;
    }
}

/// Follow `prev` from EOS, marking the best nodes and setting `next`.
pub fn link_best_path(lattice: &mut Lattice) {
    let mut cur = lattice.eos();
    while let Some(prev) = lattice.node(cur).prev {
        let node = lattice.node_mut(cur);
        node.is_best = true;
        node.accum_cost2 = node.accum_cost;
        lattice.node_mut(prev).next = Some(cur);
        cur = prev;
    }
}
