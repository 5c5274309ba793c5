use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use super::lattice::Lattice;
use super::node::NodeId;

/// A partial path from `rnode` to EOS, linked through `next_elem`.
#[derive(Debug, Clone, Copy)]
struct QueueElement {
    rnode: NodeId,
    /// Connection cost to the node of `next_elem`.
    link_cost: i32,
    next_elem: Option<usize>,
    /// Best cost from BOS to `rnode`, known from the forward pass.
    hx: i32,
    /// Cost from `rnode` to EOS along this element's chain.
    gx: i32,
}

impl QueueElement {
    fn fx(&self) -> i32 {
        self.hx.saturating_add(self.gx)
    }
}

/// A* search from EOS back to BOS over the recorded paths.
///
/// The forward accumulated costs are an exact heuristic, so solutions come
/// out in non-decreasing cost order. Equal costs pop in insertion order.
#[derive(Debug)]
pub struct NBestGenerator {
    elements: Vec<QueueElement>,
    agenda: BinaryHeap<Reverse<(i32, usize)>>,
}

impl NBestGenerator {
    pub fn new(eos: NodeId) -> Self {
        let mut generator = Self {
            elements: Vec::new(),
            agenda: BinaryHeap::new(),
        };
        generator.push(QueueElement {
            rnode: eos,
            link_cost: 0,
            next_elem: None,
            hx: 0,
            gx: 0,
        });
        generator
    }

    fn push(&mut self, elem: QueueElement) {
        let idx = self.elements.len();
        self.agenda.push(Reverse((elem.fx(), idx)));
        self.elements.push(elem);
    }

    /// Relink the lattice's `next`/`prev` chain to the next solution and
    /// return its cost, or `None` once every solution has been produced.
    pub fn next(&mut self, lattice: &mut Lattice) -> Option<i32> {
        while let Some(Reverse((fx, idx))) = self.agenda.pop() {
            let top = self.elements[idx];

            if lattice.node(top.rnode).is_bos() {
                self.relink(lattice, idx);
                debug!(cost = fx, "solution found");
                return Some(fx);
            }

            let rnode = lattice.node(top.rnode);
            let rnode_wcost = rnode.wcost;
            let mut cur = rnode.lpath;
            let mut expanded = Vec::new();
            while let Some(pid) = cur {
                let path = lattice.path(pid);
                expanded.push(QueueElement {
                    rnode: path.lnode,
                    link_cost: path.cost,
                    next_elem: Some(idx),
                    hx: lattice.node(path.lnode).accum_cost,
                    gx: path.cost.saturating_add(rnode_wcost).saturating_add(top.gx),
                });
                cur = path.lnext;
            }
            for elem in expanded {
                self.push(elem);
            }
        }
        None
    }

    fn relink(&self, lattice: &mut Lattice, from: usize) {
        let mut elem = self.elements[from];
        let mut acost = elem.link_cost;
        while let Some(next_idx) = elem.next_elem {
            let next = self.elements[next_idx];
            lattice.node_mut(elem.rnode).next = Some(next.rnode);
            let node = lattice.node_mut(next.rnode);
            node.prev = Some(elem.rnode);
            acost = acost.saturating_add(node.wcost);
            node.accum_cost2 = acost;
            acost = acost.saturating_add(next.link_cost);
            elem = next;
        }
    }
}
