//! The search tree: a double-buffered arena of statistics nodes.
//!
//! Nodes live in one of two fixed-capacity arenas and link to their
//! children by arena index (first child + next sibling), so the tree
//! never allocates after startup and fits a bounded memory budget. Only
//! one arena is rooted at a time; the other is the copy target when the
//! subtree under the move actually played is promoted to become the next
//! root, preserving its accumulated statistics across turns.
//!
//! Selection blends the direct win rate with the RAVE (all-moves-as-
//! first) rate; the RAVE weight decays as direct visits accumulate.

use crate::amaf::AmafBoard;
use crate::board::{Color, Point};
use crate::constants::{FIRST_PLAY_URGENCY, RAVE_BIAS};

/// Index of a node within the active arena.
pub type NodeId = usize;

/// Prior pseudo-counts injected when a node is created.
#[derive(Clone, Copy, Debug, Default)]
pub struct Prior {
    pub prior: f64,
    pub equiv: f64,
}

#[derive(Clone, Debug)]
pub struct Node {
    mv: Point,
    visits: f64,
    results: f64,
    rave_visits: f64,
    rave_results: f64,
    prior_visits: f64,
    prior_results: f64,
    child: Option<NodeId>,
    sibling: Option<NodeId>,
}

impl Node {
    fn reset(&mut self) {
        self.mv = 0;
        self.visits = 0.0;
        self.results = 0.0;
        self.rave_visits = 0.0;
        self.rave_results = 0.0;
        self.prior_visits = 0.0;
        self.prior_results = 0.0;
        self.child = None;
        self.sibling = None;
    }

    /// Copy statistics but not links.
    fn copy_values(&mut self, orig: &Node) {
        self.mv = orig.mv;
        self.visits = orig.visits;
        self.results = orig.results;
        self.rave_visits = orig.rave_visits;
        self.rave_results = orig.rave_results;
        self.prior_visits = orig.prior_visits;
        self.prior_results = orig.prior_results;
        self.child = None;
        self.sibling = None;
    }

    fn set_move(&mut self, mv: Point, prior: &Prior) {
        self.mv = mv;
        self.rave_results = prior.prior;
        self.rave_visits = prior.equiv;
        self.prior_results = prior.prior;
        self.prior_visits = prior.equiv;
    }

    pub fn mv(&self) -> Point {
        self.mv
    }

    pub fn visits(&self) -> f64 {
        self.visits
    }

    pub fn results(&self) -> f64 {
        self.results
    }

    pub fn rave_visits(&self) -> f64 {
        self.rave_visits
    }

    pub fn rave_results(&self) -> f64 {
        self.rave_results
    }

    pub fn has_children(&self) -> bool {
        self.child.is_some()
    }

    fn add_result(&mut self, result: i32) {
        self.visits += 1.0;
        self.results += result as f64;
    }

    /// Blended node value. With both statistics present, RAVE dominates
    /// while direct visits are few and fades as they grow; with only one,
    /// that one's mean; with neither, the first-play urgency.
    pub fn value(&self) -> f64 {
        if self.visits > 0.0 {
            if self.rave_visits > 0.0 {
                let beta = self.rave_visits
                    / (self.rave_visits
                        + self.visits
                        + self.rave_visits * self.visits * RAVE_BIAS);
                (1.0 - beta) * self.results / self.visits
                    + beta * self.rave_results / self.rave_visits
            } else {
                self.results / self.visits
            }
        } else if self.rave_visits > 0.0 {
            self.rave_results / self.rave_visits
        } else {
            FIRST_PLAY_URGENCY
        }
    }
}

pub struct Tree {
    arenas: [Vec<Node>; 2],
    len: [usize; 2],
    active: usize,
    capacity: usize,
}

impl Tree {
    /// Two arenas of `capacity` nodes each, rooted in the first.
    pub fn new(capacity: usize) -> Self {
        let blank = Node {
            mv: 0,
            visits: 0.0,
            results: 0.0,
            rave_visits: 0.0,
            rave_results: 0.0,
            prior_visits: 0.0,
            prior_results: 0.0,
            child: None,
            sibling: None,
        };
        Tree {
            arenas: [vec![blank.clone(); capacity], vec![blank; capacity]],
            len: [1, 1],
            active: 0,
            capacity,
        }
    }

    /// Discard everything; both arenas hold a blank root again.
    pub fn clear(&mut self) {
        self.active = 0;
        self.arenas[0][0].reset();
        self.arenas[1][0].reset();
        self.len = [1, 1];
    }

    fn clear_active(&mut self) {
        self.arenas[self.active][0].reset();
        self.len[self.active] = 1;
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// Nodes in use in the active arena.
    pub fn size(&self) -> usize {
        self.len[self.active]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.arenas[self.active][id]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arenas[self.active][id]
    }

    /// Child ids of `id`, in insertion order.
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter {
            arena: &self.arenas[self.active],
            next: self.arenas[self.active][id].child,
        }
    }

    /// Append a new child of `parent` in the active arena. `None` when
    /// the arena is full — the caller degrades, it does not fail.
    pub fn insert(&mut self, parent: NodeId, mv: Point, prior: &Prior) -> Option<NodeId> {
        if self.len[self.active] >= self.capacity {
            log::warn!("tree arena full ({} nodes), not expanding", self.capacity);
            return None;
        }
        let id = self.len[self.active];
        self.len[self.active] += 1;
        self.arenas[self.active][id].reset();
        self.arenas[self.active][id].set_move(mv, prior);
        self.link_child(self.active, parent, id);
        Some(id)
    }

    fn link_child(&mut self, arena: usize, parent: NodeId, child: NodeId) {
        let a = &mut self.arenas[arena];
        match a[parent].child {
            None => a[parent].child = Some(child),
            Some(first) => {
                let mut cursor = first;
                while let Some(next) = a[cursor].sibling {
                    cursor = next;
                }
                a[cursor].sibling = Some(child);
            }
        }
    }

    /// Attach one child per move, seeded with its prior. Returns false if
    /// the arena filled up part-way (the attached part stays usable).
    pub fn expand(&mut self, parent: NodeId, moves: &[Point], priors: &[Prior]) -> bool {
        for &mv in moves {
            if self.insert(parent, mv, &priors[mv]).is_none() {
                return false;
            }
        }
        true
    }

    /// Child of `id` with the highest blended value.
    pub fn select_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best = None;
        let mut best_value = f64::NEG_INFINITY;
        for child in self.children(id) {
            let value = self.node(child).value();
            if value > best_value {
                best_value = value;
                best = Some(child);
            }
        }
        best
    }

    /// Child of `id` with the most combined direct and RAVE visits — the
    /// move to actually play.
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best = None;
        let mut best_visits = 0.0;
        for child in self.children(id) {
            let n = self.node(child);
            let visits = n.visits() + n.rave_visits();
            if visits > best_visits {
                best_visits = visits;
                best = Some(child);
            }
        }
        best
    }

    /// Record one playout result at `id`.
    pub fn add_result(&mut self, id: NodeId, result: i32) {
        self.node_mut(id).add_result(result);
    }

    /// Update the RAVE statistics of every child of `id` from the
    /// simulation's AMAF record at the given ply depth and side.
    pub fn update_amaf(
        &mut self,
        id: NodeId,
        result: i32,
        amaf: &AmafBoard,
        side: Color,
        depth: i32,
    ) {
        let discount = 0.0;
        let arena = &mut self.arenas[self.active];
        let mut cursor = arena[id].child;
        while let Some(child) = cursor {
            let credit = amaf.value(arena[child].mv, depth, side, discount);
            arena[child].rave_results += result as f64 * credit;
            arena[child].rave_visits += credit;
            cursor = arena[child].sibling;
        }
    }

    /// Make the subtree under the root's child playing `mv` the new root,
    /// copying it into the reserve arena and swapping. Statistics survive
    /// intact. An unknown move discards the whole tree.
    pub fn promote(&mut self, mv: Point) {
        let mut cursor = self.arenas[self.active][0].child;
        while let Some(child) = cursor {
            if self.arenas[self.active][child].mv == mv {
                let reserve = 1 - self.active;
                self.len[reserve] = 1;
                self.arenas[reserve][0].reset();
                let root_values = self.arenas[self.active][child].clone();
                self.arenas[reserve][0].copy_values(&root_values);
                self.copy_recursive(child, 0);
                self.clear_active();
                self.active = reserve;
                return;
            }
            cursor = self.arenas[self.active][child].sibling;
        }
        self.clear();
    }

    /// Copy the children of `orig` (active arena) under `parent`
    /// (reserve arena), depth first. Children that do not fit are
    /// dropped; their siblings are still copied.
    fn copy_recursive(&mut self, orig: NodeId, parent: NodeId) {
        let reserve = 1 - self.active;
        let mut cursor = self.arenas[self.active][orig].child;
        while let Some(child) = cursor {
            if self.len[reserve] < self.capacity {
                let id = self.len[reserve];
                self.len[reserve] += 1;
                let values = self.arenas[self.active][child].clone();
                self.arenas[reserve][id].copy_values(&values);
                self.link_child(reserve, parent, id);
                self.copy_recursive(child, id);
            } else {
                log::warn!("tree arena full during promotion, subtree dropped");
            }
            cursor = self.arenas[self.active][child].sibling;
        }
    }
}

/// Iterator over a node's children by arena index.
pub struct ChildIter<'a> {
    arena: &'a [Node],
    next: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.arena[id].sibling;
        Some(id)
    }
}
