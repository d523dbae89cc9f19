//! Backtracking subgraph monomorphism (VF2 style).
//!
//! Atom and bond compatibility are supplied by the caller as index-based
//! predicates, so the same search runs SMARTS queries against sanitized
//! molecules and plain graphs against each other.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// `(query atom, target atom)` pairs, one per query atom, in query index order.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

pub fn has_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> bool {
    get_substruct_match_with(target, query, atom_match, bond_match).is_some()
}

pub fn get_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Option<AtomMapping> {
    let mut results = Vec::new();
    Vf2::new(target, query, atom_match, bond_match).run(&mut results, true);
    results.pop()
}

/// Every embedding of `query` in `target`. Embeddings that cover the same
/// target atoms in a different arrangement are all reported.
pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Vec<AtomMapping> {
    let mut results = Vec::new();
    Vf2::new(target, query, atom_match, bond_match).run(&mut results, false);
    results
}

/// Keep the first mapping for each distinct set of target atoms.
pub fn uniquify(matches: Vec<AtomMapping>) -> Vec<AtomMapping> {
    let mut seen: Vec<Vec<NodeIndex>> = Vec::new();
    let mut out = Vec::new();
    for mapping in matches {
        let mut atoms: Vec<NodeIndex> = mapping.iter().map(|&(_, t)| t).collect();
        atoms.sort_unstable();
        if !seen.contains(&atoms) {
            seen.push(atoms);
            out.push(mapping);
        }
    }
    out
}

struct Vf2<'a, A1, B1, A2, B2, FA, FB> {
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_match: FA,
    bond_match: FB,
    query_order: Vec<NodeIndex>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
}

impl<'a, A1, B1, A2, B2, FA, FB> Vf2<'a, A1, B1, A2, B2, FA, FB>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    fn new(target: &'a Mol<A1, B1>, query: &'a Mol<A2, B2>, atom_match: FA, bond_match: FB) -> Self {
        Self {
            target,
            query,
            atom_match,
            bond_match,
            query_order: connected_order(query),
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
        }
    }

    fn run(&mut self, results: &mut Vec<AtomMapping>, first_only: bool) {
        if self.query.is_empty() || self.query.atom_count() > self.target.atom_count() {
            return;
        }
        self.recurse(0, results, first_only);
    }

    /// Returns `true` once the search should stop.
    fn recurse(&mut self, depth: usize, results: &mut Vec<AtomMapping>, first_only: bool) -> bool {
        if depth == self.query_order.len() {
            let mapping = self
                .query
                .atoms()
                .filter_map(|q| self.query_map[q.index()].map(|t| (q, t)))
                .collect();
            results.push(mapping);
            return first_only;
        }

        let query_node = self.query_order[depth];
        for target_node in self.candidates(query_node) {
            if self.target_used[target_node.index()] || !self.is_feasible(query_node, target_node) {
                continue;
            }
            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[target_node.index()] = true;

            let stop = self.recurse(depth + 1, results, first_only);

            self.query_map[query_node.index()] = None;
            self.target_used[target_node.index()] = false;
            if stop {
                return true;
            }
        }
        false
    }

    /// Neighbors of an already-mapped query neighbor's image, or every target
    /// atom when the query atom starts a new component.
    fn candidates(&self, query_node: NodeIndex) -> Vec<NodeIndex> {
        let anchor = self
            .query
            .neighbors(query_node)
            .find_map(|qn| self.query_map[qn.index()]);
        match anchor {
            Some(t) => self.target.neighbors(t).collect(),
            None => self.target.atoms().collect(),
        }
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if !(self.atom_match)(target_node, query_node) {
            return false;
        }
        for (q_edge, q_neighbor) in self.query.bonds_of(query_node) {
            let Some(t_mapped) = self.query_map[q_neighbor.index()] else {
                continue;
            };
            match self.target.bond_between(target_node, t_mapped) {
                Some(t_edge) if (self.bond_match)(t_edge, q_edge) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Breadth-first order from the highest-degree atom of each component, so
/// every atom after the first in a component has a mapped neighbor.
fn connected_order<A, B>(query: &Mol<A, B>) -> Vec<NodeIndex> {
    let mut seen = vec![false; query.atom_count()];
    let mut starts: Vec<NodeIndex> = query.atoms().collect();
    starts.sort_by_key(|&v| std::cmp::Reverse(query.degree(v)));

    let mut order = Vec::with_capacity(query.atom_count());
    for start in starts {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut head = order.len();
        order.push(start);
        while head < order.len() {
            let cur = order[head];
            head += 1;
            for nb in query.neighbors(cur) {
                if !seen[nb.index()] {
                    seen[nb.index()] = true;
                    order.push(nb);
                }
            }
        }
    }
    order
}
