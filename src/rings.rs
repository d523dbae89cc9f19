//! Smallest set of smallest rings.
//!
//! Candidates are Horton cycles: for every bond `(u, v)` and pivot atom `w`,
//! the shortest paths `w → u` and `w → v` closed by the bond. Sorted by size,
//! they are added greedily while they stay linearly independent over GF(2)
//! in the space of bond sets.

use std::collections::VecDeque;

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;

use crate::mol::Mol;

#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
    atom_membership: Vec<u8>,
    bond_membership: Vec<u8>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let mut info = Self {
            rings: Vec::new(),
            atom_membership: vec![0; mol.atom_count()],
            bond_membership: vec![0; mol.bond_count()],
        };
        let wanted = Self::cyclomatic_number(mol);
        if wanted == 0 {
            return info;
        }

        let mut basis = Gf2Basis::default();
        for ring in horton_candidates(mol) {
            if info.rings.len() == wanted {
                break;
            }
            let Some(edges) = EdgeSet::of_ring(mol, &ring) else {
                continue;
            };
            if basis.insert(edges) {
                info.rings.push(ring);
            }
        }

        for ring in &info.rings {
            for (i, &a) in ring.iter().enumerate() {
                info.atom_membership[a.index()] += 1;
                let b = ring[(i + 1) % ring.len()];
                if let Some(e) = mol.bond_between(a, b) {
                    info.bond_membership[e.index()] += 1;
                }
            }
        }
        info
    }

    /// Number of independent cycles: `E - V + C`.
    pub fn cyclomatic_number<A, B>(mol: &Mol<A, B>) -> usize {
        let c = connected_components(mol.graph());
        (mol.bond_count() + c).saturating_sub(mol.atom_count())
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.atom_ring_count(atom) > 0
    }

    /// How many SSSR rings contain `atom` (the SMARTS `R<n>` count).
    pub fn atom_ring_count(&self, atom: NodeIndex) -> u8 {
        self.atom_membership.get(atom.index()).copied().unwrap_or(0)
    }

    pub fn is_ring_bond<A, B>(&self, mol: &Mol<A, B>, a: NodeIndex, b: NodeIndex) -> bool {
        mol.bond_between(a, b)
            .and_then(|e| self.bond_membership.get(e.index()))
            .is_some_and(|&n| n > 0)
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .map(Vec::len)
            .min()
    }
}

#[derive(Clone, PartialEq, Eq)]
struct EdgeSet(Vec<u64>);

impl EdgeSet {
    fn of_ring<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> Option<Self> {
        let mut words = vec![0u64; mol.bond_count().div_ceil(64)];
        for (i, &a) in ring.iter().enumerate() {
            let e = mol.bond_between(a, ring[(i + 1) % ring.len()])?;
            words[e.index() / 64] |= 1u64 << (e.index() % 64);
        }
        Some(Self(words))
    }

    fn lowest_bit(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }

    fn has_bit(&self, bit: usize) -> bool {
        self.0[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    fn xor(&mut self, other: &Self) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a ^= *b;
        }
    }
}

/// Row-reduced basis; each row's lowest bit is absent from every later row.
#[derive(Default)]
struct Gf2Basis {
    rows: Vec<(usize, EdgeSet)>,
}

impl Gf2Basis {
    fn insert(&mut self, mut v: EdgeSet) -> bool {
        for (pivot, row) in &self.rows {
            if v.has_bit(*pivot) {
                v.xor(row);
            }
        }
        match v.lowest_bit() {
            Some(pivot) => {
                self.rows.push((pivot, v));
                true
            }
            None => false,
        }
    }
}

fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let trees: Vec<BfsTree> = mol.atoms().map(|w| BfsTree::new(mol, w)).collect();

    let mut candidates = Vec::new();
    for e in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(e) else {
            continue;
        };
        for tree in &trees {
            let (Some(du), Some(dv)) = (tree.dist[u.index()], tree.dist[v.index()]) else {
                continue;
            };
            if du + dv + 1 < 3 {
                continue;
            }
            let to_u = tree.path_to(u);
            let to_v = tree.path_to(v);
            if to_u[1..].iter().any(|x| to_v[1..].contains(x)) {
                continue;
            }
            let mut ring = to_u;
            ring.extend(to_v[1..].iter().rev());
            candidates.push(normalize(ring));
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

struct BfsTree {
    dist: Vec<Option<u32>>,
    parent: Vec<Option<NodeIndex>>,
}

impl BfsTree {
    fn new<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut tree = Self {
            dist: vec![None; n],
            parent: vec![None; n],
        };
        tree.dist[root.index()] = Some(0);
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            let d = tree.dist[cur.index()].unwrap_or(0);
            let mut next: Vec<NodeIndex> = mol.neighbors(cur).collect();
            next.sort();
            for nb in next {
                if tree.dist[nb.index()].is_none() {
                    tree.dist[nb.index()] = Some(d + 1);
                    tree.parent[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        tree
    }

    /// Path from the root to `target`, root first.
    fn path_to(&self, target: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![target];
        let mut cur = target;
        while let Some(p) = self.parent[cur.index()] {
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }
}

/// Rotate so the smallest index comes first, then orient toward the smaller
/// neighbor, so equal rings compare equal.
fn normalize(ring: Vec<NodeIndex>) -> Vec<NodeIndex> {
    let Some(start) = ring.iter().enumerate().min_by_key(|(_, v)| **v).map(|(i, _)| i) else {
        return ring;
    };
    let mut out: Vec<NodeIndex> = ring[start..].iter().chain(&ring[..start]).copied().collect();
    if out.len() > 2 && out[1] > out[out.len() - 1] {
        out[1..].reverse();
    }
    out
}
