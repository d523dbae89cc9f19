//! Canonical atom ranking.
//!
//! Atoms start in classes of equal local invariants. Classes are refined
//! from their neighbors' classes until stable, and remaining ties are broken
//! one atom at a time. Each tied candidate is tried, and the candidate whose
//! refined ranking gives the smallest labelled-graph trace wins. Nothing in
//! the result depends on the input atom order.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct AtomInvariant {
    atomic_num: u8,
    isotope: u16,
    degree: usize,
    hydrogen_count: u8,
    formal_charge: i8,
    is_aromatic: bool,
    bond_codes: Vec<u8>,
}

fn atom_invariant(mol: &Mol<Atom, Bond>, v: NodeIndex) -> AtomInvariant {
    let atom = mol.atom(v);
    let mut bond_codes: Vec<u8> = mol.bonds_of(v).map(|(e, _)| bond_code(mol.bond(e))).collect();
    bond_codes.sort_unstable();
    AtomInvariant {
        atomic_num: atom.atomic_num,
        isotope: atom.isotope,
        degree: bond_codes.len(),
        hydrogen_count: atom.hydrogen_count,
        formal_charge: atom.formal_charge,
        is_aromatic: atom.is_aromatic,
        bond_codes,
    }
}

fn bond_code(bond: &Bond) -> u8 {
    if bond.is_aromatic {
        return 4;
    }
    match bond.order {
        BondOrder::Any => 0,
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
    }
}

/// Dense ranks (0, 1, 2, … with ties sharing a rank) ordered by `keys`.
fn dense_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0; keys.len()];
    let mut rank = 0;
    for (pos, &i) in order.iter().enumerate() {
        if pos > 0 && keys[i] != keys[order[pos - 1]] {
            rank += 1;
        }
        ranks[i] = rank;
    }
    ranks
}

fn class_count(ranks: &[usize]) -> usize {
    ranks.iter().max().map_or(0, |m| m + 1)
}

struct Ranker<'a> {
    mol: &'a Mol<Atom, Bond>,
    invariants: Vec<AtomInvariant>,
    /// Neighbor index and bond code, per atom.
    adjacency: Vec<Vec<(usize, u8)>>,
}

impl<'a> Ranker<'a> {
    fn new(mol: &'a Mol<Atom, Bond>) -> Self {
        let invariants = mol.atoms().map(|v| atom_invariant(mol, v)).collect();
        let adjacency = mol
            .atoms()
            .map(|v| {
                mol.bonds_of(v)
                    .map(|(e, w)| (w.index(), bond_code(mol.bond(e))))
                    .collect()
            })
            .collect();
        Self {
            mol,
            invariants,
            adjacency,
        }
    }

    fn neighbor_signature(&self, ranks: &[usize], i: usize) -> Vec<(usize, u8)> {
        let mut sig: Vec<(usize, u8)> = self.adjacency[i]
            .iter()
            .map(|&(j, code)| (ranks[j], code))
            .collect();
        sig.sort_unstable();
        sig
    }

    /// Split classes by their neighbors' classes until nothing changes.
    /// Existing class order is preserved, so refinement only ever splits.
    fn refine(&self, ranks: &mut Vec<usize>) {
        loop {
            let before = class_count(ranks);
            let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..ranks.len())
                .map(|i| (ranks[i], self.neighbor_signature(ranks, i)))
                .collect();
            *ranks = dense_ranks(&keys);
            if class_count(ranks) == before {
                return;
            }
        }
    }

    /// Numbering-independent description of the graph under `ranks`.
    fn trace(&self, ranks: &[usize]) -> Vec<(usize, &AtomInvariant, Vec<(usize, u8)>)> {
        let mut rows: Vec<_> = (0..ranks.len())
            .map(|i| (ranks[i], &self.invariants[i], self.neighbor_signature(ranks, i)))
            .collect();
        rows.sort();
        rows
    }

    fn break_ties(&self, ranks: &mut Vec<usize>) {
        let n = ranks.len();
        while class_count(ranks) < n {
            let Some(tied) = lowest_tied_rank(ranks) else {
                return;
            };
            let members: Vec<usize> = (0..n).filter(|&i| ranks[i] == tied).collect();

            let mut best: Option<Vec<usize>> = None;
            for &candidate in &members {
                let keys: Vec<(usize, bool)> = (0..n)
                    .map(|i| (ranks[i], ranks[i] == tied && i != candidate))
                    .collect();
                let mut trial = dense_ranks(&keys);
                self.refine(&mut trial);
                let better = match &best {
                    None => true,
                    Some(current) => self.trace(&trial) < self.trace(current),
                };
                if better {
                    best = Some(trial);
                }
            }
            if let Some(next) = best {
                *ranks = next;
            }
        }
    }
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut counts = vec![0usize; class_count(ranks)];
    for &r in ranks {
        counts[r] += 1;
    }
    counts.iter().position(|&c| c > 1)
}

/// A rank in `0..atom_count` for every atom, unique per atom.
///
/// Symmetry-equivalent atoms end up ranked in an arbitrary but
/// reproducible order; any choice among them writes the same SMILES.
pub fn canonical_ranks(mol: &Mol<Atom, Bond>) -> Vec<usize> {
    if mol.is_empty() {
        return Vec::new();
    }
    let ranker = Ranker::new(mol);
    let mut ranks = dense_ranks(&ranker.invariants);
    ranker.refine(&mut ranks);
    ranker.break_ties(&mut ranks);
    debug_assert_eq!(class_count(&ranks), ranker.mol.atom_count());
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn is_permutation(ranks: &[usize]) -> bool {
        let mut sorted = ranks.to_vec();
        sorted.sort_unstable();
        sorted == (0..ranks.len()).collect::<Vec<_>>()
    }

    #[test]
    fn empty_mol() {
        let mol = Mol::<Atom, Bond>::new();
        assert!(canonical_ranks(&mol).is_empty());
    }

    #[test]
    fn dense_ranks_share_ties() {
        assert_eq!(dense_ranks(&[5, 1, 5, 3]), vec![2, 0, 2, 1]);
    }

    #[test]
    fn distinct_atoms_are_ranked_by_invariant() {
        let mol = from_smiles("OCC").unwrap();
        let ranks = canonical_ranks(&mol);
        assert!(is_permutation(&ranks));
        // Carbon sorts before oxygen; the terminal methyl before the CH2.
        assert_eq!(ranks[2], 0);
        assert_eq!(ranks[1], 1);
        assert_eq!(ranks[0], 2);
    }

    #[test]
    fn symmetric_molecules_get_total_orders() {
        for smi in ["c1ccccc1", "C1CCCCC1", "C12C3C4C1C5C2C3C45", "c1ccc2ccccc2c1", "CC(C)(C)C"] {
            let mol = from_smiles(smi).unwrap();
            assert!(is_permutation(&canonical_ranks(&mol)), "{smi}");
        }
    }

    #[test]
    fn ranks_follow_atoms_under_reordering() {
        let a = from_smiles("Nc1ccc(Cl)cc1").unwrap();
        let b = from_smiles("Clc1ccc(N)cc1").unwrap();
        let rank_of = |mol: &Mol<Atom, Bond>, num: u8| {
            let ranks = canonical_ranks(mol);
            mol.atoms()
                .find(|&v| mol.atom(v).atomic_num == num)
                .map(|v| ranks[v.index()])
        };
        assert_eq!(rank_of(&a, 7), rank_of(&b, 7));
        assert_eq!(rank_of(&a, 17), rank_of(&b, 17));
    }
}
