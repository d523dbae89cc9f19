//! Hückel aromaticity perception on a kekulized molecule.
//!
//! Each SSSR ring, and each pair of rings fused through a shared bond, is
//! checked on its own: every atom must be able to donate to the pi system
//! and the donated electrons must total 4n+2. Atoms and bonds of passing
//! rings get their aromatic flags set; everything else is cleared.

use std::collections::BTreeSet;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

/// Recompute aromatic flags on every atom and bond.
pub fn perceive(mol: &mut Mol<Atom, Bond>) {
    let rings = RingInfo::sssr(mol);
    let mut aromatic_atoms = vec![false; mol.atom_count()];
    let mut aromatic_rings: Vec<&[NodeIndex]> = Vec::new();

    let mut passed = vec![false; rings.num_rings()];
    for (i, ring) in rings.rings().iter().enumerate() {
        let atoms: BTreeSet<NodeIndex> = ring.iter().copied().collect();
        if is_huckel(pi_total(mol, &rings, &atoms)) {
            passed[i] = true;
            aromatic_rings.push(ring);
        }
    }

    for (i, a) in rings.rings().iter().enumerate() {
        for (j, b) in rings.rings().iter().enumerate().skip(i + 1) {
            if passed[i] && passed[j] {
                continue;
            }
            if shared_bonds(a, b) == 0 {
                continue;
            }
            let atoms: BTreeSet<NodeIndex> = a.iter().chain(b).copied().collect();
            if is_huckel(pi_total(mol, &rings, &atoms)) {
                if !passed[i] {
                    aromatic_rings.push(a);
                }
                if !passed[j] {
                    aromatic_rings.push(b);
                }
                passed[i] = true;
                passed[j] = true;
            }
        }
    }

    let mut aromatic_bonds = vec![false; mol.bond_count()];
    for ring in &aromatic_rings {
        for (k, &v) in ring.iter().enumerate() {
            aromatic_atoms[v.index()] = true;
            if let Some(e) = mol.bond_between(v, ring[(k + 1) % ring.len()]) {
                aromatic_bonds[e.index()] = true;
            }
        }
    }

    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for v in atoms {
        mol.atom_mut(v).is_aromatic = aromatic_atoms[v.index()];
    }
    let bonds: Vec<_> = mol.bonds().collect();
    for e in bonds {
        mol.bond_mut(e).is_aromatic = aromatic_bonds[e.index()];
    }
}

fn shared_bonds(a: &[NodeIndex], b: &[NodeIndex]) -> usize {
    (0..a.len())
        .filter(|&k| {
            let (x, y) = (a[k], a[(k + 1) % a.len()]);
            (0..b.len()).any(|m| {
                let (p, q) = (b[m], b[(m + 1) % b.len()]);
                (x == p && y == q) || (x == q && y == p)
            })
        })
        .count()
}

/// Sum of pi electrons over `atoms`, or `None` if any atom cannot take part.
fn pi_total(mol: &Mol<Atom, Bond>, rings: &RingInfo, atoms: &BTreeSet<NodeIndex>) -> Option<u8> {
    atoms
        .iter()
        .map(|&v| pi_electrons(mol, rings, v))
        .try_fold(0u8, |acc, e| e.map(|e| acc.saturating_add(e)))
}

fn pi_electrons(mol: &Mol<Atom, Bond>, rings: &RingInfo, v: NodeIndex) -> Option<u8> {
    let atom = mol.atom(v);
    let degree = mol.degree(v) + usize::from(atom.hydrogen_count);
    if degree > 3 {
        return None;
    }

    let mut ring_double = false;
    let mut exocyclic_double: Option<u8> = None;
    for (e, other) in mol.bonds_of(v) {
        match mol.bond(e).order {
            BondOrder::Triple => return None,
            BondOrder::Double if rings.is_ring_bond(mol, v, other) => ring_double = true,
            BondOrder::Double => exocyclic_double = Some(mol.atom(other).atomic_num),
            _ => {}
        }
    }

    if ring_double {
        return Some(1);
    }
    if let Some(partner) = exocyclic_double {
        // C=O, C=N and C=S out of the ring leave an empty p orbital.
        return matches!(partner, 7 | 8 | 16).then_some(0);
    }

    let charge = atom.formal_charge;
    match (atom.atomic_num, charge) {
        (6, -1) => Some(2),
        (6, 1) => Some(0),
        (5, 0) => Some(0),
        (7 | 15 | 33, 0) if degree == 3 => Some(2),
        (7 | 15 | 33, -1) if degree == 2 => Some(2),
        (8 | 16 | 34 | 52, 0) if degree == 2 => Some(2),
        _ => None,
    }
}

fn is_huckel(pi: Option<u8>) -> bool {
    matches!(pi, Some(n) if n >= 2 && (n - 2) % 4 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn aromatic_atoms(s: &str) -> usize {
        let mol = from_smiles(s).unwrap();
        mol.atoms().filter(|&v| mol.atom(v).is_aromatic).count()
    }

    fn aromatic_bonds(s: &str) -> usize {
        let mol = from_smiles(s).unwrap();
        mol.bonds().filter(|&e| mol.bond(e).is_aromatic).count()
    }

    #[test]
    fn kekule_benzene_is_perceived() {
        assert_eq!(aromatic_atoms("C1=CC=CC=C1"), 6);
        assert_eq!(aromatic_bonds("C1=CC=CC=C1"), 6);
    }

    #[test]
    fn heteroaromatics() {
        assert_eq!(aromatic_atoms("c1ccncc1"), 6);
        assert_eq!(aromatic_atoms("c1cc[nH]c1"), 5);
        assert_eq!(aromatic_atoms("c1ccoc1"), 5);
        assert_eq!(aromatic_atoms("c1ccsc1"), 5);
        assert_eq!(aromatic_atoms("Cc1cc(C)on1"), 5);
        assert_eq!(aromatic_atoms("O=c1cccc[nH]1"), 6);
    }

    #[test]
    fn non_aromatic_rings() {
        assert_eq!(aromatic_atoms("C1CCCCC1"), 0);
        assert_eq!(aromatic_atoms("C1=CCC=C1"), 0);
        assert_eq!(aromatic_atoms("C1=CC=CC=CC=C1"), 0);
        assert_eq!(aromatic_atoms("C1=CC=C1"), 0);
    }

    #[test]
    fn fused_systems() {
        assert_eq!(aromatic_atoms("c1ccc2ccccc2c1"), 10);
        assert_eq!(aromatic_bonds("c1ccc2ccccc2c1"), 11);
        assert_eq!(aromatic_atoms("c1ccc2[nH]ccc2c1"), 9);
        assert_eq!(aromatic_atoms("c1ccc2c(c1)Cc1ccccc1-2"), 12);
    }

    #[test]
    fn azulene_needs_the_fused_envelope() {
        assert_eq!(aromatic_atoms("c1cc2cccccc2c1"), 10);
    }

    #[test]
    fn biaryl_link_stays_single() {
        assert_eq!(aromatic_atoms("c1ccccc1-c1ccccc1"), 12);
        assert_eq!(aromatic_bonds("c1ccccc1-c1ccccc1"), 12);
    }

    #[test]
    fn charged_rings() {
        assert_eq!(aromatic_atoms("C[n+]1ccccc1"), 6);
        assert_eq!(aromatic_atoms("[cH-]1cccc1"), 5);
    }
}
