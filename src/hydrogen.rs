use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{SmilesBond, SmilesBondOrder};
use crate::mol::Mol;

fn is_plain_hydrogen(atom: &Atom) -> bool {
    atom.atomic_num == 1 && atom.isotope == 0 && atom.formal_charge == 0 && atom.hydrogen_count == 0
}

/// Fold explicit `[H]` atoms into their neighbor's hydrogen count.
///
/// Only a plain hydrogen singly bonded to one heavy atom is folded.
/// `[2H]`, `[H+]`, `[H][H]` and bridging hydrogens stay graph nodes.
pub fn remove_hs(mol: &Mol<Atom, SmilesBond>) -> Mol<Atom, SmilesBond> {
    let node_count = mol.atom_count();
    let mut removable = vec![false; node_count];
    let mut extra_h: Vec<u8> = vec![0; node_count];

    for idx in mol.atoms() {
        if !is_plain_hydrogen(mol.atom(idx)) {
            continue;
        }
        let mut bonds = mol.bonds_of(idx);
        let (Some((edge, parent)), None) = (bonds.next(), bonds.next()) else {
            continue;
        };
        let single = matches!(
            mol.bond(edge).order,
            SmilesBondOrder::Single | SmilesBondOrder::Implicit
        );
        if single && mol.atom(parent).atomic_num != 1 {
            removable[idx.index()] = true;
            extra_h[parent.index()] = extra_h[parent.index()].saturating_add(1);
        }
    }

    let mut result = Mol::new();
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; node_count];
    for idx in mol.atoms() {
        if removable[idx.index()] {
            continue;
        }
        let atom = mol.atom(idx);
        let new_idx = result.add_atom(Atom {
            hydrogen_count: atom.hydrogen_count.saturating_add(extra_h[idx.index()]),
            ..atom.clone()
        });
        index_map[idx.index()] = Some(new_idx);
    }

    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(new_a), Some(new_b)) = (index_map[a.index()], index_map[b.index()]) {
            result.add_bond(new_a, new_b, mol.bond(edge).clone());
        }
    }
    result
}
