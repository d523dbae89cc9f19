pub(crate) mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use crate::aromaticity;
use crate::atom::Atom;
use crate::bond::{Bond, SmilesBond};
use crate::hydrogen;
use crate::kekulize::{self, KekulizeError};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::valence::check_valence;
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles};

/// Parse SMILES into a graph that still carries the bond orders as written.
///
/// An empty (or all-whitespace) string is the empty molecule.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, SmilesBond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(Mol::new());
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}

/// Fold plain explicit hydrogens, kekulize, then perceive aromaticity from
/// scratch.
pub fn sanitize(mol: &Mol<Atom, SmilesBond>) -> Result<Mol<Atom, Bond>, KekulizeError> {
    let mut out = kekulize::kekulize(&hydrogen::remove_hs(mol))?;
    aromaticity::perceive(&mut out);
    Ok(out)
}

/// Parse and sanitize, rejecting molecules that cannot exist: lowercase
/// atoms outside rings and uncharged atoms over their maximum valence.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let parsed = parse_smiles(s)?;
    check_aromatic_atoms_in_rings(&parsed)?;
    let mol = sanitize(&parsed)?;
    check_valence(&mol)?;
    Ok(mol)
}

fn check_aromatic_atoms_in_rings(mol: &Mol<Atom, SmilesBond>) -> Result<(), SmilesError> {
    if !mol.atoms().any(|idx| mol.atom(idx).is_aromatic) {
        return Ok(());
    }
    let rings = RingInfo::sssr(mol);
    match mol.atoms().find(|&idx| mol.atom(idx).is_aromatic && !rings.is_ring_atom(idx)) {
        Some(idx) => Err(SmilesError::NonRingAromatic { atom: idx.index() }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{BondOrder, SmilesBondOrder};
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn atom(mol: &Mol<Atom, SmilesBond>, i: usize) -> &Atom {
        mol.atom(n(i))
    }

    // ---- Simple molecules ----

    #[test]
    fn methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).atomic_num, 6);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn ethene() {
        let mol = parse_smiles("C=C").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 2);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, SmilesBondOrder::Double);
    }

    #[test]
    fn halides_take_one_hydrogen() {
        for (smi, num) in [("F", 9), ("Cl", 17), ("Br", 35), ("I", 53)] {
            let mol = parse_smiles(smi).unwrap();
            assert_eq!(atom(&mol, 0).atomic_num, num, "{smi}");
            assert_eq!(atom(&mol, 0).hydrogen_count, 1, "{smi}");
        }
    }

    #[test]
    fn guanidine_base() {
        // BTMG: the amidine carbon and the tert-butyl centre carry no H.
        let mol = parse_smiles("CN(C)C(=NC(C)(C)C)N(C)C").unwrap();
        assert_eq!(mol.atom_count(), 12);
        assert_eq!(atom(&mol, 3).hydrogen_count, 0);
        assert_eq!(atom(&mol, 5).hydrogen_count, 0);
        assert_eq!(mol.degree(n(5)), 4);
        assert_eq!(atom(&mol, 6).hydrogen_count, 3);
        assert_eq!(atom(&mol, 4).hydrogen_count, 0);
    }

    #[test]
    fn multi_digit_ring() {
        let mol = parse_smiles("C%10CC%10").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 3);
    }

    // ---- Bracket atoms ----

    #[test]
    fn ammonium() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn bracket_without_h_has_none() {
        let mol = parse_smiles("[C]").unwrap();
        assert_eq!(atom(&mol, 0).hydrogen_count, 0);
        let mol = parse_smiles("[Pd]").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 46);
    }

    #[test]
    fn isotopes() {
        assert_eq!(atom(&parse_smiles("[13C]").unwrap(), 0).isotope, 13);
        let d = parse_smiles("[2H]").unwrap();
        assert_eq!(atom(&d, 0).isotope, 2);
        assert_eq!(atom(&d, 0).atomic_num, 1);
    }

    #[test]
    fn stereo_marks_are_dropped() {
        let a = from_smiles("N[C@@H](C)C(=O)O").unwrap();
        let b = from_smiles("NC(C)C(=O)O").unwrap();
        assert_eq!(to_canonical_smiles(&a), to_canonical_smiles(&b));
        let a = from_smiles("F/C=C/F").unwrap();
        let b = from_smiles("F\\C=C/F").unwrap();
        assert_eq!(to_canonical_smiles(&a), to_canonical_smiles(&b));
    }

    // ---- Aromatic input ----

    #[test]
    fn pyridine_ring_bonds_stay_aromatic_until_sanitized() {
        let mol = parse_smiles("c1ccncc1").unwrap();
        let hydrogens: Vec<u8> = (0..6).map(|i| atom(&mol, i).hydrogen_count).collect();
        assert_eq!(hydrogens, [1, 1, 1, 0, 1, 1]);
        assert!((0..6).all(|i| atom(&mol, i).is_aromatic));
        assert!(mol
            .bonds()
            .all(|e| mol.bond(e).order == SmilesBondOrder::Aromatic));
    }

    #[test]
    fn pyrrole_nh_is_explicit() {
        let mol = parse_smiles("c1cc[nH]c1").unwrap();
        assert_eq!(atom(&mol, 3).hydrogen_count, 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
    }

    #[test]
    fn sanitize_kekulizes_and_flags() {
        let mol = from_smiles("c1ccncc1").unwrap();
        let doubles = mol
            .bonds()
            .filter(|&e| mol.bond(e).order == BondOrder::Double)
            .count();
        assert_eq!(doubles, 3);
        assert!(mol.bonds().all(|e| mol.bond(e).is_aromatic));
    }

    #[test]
    fn any_bond_adds_no_valence() {
        let mol = parse_smiles("[Pd]~N").unwrap();
        assert_eq!(atom(&mol, 1).hydrogen_count, 3);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, SmilesBondOrder::Any);
    }

    #[test]
    fn disconnected_fragments() {
        let mol = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    // ---- Empty and invalid input ----

    #[test]
    fn empty_string_is_empty_molecule() {
        assert!(parse_smiles("").unwrap().is_empty());
        assert!(parse_smiles("   ").unwrap().is_empty());
        assert_eq!(to_canonical_smiles(&from_smiles("").unwrap()), "");
    }

    #[test]
    fn malformed_input() {
        for smi in ["C(C", "C)C", "C1CC", "X", "[C", "C=", "[Xx]", "c1cccc1"] {
            assert!(from_smiles(smi).is_err(), "{smi}");
        }
    }

    #[test]
    fn unkekulizable_is_reported() {
        assert!(matches!(
            from_smiles("c1cccc1"),
            Err(SmilesError::Kekulize(_))
        ));
    }

    #[test]
    fn impossible_valences_are_rejected() {
        for smi in ["C(C)(C)(C)(C)C", "FC(F)(F)(F)F", "O(C)(C)C", "Cl(C)C"] {
            assert!(matches!(from_smiles(smi), Err(SmilesError::Valence(_))), "{smi}");
        }
        assert!(from_smiles("[NH4+]").is_ok());
    }

    #[test]
    fn aromatic_atoms_need_a_ring() {
        assert_eq!(from_smiles("cc").unwrap_err(), SmilesError::NonRingAromatic { atom: 0 });
        assert!(matches!(
            from_smiles("c1ccccc1-c"),
            Err(SmilesError::NonRingAromatic { atom: 6 })
        ));
    }

    #[test]
    fn explicit_hydrogens_fold_away() {
        let mol = from_smiles("[H]C([H])([H])O").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(to_canonical_smiles(&mol), to_canonical_smiles(&from_smiles("CO").unwrap()));
        assert_eq!(from_smiles("[2H]C").unwrap().atom_count(), 2);
    }
}
