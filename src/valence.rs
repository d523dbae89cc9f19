use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;

/// An uncharged atom with more bonds and hydrogens than its element allows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("atom {atom} ({symbol}): valence {actual} exceeds the maximum of {max}")]
pub struct ValenceError {
    pub atom: usize,
    pub symbol: &'static str,
    pub actual: u8,
    pub max: u8,
}

/// Bond orders plus hydrogens. `~` bonds count for nothing.
pub fn total_valence(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> u8 {
    mol.bonds_of(atom)
        .map(|(e, _)| mol.bond(e).order.valence_contribution())
        .fold(mol.atom(atom).hydrogen_count, u8::saturating_add)
}

/// Reject the first uncharged atom whose valence exceeds its element's
/// largest default valence. Charged atoms and elements without default
/// valences (metals, noble gases) are not checked.
pub fn check_valence(mol: &Mol<Atom, Bond>) -> Result<(), ValenceError> {
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        if atom.formal_charge != 0 {
            continue;
        }
        let Some(element) = atom.element() else {
            continue;
        };
        let Some(&max) = element.default_valences().iter().max() else {
            continue;
        };
        let actual = total_valence(mol, idx);
        if actual > max {
            return Err(ValenceError {
                atom: idx.index(),
                symbol: element.symbol(),
                actual,
                max,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{parse_smiles, sanitize};

    fn check(smiles: &str) -> Result<(), ValenceError> {
        check_valence(&sanitize(&parse_smiles(smiles).unwrap()).unwrap())
    }

    #[test]
    fn ordinary_molecules_pass() {
        for smiles in ["C", "CC", "c1ccccc1", "O", "N", "C=C", "S(F)(F)(F)(F)(F)F", "CCN=P(N(C)C)(N(C)C)N(C)C"] {
            assert!(check(smiles).is_ok(), "{smiles}");
        }
    }

    #[test]
    fn pentavalent_carbon() {
        let err = check("C(C)(C)(C)(C)C").unwrap_err();
        assert_eq!(
            err,
            ValenceError {
                atom: 0,
                symbol: "C",
                actual: 5,
                max: 4
            }
        );
    }

    #[test]
    fn overbonded_heteroatoms() {
        assert_eq!(check("O(C)(C)C").unwrap_err().symbol, "O");
        assert_eq!(check("CCl(C)").unwrap_err().symbol, "Cl");
        assert_eq!(check("[CH5]").unwrap_err().actual, 5);
    }

    #[test]
    fn underfilled_bracket_atoms_pass() {
        assert!(check("[CH2]").is_ok());
        assert!(check("[C]").is_ok());
    }

    #[test]
    fn charged_and_metal_atoms_skipped() {
        assert!(check("[NH4+]").is_ok());
        assert!(check("[Pd]").is_ok());
        assert!(check("C[Pd](C)(C)(C)(C)C").is_ok());
    }

    #[test]
    fn dative_bonds_add_nothing() {
        let mol = sanitize(&parse_smiles("[Pd]~[NH3]").unwrap()).unwrap();
        assert_eq!(total_valence(&mol, NodeIndex::new(1)), 3);
        assert!(check_valence(&mol).is_ok());
    }
}
