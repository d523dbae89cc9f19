use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{SmilesBond, SmilesBondOrder};
use crate::mol::Mol;
use crate::smiles::parse_tree::ParseTree;
use crate::smiles::tokenizer::BondToken;

pub fn build_mol(tree: &ParseTree) -> Mol<Atom, SmilesBond> {
    let mut mol = Mol::new();
    let nodes: Vec<NodeIndex> = tree
        .atoms
        .iter()
        .map(|tok| {
            mol.add_atom(Atom {
                atomic_num: tok.element.atomic_num(),
                formal_charge: tok.charge,
                isotope: tok.isotope,
                hydrogen_count: tok.hcount.unwrap_or(0),
                is_aromatic: tok.is_aromatic,
            })
        })
        .collect();

    for edge in &tree.edges {
        let order = resolve_bond_order(
            edge.bond,
            tree.atoms[edge.from].is_aromatic,
            tree.atoms[edge.to].is_aromatic,
        );
        mol.add_bond(nodes[edge.from], nodes[edge.to], SmilesBond::new(order));
    }

    for (tok, &node) in tree.atoms.iter().zip(&nodes) {
        if !tok.is_bracket() {
            let h = implicit_hydrogens(&mol, node);
            mol.atom_mut(node).hydrogen_count = h;
        }
    }

    mol
}

fn resolve_bond_order(bond: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> SmilesBondOrder {
    match bond {
        Some(BondToken::Single) => SmilesBondOrder::Single,
        Some(BondToken::Double) => SmilesBondOrder::Double,
        Some(BondToken::Triple) => SmilesBondOrder::Triple,
        Some(BondToken::Aromatic) => SmilesBondOrder::Aromatic,
        Some(BondToken::Any) => SmilesBondOrder::Any,
        None if from_aromatic && to_aromatic => SmilesBondOrder::Aromatic,
        None => SmilesBondOrder::Implicit,
    }
}

/// Hydrogens implied for an organic-subset atom written without brackets:
/// the smallest default valence that covers the explicit bonds, minus one
/// more for an aromatic atom whose pi bond is not yet assigned.
pub(crate) fn implicit_hydrogens(mol: &Mol<Atom, SmilesBond>, node: NodeIndex) -> u8 {
    let atom = mol.atom(node);
    let Some(element) = atom.element() else {
        return 0;
    };
    let bond_sum: u8 = mol
        .bonds_of(node)
        .map(|(e, _)| smiles_bond_valence(mol.bond(e).order))
        .fold(0u8, u8::saturating_add);

    let Some(&target) = element.default_valences().iter().find(|&&v| v >= bond_sum) else {
        return 0;
    };
    let h = target - bond_sum;
    if atom.is_aromatic && h > 0 {
        h - 1
    } else {
        h
    }
}

pub(crate) fn smiles_bond_valence(order: SmilesBondOrder) -> u8 {
    match order {
        SmilesBondOrder::Single | SmilesBondOrder::Implicit | SmilesBondOrder::Aromatic => 1,
        SmilesBondOrder::Double => 2,
        SmilesBondOrder::Triple => 3,
        SmilesBondOrder::Any => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_tree::build_parse_tree;
    use crate::smiles::tokenizer::tokenize;

    fn parse(s: &str) -> Mol<Atom, SmilesBond> {
        build_mol(&build_parse_tree(&tokenize(s).unwrap()).unwrap())
    }

    fn h(mol: &Mol<Atom, SmilesBond>, i: usize) -> u8 {
        mol.atom(NodeIndex::new(i)).hydrogen_count
    }

    #[test]
    fn aliphatic_hydrogens() {
        let mol = parse("CC(=O)O");
        assert_eq!([h(&mol, 0), h(&mol, 1), h(&mol, 2), h(&mol, 3)], [3, 0, 0, 1]);
    }

    #[test]
    fn hypervalent_picks_next_valence() {
        let mol = parse("CS(=O)(=O)C");
        assert_eq!(h(&mol, 1), 0);
        let mol = parse("FP(F)(F)(F)F");
        assert_eq!(h(&mol, 1), 0);
    }

    #[test]
    fn bracket_atoms_keep_explicit_count() {
        let mol = parse("[CH2]C[NH3+]");
        assert_eq!(h(&mol, 0), 2);
        assert_eq!(h(&mol, 2), 3);
    }

    #[test]
    fn aromatic_carbons() {
        let mol = parse("c1ccccc1C");
        for i in 1..6 {
            assert_eq!(h(&mol, i), 1);
        }
        assert_eq!(h(&mol, 0), 0);
        assert_eq!(h(&mol, 6), 3);
    }

    #[test]
    fn pyridine_nitrogen_has_no_h() {
        let mol = parse("c1ccncc1");
        assert_eq!(h(&mol, 3), 0);
    }

    #[test]
    fn implicit_bond_between_aromatic_atoms_is_aromatic() {
        let mol = parse("c1ccccc1-c1ccccc1");
        let aromatic = mol
            .bonds()
            .filter(|&e| mol.bond(e).order == SmilesBondOrder::Aromatic)
            .count();
        assert_eq!(aromatic, 12);
    }

    #[test]
    fn any_bond_adds_no_valence() {
        let mol = parse("[Pd]~N");
        assert_eq!(h(&mol, 1), 3);
    }
}
