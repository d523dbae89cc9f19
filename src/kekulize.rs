//! Kekulization assigns alternating single and double bonds to aromatic ring systems.
//!
//! The input is a `Mol<Atom, SmilesBond>` whose aromatic bonds come from
//! lowercase SMILES atoms or from a reaction product that inherited aromatic
//! bonds. The output is a `Mol<Atom, Bond>` with concrete orders. Each
//! aromatic component is solved as a perfect matching over the atoms that
//! still need a double bond.
//!
//! If no valid assignment exists (e.g., an odd-membered ring with the
//! wrong electron count), [`kekulize`] returns a [`KekulizeError`].

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
use crate::mol::Mol;
use crate::smiles::builder::smiles_bond_valence;

/// Error returned when no valid Kekulé structure exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KekulizeError {
    /// The given atoms (by index) could not be assigned a double bond.
    #[error("cannot kekulize aromatic system: unmatched atoms {0:?}")]
    Unkekulizable(Vec<usize>),
}

/// Convert a molecule with aromatic bonds into one with explicit Kekulé bonds.
///
/// Aromatic bonds become `Single` or `Double` such that every atom that
/// needs a double bond receives exactly one. Other bonds keep their order;
/// implicit bonds become single. Aromatic flags are left for
/// [`crate::aromaticity::perceive`] to set.
pub fn kekulize(mol: &Mol<Atom, SmilesBond>) -> Result<Mol<Atom, Bond>, KekulizeError> {
    let n = mol.atom_count();
    let mut aromatic_adj: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
    for e in mol.bonds() {
        if mol.bond(e).order != SmilesBondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(e) {
            aromatic_adj[a.index()].push((b, e));
            aromatic_adj[b.index()].push((a, e));
        }
    }

    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|v| !aromatic_adj[v.index()].is_empty() && needs_double_bond(mol, v))
        .collect();

    let mut solver = Matcher {
        adj: &aromatic_adj,
        needs_double: &needs_double,
        partner: vec![None; n],
    };
    let pending: Vec<NodeIndex> = mol.atoms().filter(|v| needs_double[v.index()]).collect();
    if !solver.solve(&pending) {
        let unmatched = solver.greedy_leftovers(&pending);
        return Err(KekulizeError::Unkekulizable(unmatched));
    }

    let doubled: Vec<EdgeIndex> = solver.partner.iter().flatten().map(|&(_, e)| e).collect();
    Ok(mol.map(
        |_, atom| atom.clone(),
        |e, bond| {
            let order = match bond.order {
                SmilesBondOrder::Aromatic if doubled.contains(&e) => BondOrder::Double,
                SmilesBondOrder::Aromatic | SmilesBondOrder::Single | SmilesBondOrder::Implicit => {
                    BondOrder::Single
                }
                SmilesBondOrder::Double => BondOrder::Double,
                SmilesBondOrder::Triple => BondOrder::Triple,
                SmilesBondOrder::Any => BondOrder::Any,
            };
            Bond::new(order)
        },
    ))
}

/// An aromatic atom needs a double bond when its valence, adjusted for
/// charge, is one short of full. A bare charged atom two short (e.g.
/// `[n+]` with no hydrogen and two ring bonds) also takes one.
fn needs_double_bond(mol: &Mol<Atom, SmilesBond>, v: NodeIndex) -> bool {
    let atom = mol.atom(v);
    let Some(element) = atom.element() else {
        return false;
    };
    let used: u8 = mol
        .bonds_of(v)
        .map(|(e, _)| smiles_bond_valence(mol.bond(e).order))
        .sum::<u8>()
        + atom.hydrogen_count;

    let charge = i16::from(atom.formal_charge);
    let target = element
        .default_valences()
        .iter()
        .map(|&val| i16::from(val) + charge)
        .filter(|&val| val > 0)
        .find(|&val| val >= i16::from(used));

    match target.map(|t| t - i16::from(used)) {
        Some(1) => true,
        Some(2) => atom.hydrogen_count == 0 && atom.formal_charge != 0,
        _ => false,
    }
}

struct Matcher<'a> {
    adj: &'a [Vec<(NodeIndex, EdgeIndex)>],
    needs_double: &'a [bool],
    partner: Vec<Option<(NodeIndex, EdgeIndex)>>,
}

impl Matcher<'_> {
    fn free_neighbors(&self, v: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        self.adj[v.index()]
            .iter()
            .copied()
            .filter(|(w, _)| self.needs_double[w.index()] && self.partner[w.index()].is_none())
    }

    /// Backtracking perfect matching, always expanding the most constrained
    /// atom first. Aromatic systems are small and nearly forced, so this
    /// rarely backtracks.
    fn solve(&mut self, atoms: &[NodeIndex]) -> bool {
        let next = atoms
            .iter()
            .copied()
            .filter(|v| self.partner[v.index()].is_none())
            .min_by_key(|&v| (self.free_neighbors(v).count(), v.index()));
        let Some(v) = next else {
            return true;
        };

        let options: Vec<_> = self.free_neighbors(v).collect();
        for (w, e) in options {
            self.partner[v.index()] = Some((w, e));
            self.partner[w.index()] = Some((v, e));
            if self.solve(atoms) {
                return true;
            }
            self.partner[v.index()] = None;
            self.partner[w.index()] = None;
        }
        false
    }

    fn greedy_leftovers(&mut self, atoms: &[NodeIndex]) -> Vec<usize> {
        self.partner.iter_mut().for_each(|p| *p = None);
        for &v in atoms {
            if self.partner[v.index()].is_some() {
                continue;
            }
            let next = self.free_neighbors(v).next();
            if let Some((w, e)) = next {
                self.partner[v.index()] = Some((w, e));
                self.partner[w.index()] = Some((v, e));
            }
        }
        atoms
            .iter()
            .filter(|v| self.partner[v.index()].is_none())
            .map(|v| v.index())
            .collect()
    }
}
