use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::substruct::has_substruct_match_with;

/// AST node for a SMARTS atom query expression.
///
/// Each variant represents a primitive test or a logical combination of tests.
/// During substructure search, [`AtomExpr::matches`] evaluates the expression
/// tree against a target atom.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    /// Matches any atom (wildcard `*`).
    True,
    /// Matches by element. `aromatic` is `None` for `#n` (either), `Some(true)`
    /// for lowercase (`c`), `Some(false)` for uppercase (`C`).
    Element {
        atomic_num: u8,
        aromatic: Option<bool>,
    },
    /// Matches any aromatic atom (`a`).
    Aromatic,
    /// Matches any aliphatic atom (`A`).
    Aliphatic,
    Isotope(u16),
    /// Number of explicit neighbors in the graph (`D`).
    Degree(u8),
    /// Sum of bond orders plus hydrogens (`v`).
    Valence(u8),
    /// Neighbors plus hydrogens (`X`).
    Connectivity(u8),
    /// Total hydrogen count, including explicit H neighbors (`H`).
    TotalHCount(u8),
    /// Suppressed hydrogen count only (`h`).
    ImplicitHCount(u8),
    /// Number of SSSR rings containing the atom (`Rn`).
    RingMembership(u8),
    /// Size of the smallest SSSR ring containing the atom (`rn`).
    SmallestRingSize(u8),
    /// Number of ring bonds on the atom (`x`).
    RingBondCount(u8),
    Charge(i8),
    /// `R` or `r` with no count.
    InRing,
    /// `R0`.
    NotInRing,
    /// A recursive sub-query (`$(...)`) rooted at its first atom.
    Recursive(Box<Mol<AtomExpr, BondExpr>>),
    /// Atom map class (`:n`). Always matches; reactions use it for mapping.
    AtomMapClass(u16),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
    Not(Box<AtomExpr>),
}

/// AST node for a SMARTS bond query expression.
///
/// Implicit bonds in SMARTS default to [`BondExpr::SingleOrAromatic`], unlike
/// SMILES where implicit bonds are always single.
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// Matches any bond (`~`).
    True,
    /// Non-aromatic single bond (`-`).
    Single,
    /// Non-aromatic double bond (`=`).
    Double,
    Triple,
    /// Aromatic bond (`:`).
    Aromatic,
    /// Ring bond (`@`).
    Ring,
    SingleOrAromatic,
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
    Not(Box<BondExpr>),
}

/// Target-side data shared by every atom and bond test of one search.
pub struct MatchContext<'a> {
    pub mol: &'a Mol<Atom, Bond>,
    pub ring_info: &'a RingInfo,
}

impl<'a> MatchContext<'a> {
    pub fn new(mol: &'a Mol<Atom, Bond>, ring_info: &'a RingInfo) -> Self {
        Self { mol, ring_info }
    }

    fn explicit_h_count(&self, idx: NodeIndex) -> u8 {
        self.mol
            .neighbors(idx)
            .filter(|&nb| self.mol.atom(nb).atomic_num == 1)
            .count() as u8
    }

    fn bond_order_sum(&self, idx: NodeIndex) -> u8 {
        self.mol
            .bonds_of(idx)
            .map(|(e, _)| self.mol.bond(e).order.valence_contribution())
            .sum()
    }

    fn ring_bond_count(&self, idx: NodeIndex) -> u8 {
        self.mol
            .neighbors(idx)
            .filter(|&nb| self.ring_info.is_ring_bond(self.mol, idx, nb))
            .count() as u8
    }
}

impl AtomExpr {
    pub fn matches(&self, ctx: &MatchContext, idx: NodeIndex) -> bool {
        let atom = ctx.mol.atom(idx);
        match self {
            AtomExpr::True | AtomExpr::AtomMapClass(_) => true,
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => atom.atomic_num == *atomic_num && aromatic.map_or(true, |a| atom.is_aromatic == a),
            AtomExpr::Aromatic => atom.is_aromatic,
            AtomExpr::Aliphatic => !atom.is_aromatic,
            AtomExpr::Isotope(iso) => atom.isotope == *iso,
            AtomExpr::Degree(d) => ctx.mol.degree(idx) as u8 == *d,
            AtomExpr::Valence(v) => ctx.bond_order_sum(idx) + atom.hydrogen_count == *v,
            AtomExpr::Connectivity(x) => ctx.mol.degree(idx) as u8 + atom.hydrogen_count == *x,
            AtomExpr::TotalHCount(h) => atom.hydrogen_count + ctx.explicit_h_count(idx) == *h,
            AtomExpr::ImplicitHCount(h) => atom.hydrogen_count == *h,
            AtomExpr::RingMembership(n) => ctx.ring_info.atom_ring_count(idx) == *n,
            AtomExpr::SmallestRingSize(r) => {
                ctx.ring_info.smallest_ring_size(idx).unwrap_or(0) == usize::from(*r)
            }
            AtomExpr::RingBondCount(x) => ctx.ring_bond_count(idx) == *x,
            AtomExpr::Charge(c) => atom.formal_charge == *c,
            AtomExpr::InRing => ctx.ring_info.is_ring_atom(idx),
            AtomExpr::NotInRing => !ctx.ring_info.is_ring_atom(idx),
            AtomExpr::Recursive(inner) => matches_rooted(inner, ctx, idx),
            AtomExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, idx)),
            AtomExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, idx)),
            AtomExpr::Not(expr) => !expr.matches(ctx, idx),
        }
    }

    /// Top-level conjuncts: the expression itself unless it is an `And`.
    fn conjuncts(&self) -> &[AtomExpr] {
        match self {
            AtomExpr::And(parts) => parts,
            other => std::slice::from_ref(other),
        }
    }

    pub fn map_class(&self) -> Option<u16> {
        self.conjuncts().iter().find_map(|e| match e {
            AtomExpr::AtomMapClass(n) => Some(*n),
            _ => None,
        })
    }

    /// The element this expression pins down, with its aromaticity when
    /// stated. `None` for wildcards and alternatives such as `[c,n]`.
    pub fn element(&self) -> Option<(u8, Option<bool>)> {
        let mut found = None;
        for part in self.conjuncts() {
            if let AtomExpr::Element {
                atomic_num,
                aromatic,
            } = part
            {
                if found.is_some() {
                    return None;
                }
                found = Some((*atomic_num, *aromatic));
            }
        }
        found
    }

    pub fn stated_charge(&self) -> Option<i8> {
        self.conjuncts().iter().find_map(|e| match e {
            AtomExpr::Charge(c) => Some(*c),
            _ => None,
        })
    }

    pub fn stated_hydrogens(&self) -> Option<u8> {
        self.conjuncts().iter().find_map(|e| match e {
            AtomExpr::TotalHCount(h) | AtomExpr::ImplicitHCount(h) => Some(*h),
            _ => None,
        })
    }

    pub fn stated_isotope(&self) -> Option<u16> {
        self.conjuncts().iter().find_map(|e| match e {
            AtomExpr::Isotope(i) => Some(*i),
            _ => None,
        })
    }
}

impl BondExpr {
    pub fn matches(&self, ctx: &MatchContext, edge: EdgeIndex) -> bool {
        let bond = ctx.mol.bond(edge);
        match self {
            BondExpr::True => true,
            BondExpr::Single => bond.order == BondOrder::Single && !bond.is_aromatic,
            BondExpr::Double => bond.order == BondOrder::Double && !bond.is_aromatic,
            BondExpr::Triple => bond.order == BondOrder::Triple,
            BondExpr::Aromatic => bond.is_aromatic,
            BondExpr::Ring => ctx
                .mol
                .bond_endpoints(edge)
                .is_some_and(|(a, b)| ctx.ring_info.is_ring_bond(ctx.mol, a, b)),
            BondExpr::SingleOrAromatic => bond.is_aromatic || bond.order == BondOrder::Single,
            BondExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, edge)),
            BondExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, edge)),
            BondExpr::Not(expr) => !expr.matches(ctx, edge),
        }
    }
}

/// Whether `query` embeds in the target with its first atom on `root`.
fn matches_rooted(query: &Mol<AtomExpr, BondExpr>, ctx: &MatchContext, root: NodeIndex) -> bool {
    let first = NodeIndex::new(0);
    has_substruct_match_with(
        ctx.mol,
        query,
        |t, q| (q != first || t == root) && query.atom(q).matches(ctx, t),
        |te, qe| query.bond(qe).matches(ctx, te),
    )
}
