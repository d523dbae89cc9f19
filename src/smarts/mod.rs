mod error;
mod parser;
pub mod query;

pub use error::SmartsError;
pub use query::{AtomExpr, BondExpr, MatchContext};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::substruct::{
    get_substruct_match_with, get_substruct_matches_with, uniquify, AtomMapping,
};

pub fn from_smarts(s: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    parser::parse(s)
}

pub fn has_smarts_match(target: &Mol<Atom, Bond>, query: &Mol<AtomExpr, BondExpr>) -> bool {
    get_smarts_match(target, query).is_some()
}

pub fn get_smarts_match(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Option<AtomMapping> {
    let ring_info = RingInfo::sssr(target);
    let ctx = MatchContext::new(target, &ring_info);
    get_substruct_match_with(
        target,
        query,
        |t, q| query.atom(q).matches(&ctx, t),
        |te, qe| query.bond(qe).matches(&ctx, te),
    )
}

/// Every embedding of `query`, including symmetric duplicates.
pub fn get_smarts_matches(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Vec<AtomMapping> {
    let ring_info = RingInfo::sssr(target);
    get_smarts_matches_in(target, query, &ring_info)
}

/// One embedding per distinct set of matched target atoms.
pub fn get_unique_smarts_matches(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Vec<AtomMapping> {
    uniquify(get_smarts_matches(target, query))
}

pub(crate) fn get_smarts_matches_in(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
    ring_info: &RingInfo,
) -> Vec<AtomMapping> {
    let ctx = MatchContext::new(target, ring_info);
    get_substruct_matches_with(
        target,
        query,
        |t, q| query.atom(q).matches(&ctx, t),
        |te, qe| query.bond(qe).matches(&ctx, te),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn count(target: &str, pattern: &str) -> usize {
        let mol = from_smiles(target).unwrap();
        let query = from_smarts(pattern).unwrap();
        get_unique_smarts_matches(&mol, &query).len()
    }

    fn hit(target: &str, pattern: &str) -> bool {
        let mol = from_smiles(target).unwrap();
        has_smarts_match(&mol, &from_smarts(pattern).unwrap())
    }

    #[test]
    fn aromatic_vs_aliphatic() {
        assert!(hit("c1ccccc1", "c"));
        assert!(!hit("c1ccccc1", "C"));
        assert!(hit("C1=CC=CC=C1", "c:c"));
        assert!(hit("CCO", "[#8]"));
        assert_eq!(count("c1ccccc1C", "a"), 6);
        assert_eq!(count("c1ccccc1C", "A"), 1);
    }

    #[test]
    fn aryl_halide_side_of_coupling_template() {
        let pattern = "[F,Cl,Br,I]-[c;H0;D3;+0:1](:[c,n:2]):[c,n:3]";
        assert_eq!(count("Brc1ccccc1", pattern), 1);
        assert_eq!(count("Clc1ccccn1", pattern), 1);
        assert_eq!(count("Ic1ccc(Br)cc1", pattern), 2);
        assert_eq!(count("BrCC", pattern), 0);
        assert_eq!(count("c1ccccc1", pattern), 0);
    }

    #[test]
    fn amine_side_of_coupling_template() {
        let pattern = "[NH2;D1;+0:4]-[c:5]";
        assert_eq!(count("Cc1ccc(N)cc1", pattern), 1);
        assert_eq!(count("CN", pattern), 0);
        assert_eq!(count("CNc1ccccc1", pattern), 0);
        assert_eq!(count("[NH3+]c1ccccc1", pattern), 0);
    }

    #[test]
    fn recursive_environment() {
        // Carbon attached to a hydroxyl.
        assert!(hit("CCO", "[$(CO)]"));
        assert_eq!(count("CCO", "[C;$(C[OH])]"), 1);
        assert_eq!(count("CCC", "[$(CO)]"), 0);
    }

    #[test]
    fn ring_bond_queries() {
        assert_eq!(count("c1ccccc1-c1ccccc1", "c!@c"), 1);
        assert_eq!(count("c1ccccc1-c1ccccc1", "c@c"), 12);
    }

    #[test]
    fn all_vs_unique_matches() {
        let mol = from_smiles("c1ccccc1").unwrap();
        let query = from_smarts("cc").unwrap();
        assert_eq!(get_smarts_matches(&mol, &query).len(), 12);
        assert_eq!(get_unique_smarts_matches(&mol, &query).len(), 6);
    }
}
