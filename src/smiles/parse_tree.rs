use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

/// Atoms in input order plus the edges between them, with ring closures
/// already resolved.
#[derive(Debug, Clone, Default)]
pub struct ParseTree {
    pub atoms: Vec<AtomToken>,
    pub edges: Vec<ParseEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseEdge {
    pub from: usize,
    pub to: usize,
    pub bond: Option<BondToken>,
}

struct OpenRing {
    atom: usize,
    bond: Option<BondToken>,
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut tree = ParseTree::default();
    let mut branches: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending: Option<(BondToken, usize)> = None;
    let mut rings: Vec<Option<OpenRing>> = (0..100).map(|_| None).collect();

    for token in tokens {
        match token {
            Token::Atom(atom) => {
                let idx = tree.atoms.len();
                tree.atoms.push(atom.clone());
                match (current, pending.take()) {
                    (Some(prev), bond) => tree.edges.push(ParseEdge {
                        from: prev,
                        to: idx,
                        bond: bond.map(|(b, _)| b),
                    }),
                    (None, Some((_, pos))) => return Err(SmilesError::DanglingBond { pos }),
                    (None, None) => {}
                }
                current = Some(idx);
            }
            Token::Bond(bond, pos) => {
                if current.is_none() || pending.is_some() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending = Some((*bond, *pos));
            }
            Token::RingClosure { digit, pos } => {
                let here = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let bond = pending.take().map(|(b, _)| b);
                let slot = &mut rings[usize::from(*digit)];
                match slot.take() {
                    None => *slot = Some(OpenRing { atom: here, bond }),
                    Some(open) => {
                        if open.atom == here {
                            return Err(SmilesError::InvalidRingBond {
                                digit: *digit,
                                pos: *pos,
                            });
                        }
                        let bond = match (open.bond, bond) {
                            (Some(a), Some(b)) if a != b => {
                                return Err(SmilesError::RingBondConflict { digit: *digit })
                            }
                            (a, b) => a.or(b),
                        };
                        tree.edges.push(ParseEdge {
                            from: open.atom,
                            to: here,
                            bond,
                        });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let here = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                branches.push((here, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let (anchor, _) = branches
                    .pop()
                    .ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(anchor);
            }
            Token::Dot(pos) => {
                if pending.is_some() || !branches.is_empty() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                current = None;
            }
        }
    }

    if let Some((_, pos)) = pending {
        return Err(SmilesError::DanglingBond { pos });
    }
    if let Some((_, pos)) = branches.pop() {
        return Err(SmilesError::UnmatchedParen { pos });
    }
    if let Some(digit) = rings.iter().position(Option::is_some) {
        return Err(SmilesError::UnclosedRing {
            digit: digit as u16,
        });
    }

    for (i, edge) in tree.edges.iter().enumerate() {
        let dup = tree.edges[..i].iter().any(|e| {
            (e.from == edge.from && e.to == edge.to) || (e.from == edge.to && e.to == edge.from)
        });
        if dup {
            return Err(SmilesError::DuplicateBond(edge.from, edge.to));
        }
    }

    Ok(tree)
}
