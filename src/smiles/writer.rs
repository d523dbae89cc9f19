use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ranks;
use crate::mol::Mol;

/// Write SMILES following input atom order.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    let ranks: Vec<usize> = (0..mol.atom_count()).collect();
    write_ranked(mol, &ranks)
}

/// Write the canonical SMILES: the same string for every input that
/// describes the same molecule.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    write_ranked(mol, &canonical_ranks(mol))
}

/// Depth-first traversal from the lowest-ranked atom of each fragment,
/// visiting neighbors in rank order. Fragments are joined by `.` in order
/// of their lowest rank.
fn write_ranked(mol: &Mol<Atom, Bond>, ranks: &[usize]) -> String {
    let mut order: Vec<NodeIndex> = mol.atoms().collect();
    order.sort_by_key(|v| ranks[v.index()]);

    let mut tree = SpanningTree::new(mol.atom_count());
    let mut fragments = Vec::new();
    for &root in &order {
        if tree.visited[root.index()] {
            continue;
        }
        tree.grow(mol, ranks, root);
        let mut out = String::new();
        let mut digits = RingDigits::default();
        write_atom_and_tail(mol, &tree, root, &mut digits, &mut out);
        fragments.push(out);
    }
    fragments.join(".")
}

struct SpanningTree {
    visited: Vec<bool>,
    children: Vec<Vec<NodeIndex>>,
    /// Ring bonds opened at an atom, to a later atom in the traversal.
    ring_opens: Vec<Vec<NodeIndex>>,
    /// Ring bonds closed at an atom, back to an earlier one.
    ring_closes: Vec<Vec<NodeIndex>>,
}

impl SpanningTree {
    fn new(n: usize) -> Self {
        Self {
            visited: vec![false; n],
            children: vec![Vec::new(); n],
            ring_opens: vec![Vec::new(); n],
            ring_closes: vec![Vec::new(); n],
        }
    }

    fn grow(&mut self, mol: &Mol<Atom, Bond>, ranks: &[usize], root: NodeIndex) {
        let mut parent: Vec<Option<NodeIndex>> = vec![None; mol.atom_count()];
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>)> = Vec::new();
        self.visited[root.index()] = true;
        stack.push((root, sorted_neighbors(mol, ranks, root)));

        while let Some((node, pending)) = stack.last_mut() {
            let node = *node;
            let Some(next) = pending.pop() else {
                stack.pop();
                continue;
            };
            if !self.visited[next.index()] {
                self.visited[next.index()] = true;
                parent[next.index()] = Some(node);
                self.children[node.index()].push(next);
                stack.push((next, sorted_neighbors(mol, ranks, next)));
            } else if parent[node.index()] != Some(next)
                && !self.ring_opens[node.index()].contains(&next)
                && !self.ring_closes[node.index()].contains(&next)
                && !self.children[node.index()].contains(&next)
            {
                self.ring_opens[next.index()].push(node);
                self.ring_closes[node.index()].push(next);
            }
        }
    }
}

/// Neighbors in reverse rank order, so popping yields the lowest rank first.
fn sorted_neighbors(mol: &Mol<Atom, Bond>, ranks: &[usize], v: NodeIndex) -> Vec<NodeIndex> {
    let mut nbrs: Vec<NodeIndex> = mol.neighbors(v).collect();
    nbrs.sort_by_key(|w| std::cmp::Reverse(ranks[w.index()]));
    nbrs
}

/// Ring-closure digits in use, handing out the lowest free one.
#[derive(Default)]
struct RingDigits {
    open: Vec<(NodeIndex, NodeIndex, u16)>,
}

impl RingDigits {
    fn open(&mut self, from: NodeIndex, to: NodeIndex) -> u16 {
        let digit = (1u16..)
            .find(|d| self.open.iter().all(|&(_, _, used)| used != *d))
            .unwrap_or(1);
        self.open.push((from, to, digit));
        digit
    }

    fn find(&self, from: NodeIndex, to: NodeIndex) -> Option<u16> {
        self.open
            .iter()
            .find(|&&(a, b, _)| a == to && b == from)
            .map(|&(_, _, d)| d)
    }

    fn release(&mut self, digit: u16) {
        self.open.retain(|&(_, _, d)| d != digit);
    }
}

fn write_atom_and_tail(
    mol: &Mol<Atom, Bond>,
    tree: &SpanningTree,
    v: NodeIndex,
    digits: &mut RingDigits,
    out: &mut String,
) {
    write_atom(mol, v, out);

    // Digits closed here are not reused by rings opened at the same atom.
    let closed: Vec<(NodeIndex, u16)> = tree.ring_closes[v.index()]
        .iter()
        .filter_map(|&earlier| digits.find(v, earlier).map(|d| (earlier, d)))
        .collect();
    let opened: Vec<u16> = tree.ring_opens[v.index()]
        .iter()
        .map(|&later| digits.open(v, later))
        .collect();
    for &(_, d) in &closed {
        digits.release(d);
    }
    for (earlier, d) in closed {
        write_bond(mol, v, earlier, out);
        write_ring_digit(d, out);
    }
    for d in opened {
        write_ring_digit(d, out);
    }

    let kids = &tree.children[v.index()];
    for (i, &child) in kids.iter().enumerate() {
        let is_branch = i + 1 < kids.len();
        if is_branch {
            out.push('(');
        }
        write_bond(mol, v, child, out);
        write_atom_and_tail(mol, tree, child, digits, out);
        if is_branch {
            out.push(')');
        }
    }
}

fn write_bond(mol: &Mol<Atom, Bond>, a: NodeIndex, b: NodeIndex, out: &mut String) {
    let Some(e) = mol.bond_between(a, b) else {
        return;
    };
    let bond = mol.bond(e);
    if bond.is_aromatic {
        return;
    }
    match bond.order {
        BondOrder::Single if mol.atom(a).is_aromatic && mol.atom(b).is_aromatic => out.push('-'),
        BondOrder::Single => {}
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
        BondOrder::Any => out.push('~'),
    }
}

fn write_ring_digit(d: u16, out: &mut String) {
    if d < 10 {
        out.push(char::from(b'0' + d as u8));
    } else {
        out.push('%');
        out.push_str(&d.to_string());
    }
}

fn write_atom(mol: &Mol<Atom, Bond>, v: NodeIndex, out: &mut String) {
    let atom = mol.atom(v);
    let symbol = atom.element().map_or("*", |e| e.symbol());
    let push_symbol = |out: &mut String| {
        if atom.is_aromatic {
            out.push_str(&symbol.to_ascii_lowercase());
        } else {
            out.push_str(symbol);
        }
    };

    if can_write_bare(mol, v) {
        push_symbol(out);
        return;
    }

    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    push_symbol(out);
    match atom.hydrogen_count {
        0 => {}
        1 => out.push('H'),
        h => {
            out.push('H');
            out.push_str(&h.to_string());
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => {
            out.push('+');
            out.push_str(&c.to_string());
        }
        c => {
            out.push('-');
            out.push_str(&c.unsigned_abs().to_string());
        }
    }
    out.push(']');
}

/// A bare atom is only written when the parser's implicit-hydrogen rule
/// would give back exactly the stored hydrogen count.
fn can_write_bare(mol: &Mol<Atom, Bond>, v: NodeIndex) -> bool {
    let atom = mol.atom(v);
    let Some(element) = atom.element() else {
        return false;
    };
    if !element.is_organic_subset() || atom.isotope != 0 || atom.formal_charge != 0 {
        return false;
    }
    if atom.is_aromatic && !matches!(element.atomic_num(), 5 | 6 | 7 | 8 | 15 | 16) {
        return false;
    }

    let seen: u8 = mol
        .bonds_of(v)
        .map(|(e, _)| {
            let bond = mol.bond(e);
            if bond.is_aromatic {
                1
            } else {
                bond.order.valence_contribution()
            }
        })
        .sum();
    let Some(&target) = element.default_valences().iter().find(|&&val| val >= seen) else {
        return atom.hydrogen_count == 0;
    };
    let mut implied = target - seen;
    if atom.is_aromatic && implied > 0 {
        implied -= 1;
    }
    implied == atom.hydrogen_count
}
