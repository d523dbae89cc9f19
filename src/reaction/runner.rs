use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, SmilesBond, SmilesBondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::smarts::{get_smarts_matches_in, AtomExpr, BondExpr};
use crate::smiles::builder::smiles_bond_valence;
use crate::smiles::sanitize;
use crate::substruct::uniquify;

use super::error::ReactionError;
use super::Reaction;

pub const MAX_COMBINATIONS: usize = 1000;

/// Template atom index to matched reactant atom, for one reactant template.
type Match = Vec<Option<NodeIndex>>;

impl Reaction {
    /// Apply this reaction to one molecule per reactant template.
    ///
    /// Returns one outcome per combination of template matches, each holding
    /// one sanitized product per product template. No match on any template
    /// gives an empty list.
    pub fn run(&self, reactants: &[&Mol<Atom, Bond>]) -> Result<Vec<Vec<Mol<Atom, Bond>>>, ReactionError> {
        if reactants.len() != self.reactant_templates.len() {
            return Err(ReactionError::WrongReactantCount {
                expected: self.reactant_templates.len(),
                got: reactants.len(),
            });
        }

        let per_template_matches: Vec<Vec<Match>> = self
            .reactant_templates
            .iter()
            .zip(reactants)
            .map(|(tmpl, mol)| {
                let rings = RingInfo::sssr(mol);
                uniquify(get_smarts_matches_in(mol, tmpl, &rings))
                    .into_iter()
                    .map(|mapping| {
                        let mut by_query = vec![None; tmpl.atom_count()];
                        for (q, t) in mapping {
                            by_query[q.index()] = Some(t);
                        }
                        by_query
                    })
                    .collect()
            })
            .collect();

        if per_template_matches.iter().any(Vec::is_empty) {
            return Ok(Vec::new());
        }

        let combinations = cartesian_product(&per_template_matches, MAX_COMBINATIONS)?;
        combinations
            .iter()
            .map(|combo| self.generate_products(combo, reactants))
            .collect()
    }

    fn generate_products(
        &self,
        combo: &[&Match],
        reactants: &[&Mol<Atom, Bond>],
    ) -> Result<Vec<Mol<Atom, Bond>>, ReactionError> {
        let plan = MatchPlan::new(&self.reactant_templates, combo);
        self.product_templates
            .iter()
            .map(|tmpl| {
                let raw = build_product(tmpl, &plan, reactants);
                Ok(sanitize(&raw)?)
            })
            .collect()
    }
}

/// What one combination of template matches says about the reactants.
struct MatchPlan {
    /// Map number to `(reactant, atom)`.
    mapped: HashMap<u16, (usize, NodeIndex)>,
    /// Reverse of `mapped`, per reactant.
    map_of: Vec<HashMap<NodeIndex, u16>>,
    /// Every reactant atom covered by its template match.
    matched: Vec<HashSet<NodeIndex>>,
    /// Map-number pairs bonded in each reactant template.
    template_bonds: Vec<HashSet<(u16, u16)>>,
}

impl MatchPlan {
    fn new(templates: &[Mol<AtomExpr, BondExpr>], combo: &[&Match]) -> Self {
        let mut mapped = HashMap::new();
        let mut map_of = vec![HashMap::new(); templates.len()];
        for (ri, (tmpl, found)) in templates.iter().zip(combo).enumerate() {
            for q in tmpl.atoms() {
                let (Some(map_num), Some(t)) = (map_number(tmpl.atom(q)), found[q.index()]) else {
                    continue;
                };
                mapped.insert(map_num, (ri, t));
                map_of[ri].insert(t, map_num);
            }
        }
        Self {
            mapped,
            map_of,
            matched: combo.iter().map(|m| m.iter().flatten().copied().collect()).collect(),
            template_bonds: templates.iter().map(mapped_bond_pairs).collect(),
        }
    }
}

fn map_number(expr: &AtomExpr) -> Option<u16> {
    expr.map_class().filter(|&n| n != 0)
}

fn mapped_bond_pairs(tmpl: &Mol<AtomExpr, BondExpr>) -> HashSet<(u16, u16)> {
    tmpl.bonds()
        .filter_map(|e| {
            let (a, b) = tmpl.bond_endpoints(e)?;
            let (ma, mb) = (map_number(tmpl.atom(a))?, map_number(tmpl.atom(b))?);
            Some((ma.min(mb), ma.max(mb)))
        })
        .collect()
}

fn build_product(
    tmpl: &Mol<AtomExpr, BondExpr>,
    plan: &MatchPlan,
    reactants: &[&Mol<Atom, Bond>],
) -> Mol<Atom, SmilesBond> {
    let mut product: Mol<Atom, SmilesBond> = Mol::new();
    let mut node_of: Vec<NodeIndex> = Vec::with_capacity(tmpl.atom_count());
    let mut source_of: HashMap<NodeIndex, (usize, NodeIndex)> = HashMap::new();
    let mut by_map: HashMap<u16, NodeIndex> = HashMap::new();

    for p_idx in tmpl.atoms() {
        let expr = tmpl.atom(p_idx);
        let source = map_number(expr).and_then(|n| plan.mapped.get(&n).copied());
        let atom = match source {
            Some((ri, t)) => apply_template(reactants[ri].atom(t).clone(), expr),
            None => apply_template(Atom::default(), expr),
        };
        let node = product.add_atom(atom);
        node_of.push(node);
        if let Some(src) = source {
            source_of.insert(node, src);
        }
        if let Some(n) = map_number(expr) {
            by_map.insert(n, node);
        }
    }

    for e in tmpl.bonds() {
        let Some((a, b)) = tmpl.bond_endpoints(e) else {
            continue;
        };
        let (pa, pb) = (node_of[a.index()], node_of[b.index()]);
        let existing = match (source_of.get(&pa), source_of.get(&pb)) {
            (Some(&(ra, ta)), Some(&(rb, tb))) if ra == rb => reactants[ra]
                .bond_between(ta, tb)
                .map(|re| SmilesBond::from(reactants[ra].bond(re))),
            _ => None,
        };
        let bond = template_bond(tmpl.bond(e), existing, product.atom(pa), product.atom(pb));
        product.add_bond(pa, pb, bond);
    }

    let template_pairs = mapped_bond_pairs(tmpl);
    let mut carried: HashMap<(usize, NodeIndex), NodeIndex> = HashMap::new();

    let mapped_nodes: Vec<(NodeIndex, u16, usize, NodeIndex)> = tmpl
        .atoms()
        .filter_map(|p| {
            let n = map_number(tmpl.atom(p))?;
            let &(ri, t) = plan.mapped.get(&n)?;
            Some((node_of[p.index()], n, ri, t))
        })
        .collect();

    for &(node, map_num, ri, t) in &mapped_nodes {
        let reactant = reactants[ri];
        for (edge, neighbor) in reactant.bonds_of(t) {
            if !plan.matched[ri].contains(&neighbor) {
                let carried_node =
                    carry_substituent(&mut product, reactant, &plan.matched[ri], ri, neighbor, &mut carried);
                if product.bond_between(node, carried_node).is_none() {
                    product.add_bond(node, carried_node, SmilesBond::from(reactant.bond(edge)));
                }
                continue;
            }

            // Matched neighbors: keep a bond the reactant template did not
            // mention, as long as both ends survive into this product.
            let Some(&other_map) = plan.map_of[ri].get(&neighbor) else {
                continue;
            };
            let pair = (map_num.min(other_map), map_num.max(other_map));
            if plan.template_bonds[ri].contains(&pair) || template_pairs.contains(&pair) {
                continue;
            }
            if let Some(&other) = by_map.get(&other_map) {
                if product.bond_between(node, other).is_none() {
                    product.add_bond(node, other, SmilesBond::from(reactant.bond(edge)));
                }
            }
        }
    }

    let carried_nodes: HashSet<NodeIndex> = carried.values().copied().collect();
    fix_hydrogens(&mut product, tmpl, &node_of, &source_of, &carried_nodes, reactants);
    product
}

/// Copy the unmatched fragment reachable from `start` into `product`, once.
/// Returns the product node for `start`.
fn carry_substituent(
    product: &mut Mol<Atom, SmilesBond>,
    reactant: &Mol<Atom, Bond>,
    matched: &HashSet<NodeIndex>,
    ri: usize,
    start: NodeIndex,
    carried: &mut HashMap<(usize, NodeIndex), NodeIndex>,
) -> NodeIndex {
    if let Some(&existing) = carried.get(&(ri, start)) {
        return existing;
    }

    let first = product.add_atom(reactant.atom(start).clone());
    carried.insert((ri, start), first);
    let mut queue = VecDeque::from([start]);

    while let Some(r_node) = queue.pop_front() {
        let p_node = carried[&(ri, r_node)];
        for (edge, nb) in reactant.bonds_of(r_node) {
            if matched.contains(&nb) {
                continue;
            }
            let nb_node = match carried.get(&(ri, nb)) {
                Some(&existing) => existing,
                None => {
                    let created = product.add_atom(reactant.atom(nb).clone());
                    carried.insert((ri, nb), created);
                    queue.push_back(nb);
                    created
                }
            };
            if product.bond_between(p_node, nb_node).is_none() {
                product.add_bond(p_node, nb_node, SmilesBond::from(reactant.bond(edge)));
            }
        }
    }
    first
}

/// Template-stated properties override the matched atom's.
fn apply_template(mut atom: Atom, expr: &AtomExpr) -> Atom {
    if let Some((atomic_num, aromatic)) = expr.element() {
        atom.atomic_num = atomic_num;
        if let Some(aromatic) = aromatic {
            atom.is_aromatic = aromatic;
        }
    }
    if let Some(charge) = expr.stated_charge() {
        atom.formal_charge = charge;
    }
    if let Some(isotope) = expr.stated_isotope() {
        atom.isotope = isotope;
    }
    if let Some(h) = expr.stated_hydrogens() {
        atom.hydrogen_count = h;
    }
    atom
}

fn template_bond(
    expr: &BondExpr,
    existing: Option<SmilesBond>,
    a: &Atom,
    b: &Atom,
) -> SmilesBond {
    let order = match expr {
        BondExpr::Single => SmilesBondOrder::Single,
        BondExpr::Double => SmilesBondOrder::Double,
        BondExpr::Triple => SmilesBondOrder::Triple,
        BondExpr::Aromatic => SmilesBondOrder::Aromatic,
        BondExpr::True => SmilesBondOrder::Any,
        BondExpr::SingleOrAromatic if a.is_aromatic && b.is_aromatic => SmilesBondOrder::Aromatic,
        BondExpr::SingleOrAromatic => SmilesBondOrder::Single,
        BondExpr::Ring | BondExpr::And(_) | BondExpr::Or(_) | BondExpr::Not(_) => {
            return existing.unwrap_or(SmilesBond::new(SmilesBondOrder::Single));
        }
    };
    SmilesBond::new(order)
}

fn smiles_valence<B>(mol: &Mol<Atom, B>, v: NodeIndex, order: impl Fn(&B) -> SmilesBondOrder) -> u8 {
    mol.bonds_of(v)
        .map(|(e, _)| smiles_bond_valence(order(mol.bond(e))))
        .sum()
}

/// Hydrogens a bare atom would carry: the smallest charge-adjusted default
/// valence that fits, less one for aromatic atoms.
fn implied_hydrogens(atom: &Atom, valence: u8) -> u8 {
    let Some(element) = Element::from_atomic_num(atom.atomic_num) else {
        return 0;
    };
    let charge = i16::from(atom.formal_charge);
    let h = element
        .default_valences()
        .iter()
        .map(|&v| i16::from(v) + charge)
        .filter(|&v| v > 0)
        .find(|&v| v >= i16::from(valence))
        .map_or(0, |v| v - i16::from(valence));
    let h = if atom.is_aromatic && h > 0 { h - 1 } else { h };
    u8::try_from(h).unwrap_or(0)
}

/// Hydrogens on atoms whose template does not state them.
///
/// Fresh atoms get the implied count. A mapped atom whose reactant count was
/// itself the implied one is recomputed for its new charge and bonds;
/// otherwise its count shifts by the change in bond valence. Carried atoms
/// keep theirs.
fn fix_hydrogens(
    product: &mut Mol<Atom, SmilesBond>,
    tmpl: &Mol<AtomExpr, BondExpr>,
    node_of: &[NodeIndex],
    source_of: &HashMap<NodeIndex, (usize, NodeIndex)>,
    carried: &HashSet<NodeIndex>,
    reactants: &[&Mol<Atom, Bond>],
) {
    for p in tmpl.atoms() {
        if tmpl.atom(p).stated_hydrogens().is_some() {
            continue;
        }
        let node = node_of[p.index()];
        if carried.contains(&node) {
            continue;
        }
        let new_valence = smiles_valence(product, node, |b| b.order);
        let h = match source_of.get(&node) {
            None => implied_hydrogens(product.atom(node), new_valence),
            Some(&(ri, t)) => {
                let reactant = reactants[ri];
                let old = reactant.atom(t);
                let old_valence = smiles_valence(reactant, t, |b| SmilesBond::from(b).order);
                let was_implied = old.formal_charge == 0
                    && old.hydrogen_count == implied_hydrogens(old, old_valence);
                if was_implied {
                    implied_hydrogens(product.atom(node), new_valence)
                } else {
                    old.hydrogen_count
                        .saturating_add(old_valence)
                        .saturating_sub(new_valence)
                }
            }
        };
        product.atom_mut(node).hydrogen_count = h;
    }
}

fn cartesian_product<T>(sets: &[Vec<T>], max: usize) -> Result<Vec<Vec<&T>>, ReactionError> {
    let mut result: Vec<Vec<&T>> = vec![vec![]];
    for set in sets {
        let mut next = Vec::with_capacity(result.len() * set.len());
        for combo in &result {
            for item in set {
                let mut extended = combo.clone();
                extended.push(item);
                next.push(extended);
                if next.len() > max {
                    return Err(ReactionError::TooManyCombinations { limit: max });
                }
            }
        }
        result = next;
    }
    Ok(result)
}
