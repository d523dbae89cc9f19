use std::collections::HashSet;

use crate::mol::Mol;
use crate::smarts::{from_smarts, AtomExpr, BondExpr};

use super::error::ReactionSmartsError;
use super::Reaction;

type Template = Mol<AtomExpr, BondExpr>;

/// The three `>`-separated parts of a reaction SMARTS.
#[derive(Debug, PartialEq, Eq)]
struct Sections<'a> {
    reactants: &'a str,
    agents: &'a str,
    products: &'a str,
}

pub fn parse_reaction_smarts(s: &str) -> Result<Reaction, ReactionSmartsError> {
    let sections = split_sections(s.trim())?;

    let reactant_templates = parse_templates(sections.reactants, "reactant")?;
    if reactant_templates.is_empty() {
        return Err(ReactionSmartsError::EmptyReactants);
    }
    let product_templates = parse_templates(sections.products, "product")?;
    if product_templates.is_empty() {
        return Err(ReactionSmartsError::EmptyProducts);
    }
    let agent_templates = parse_templates(sections.agents, "agent")?;

    let reactant_maps = unique_map_numbers(&reactant_templates, "reactant")?;
    unique_map_numbers(&product_templates, "product")?;
    check_unmapped_product_atoms(&product_templates, &reactant_maps)?;

    Ok(Reaction {
        reactant_templates,
        product_templates,
        agent_templates,
    })
}

/// Byte offsets of `sep` outside brackets and parentheses.
fn top_level(s: &str, sep: char) -> Vec<usize> {
    let mut found = Vec::new();
    let mut brackets = 0u32;
    let mut parens = 0u32;
    for (i, ch) in s.char_indices() {
        match ch {
            '[' => brackets += 1,
            ']' => brackets = brackets.saturating_sub(1),
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            c if c == sep && brackets == 0 && parens == 0 => found.push(i),
            _ => {}
        }
    }
    found
}

fn split_sections(s: &str) -> Result<Sections<'_>, ReactionSmartsError> {
    match top_level(s, '>')[..] {
        [] | [_] => Err(ReactionSmartsError::MissingSeparator),
        [first, second] => Ok(Sections {
            reactants: &s[..first],
            agents: &s[first + 1..second],
            products: &s[second + 1..],
        }),
        _ => Err(ReactionSmartsError::TooManySeparators),
    }
}

/// Dot-separated components. A component wrapped in one pair of grouping
/// parentheses is unwrapped and split again.
fn components(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for end in top_level(text, '.').into_iter().chain([text.len()]) {
        let part = &text[start..end];
        start = end + 1;
        match unwrap_group(part) {
            Some(inner) => out.extend(components(inner)),
            None if part.is_empty() => {}
            None => out.push(part),
        }
    }
    out
}

fn unwrap_group(part: &str) -> Option<&str> {
    let inner = part.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

fn parse_templates(text: &str, section: &'static str) -> Result<Vec<Template>, ReactionSmartsError> {
    components(text)
        .into_iter()
        .map(|part| {
            from_smarts(part).map_err(|detail| ReactionSmartsError::InvalidComponent { section, detail })
        })
        .collect()
}

fn unique_map_numbers(
    templates: &[Template],
    section: &'static str,
) -> Result<HashSet<u16>, ReactionSmartsError> {
    let mut seen = HashSet::new();
    let map_numbers = templates
        .iter()
        .flat_map(|tmpl| tmpl.atoms().filter_map(|idx| tmpl.atom(idx).map_class()))
        .filter(|&n| n != 0);
    for map_num in map_numbers {
        if !seen.insert(map_num) {
            return Err(ReactionSmartsError::DuplicateAtomMap { section, map_num });
        }
    }
    Ok(seen)
}

/// Product atoms without a reactant counterpart are created from the
/// template alone, so the template must name their element.
fn check_unmapped_product_atoms(
    products: &[Template],
    reactant_maps: &HashSet<u16>,
) -> Result<(), ReactionSmartsError> {
    for (template, tmpl) in products.iter().enumerate() {
        for idx in tmpl.atoms() {
            let expr = tmpl.atom(idx);
            let mapped = expr.map_class().is_some_and(|n| reactant_maps.contains(&n));
            if !mapped && expr.element().is_none() {
                return Err(ReactionSmartsError::AmbiguousProductAtom {
                    template,
                    atom: idx.index(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections() {
        assert_eq!(
            split_sections("[C:1][Br:2]>>[C:1]O").unwrap(),
            Sections {
                reactants: "[C:1][Br:2]",
                agents: "",
                products: "[C:1]O",
            }
        );
        assert_eq!(split_sections("CC>[Pd]>C=C").unwrap().agents, "[Pd]");
        // A '>' inside a recursive environment is not a separator.
        assert_eq!(
            split_sections("[C;$(C>C)]>>C").unwrap().reactants,
            "[C;$(C>C)]"
        );
    }

    #[test]
    fn separator_errors() {
        assert_eq!(split_sections("CBr"), Err(ReactionSmartsError::MissingSeparator));
        assert_eq!(split_sections("C>Br"), Err(ReactionSmartsError::MissingSeparator));
        assert_eq!(split_sections("C>N>O>P"), Err(ReactionSmartsError::TooManySeparators));
        assert_eq!(split_sections("C>>>O"), Err(ReactionSmartsError::TooManySeparators));
    }

    #[test]
    fn component_splitting() {
        assert_eq!(components("[C:1]Br.[N:2]"), vec!["[C:1]Br", "[N:2]"]);
        assert_eq!(components("[C.C]"), vec!["[C.C]"]);
        assert_eq!(components("C(.N)O"), vec!["C(.N)O"]);
        assert_eq!(components(""), Vec::<&str>::new());
        assert_eq!(components("C..N"), vec!["C", "N"]);
    }

    #[test]
    fn grouping_parentheses() {
        assert_eq!(components("(A.B)"), vec!["A", "B"]);
        assert_eq!(components("(A(=O).B).C"), vec!["A(=O)", "B", "C"]);
        assert_eq!(unwrap_group("(A)(B)"), None);
        assert_eq!(unwrap_group("A.B"), None);

        let rxn = parse_reaction_smarts("([C:1](=O)[OH].[NH2:2][C:3])>>[C:1](=O)[N:2][C:3]").unwrap();
        assert_eq!(rxn.reactant_templates.len(), 2);
        assert_eq!(rxn.product_templates.len(), 1);
    }

    #[test]
    fn bad_component_names_its_section() {
        assert!(matches!(
            parse_reaction_smarts("[C:1]>>[C:1]("),
            Err(ReactionSmartsError::InvalidComponent { section: "product", .. })
        ));
        assert!(matches!(
            parse_reaction_smarts("C>C1CC>C"),
            Err(ReactionSmartsError::InvalidComponent { section: "agent", .. })
        ));
    }

    #[test]
    fn duplicate_map_numbers_rejected() {
        assert_eq!(
            parse_reaction_smarts("[C:1][N:1]>>[C:1]"),
            Err(ReactionSmartsError::DuplicateAtomMap {
                section: "reactant",
                map_num: 1
            })
        );
        assert!(matches!(
            parse_reaction_smarts("[C:1][N:2]>>[C:1].[N:1]"),
            Err(ReactionSmartsError::DuplicateAtomMap {
                section: "product",
                ..
            })
        ));
        // Zero is "unmapped" and may repeat.
        assert!(parse_reaction_smarts("[C:0][C:0]>>C").is_ok());
    }

    #[test]
    fn unmapped_product_atom_needs_an_element() {
        assert!(parse_reaction_smarts("[C:1]Br>>[C:1]O").is_ok());
        assert!(matches!(
            parse_reaction_smarts("[C:1]Br>>[C:1][O,N]"),
            Err(ReactionSmartsError::AmbiguousProductAtom { template: 0, atom: 1 })
        ));
        // A mapped wildcard takes its element from the matched atom.
        assert!(parse_reaction_smarts("[*:1]Br>>[*:1]O").is_ok());
        // A map number with no reactant partner counts as unmapped.
        assert!(parse_reaction_smarts("[C:1]Br>>[C:1][*:7]").is_err());
    }

    #[test]
    fn coupling_template_parses() {
        let rxn = parse_reaction_smarts(
            "[F,Cl,Br,I]-[c;H0;D3;+0:1](:[c,n:2]):[c,n:3].[NH2;D1;+0:4]-[c:5]>>[c,n:2]:[c;H0;D3;+0:1](:[c,n:3])-[NH;D2;+0:4]-[c:5]",
        )
        .unwrap();
        assert_eq!(rxn.reactant_templates.len(), 2);
        assert_eq!(rxn.reactant_templates[0].atom_count(), 4);
        assert_eq!(rxn.reactant_templates[1].atom_count(), 2);
        assert_eq!(rxn.product_templates.len(), 1);
        assert_eq!(rxn.product_templates[0].atom_count(), 5);
        assert!(rxn.agent_templates.is_empty());
    }
}
