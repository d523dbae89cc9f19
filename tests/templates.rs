use std::collections::BTreeSet;

use rxn_yields::config::{DEFAULT_COREACTANT, DEFAULT_TEMPLATE};
use rxn_yields::{from_reaction_smarts, from_smiles, to_canonical_smiles, Reaction};

fn canonical(smiles: &str) -> String {
    to_canonical_smiles(&from_smiles(smiles).unwrap())
}

fn products(rxn: &Reaction, halide: &str) -> BTreeSet<String> {
    let halide = from_smiles(halide).unwrap();
    let amine = from_smiles(DEFAULT_COREACTANT).unwrap();
    rxn.run(&[&halide, &amine])
        .unwrap()
        .iter()
        .map(|outcome| to_canonical_smiles(&outcome[0]))
        .collect()
}

#[test]
fn every_dataset_halide_couples_once() {
    let rxn = from_reaction_smarts(DEFAULT_TEMPLATE).unwrap();
    let cases = [
        ("FC(F)(F)c1ccc(Cl)cc1", "Cc1ccc(Nc2ccc(C(F)(F)F)cc2)cc1"),
        ("FC(F)(F)c1ccc(Br)cc1", "Cc1ccc(Nc2ccc(C(F)(F)F)cc2)cc1"),
        ("FC(F)(F)c1ccc(I)cc1", "Cc1ccc(Nc2ccc(C(F)(F)F)cc2)cc1"),
        ("COc1ccc(Cl)cc1", "COc1ccc(Nc2ccc(C)cc2)cc1"),
        ("COc1ccc(Br)cc1", "COc1ccc(Nc2ccc(C)cc2)cc1"),
        ("COc1ccc(I)cc1", "COc1ccc(Nc2ccc(C)cc2)cc1"),
        ("CCc1ccc(Cl)cc1", "CCc1ccc(Nc2ccc(C)cc2)cc1"),
        ("CCc1ccc(Br)cc1", "CCc1ccc(Nc2ccc(C)cc2)cc1"),
        ("CCc1ccc(I)cc1", "CCc1ccc(Nc2ccc(C)cc2)cc1"),
        ("Clc1ccccn1", "Cc1ccc(Nc2ccccn2)cc1"),
        ("Brc1ccccn1", "Cc1ccc(Nc2ccccn2)cc1"),
        ("Ic1ccccn1", "Cc1ccc(Nc2ccccn2)cc1"),
        ("Clc1cccnc1", "Cc1ccc(Nc2cccnc2)cc1"),
        ("Brc1cccnc1", "Cc1ccc(Nc2cccnc2)cc1"),
        ("Ic1cccnc1", "Cc1ccc(Nc2cccnc2)cc1"),
    ];
    for (halide, expected) in cases {
        let found = products(&rxn, halide);
        assert_eq!(
            found,
            BTreeSet::from([canonical(expected)]),
            "products of {halide}"
        );
    }
}

#[test]
fn halogen_must_sit_on_an_aromatic_carbon() {
    let rxn = from_reaction_smarts(DEFAULT_TEMPLATE).unwrap();
    assert!(products(&rxn, "ClCc1ccccc1").is_empty());
    assert!(products(&rxn, "c1ccccc1").is_empty());
}

#[test]
fn two_halogens_give_two_products() {
    let rxn = from_reaction_smarts(DEFAULT_TEMPLATE).unwrap();
    let found = products(&rxn, "Clc1ccc(Br)cc1");
    assert_eq!(
        found,
        BTreeSet::from([
            canonical("Cc1ccc(Nc2ccc(Br)cc2)cc1"),
            canonical("Cc1ccc(Nc2ccc(Cl)cc2)cc1"),
        ])
    );
}

#[test]
fn secondary_amines_do_not_react() {
    let rxn = from_reaction_smarts(DEFAULT_TEMPLATE).unwrap();
    let halide = from_smiles("Brc1ccccc1").unwrap();
    let amine = from_smiles("CNc1ccccc1").unwrap();
    assert!(rxn.run(&[&halide, &amine]).unwrap().is_empty());
}

#[test]
fn products_carry_no_leftover_halogen() {
    let rxn = from_reaction_smarts(DEFAULT_TEMPLATE).unwrap();
    for product in products(&rxn, "FC(F)(F)c1ccc(Br)cc1") {
        assert!(!product.contains("Br"), "{product}");
        assert!(product.contains("N"), "{product}");
    }
}
