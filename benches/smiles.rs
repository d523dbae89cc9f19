use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rxn_yields::smiles::{from_smiles, to_canonical_smiles, to_smiles};

const TOLUIDINE: &str = "Cc1ccc(N)cc1";
const CATALYST: &str = "O=S(=O)(O[Pd]1~[NH2]C2C=CC=CC=2C2C=CC=CC1=2)C(F)(F)F";
const P2ET: &str = "CCN=P(N=P(N(C)C)(N(C)C)N(C)C)(N(C)C)N(C)C";
const ADBRETTPHOS: &str =
    "COc1ccc(OC)c(P(C23CC4CC(CC(C4)C2)C3)C23CC4CC(CC(C4)C2)C3)c1-c1c(C(C)C)cc(C(C)C)cc1C(C)C";

const MOLECULES: [(&str, &str); 4] = [
    ("toluidine", TOLUIDINE),
    ("catalyst", CATALYST),
    ("p2et", P2ET),
    ("adbrettphos", ADBRETTPHOS),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, smiles) in MOLECULES {
        group.bench_function(name, |b| {
            b.iter(|| black_box(from_smiles(black_box(smiles)).unwrap()))
        });
    }
    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for (name, smiles) in MOLECULES {
        let mol = from_smiles(smiles).unwrap();
        group.bench_function(name, |b| b.iter(|| black_box(to_smiles(black_box(&mol)))));
    }
    group.finish();
}

fn bench_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical");
    for (name, smiles) in MOLECULES {
        let mol = from_smiles(smiles).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| black_box(to_canonical_smiles(black_box(&mol))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_write, bench_canonical);
criterion_main!(benches);
