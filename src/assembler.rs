//! Turn condition rows into full reaction SMILES.
//!
//! Each row becomes
//! `halide.coreactant.catalyst.ligand.base.additive>>product`, with every
//! component except the co-reactant in canonical form. Any failure aborts
//! the whole batch.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, info_span, trace, warn};

use crate::config::ReactionSettings;
use crate::table::Row;
use crate::toolkit::{ChemToolkit, ToolkitError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    /// A row identifier or the catalyst is not valid SMILES.
    #[error("cannot parse SMILES {smiles:?}: {source}")]
    Parse {
        smiles: String,
        #[source]
        source: ToolkitError,
    },
    #[error("cannot parse reaction template {template:?}: {source}")]
    Template {
        template: String,
        #[source]
        source: ToolkitError,
    },
    #[error("applying the template to row {row} failed: {source}")]
    Reaction {
        row: usize,
        #[source]
        source: ToolkitError,
    },
    /// A template outcome held no product molecule at all.
    #[error("row {row}: the template produced an outcome without products")]
    EmptyOutcome { row: usize },
    /// The template gave zero or several distinct products for one row.
    #[error("row {row}: expected exactly one product, found {}: {products:?}", products.len())]
    ProductCount { row: usize, products: Vec<String> },
}

/// Raw identifier to canonical SMILES, shared by every row of a batch.
///
/// The first value stored for a key is the one that stays.
#[derive(Debug, Clone, Default)]
pub struct CanonicalCache {
    entries: HashMap<String, String>,
}

impl CanonicalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }

    /// Returns the value now cached for `raw`.
    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) -> &str {
        self.entries
            .entry(raw.into())
            .or_insert_with(|| canonical.into())
            .as_str()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Canonical form of `smiles`, from the cache when present.
///
/// On a miss the toolkit parses and writes the molecule. The result is not
/// inserted; callers decide what to keep.
pub fn canonicalize<T: ChemToolkit>(
    toolkit: &T,
    smiles: &str,
    cache: &CanonicalCache,
) -> Result<String, AssemblyError> {
    if let Some(hit) = cache.get(smiles) {
        return Ok(hit.to_owned());
    }
    let mol = toolkit.parse_smiles(smiles).map_err(|source| AssemblyError::Parse {
        smiles: smiles.to_owned(),
        source,
    })?;
    Ok(toolkit.canonical_smiles(&mol))
}

fn canonicalize_cached<T: ChemToolkit>(
    toolkit: &T,
    smiles: &str,
    cache: &mut CanonicalCache,
) -> Result<String, AssemblyError> {
    let canonical = canonicalize(toolkit, smiles, cache)?;
    Ok(cache.insert(smiles, canonical).to_owned())
}

/// The single canonical product of each row, in row order.
pub fn generate_products<T: ChemToolkit>(
    toolkit: &T,
    rows: &[Row],
    settings: &ReactionSettings,
) -> Result<Vec<String>, AssemblyError> {
    let template = toolkit
        .parse_template(&settings.template)
        .map_err(|source| AssemblyError::Template {
            template: settings.template.clone(),
            source,
        })?;
    let coreactant = toolkit
        .parse_smiles(&settings.coreactant)
        .map_err(|source| AssemblyError::Parse {
            smiles: settings.coreactant.clone(),
            source,
        })?;

    rows.iter()
        .enumerate()
        .map(|(row, record)| {
            let halide = toolkit
                .parse_smiles(&record.aryl_halide)
                .map_err(|source| AssemblyError::Parse {
                    smiles: record.aryl_halide.clone(),
                    source,
                })?;
            let outcomes = toolkit
                .run_template(&template, &[&halide, &coreactant])
                .map_err(|source| AssemblyError::Reaction { row, source })?;

            let products = outcomes
                .iter()
                .map(|outcome| -> Result<String, AssemblyError> {
                    let mol = outcome.first().ok_or(AssemblyError::EmptyOutcome { row })?;
                    let product = toolkit.canonical_smiles(mol);
                    trace!(row, %product, "outcome");
                    Ok(product)
                })
                .collect::<Result<BTreeSet<String>, AssemblyError>>()?;

            let mut products = products.into_iter();
            match (products.next(), products.next()) {
                (Some(product), None) => Ok(product),
                (first, second) => {
                    let products: Vec<String> =
                        first.into_iter().chain(second).chain(products).collect();
                    warn!(row, halide = %record.aryl_halide, ?products, "expected exactly one product");
                    Err(AssemblyError::ProductCount { row, products })
                }
            }
        })
        .collect()
}

/// Reaction strings for `rows`, canonicalizing through `cache`.
pub fn assemble<T: ChemToolkit>(
    toolkit: &T,
    rows: &[Row],
    settings: &ReactionSettings,
    cache: &mut CanonicalCache,
) -> Result<Vec<String>, AssemblyError> {
    let span = info_span!("assemble", rows = rows.len());
    let _enter = span.enter();

    let catalyst = toolkit
        .parse_smiles(&settings.catalyst)
        .map(|mol| toolkit.canonical_smiles(&mol))
        .map_err(|source| AssemblyError::Parse {
            smiles: settings.catalyst.clone(),
            source,
        })?;
    let products = generate_products(toolkit, rows, settings)?;

    let reactions = rows
        .iter()
        .zip(&products)
        .enumerate()
        .map(|(row, (record, product))| {
            let halide = canonicalize_cached(toolkit, &record.aryl_halide, cache)?;
            let ligand = canonicalize_cached(toolkit, &record.ligand, cache)?;
            let base = canonicalize_cached(toolkit, &record.base, cache)?;
            let additive = canonicalize_cached(toolkit, &record.additive, cache)?;
            debug!(row, %product, cached = cache.len(), "assembled");
            Ok(format!(
                "{halide}.{coreactant}.{catalyst}.{ligand}.{base}.{additive}>>{product}",
                coreactant = settings.coreactant,
            ))
        })
        .collect::<Result<Vec<_>, AssemblyError>>()?;

    info!(reactions = reactions.len(), cached = cache.len(), "batch assembled");
    Ok(reactions)
}

/// [`assemble`] with a cache that lives only for this call.
pub fn assemble_fresh<T: ChemToolkit>(
    toolkit: &T,
    rows: &[Row],
    settings: &ReactionSettings,
) -> Result<Vec<String>, AssemblyError> {
    assemble(toolkit, rows, settings, &mut CanonicalCache::new())
}

/// A toolkit bundled with the settings it runs under.
#[derive(Debug, Clone)]
pub struct Assembler<T> {
    toolkit: T,
    settings: ReactionSettings,
}

impl<T: ChemToolkit> Assembler<T> {
    pub fn new(toolkit: T, settings: ReactionSettings) -> Self {
        Self { toolkit, settings }
    }

    pub fn with_defaults(toolkit: T) -> Self {
        Self::new(toolkit, ReactionSettings::default())
    }

    pub fn run(&self, rows: &[Row]) -> Result<Vec<String>, AssemblyError> {
        assemble_fresh(&self.toolkit, rows, &self.settings)
    }

    pub fn run_with_cache(
        &self,
        rows: &[Row],
        cache: &mut CanonicalCache,
    ) -> Result<Vec<String>, AssemblyError> {
        assemble(&self.toolkit, rows, &self.settings, cache)
    }
}
