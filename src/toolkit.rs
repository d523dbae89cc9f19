use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::reaction::{from_reaction_smarts, Reaction, ReactionError, ReactionSmartsError};
use crate::smiles::{from_smiles, to_canonical_smiles, SmilesError};

/// The chemistry operations the assembler needs, and nothing more.
///
/// A backend parses molecules and reaction templates, writes canonical
/// SMILES, and applies a template to an ordered list of reactants.
pub trait ChemToolkit {
    type Molecule;
    type Template;

    fn parse_smiles(&self, smiles: &str) -> Result<Self::Molecule, ToolkitError>;

    /// Deterministic for a given molecule, whatever the input atom order was.
    fn canonical_smiles(&self, mol: &Self::Molecule) -> String;

    fn parse_template(&self, template: &str) -> Result<Self::Template, ToolkitError>;

    /// One entry per outcome, each listing that outcome's products.
    fn run_template(
        &self,
        template: &Self::Template,
        reactants: &[&Self::Molecule],
    ) -> Result<Vec<Vec<Self::Molecule>>, ToolkitError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolkitError {
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error(transparent)]
    Template(#[from] ReactionSmartsError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
}

/// The in-crate engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeToolkit;

impl ChemToolkit for NativeToolkit {
    type Molecule = Mol<Atom, Bond>;
    type Template = Reaction;

    fn parse_smiles(&self, smiles: &str) -> Result<Self::Molecule, ToolkitError> {
        Ok(from_smiles(smiles)?)
    }

    fn canonical_smiles(&self, mol: &Self::Molecule) -> String {
        to_canonical_smiles(mol)
    }

    fn parse_template(&self, template: &str) -> Result<Reaction, ToolkitError> {
        Ok(from_reaction_smarts(template)?)
    }

    fn run_template(
        &self,
        template: &Reaction,
        reactants: &[&Self::Molecule],
    ) -> Result<Vec<Vec<Self::Molecule>>, ToolkitError> {
        Ok(template.run(reactants)?)
    }
}
