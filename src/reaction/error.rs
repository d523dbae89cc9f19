use crate::kekulize::KekulizeError;
use crate::smarts::SmartsError;

/// Error returned when parsing a reaction SMARTS string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReactionSmartsError {
    #[error("no '>>' separator found in reaction SMARTS")]
    MissingSeparator,
    #[error("too many '>' separators in reaction SMARTS")]
    TooManySeparators,
    #[error("reaction has no reactant templates")]
    EmptyReactants,
    #[error("reaction has no product templates")]
    EmptyProducts,
    /// A SMARTS component failed to parse.
    #[error("invalid {section} component: {detail}")]
    InvalidComponent {
        section: &'static str,
        #[source]
        detail: SmartsError,
    },
    /// An atom map number appears more than once on one side.
    #[error("atom map number {map_num} appears more than once in the {section} templates")]
    DuplicateAtomMap { section: &'static str, map_num: u16 },
    /// A product atom with no reactant counterpart does not name one element.
    #[error("product atom {atom} of template {template} is unmapped and has no single element")]
    AmbiguousProductAtom { template: usize, atom: usize },
}

/// Error returned when applying a reaction to reactant molecules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReactionError {
    /// The number of reactant molecules does not match the number of templates.
    #[error("expected {expected} reactants, got {got}")]
    WrongReactantCount { expected: usize, got: usize },
    /// Match enumeration exceeded the combination limit.
    #[error("match combination count exceeds limit of {limit}")]
    TooManyCombinations { limit: usize },
    /// A product could not be kekulized.
    #[error("product sanitization failed: {0}")]
    Sanitize(#[from] KekulizeError),
}
