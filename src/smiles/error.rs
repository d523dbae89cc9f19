use crate::kekulize::KekulizeError;
use crate::valence::ValenceError;

/// Errors produced when parsing a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmilesError {
    /// Input ended before a complete token could be read.
    #[error("unexpected end of SMILES")]
    UnexpectedEnd,
    /// An unexpected character was encountered at the given position.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    /// An unrecognized element symbol was found.
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    #[error("isotope overflow at position {pos}")]
    InvalidIsotope { pos: usize },
    #[error("invalid atom class at position {pos}")]
    InvalidAtomClass { pos: usize },
    /// A bond symbol with no atom to attach to, e.g. a leading `=` or `C=.C`.
    #[error("dangling bond at position {pos}")]
    DanglingBond { pos: usize },
    /// A ring-closure digit with no preceding atom, or one closing onto itself.
    #[error("invalid ring bond {digit} at position {pos}")]
    InvalidRingBond { digit: u16, pos: usize },
    /// Two ring-closure bonds on the same digit specify conflicting bond types.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    /// The same pair of atoms is bonded twice.
    #[error("duplicate bond between atoms {0} and {1}")]
    DuplicateBond(usize, usize),
    /// A lowercase (aromatic) atom that is not part of any ring.
    #[error("non-ring atom {atom} marked aromatic")]
    NonRingAromatic { atom: usize },
    /// Kekulization of the aromatic system failed.
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error(transparent)]
    Valence(#[from] ValenceError),
}
