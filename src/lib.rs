pub mod aromaticity;
pub mod assembler;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod config;
pub mod element;
pub mod hydrogen;
pub mod kekulize;
pub mod mol;
pub mod reaction;
pub mod rings;
pub mod smarts;
pub mod smiles;
pub mod substruct;
pub mod table;
pub mod toolkit;
pub mod valence;

pub use assembler::{
    assemble, assemble_fresh, canonicalize, generate_products, Assembler, AssemblyError,
    CanonicalCache,
};
pub use atom::Atom;
pub use bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
pub use config::{ConfigError, ReactionSettings};
pub use element::Element;
pub use kekulize::{kekulize, KekulizeError};
pub use mol::Mol;
pub use reaction::{from_reaction_smarts, Reaction, ReactionError, ReactionSmartsError};
pub use smarts::{from_smarts, SmartsError};
pub use smiles::{from_smiles, parse_smiles, to_canonical_smiles, to_smiles, SmilesError};
pub use table::{load_rows, Row, TableError};
pub use toolkit::{ChemToolkit, NativeToolkit, ToolkitError};
pub use valence::{check_valence, ValenceError};
