/// Concrete bond multiplicity after kekulization.
///
/// `Any` comes from the SMILES `~` bond. It marks a connection without a
/// defined order (typically a dative contact to a metal) and contributes
/// nothing to either atom's valence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Any,
}

impl BondOrder {
    pub fn valence_contribution(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Any => 0,
        }
    }
}

/// A sanitized bond: a Kekulé order plus the perceived aromatic flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bond {
    pub order: BondOrder,
    pub is_aromatic: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: false,
        }
    }
}

/// Bond order as written in SMILES, before kekulization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SmilesBondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
    #[default]
    Implicit,
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SmilesBond {
    pub order: SmilesBondOrder,
}

impl SmilesBond {
    pub fn new(order: SmilesBondOrder) -> Self {
        Self { order }
    }
}

impl From<&Bond> for SmilesBond {
    /// Loses the Kekulé assignment of aromatic bonds, so the result can be
    /// re-sanitized after the graph around it changes.
    fn from(bond: &Bond) -> Self {
        let order = if bond.is_aromatic {
            SmilesBondOrder::Aromatic
        } else {
            match bond.order {
                BondOrder::Single => SmilesBondOrder::Single,
                BondOrder::Double => SmilesBondOrder::Double,
                BondOrder::Triple => SmilesBondOrder::Triple,
                BondOrder::Any => SmilesBondOrder::Any,
            }
        };
        Self { order }
    }
}
