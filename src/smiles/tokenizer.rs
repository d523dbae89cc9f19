use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken, usize),
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    /// `None` for bare atoms, whose hydrogens are implied by valence.
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u16,
    pub pos: usize,
}

impl AtomToken {
    pub fn is_bracket(&self) -> bool {
        self.hcount.is_some()
    }
}

/// Bond symbols. `/` and `\` are read as plain single bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    Any,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut val: u32 = 0;
        while let Some(d @ b'0'..=b'9') = self.peek() {
            val = val.saturating_mul(10).saturating_add(u32::from(d - b'0'));
            self.pos += 1;
        }
        (self.pos > start).then_some(val)
    }

    fn unexpected(&self) -> SmilesError {
        match self.peek() {
            Some(b) => SmilesError::UnexpectedChar {
                pos: self.pos,
                ch: b as char,
            },
            None => SmilesError::UnexpectedEnd,
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    if let Some((pos, ch)) = input.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(SmilesError::UnexpectedChar { pos, ch });
    }

    let mut cur = Cursor {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let mut tokens = Vec::new();

    while let Some(b) = cur.peek() {
        let pos = cur.pos;
        let token = match b {
            b'[' => Token::Atom(bracket_atom(&mut cur)?),
            b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' | b'b' | b'c' | b'n'
            | b'o' | b'p' | b's' => Token::Atom(organic_atom(&mut cur)),
            b'-' | b'/' | b'\\' => {
                cur.bump();
                Token::Bond(BondToken::Single, pos)
            }
            b'=' => {
                cur.bump();
                Token::Bond(BondToken::Double, pos)
            }
            b'#' => {
                cur.bump();
                Token::Bond(BondToken::Triple, pos)
            }
            b':' => {
                cur.bump();
                Token::Bond(BondToken::Aromatic, pos)
            }
            b'~' => {
                cur.bump();
                Token::Bond(BondToken::Any, pos)
            }
            b'(' => {
                cur.bump();
                Token::OpenParen(pos)
            }
            b')' => {
                cur.bump();
                Token::CloseParen(pos)
            }
            b'.' => {
                cur.bump();
                Token::Dot(pos)
            }
            b'%' => {
                cur.bump();
                match (cur.peek(), cur.peek_at(1)) {
                    (Some(d1 @ b'0'..=b'9'), Some(d2 @ b'0'..=b'9')) => {
                        cur.pos += 2;
                        Token::RingClosure {
                            digit: u16::from(d1 - b'0') * 10 + u16::from(d2 - b'0'),
                            pos,
                        }
                    }
                    _ => return Err(SmilesError::UnexpectedChar { pos, ch: '%' }),
                }
            }
            d @ b'0'..=b'9' => {
                cur.bump();
                Token::RingClosure {
                    digit: u16::from(d - b'0'),
                    pos,
                }
            }
            _ => return Err(cur.unexpected()),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn organic_atom(cur: &mut Cursor<'_>) -> AtomToken {
    let pos = cur.pos;
    let (element, is_aromatic) = match cur.bump() {
        Some(b'B') if cur.eat(b'r') => (Element::BR, false),
        Some(b'C') if cur.eat(b'l') => (Element::CL, false),
        Some(b'B') => (Element::B, false),
        Some(b'C') => (Element::C, false),
        Some(b'N') => (Element::N, false),
        Some(b'O') => (Element::O, false),
        Some(b'P') => (Element::P, false),
        Some(b'S') => (Element::S, false),
        Some(b'F') => (Element::F, false),
        Some(b'I') => (Element::I, false),
        Some(b'b') => (Element::B, true),
        Some(b'c') => (Element::C, true),
        Some(b'n') => (Element::N, true),
        Some(b'o') => (Element::O, true),
        Some(b'p') => (Element::P, true),
        _ => (Element::S, true),
    };
    AtomToken {
        element,
        is_aromatic,
        isotope: 0,
        hcount: None,
        charge: 0,
        atom_class: 0,
        pos,
    }
}

fn bracket_atom(cur: &mut Cursor<'_>) -> Result<AtomToken, SmilesError> {
    let start = cur.pos;
    cur.bump();

    let isotope = match cur.number() {
        Some(n) => u16::try_from(n).map_err(|_| SmilesError::InvalidIsotope { pos: start })?,
        None => 0,
    };

    let (element, is_aromatic) = bracket_element(cur, start)?;

    // Tetrahedral parity is not modelled; consume `@`, `@@` and `@TH1`-style tags.
    if cur.eat(b'@') {
        cur.eat(b'@');
        if matches!(cur.peek(), Some(b'A'..=b'Z')) && matches!(cur.peek_at(1), Some(b'A'..=b'Z'))
        {
            cur.pos += 2;
            cur.number();
        }
    }

    let hcount = if cur.eat(b'H') {
        match cur.peek() {
            Some(d @ b'0'..=b'9') => {
                cur.bump();
                d - b'0'
            }
            _ => 1,
        }
    } else {
        0
    };

    let charge = bracket_charge(cur, start)?;

    let atom_class = if cur.eat(b':') {
        let n = cur.number().ok_or(SmilesError::InvalidAtomClass { pos: start })?;
        u16::try_from(n).map_err(|_| SmilesError::InvalidAtomClass { pos: start })?
    } else {
        0
    };

    if !cur.eat(b']') {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }

    Ok(AtomToken {
        element,
        is_aromatic,
        isotope,
        hcount: Some(hcount),
        charge,
        atom_class,
        pos: start,
    })
}

const AROMATIC_BRACKET: [(&str, Element); 10] = [
    ("se", Element::SE),
    ("te", Element::TE),
    ("as", Element::AS),
    ("si", Element::SI),
    ("b", Element::B),
    ("c", Element::C),
    ("n", Element::N),
    ("o", Element::O),
    ("p", Element::P),
    ("s", Element::S),
];

fn bracket_element(cur: &mut Cursor<'_>, start: usize) -> Result<(Element, bool), SmilesError> {
    let rest = &cur.bytes[cur.pos..];

    if matches!(rest.first(), Some(b'a'..=b'z')) {
        for (sym, element) in AROMATIC_BRACKET {
            if rest.starts_with(sym.as_bytes()) {
                cur.pos += sym.len();
                return Ok((element, true));
            }
        }
    }

    if let [upper @ b'A'..=b'Z', lower @ b'a'..=b'z', ..] = rest {
        let sym = [*upper, *lower];
        if let Some(element) = std::str::from_utf8(&sym).ok().and_then(Element::from_symbol) {
            cur.pos += 2;
            return Ok((element, false));
        }
    }

    if let [upper @ b'A'..=b'Z', ..] = rest {
        let sym = [*upper];
        if let Some(element) = std::str::from_utf8(&sym).ok().and_then(Element::from_symbol) {
            cur.pos += 1;
            return Ok((element, false));
        }
    }

    if rest.is_empty() {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    Err(SmilesError::InvalidElement {
        pos: cur.pos,
        text: (rest[0] as char).to_string(),
    })
}

fn bracket_charge(cur: &mut Cursor<'_>, start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match cur.peek() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Ok(0),
    };
    let symbol = cur.bump();

    let magnitude = if let Some(n) = cur.number() {
        n
    } else {
        let mut count = 1u32;
        while cur.peek() == symbol {
            cur.bump();
            count += 1;
        }
        count
    };

    i8::try_from(magnitude)
        .ok()
        .filter(|m| *m <= 15)
        .map(|m| sign * m)
        .ok_or(SmilesError::InvalidCharge { pos: start })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(tokens: &[Token], i: usize) -> &AtomToken {
        match &tokens[i] {
            Token::Atom(a) => a,
            other => panic!("expected atom, got {other:?}"),
        }
    }

    #[test]
    fn organic_subset_two_letter() {
        let tokens = tokenize("ClCBr").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(atom(&tokens, 0).element, Element::CL);
        assert_eq!(atom(&tokens, 1).element, Element::C);
        assert_eq!(atom(&tokens, 2).element, Element::BR);
        assert!(!atom(&tokens, 0).is_bracket());
    }

    #[test]
    fn bracket_atom_fields() {
        let tokens = tokenize("[13CH3+:7]").unwrap();
        let a = atom(&tokens, 0);
        assert_eq!(a.isotope, 13);
        assert_eq!(a.element, Element::C);
        assert_eq!(a.hcount, Some(3));
        assert_eq!(a.charge, 1);
        assert_eq!(a.atom_class, 7);
    }

    #[test]
    fn bracket_without_h_has_zero() {
        let tokens = tokenize("[Pd]").unwrap();
        assert_eq!(atom(&tokens, 0).element, Element::PD);
        assert_eq!(atom(&tokens, 0).hcount, Some(0));
    }

    #[test]
    fn charge_spellings() {
        for (smi, charge) in [("[O-]", -1), ("[O-2]", -2), ("[O--]", -2), ("[Fe+++]", 3)] {
            let tokens = tokenize(smi).unwrap();
            assert_eq!(atom(&tokens, 0).charge, charge, "{smi}");
        }
    }

    #[test]
    fn chirality_is_dropped() {
        let tokens = tokenize("[C@@H](F)(Cl)Br").unwrap();
        assert_eq!(atom(&tokens, 0).hcount, Some(1));
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn aromatic_bracket_elements() {
        let tokens = tokenize("[se][nH]").unwrap();
        assert_eq!(atom(&tokens, 0).element, Element::SE);
        assert!(atom(&tokens, 0).is_aromatic);
        assert_eq!(atom(&tokens, 1).element, Element::N);
        assert_eq!(atom(&tokens, 1).hcount, Some(1));
    }

    #[test]
    fn ring_closures() {
        let tokens = tokenize("C%12CC1").unwrap();
        assert!(matches!(tokens[1], Token::RingClosure { digit: 12, .. }));
        assert!(matches!(tokens[4], Token::RingClosure { digit: 1, .. }));
    }

    #[test]
    fn any_and_directional_bonds() {
        let tokens = tokenize("[Pd]~N/C=C\\C").unwrap();
        assert_eq!(tokens[1], Token::Bond(BondToken::Any, 4));
        assert!(matches!(tokens[3], Token::Bond(BondToken::Single, _)));
        assert!(matches!(tokens[7], Token::Bond(BondToken::Single, _)));
    }

    #[test]
    fn errors() {
        assert!(matches!(
            tokenize("C$"),
            Err(SmilesError::UnexpectedChar { pos: 1, ch: '$' })
        ));
        assert!(matches!(
            tokenize("[CH4"),
            Err(SmilesError::UnclosedBracket { pos: 0 })
        ));
        assert!(matches!(
            tokenize("[Xx]"),
            Err(SmilesError::InvalidElement { .. })
        ));
        assert!(tokenize("C%1").is_err());
        assert!(tokenize("Cé").is_err());
    }
}
