use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::element::Element;
use crate::mol::Mol;

use super::error::SmartsError;
use super::query::{AtomExpr, BondExpr};

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    input: &'a str,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            input,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn expect(&mut self, ch: char) -> Result<(), SmartsError> {
        match self.advance() {
            Some(c) if c == ch => Ok(()),
            Some(c) => Err(SmartsError::UnexpectedChar {
                pos: self.pos - 1,
                ch: c,
            }),
            None => Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: format!("expected '{ch}', got end of input"),
            }),
        }
    }

    fn parse_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos > start {
            let s: String = self.chars[start..self.pos].iter().collect();
            s.parse().ok()
        } else {
            None
        }
    }

    fn small_number(&mut self, default: u8) -> Result<u8, SmartsError> {
        let at = self.pos;
        match self.parse_number() {
            None => Ok(default),
            Some(n) => u8::try_from(n).map_err(|_| SmartsError::InvalidSmarts {
                pos: at,
                msg: format!("count {n} out of range"),
            }),
        }
    }

    fn parse_smarts(&mut self) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
        let mut mol = Mol::new();
        let mut stack: Vec<(NodeIndex, Option<BondExpr>)> = Vec::new();
        let mut current: Option<NodeIndex> = None;
        let mut pending_bond: Option<BondExpr> = None;
        let mut ring_map: HashMap<u16, (NodeIndex, Option<BondExpr>)> = HashMap::new();

        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    let Some(cur) = current else {
                        return Err(SmartsError::UnmatchedParen { pos: self.pos });
                    };
                    self.pos += 1;
                    stack.push((cur, pending_bond.take()));
                }
                ')' => {
                    let Some((prev, saved_bond)) = stack.pop() else {
                        return Err(SmartsError::UnmatchedParen { pos: self.pos });
                    };
                    self.pos += 1;
                    current = Some(prev);
                    pending_bond = saved_bond;
                }
                '.' => {
                    if pending_bond.is_some() || !stack.is_empty() {
                        return Err(SmartsError::UnexpectedChar { pos: self.pos, ch });
                    }
                    self.pos += 1;
                    current = None;
                }
                '-' | '=' | '#' | '~' | ':' | '/' | '\\' | '@' | '!' => {
                    if pending_bond.is_some() || current.is_none() {
                        return Err(SmartsError::InvalidSmarts {
                            pos: self.pos,
                            msg: "bond without a preceding atom".into(),
                        });
                    }
                    pending_bond = Some(self.parse_bond_expr()?);
                }
                '0'..='9' | '%' => {
                    let at = self.pos;
                    let digit = self.parse_ring_closure()?;
                    let Some(cur) = current else {
                        return Err(SmartsError::InvalidSmarts {
                            pos: at,
                            msg: "ring closure without preceding atom".into(),
                        });
                    };
                    if let Some((other, saved_bond)) = ring_map.remove(&digit) {
                        if other == cur || mol.bond_between(cur, other).is_some() {
                            return Err(SmartsError::InvalidSmarts {
                                pos: at,
                                msg: format!("ring closure {digit} duplicates a bond"),
                            });
                        }
                        let bond = pending_bond
                            .take()
                            .or(saved_bond)
                            .unwrap_or(BondExpr::SingleOrAromatic);
                        mol.add_bond(cur, other, bond);
                    } else {
                        ring_map.insert(digit, (cur, pending_bond.take()));
                    }
                }
                _ => {
                    let atom_expr = if ch == '[' {
                        self.parse_bracket_atom()?
                    } else {
                        self.parse_bare_atom()?
                    };
                    let idx = mol.add_atom(atom_expr);
                    if let Some(prev) = current {
                        let bond = pending_bond.take().unwrap_or(BondExpr::SingleOrAromatic);
                        mol.add_bond(prev, idx, bond);
                    }
                    current = Some(idx);
                }
            }
        }

        if pending_bond.is_some() {
            return Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "dangling bond".into(),
            });
        }
        if !stack.is_empty() {
            return Err(SmartsError::UnmatchedParen { pos: self.pos });
        }
        if let Some(&digit) = ring_map.keys().min() {
            return Err(SmartsError::UnclosedRing { digit });
        }
        Ok(mol)
    }

    fn parse_ring_closure(&mut self) -> Result<u16, SmartsError> {
        let start = self.pos;
        if self.advance() == Some('%') {
            let hi = self.advance().and_then(|c| c.to_digit(10));
            let lo = self.advance().and_then(|c| c.to_digit(10));
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi * 10 + lo) as u16),
                _ => Err(SmartsError::InvalidSmarts {
                    pos: start,
                    msg: "expected two digits after %".into(),
                }),
            }
        } else {
            Ok(self.chars[start].to_digit(10).unwrap_or(0) as u16)
        }
    }

    // Bond expressions use the same precedence as atom expressions:
    // `!` binds tightest, then implicit or explicit `&`, then `,`, then `;`.

    fn parse_bond_expr(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_or()?];
        while self.peek() == Some(';') {
            self.pos += 1;
            parts.push(self.parse_bond_or()?);
        }
        Ok(flatten_bond_and(parts))
    }

    fn parse_bond_or(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_and()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            parts.push(self.parse_bond_and()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            BondExpr::Or(parts)
        })
    }

    fn parse_bond_and(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                Some('&') => self.pos += 1,
                Some('-' | '=' | '#' | '~' | ':' | '/' | '\\' | '@' | '!') => {
                    parts.push(self.parse_bond_not()?);
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "expected bond primitive".into(),
            });
        }
        Ok(flatten_bond_and(parts))
    }

    fn parse_bond_not(&mut self) -> Result<BondExpr, SmartsError> {
        if self.peek() == Some('!') {
            self.pos += 1;
            return Ok(BondExpr::Not(Box::new(self.parse_bond_not()?)));
        }
        let at = self.pos;
        match self.advance() {
            Some('-' | '/' | '\\') => Ok(BondExpr::Single),
            Some('=') => Ok(BondExpr::Double),
            Some('#') => Ok(BondExpr::Triple),
            Some('~') => Ok(BondExpr::True),
            Some(':') => Ok(BondExpr::Aromatic),
            Some('@') => Ok(BondExpr::Ring),
            Some(ch) => Err(SmartsError::UnexpectedChar { pos: at, ch }),
            None => Err(SmartsError::InvalidSmarts {
                pos: at,
                msg: "expected bond primitive".into(),
            }),
        }
    }

    fn parse_bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.chars[self.pos];

        if ch == '*' {
            self.pos += 1;
            return Ok(AtomExpr::True);
        }
        if ch == 'A' && !self.chars.get(self.pos + 1).is_some_and(|c| c.is_ascii_lowercase()) {
            self.pos += 1;
            return Ok(AtomExpr::Aliphatic);
        }
        if ch == 'a' {
            self.pos += 1;
            return Ok(AtomExpr::Aromatic);
        }

        self.parse_bare_element()
            .map_err(|_| SmartsError::UnexpectedChar { pos: start, ch })
    }

    fn parse_bare_element(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.chars[self.pos];

        const AROMATIC_BARE: [(char, u8); 6] =
            [('b', 5), ('c', 6), ('n', 7), ('o', 8), ('s', 16), ('p', 15)];
        if let Some(&(_, num)) = AROMATIC_BARE.iter().find(|(sym, _)| *sym == ch) {
            self.pos += 1;
            return Ok(AtomExpr::Element {
                atomic_num: num,
                aromatic: Some(true),
            });
        }

        // Outside brackets only the organic subset is written bare.
        if ch.is_ascii_uppercase() {
            self.pos += 1;
            if let Some(next) = self.peek().filter(|c| c.is_ascii_lowercase()) {
                let two: String = [ch, next].iter().collect();
                if let Some(elem) = Element::from_symbol(&two).filter(|e| e.is_organic_subset()) {
                    self.pos += 1;
                    return Ok(aliphatic(elem));
                }
            }
            if let Some(elem) = Element::from_symbol(&ch.to_string()).filter(|e| e.is_organic_subset())
            {
                return Ok(aliphatic(elem));
            }
            self.pos = start;
        }

        Err(SmartsError::UnexpectedChar { pos: start, ch })
    }

    fn parse_bracket_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let bracket_start = self.pos;
        self.expect('[')?;

        let mut expr = self.parse_semicolon_expr()?;

        if self.peek() == Some(':') {
            self.pos += 1;
            let at = self.pos;
            let class = self
                .parse_number()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or(SmartsError::InvalidSmarts {
                    pos: at,
                    msg: "expected atom map number".into(),
                })?;
            expr = flatten_and(vec![expr, AtomExpr::AtomMapClass(class)]);
        }

        if self.peek() != Some(']') {
            return Err(SmartsError::UnclosedBracket { pos: bracket_start });
        }
        self.pos += 1;

        Ok(expr)
    }

    fn parse_semicolon_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_comma_expr()?];
        while self.peek() == Some(';') {
            self.pos += 1;
            parts.push(self.parse_comma_expr()?);
        }
        Ok(flatten_and(parts))
    }

    fn parse_comma_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_high_and_expr()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            parts.push(self.parse_high_and_expr()?);
        }
        Ok(flatten_or(parts))
    }

    fn parse_high_and_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = Vec::new();
        while let Some(ch) = self.peek() {
            match ch {
                ']' | ',' | ';' | ':' => break,
                '&' => self.pos += 1,
                _ => parts.push(self.parse_not_expr()?),
            }
        }
        if parts.is_empty() {
            Ok(AtomExpr::True)
        } else {
            Ok(flatten_and(parts))
        }
    }

    fn parse_not_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        if self.peek() == Some('!') {
            self.pos += 1;
            let inner = self.parse_not_expr()?;
            Ok(AtomExpr::Not(Box::new(inner)))
        } else {
            self.parse_primitive()
        }
    }

    fn parse_primitive(&mut self) -> Result<AtomExpr, SmartsError> {
        let Some(ch) = self.peek() else {
            return Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "expected atom primitive".into(),
            });
        };

        match ch {
            '*' => {
                self.pos += 1;
                Ok(AtomExpr::True)
            }
            'A' if !self.chars.get(self.pos + 1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.pos += 1;
                Ok(AtomExpr::Aliphatic)
            }
            'a' if self.chars.get(self.pos + 1) != Some(&'s') => {
                self.pos += 1;
                Ok(AtomExpr::Aromatic)
            }
            '#' => {
                self.pos += 1;
                let num = self
                    .parse_number()
                    .filter(|n| (1..=118).contains(n))
                    .ok_or(SmartsError::InvalidAtomicNum { pos: self.pos })?;
                Ok(AtomExpr::Element {
                    atomic_num: num as u8,
                    aromatic: None,
                })
            }
            'D' => {
                self.pos += 1;
                Ok(AtomExpr::Degree(self.small_number(1)?))
            }
            'v' => {
                self.pos += 1;
                Ok(AtomExpr::Valence(self.small_number(1)?))
            }
            'X' => {
                self.pos += 1;
                Ok(AtomExpr::Connectivity(self.small_number(1)?))
            }
            'H' if self.chars.get(self.pos + 1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.parse_bracket_element()
            }
            'H' if self.is_hydrogen_element_context() => {
                self.pos += 1;
                Ok(aliphatic(Element::H))
            }
            'H' => {
                self.pos += 1;
                Ok(AtomExpr::TotalHCount(self.small_number(1)?))
            }
            'h' => {
                self.pos += 1;
                Ok(AtomExpr::ImplicitHCount(self.small_number(1)?))
            }
            'R' | 'r' => {
                self.pos += 1;
                if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Ok(AtomExpr::InRing);
                }
                match (ch, self.small_number(0)?) {
                    (_, 0) => Ok(AtomExpr::NotInRing),
                    ('R', n) => Ok(AtomExpr::RingMembership(n)),
                    (_, n) => Ok(AtomExpr::SmallestRingSize(n)),
                }
            }
            'x' => {
                self.pos += 1;
                Ok(AtomExpr::RingBondCount(self.small_number(1)?))
            }
            '@' => {
                // Stereo is not modelled; chirality marks always match.
                while self.peek() == Some('@') {
                    self.pos += 1;
                }
                Ok(AtomExpr::True)
            }
            '+' | '-' => Ok(AtomExpr::Charge(self.parse_charge(ch)?)),
            '$' => {
                self.pos += 1;
                if self.peek() != Some('(') {
                    return Err(SmartsError::UnclosedRecursive { pos: self.pos });
                }
                self.pos += 1;
                let inner = self.extract_balanced_parens()?;
                Ok(AtomExpr::Recursive(Box::new(parse(inner)?)))
            }
            _ if ch.is_ascii_alphabetic() => self.parse_bracket_element(),
            _ if ch.is_ascii_digit() => {
                let at = self.pos;
                let iso = self
                    .parse_number()
                    .and_then(|n| u16::try_from(n).ok())
                    .ok_or(SmartsError::InvalidSmarts {
                        pos: at,
                        msg: "isotope out of range".into(),
                    })?;
                Ok(AtomExpr::Isotope(iso))
            }
            _ => Err(SmartsError::UnexpectedChar { pos: self.pos, ch }),
        }
    }

    /// `+`, `+2`, `++`, `-`, `-3`, `--`, and `+0`.
    fn parse_charge(&mut self, sign: char) -> Result<i8, SmartsError> {
        let at = self.pos;
        self.pos += 1;
        let magnitude = match self.parse_number() {
            Some(n) => n,
            None => {
                let mut n = 1;
                while self.peek() == Some(sign) {
                    self.pos += 1;
                    n += 1;
                }
                n
            }
        };
        let magnitude = i8::try_from(magnitude)
            .ok()
            .filter(|m| *m <= 15)
            .ok_or(SmartsError::InvalidSmarts {
                pos: at,
                msg: "charge out of range".into(),
            })?;
        Ok(if sign == '-' { -magnitude } else { magnitude })
    }

    /// `[H]`, `[2H]` and `[H+]` name hydrogen itself; elsewhere `H` is a count.
    fn is_hydrogen_element_context(&self) -> bool {
        let mut start = self.pos;
        while start > 0 && self.chars[start - 1] != '[' {
            start -= 1;
        }
        let before_is_isotope = self.chars[start..self.pos].iter().all(|c| c.is_ascii_digit());
        let after = self.chars.get(self.pos + 1).copied();
        before_is_isotope && matches!(after, Some(']' | '+' | '-' | ':'))
    }

    fn parse_bracket_element(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.chars[self.pos];

        const AROMATIC_BRACKET: [(&str, u8); 10] = [
            ("se", 34),
            ("te", 52),
            ("as", 33),
            ("si", 14),
            ("b", 5),
            ("c", 6),
            ("n", 7),
            ("o", 8),
            ("p", 15),
            ("s", 16),
        ];

        if ch.is_ascii_lowercase() {
            for &(sym, num) in &AROMATIC_BRACKET {
                if self.matches_str(sym) {
                    self.pos += sym.len();
                    return Ok(AtomExpr::Element {
                        atomic_num: num,
                        aromatic: Some(true),
                    });
                }
            }
            return Err(SmartsError::UnexpectedChar { pos: start, ch });
        }

        self.pos += 1;
        if let Some(next) = self.peek().filter(|c| c.is_ascii_lowercase()) {
            let two: String = [ch, next].iter().collect();
            if let Some(elem) = Element::from_symbol(&two) {
                self.pos += 1;
                return Ok(aliphatic(elem));
            }
        }
        if let Some(elem) = Element::from_symbol(&ch.to_string()) {
            return Ok(aliphatic(elem));
        }

        self.pos = start;
        Err(SmartsError::UnexpectedChar { pos: start, ch })
    }

    fn matches_str(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    /// Consume up to the `)` that closes an already consumed `(` and return
    /// the text in between.
    fn extract_balanced_parens(&mut self) -> Result<&'a str, SmartsError> {
        let start_pos = self.pos;
        let begin_byte: usize = self.chars[..self.pos].iter().map(|c| c.len_utf8()).sum();
        let mut depth = 1;

        while let Some(ch) = self.advance() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let len: usize = self.chars[start_pos..self.pos - 1]
                            .iter()
                            .map(|c| c.len_utf8())
                            .sum();
                        return Ok(&self.input[begin_byte..begin_byte + len]);
                    }
                }
                _ => {}
            }
        }

        Err(SmartsError::UnclosedRecursive { pos: start_pos })
    }
}

fn aliphatic(elem: Element) -> AtomExpr {
    AtomExpr::Element {
        atomic_num: elem.atomic_num(),
        aromatic: Some(false),
    }
}

fn flatten_and(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            AtomExpr::And(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    flattened.retain(|e| *e != AtomExpr::True);
    match flattened.len() {
        0 => AtomExpr::True,
        1 => flattened.remove(0),
        _ => AtomExpr::And(flattened),
    }
}

fn flatten_or(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            AtomExpr::Or(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    if flattened.len() == 1 {
        flattened.remove(0)
    } else {
        AtomExpr::Or(flattened)
    }
}

fn flatten_bond_and(parts: Vec<BondExpr>) -> BondExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            BondExpr::And(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    if flattened.len() == 1 {
        flattened.remove(0)
    } else {
        BondExpr::And(flattened)
    }
}

pub fn parse(input: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmartsError::EmptyInput);
    }
    Parser::new(trimmed).parse_smarts()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn element(atomic_num: u8, aromatic: bool) -> AtomExpr {
        AtomExpr::Element {
            atomic_num,
            aromatic: Some(aromatic),
        }
    }

    #[test]
    fn bare_atoms_and_default_bonds() {
        let mol = parse("CcN").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(*mol.atom(n(1)), element(6, true));
        let e = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(*mol.bond(e), BondExpr::SingleOrAromatic);
    }

    #[test]
    fn bracket_precedence() {
        let expr = parse("[c,n;H0]").unwrap().atom(n(0)).clone();
        assert_eq!(
            expr,
            AtomExpr::And(vec![
                AtomExpr::Or(vec![element(6, true), element(7, true)]),
                AtomExpr::TotalHCount(0),
            ])
        );
    }

    #[test]
    fn template_atom_with_map_class() {
        let mol = parse("[c;H0;D3;+0:1]").unwrap();
        assert_eq!(
            *mol.atom(n(0)),
            AtomExpr::And(vec![
                element(6, true),
                AtomExpr::TotalHCount(0),
                AtomExpr::Degree(3),
                AtomExpr::Charge(0),
                AtomExpr::AtomMapClass(1),
            ])
        );
        let mol = parse("[NH2;D1;+0:4]").unwrap();
        assert_eq!(mol.atom(n(0)).map_class(), Some(4));
        assert_eq!(mol.atom(n(0)).stated_hydrogens(), Some(2));
    }

    #[test]
    fn halogen_list() {
        let mol = parse("[F,Cl,Br,I]-c").unwrap();
        assert_eq!(
            *mol.atom(n(0)),
            AtomExpr::Or(vec![
                element(9, false),
                element(17, false),
                element(35, false),
                element(53, false),
            ])
        );
        let e = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(*mol.bond(e), BondExpr::Single);
    }

    #[test]
    fn charges() {
        let charge = |s: &str| parse(s).unwrap().atom(n(0)).stated_charge();
        assert_eq!(charge("[N+]"), Some(1));
        assert_eq!(charge("[O--]"), Some(-2));
        assert_eq!(charge("[Fe+3]"), Some(3));
        assert_eq!(charge("[C+0]"), Some(0));
    }

    #[test]
    fn hydrogen_element_vs_count() {
        assert_eq!(*parse("[H]").unwrap().atom(n(0)), element(1, false));
        assert_eq!(
            *parse("[2H]").unwrap().atom(n(0)),
            AtomExpr::And(vec![AtomExpr::Isotope(2), element(1, false)])
        );
        assert_eq!(*parse("[Hg]").unwrap().atom(n(0)), element(80, false));
        assert_eq!(
            *parse("[CH3]").unwrap().atom(n(0)),
            AtomExpr::And(vec![element(6, false), AtomExpr::TotalHCount(3)])
        );
    }

    #[test]
    fn bond_logic() {
        let mol = parse("C-;!@C").unwrap();
        let e = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(
            *mol.bond(e),
            BondExpr::And(vec![BondExpr::Single, BondExpr::Not(Box::new(BondExpr::Ring))])
        );
        let mol = parse("C=,#C").unwrap();
        let e = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(*mol.bond(e), BondExpr::Or(vec![BondExpr::Double, BondExpr::Triple]));
    }

    #[test]
    fn rings_and_branches() {
        let mol = parse("c1ccccc1C(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 9);
        assert_eq!(mol.bond_count(), 9);
        let mol = parse("C%12CC%12").unwrap();
        assert_eq!(mol.bond_count(), 3);
    }

    #[test]
    fn recursive() {
        let mol = parse("[$(CO)]").unwrap();
        match mol.atom(n(0)) {
            AtomExpr::Recursive(inner) => assert_eq!(inner.atom_count(), 2),
            other => panic!("expected recursive, got {other:?}"),
        }
    }

    #[test]
    fn components() {
        let mol = parse("[Br].[NH2]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn errors() {
        assert_eq!(parse(""), Err(SmartsError::EmptyInput));
        assert!(matches!(parse("[C"), Err(SmartsError::UnclosedBracket { .. })));
        assert!(matches!(parse("C1CC"), Err(SmartsError::UnclosedRing { digit: 1 })));
        assert!(matches!(parse("C(C"), Err(SmartsError::UnmatchedParen { .. })));
        assert!(matches!(parse("[#200]"), Err(SmartsError::InvalidAtomicNum { .. })));
        assert!(matches!(parse("[$(CC]"), Err(SmartsError::UnclosedRecursive { .. })));
        assert!(parse("C=").is_err());
        assert!(parse("Xx").is_err());
    }
}
