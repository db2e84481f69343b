use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[allow(non_snake_case)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    Unknown,
}

impl Display for Nucleotide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Nucleotide::A => write!(f, "A"),
            Nucleotide::C => write!(f, "C"),
            Nucleotide::G => write!(f, "G"),
            Nucleotide::T => write!(f, "T"),
            Nucleotide::Unknown => write!(f, "N"),
        }
    }
}

impl From<u8> for Nucleotide {
    fn from(symbol: u8) -> Self {
        match symbol {
            b'A' | b'a' => Nucleotide::A,
            b'C' | b'c' => Nucleotide::C,
            b'G' | b'g' => Nucleotide::G,
            b'T' | b't' => Nucleotide::T,
            _ => Nucleotide::Unknown,
        }
    }
}

/// True for unambiguous bases, upper or lower case.
#[inline]
pub fn is_regular(base: u8) -> bool {
    matches!(base, b'A' | b'a' | b'C' | b'c' | b'G' | b'g' | b'T' | b't')
}

/// Case-insensitive base identity. From the SAM specification: no assumptions
/// can be made on the letter cases.
#[inline]
pub fn same_base(lhs: u8, rhs: u8) -> bool {
    lhs.eq_ignore_ascii_case(&rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol() {
        for (symbol, expected) in [
            (b'A', Nucleotide::A),
            (b'a', Nucleotide::A),
            (b'c', Nucleotide::C),
            (b'G', Nucleotide::G),
            (b't', Nucleotide::T),
            (b'N', Nucleotide::Unknown),
            (b'-', Nucleotide::Unknown),
        ] {
            assert_eq!(Nucleotide::from(symbol), expected);
        }
    }

    #[test]
    fn regular() {
        assert!(b"ACGTacgt".iter().all(|&x| is_regular(x)));
        assert!(b"NnXx*-".iter().all(|&x| !is_regular(x)));
    }

    #[test]
    fn base_identity() {
        assert!(same_base(b'a', b'A'));
        assert!(same_base(b'T', b't'));
        assert!(!same_base(b'A', b'G'));
    }
}
