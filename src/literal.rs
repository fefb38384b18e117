use std::fmt;
use std::ops::{BitXor, BitXorAssign, Not};

/// Representation of a solver literal (a boolean variable or its complement)
///
/// The literal is packed in a single integer: the low bit is the negation flag, the upper bits hold
/// the variable index plus one. The raw value 0 is reserved for the undefined literal.
/// Variable 0 is the constant variable of every solver instance: its positive literal is the
/// constant true, its negation the constant false.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub struct Literal {
    a: u32,
}

impl Literal {
    /// Undefined literal, used for containers that were never allocated
    pub const fn undefined() -> Literal {
        Literal { a: 0 }
    }

    /// Constant true literal
    pub const fn one() -> Literal {
        Literal { a: 2 }
    }

    /// Constant false literal
    pub const fn zero() -> Literal {
        Literal { a: 3 }
    }

    /// Create the positive literal of a variable
    pub fn from_var(v: u32) -> Literal {
        assert!(v < 0x7fff_ffff, "Variable index {v} out of range");
        Literal { a: (v + 1) << 1 }
    }

    /// Create a literal from its DIMACS representation
    ///
    /// DIMACS variables are numbered from 1, so the constant variable is 1.
    pub fn from_dimacs(v: i32) -> Literal {
        assert!(v != 0, "DIMACS literal 0 is a clause terminator");
        Literal::from_var(v.unsigned_abs() - 1) ^ (v < 0)
    }

    /// Create a literal from its internal representation
    pub fn from_raw(a: u32) -> Literal {
        Literal { a }
    }

    /// Obtain the variable index associated with the literal
    pub fn var(&self) -> u32 {
        assert!(self.is_set(), "Undefined literal has no variable");
        (self.a >> 1) - 1
    }

    /// Obtain the DIMACS representation of the literal
    pub fn to_dimacs(&self) -> i32 {
        let v = self.var() as i32 + 1;
        if self.is_negated() {
            -v
        } else {
            v
        }
    }

    /// Returns true if the literal references a variable (or a constant)
    pub fn is_set(&self) -> bool {
        self.a > 1
    }

    /// Returns true if the literal is one of the two constants
    pub fn is_constant(&self) -> bool {
        self.a >> 1 == 1
    }

    /// Returns true if the literal is the complement of its variable
    pub fn is_negated(&self) -> bool {
        self.a & 1 != 0
    }

    /// Return the internal representation of the literal
    pub fn raw(&self) -> u32 {
        self.a
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Literal {
        if b {
            Literal::one()
        } else {
            Literal::zero()
        }
    }
}

impl Not for Literal {
    type Output = Literal;
    fn not(self) -> Literal {
        Literal { a: self.a ^ 1u32 }
    }
}

impl Not for &'_ Literal {
    type Output = Literal;
    fn not(self) -> Literal {
        Literal { a: self.a ^ 1u32 }
    }
}

impl BitXorAssign<bool> for Literal {
    fn bitxor_assign(&mut self, rhs: bool) {
        self.a ^= rhs as u32;
    }
}

impl BitXor<bool> for Literal {
    type Output = Literal;
    fn bitxor(self, rhs: bool) -> Self::Output {
        let mut l = self;
        l ^= rhs;
        l
    }
}

impl BitXor<bool> for &'_ Literal {
    type Output = Literal;
    fn bitxor(self, rhs: bool) -> Self::Output {
        *self ^ rhs
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_set() {
            write!(f, "##")
        } else if self.is_constant() {
            let v = !self.is_negated() as u32;
            write!(f, "{v}")
        } else {
            if self.is_negated() {
                write!(f, "!")?;
            }
            let v = self.var();
            write!(f, "x{v}")
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let l0 = Literal::zero();
        let l1 = Literal::one();
        assert_eq!(l0, !l1);
        assert_eq!(l1, !l0);
        assert!(l0.is_constant());
        assert!(l1.is_constant());
        assert!(l0.is_negated());
        assert!(!l1.is_negated());
        assert_eq!(l1.var(), 0);
        assert_eq!(format!("{l0}"), "0");
        assert_eq!(format!("{l1}"), "1");
    }

    #[test]
    fn test_undefined() {
        let l = Literal::undefined();
        assert!(!l.is_set());
        assert!(!l.is_constant());
        assert_eq!(l, Literal::default());
        assert_eq!(format!("{l}"), "##");
    }

    #[test]
    fn test_var() {
        for v in 1u32..10u32 {
            let l = Literal::from_var(v);
            assert!(l.is_set());
            assert!(!l.is_constant());
            assert_eq!(l.var(), v);
            assert_eq!((!l).var(), v);
            assert!(!l.is_negated());
            assert!((!l).is_negated());
            assert_eq!(l ^ false, l);
            assert_eq!(l ^ true, !l);
            assert_eq!(format!("{l}"), format!("x{v}"));
            assert_eq!(format!("{}", !l), format!("!x{v}"));
        }
    }

    #[test]
    fn test_dimacs() {
        assert_eq!(Literal::from_dimacs(1), Literal::one());
        assert_eq!(Literal::from_dimacs(-1), Literal::zero());
        assert_eq!(Literal::from_dimacs(2), Literal::from_var(1));
        assert_eq!(Literal::from_dimacs(-2), !Literal::from_var(1));
        assert_eq!(Literal::from_dimacs(3), Literal::from_var(2));
        assert_eq!(Literal::from_dimacs(-3), !Literal::from_var(2));
        for v in [-7, -2, -1, 1, 4, 12] {
            assert_eq!(Literal::from_dimacs(v).to_dimacs(), v);
        }
    }

    #[test]
    fn test_comparison() {
        assert_eq!(Literal::from(false), Literal::zero());
        assert_eq!(Literal::from(true), Literal::one());
        assert_ne!(Literal::from_var(1), Literal::one());
        assert_ne!(Literal::from_var(1), Literal::from_var(2));
        assert!(Literal::from_var(1) < Literal::from_var(2));
        assert_eq!(Literal::one() ^ true, Literal::zero());
        assert_eq!(Literal::from_raw(Literal::from_var(4).raw()), Literal::from_var(4));
    }
}
