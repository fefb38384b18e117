//! Multi-valued logic values and value-set constraints

use std::fmt;

/// A multi-valued logic value as used for circuit signals
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Logic {
    /// Not a valid value (unsupported by the encoding, or not constant)
    Invalid,
    /// Value not determined yet
    Unknown,
    /// Boolean zero
    Zero,
    /// Boolean one
    One,
    /// Unconstrained value
    DontCare,
}

impl Logic {
    /// All values, including the invalid one
    pub const ALL: [Logic; 5] = [
        Logic::Invalid,
        Logic::Unknown,
        Logic::Zero,
        Logic::One,
        Logic::DontCare,
    ];

    /// Character representation of the value
    pub fn to_char(self) -> char {
        match self {
            Logic::Invalid => '-',
            Logic::Unknown => 'U',
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::DontCare => 'X',
        }
    }

    /// Parse a value from its character representation
    ///
    /// Unrecognized characters map to [`Logic::Invalid`].
    pub fn from_char(c: char) -> Logic {
        match c {
            'U' | 'u' => Logic::Unknown,
            '0' => Logic::Zero,
            '1' => Logic::One,
            'X' | 'x' => Logic::DontCare,
            _ => Logic::Invalid,
        }
    }

    /// Value of a boolean
    pub fn from_bool(b: bool) -> Logic {
        if b {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Logic inversion: zero and one are swapped, other values are kept
    pub fn invert(self) -> Logic {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            v => v,
        }
    }

    /// Returns true for zero and one
    pub fn is_valid_01(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }

    /// Returns true for zero, one and don't care
    pub fn is_valid_01x(self) -> bool {
        matches!(self, Logic::Zero | Logic::One | Logic::DontCare)
    }

    /// Returns true for zero, one, don't care and unknown
    pub fn is_valid_u01x(self) -> bool {
        self != Logic::Invalid
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parse a sequence of values, one character per value
pub fn logic_from_str(s: &str) -> Vec<Logic> {
    s.chars().map(Logic::from_char).collect()
}

/// Format a sequence of values, one character per value
pub fn logic_to_string(values: &[Logic]) -> String {
    values.iter().map(|v| v.to_char()).collect()
}

/// A constraint on the set of values a signal may take
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicConstraint {
    /// Any value
    NoConstraint,
    /// Anything but zero
    NotLogicZero,
    /// Anything but one
    NotLogicOne,
    /// Anything but don't care
    NotLogicDontCare,
    /// Anything but unknown
    NotLogicUnknown,
    /// Zero only
    OnlyLogicZero,
    /// One only
    OnlyLogicOne,
    /// Don't care only
    OnlyLogicDontCare,
    /// Unknown only
    OnlyLogicUnknown,
    /// Zero or one
    OnlyLogic01,
    /// Zero, one or don't care
    OnlyLogic01X,
}

impl LogicConstraint {
    /// All constraints, in the order of their character codes `*=!KL01XUNV`
    pub const ALL: [LogicConstraint; 11] = [
        LogicConstraint::NoConstraint,
        LogicConstraint::NotLogicZero,
        LogicConstraint::NotLogicOne,
        LogicConstraint::NotLogicDontCare,
        LogicConstraint::NotLogicUnknown,
        LogicConstraint::OnlyLogicZero,
        LogicConstraint::OnlyLogicOne,
        LogicConstraint::OnlyLogicDontCare,
        LogicConstraint::OnlyLogicUnknown,
        LogicConstraint::OnlyLogic01,
        LogicConstraint::OnlyLogic01X,
    ];

    /// Character representation of the constraint
    pub fn to_char(self) -> char {
        use LogicConstraint::*;
        match self {
            NoConstraint => '*',
            NotLogicZero => '=',
            NotLogicOne => '!',
            NotLogicDontCare => 'K',
            NotLogicUnknown => 'L',
            OnlyLogicZero => '0',
            OnlyLogicOne => '1',
            OnlyLogicDontCare => 'X',
            OnlyLogicUnknown => 'U',
            OnlyLogic01 => 'N',
            OnlyLogic01X => 'V',
        }
    }

    /// Parse a constraint from its character representation
    pub fn from_char(c: char) -> Option<LogicConstraint> {
        LogicConstraint::ALL.into_iter().find(|l| l.to_char() == c)
    }

    /// Returns true if the value satisfies the constraint
    pub fn accepts(self, value: Logic) -> bool {
        use LogicConstraint::*;
        if value == Logic::Invalid {
            return false;
        }
        match self {
            NoConstraint => true,
            NotLogicZero => value != Logic::Zero,
            NotLogicOne => value != Logic::One,
            NotLogicDontCare => value != Logic::DontCare,
            NotLogicUnknown => value != Logic::Unknown,
            OnlyLogicZero => value == Logic::Zero,
            OnlyLogicOne => value == Logic::One,
            OnlyLogicDontCare => value == Logic::DontCare,
            OnlyLogicUnknown => value == Logic::Unknown,
            OnlyLogic01 => value.is_valid_01(),
            OnlyLogic01X => value.is_valid_01x(),
        }
    }
}

impl fmt::Display for LogicConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_conversion() {
        for v in Logic::ALL {
            assert_eq!(Logic::from_char(v.to_char()), v);
        }
        for c in LogicConstraint::ALL {
            assert_eq!(LogicConstraint::from_char(c.to_char()), Some(c));
        }
        assert_eq!(Logic::from_char('?'), Logic::Invalid);
        assert_eq!(LogicConstraint::from_char('?'), None);
        assert_eq!(logic_to_string(&logic_from_str("U01X")), "U01X");
    }

    #[test]
    fn test_invert() {
        assert_eq!(Logic::Zero.invert(), Logic::One);
        assert_eq!(Logic::One.invert(), Logic::Zero);
        assert_eq!(Logic::DontCare.invert(), Logic::DontCare);
        assert_eq!(Logic::Unknown.invert(), Logic::Unknown);
        assert_eq!(Logic::Invalid.invert(), Logic::Invalid);
    }

    #[test]
    fn test_validity() {
        assert!(Logic::Zero.is_valid_01());
        assert!(!Logic::DontCare.is_valid_01());
        assert!(Logic::DontCare.is_valid_01x());
        assert!(!Logic::Unknown.is_valid_01x());
        assert!(Logic::Unknown.is_valid_u01x());
        assert!(!Logic::Invalid.is_valid_u01x());
    }

    #[test]
    fn test_constraint_table() {
        let rows = [
            (Logic::Unknown, "11110000100"),
            (Logic::Zero, "10111100011"),
            (Logic::One, "11011010011"),
            (Logic::DontCare, "11101001001"),
        ];
        for (value, expected) in rows {
            let got: String = LogicConstraint::ALL
                .iter()
                .map(|c| if c.accepts(value) { '1' } else { '0' })
                .collect();
            assert_eq!(got, expected, "constraint row for {value}");
        }
    }
}
