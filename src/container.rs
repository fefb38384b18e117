//! Logic containers: multi-valued signals encoded as one or two solver literals

use std::fmt;
use std::hash::Hash;
use std::ops::Not;
use std::str::FromStr;

use crate::{Literal, Logic};

/// Encoding of a multi-valued logic signal into solver literals
///
/// Bit 0 of a pattern is the value of literal `l0`, bit 1 the value of `l1`.
///
/// | Encoding      | U  | 0  | 1  | X  |
/// |---------------|----|----|----|----|
/// | `01`          |    | 0  | 1  |    |
/// | `01X`, `01F`  |    | 01 | 10 | 00 |
/// | `U01X`, `U01F`| 00 | 01 | 10 | 11 |
///
/// The pattern `11` is unused by `01X` and `01F`, and forbidden by a clause when a container is
/// created. The `F` variants are *forgetful*: gate outputs may lose a 0/1 value and become X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicEncoding {
    /// Boolean values only
    L01,
    /// Boolean values and don't care
    L01X,
    /// Boolean values and don't care, with forgetful gates
    L01F,
    /// Boolean values, don't care and unknown
    U01X,
    /// Boolean values, don't care and unknown, with forgetful gates
    U01F,
}

impl LogicEncoding {
    /// All encodings
    pub const ALL: [LogicEncoding; 5] = [
        LogicEncoding::L01,
        LogicEncoding::L01X,
        LogicEncoding::L01F,
        LogicEncoding::U01X,
        LogicEncoding::U01F,
    ];

    /// Name of the encoding
    pub fn name(self) -> &'static str {
        match self {
            LogicEncoding::L01 => "01",
            LogicEncoding::L01X => "01X",
            LogicEncoding::L01F => "01F",
            LogicEncoding::U01X => "U01X",
            LogicEncoding::U01F => "U01F",
        }
    }

    /// Number of literals used by a container
    pub fn width(self) -> usize {
        match self {
            LogicEncoding::L01 => 1,
            _ => 2,
        }
    }

    /// Values that can be represented, in table order
    pub fn values(self) -> &'static [Logic] {
        match self {
            LogicEncoding::L01 => &[Logic::Zero, Logic::One],
            LogicEncoding::L01X | LogicEncoding::L01F => {
                &[Logic::DontCare, Logic::Zero, Logic::One]
            }
            LogicEncoding::U01X | LogicEncoding::U01F => {
                &[Logic::Unknown, Logic::Zero, Logic::One, Logic::DontCare]
            }
        }
    }

    /// Returns true if the value can be represented
    pub fn supports(self, value: Logic) -> bool {
        self.values().contains(&value)
    }

    /// Returns true for the encodings whose gates may forget 0/1 values
    pub fn is_forgetful(self) -> bool {
        matches!(self, LogicEncoding::L01F | LogicEncoding::U01F)
    }

    /// Literal pattern of a value, or None if the value cannot be represented
    pub fn pattern(self, value: Logic) -> Option<u32> {
        use Logic::*;
        match (self, value) {
            (LogicEncoding::L01, Zero) => Some(0b0),
            (LogicEncoding::L01, One) => Some(0b1),
            (LogicEncoding::L01, _) => None,
            (_, Zero) => Some(0b01),
            (_, One) => Some(0b10),
            (LogicEncoding::L01X | LogicEncoding::L01F, DontCare) => Some(0b00),
            (LogicEncoding::U01X | LogicEncoding::U01F, DontCare) => Some(0b11),
            (LogicEncoding::U01X | LogicEncoding::U01F, Unknown) => Some(0b00),
            _ => None,
        }
    }

    /// Value of a literal pattern; [`Logic::Invalid`] for unused patterns
    pub fn decode(self, pattern: u32) -> Logic {
        self.values()
            .iter()
            .copied()
            .find(|v| self.pattern(*v) == Some(pattern))
            .unwrap_or(Logic::Invalid)
    }

    /// Value of a tristate output that is not driven
    pub fn high_impedance(self) -> Logic {
        match self {
            LogicEncoding::L01 => Logic::Zero,
            LogicEncoding::L01X | LogicEncoding::L01F => Logic::DontCare,
            LogicEncoding::U01X | LogicEncoding::U01F => Logic::Unknown,
        }
    }
}

impl fmt::Display for LogicEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LogicEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicEncoding::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown logic encoding {s}, expected one of 01, 01X, 01F, U01X, U01F"))
    }
}

/// A multi-valued signal, represented by one or two literals
///
/// Containers are plain values: copying one does not allocate anything in the solver.
/// Negating a container inverts the logic value it represents.
pub trait LogicContainer:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Not<Output = Self>
{
    /// Encoding used by this container type
    const ENCODING: LogicEncoding;

    /// Literal at a given bit of the encoding
    fn literal(&self, bit: usize) -> Literal;

    /// Build a container from its literals, given bit by bit
    fn from_fn<F: FnMut(usize) -> Literal>(f: F) -> Self;

    /// Number of literals in the container
    fn width() -> usize {
        Self::ENCODING.width()
    }

    /// All literals of the container, starting with bit 0
    fn literals(&self) -> Vec<Literal> {
        (0..Self::width()).map(|b| self.literal(b)).collect()
    }

    /// Returns true if all literals are set
    fn is_set(&self) -> bool {
        (0..Self::width()).all(|b| self.literal(b).is_set())
    }

    /// Build the constant container for a value, or None if the value cannot be represented
    fn constant(value: Logic) -> Option<Self> {
        let pattern = Self::ENCODING.pattern(value)?;
        Some(Self::from_fn(|b| Literal::from((pattern >> b) & 1 != 0)))
    }
}

/// Boolean container: the literal is the value
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogicContainer01 {
    /// Value literal
    pub l0: Literal,
}

impl LogicContainer01 {
    /// Wrap an existing literal
    pub fn new(l0: Literal) -> Self {
        LogicContainer01 { l0 }
    }
}

impl LogicContainer for LogicContainer01 {
    const ENCODING: LogicEncoding = LogicEncoding::L01;

    fn literal(&self, bit: usize) -> Literal {
        assert_eq!(bit, 0, "Container {self} has a single literal");
        self.l0
    }

    fn from_fn<F: FnMut(usize) -> Literal>(mut f: F) -> Self {
        LogicContainer01 { l0: f(0) }
    }
}

impl Not for LogicContainer01 {
    type Output = LogicContainer01;
    fn not(self) -> LogicContainer01 {
        LogicContainer01 { l0: !self.l0 }
    }
}

impl fmt::Display for LogicContainer01 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "01({})", self.l0)
    }
}

impl fmt::Debug for LogicContainer01 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

macro_rules! two_bit_container {
    ($(#[$doc:meta])* $name:ident, $encoding:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name {
            /// Literal for bit 0 of the pattern
            pub l0: Literal,
            /// Literal for bit 1 of the pattern
            pub l1: Literal,
        }

        impl $name {
            /// Wrap existing literals
            pub fn new(l1: Literal, l0: Literal) -> Self {
                $name { l0, l1 }
            }
        }

        impl LogicContainer for $name {
            const ENCODING: LogicEncoding = $encoding;

            fn literal(&self, bit: usize) -> Literal {
                match bit {
                    0 => self.l0,
                    1 => self.l1,
                    _ => panic!("Container {self} has no literal {bit}"),
                }
            }

            fn from_fn<F: FnMut(usize) -> Literal>(mut f: F) -> Self {
                let l0 = f(0);
                let l1 = f(1);
                $name { l0, l1 }
            }
        }

        impl Not for $name {
            type Output = $name;
            fn not(self) -> $name {
                $name {
                    l0: self.l1,
                    l1: self.l0,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}, {})", Self::ENCODING, self.l1, self.l0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

two_bit_container!(
    /// Container for 0, 1 and X
    LogicContainer01X,
    LogicEncoding::L01X
);
two_bit_container!(
    /// Container for 0, 1 and X, whose gate outputs may forget 0/1 values
    LogicContainer01F,
    LogicEncoding::L01F
);
two_bit_container!(
    /// Container for U, 0, 1 and X
    LogicContainerU01X,
    LogicEncoding::U01X
);
two_bit_container!(
    /// Container for U, 0, 1 and X, whose gate outputs may forget 0/1 values
    LogicContainerU01F,
    LogicEncoding::U01F
);
