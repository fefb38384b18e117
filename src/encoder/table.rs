//! Clause tables: CNF bodies of gates, detectors and requirements
//!
//! Each operation is described by its multi-valued semantics. For a given encoding, every input
//! pattern is classified as forbidden, or by the output bits it forces to one or to zero; unused
//! input patterns (`11` in `01X`) are don't cares. Each class is then covered with prime cubes,
//! and each selected cube becomes a clause.

use std::fmt;
use std::str::FromStr;

use volute::Lut;

use crate::{Logic, LogicConstraint, LogicEncoding};

/// Gate types available in the encoder
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GateKind {
    /// Copy of the input
    Buffer,
    /// Inversion of the input
    Inverter,
    /// And of two inputs
    And,
    /// Or of two inputs
    Or,
    /// Xor of two inputs
    Xor,
    /// Xnor of two inputs
    Xnor,
    /// Nand of two inputs
    Nand,
    /// Nor of two inputs
    Nor,
    /// Input driven to the output when enabled (in, en)
    TristateBuffer,
    /// Inverted input driven to the output when enabled (in, en)
    TristateInverter,
    /// Selection between two inputs (in1, in2, sel)
    Multiplexer,
    /// Output forced to one by a control input (in, set)
    SetControl,
    /// Output forced to zero by a control input (in, reset)
    ResetControl,
}

impl GateKind {
    /// All gates
    pub const ALL: [GateKind; 13] = [
        GateKind::Buffer,
        GateKind::Inverter,
        GateKind::And,
        GateKind::Or,
        GateKind::Xor,
        GateKind::Xnor,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::TristateBuffer,
        GateKind::TristateInverter,
        GateKind::Multiplexer,
        GateKind::SetControl,
        GateKind::ResetControl,
    ];

    /// Name of the gate, as parsed from the command line
    pub fn name(self) -> &'static str {
        use GateKind::*;
        match self {
            Buffer => "buffer",
            Inverter => "inverter",
            And => "and",
            Or => "or",
            Xor => "xor",
            Xnor => "xnor",
            Nand => "nand",
            Nor => "nor",
            TristateBuffer => "tristate-buffer",
            TristateInverter => "tristate-inverter",
            Multiplexer => "mux",
            SetControl => "set-control",
            ResetControl => "reset-control",
        }
    }

    /// Names of the inputs, in order
    pub fn input_names(self) -> &'static [&'static str] {
        use GateKind::*;
        match self {
            Buffer | Inverter => &["in"],
            And | Or | Xor | Xnor | Nand | Nor => &["in1", "in2"],
            TristateBuffer | TristateInverter => &["in", "en"],
            Multiplexer => &["in1", "in2", "sel"],
            SetControl => &["in", "set"],
            ResetControl => &["in", "reset"],
        }
    }

    /// Number of inputs
    pub fn arity(self) -> usize {
        self.input_names().len()
    }

    /// Returns true for the associative gates that accept any number of inputs
    pub fn is_nary(self) -> bool {
        use GateKind::*;
        matches!(self, And | Or | Xor | Xnor | Nand | Nor)
    }

    /// Output value for valid input values
    ///
    /// Undriven tristate outputs take the [high impedance value](LogicEncoding::high_impedance) of
    /// the encoding.
    pub fn evaluate(self, inputs: &[Logic], encoding: LogicEncoding) -> Logic {
        use GateKind::*;
        use Logic::*;
        assert_eq!(inputs.len(), self.arity(), "Wrong number of inputs for {self}");
        match self {
            Buffer => inputs[0],
            Inverter => inputs[0].invert(),
            And => and(inputs[0], inputs[1]),
            Or => or(inputs[0], inputs[1]),
            Xor => xor(inputs[0], inputs[1]),
            Nand => and(inputs[0], inputs[1]).invert(),
            Nor => or(inputs[0], inputs[1]).invert(),
            Xnor => xor(inputs[0], inputs[1]).invert(),
            TristateBuffer | TristateInverter => {
                let value = if self == TristateInverter {
                    inputs[0].invert()
                } else {
                    inputs[0]
                };
                match inputs[1] {
                    One => value,
                    Zero | DontCare => encoding.high_impedance(),
                    v => v,
                }
            }
            Multiplexer => match inputs[2] {
                Zero => inputs[0],
                One => inputs[1],
                v => v,
            },
            SetControl => match inputs[1] {
                Zero => inputs[0],
                One => One,
                v => v,
            },
            ResetControl => match inputs[1] {
                Zero => inputs[0],
                One => Zero,
                v => v,
            },
        }
    }
}

fn and(a: Logic, b: Logic) -> Logic {
    use Logic::*;
    match (a, b) {
        (Invalid, _) | (_, Invalid) => Invalid,
        (Zero, _) | (_, Zero) => Zero,
        (Unknown, _) | (_, Unknown) => Unknown,
        (DontCare, _) | (_, DontCare) => DontCare,
        _ => One,
    }
}

fn or(a: Logic, b: Logic) -> Logic {
    and(a.invert(), b.invert()).invert()
}

fn xor(a: Logic, b: Logic) -> Logic {
    use Logic::*;
    match (a, b) {
        (Invalid, _) | (_, Invalid) => Invalid,
        (Unknown, _) | (_, Unknown) => Unknown,
        (DontCare, _) | (_, DontCare) => DontCare,
        _ => Logic::from_bool(a != b),
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase().replace('_', "-");
        GateKind::ALL
            .into_iter()
            .find(|g| g.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = GateKind::ALL.iter().map(|g| g.name()).collect();
                format!("Unknown gate {s}, expected one of {}", names.join(", "))
            })
    }
}

/// Operations whose clauses are generated from a table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TableKind {
    Gate(GateKind),
    ValueDetector(Logic),
    ConstraintDetector(LogicConstraint),
    EquivalenceDetector,
    DifferenceDetector,
    ValueConstraint(LogicConstraint),
    DifferenceConstraint,
}

fn is_01_difference(a: Logic, b: Logic) -> bool {
    a.is_valid_01() && b.is_valid_01() && a != b
}

impl TableKind {
    pub fn arity(self) -> usize {
        use TableKind::*;
        match self {
            Gate(g) => g.arity(),
            ValueDetector(_) | ConstraintDetector(_) | ValueConstraint(_) => 1,
            EquivalenceDetector | DifferenceDetector | DifferenceConstraint => 2,
        }
    }

    /// Number of output literals
    pub fn output_width(self, encoding: LogicEncoding) -> usize {
        use TableKind::*;
        match self {
            Gate(_) => encoding.width(),
            ValueDetector(_) | ConstraintDetector(_) | EquivalenceDetector | DifferenceDetector => 1,
            ValueConstraint(_) | DifferenceConstraint => 0,
        }
    }

    /// Output patterns allowed for valid input values; empty if the inputs are forbidden
    pub fn allowed_outputs(self, inputs: &[Logic], encoding: LogicEncoding) -> Vec<u32> {
        use TableKind::*;
        let flag = |b: bool| vec![b as u32];
        let accept = |b: bool| if b { vec![0] } else { vec![] };
        match self {
            Gate(g) => {
                let exact = g.evaluate(inputs, encoding);
                let Some(p) = encoding.pattern(exact) else {
                    panic!("Gate {g} produces {exact} which is not supported by {encoding}");
                };
                match encoding.pattern(Logic::DontCare) {
                    Some(x) if encoding.is_forgetful() && exact.is_valid_01() => vec![p, x],
                    _ => vec![p],
                }
            }
            ValueDetector(v) => flag(inputs[0] == v),
            ConstraintDetector(c) => flag(c.accepts(inputs[0])),
            EquivalenceDetector => flag(inputs[0] == inputs[1]),
            DifferenceDetector => flag(is_01_difference(inputs[0], inputs[1])),
            ValueConstraint(c) => accept(c.accepts(inputs[0])),
            DifferenceConstraint => accept(is_01_difference(inputs[0], inputs[1])),
        }
    }
}

/// Literal slot of a table clause
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Bit `i % width` of input `i / width`
    Input(usize),
    /// Output bit
    Output(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TableLiteral {
    pub slot: Slot,
    pub negated: bool,
}

/// A product term over the input bits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cube {
    care: u32,
    value: u32,
}

impl Cube {
    fn contains(&self, mask: u32) -> bool {
        mask & self.care == self.value
    }

    /// Clause literals excluding this cube
    fn negation(&self, nb_inputs: usize) -> Vec<TableLiteral> {
        (0..nb_inputs)
            .filter(|i| self.care >> i & 1 != 0)
            .map(|i| TableLiteral {
                slot: Slot::Input(i),
                negated: self.value >> i & 1 != 0,
            })
            .collect()
    }
}

/// Select prime cubes of `target ∪ dc` covering all minterms of `target`
///
/// Greedy selection: the prime covering the most uncovered minterms first, then the one with the
/// fewest literals.
fn cover(target: &Lut, dc: &Lut) -> Vec<Cube> {
    let n = target.num_vars();
    let nb_masks = target.num_bits() as u32;
    let allowed = |m: u32| target.value(m as usize) || dc.value(m as usize);
    let valid = |c: &Cube| (0..nb_masks).filter(|m| c.contains(*m)).all(|m| allowed(m));

    let mut primes = Vec::new();
    for care in 0..nb_masks {
        // Enumerate the submasks of care
        let mut value = care;
        loop {
            let c = Cube { care, value };
            let expandable = (0..n).filter(|b| care >> b & 1 != 0).any(|b| {
                valid(&Cube {
                    care: care & !(1 << b),
                    value: value & !(1 << b),
                })
            });
            if !expandable && valid(&c) {
                primes.push(c);
            }
            if value == 0 {
                break;
            }
            value = (value - 1) & care;
        }
    }

    let mut uncovered: Vec<u32> = (0..nb_masks).filter(|m| target.value(*m as usize)).collect();
    let mut ret = Vec::new();
    while !uncovered.is_empty() {
        let mut best: Option<(usize, u32, Cube)> = None;
        for p in &primes {
            let count = uncovered.iter().filter(|m| p.contains(**m)).count();
            let better = match best {
                None => count > 0,
                Some((c, care, _)) => {
                    count > c || (count == c && p.care.count_ones() < care.count_ones())
                }
            };
            if better {
                best = Some((count, p.care, *p));
            }
        }
        let Some((_, _, cube)) = best else {
            panic!("Minterms {uncovered:?} cannot be covered");
        };
        uncovered.retain(|m| !cube.contains(*m));
        ret.push(cube);
    }
    ret
}

/// Clauses of an operation for an encoding
#[derive(Clone, Debug)]
pub(crate) struct ClauseTable {
    kind: TableKind,
    encoding: LogicEncoding,
    forbidden: Lut,
    on: Vec<Lut>,
    off: Vec<Lut>,
    clauses: Vec<Vec<TableLiteral>>,
}

impl ClauseTable {
    pub fn new(kind: TableKind, encoding: LogicEncoding) -> ClauseTable {
        let width = encoding.width();
        let arity = kind.arity();
        let nb_inputs = arity * width;
        let nb_outputs = kind.output_width(encoding);
        assert!(nb_inputs <= 6, "Table for {kind:?} is too large");

        let mut invalid = Lut::zero(nb_inputs);
        let mut forbidden = Lut::zero(nb_inputs);
        let mut on = vec![Lut::zero(nb_inputs); nb_outputs];
        let mut off = vec![Lut::zero(nb_inputs); nb_outputs];
        for mask in 0..1usize << nb_inputs {
            let inputs: Vec<Logic> = (0..arity)
                .map(|i| encoding.decode((mask >> (i * width)) as u32 & ((1 << width) - 1)))
                .collect();
            if inputs.contains(&Logic::Invalid) {
                invalid.set_bit(mask);
                continue;
            }
            let allowed = kind.allowed_outputs(&inputs, encoding);
            if allowed.is_empty() {
                forbidden.set_bit(mask);
                continue;
            }
            for k in 0..nb_outputs {
                if allowed.iter().all(|p| p >> k & 1 != 0) {
                    on[k].set_bit(mask);
                } else if allowed.iter().all(|p| p >> k & 1 == 0) {
                    off[k].set_bit(mask);
                }
            }
        }

        let mut clauses: Vec<Vec<TableLiteral>> = cover(&forbidden, &invalid)
            .iter()
            .map(|c| c.negation(nb_inputs))
            .collect();
        let mut dc = invalid.clone();
        for mask in 0..1usize << nb_inputs {
            if forbidden.value(mask) {
                dc.set_bit(mask);
            }
        }
        for k in 0..nb_outputs {
            for (lut, negated) in [(&on[k], false), (&off[k], true)] {
                for c in cover(lut, &dc) {
                    let mut clause = c.negation(nb_inputs);
                    clause.push(TableLiteral {
                        slot: Slot::Output(k),
                        negated,
                    });
                    clauses.push(clause);
                }
            }
        }

        ClauseTable {
            kind,
            encoding,
            forbidden,
            on,
            off,
            clauses,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn clauses(&self) -> &[Vec<TableLiteral>] {
        &self.clauses
    }

    pub fn nb_literals(&self) -> usize {
        self.clauses.iter().map(|c| c.len()).sum()
    }
}

impl fmt::Display for ClauseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.encoding.width();
        writeln!(
            f,
            "{:?} ({}): {} clauses, {} literals",
            self.kind,
            self.encoding,
            self.clauses.len(),
            self.nb_literals()
        )?;
        writeln!(f, "  forbidden 0x{}", self.forbidden.to_hex_string())?;
        for (k, (on, off)) in self.on.iter().zip(self.off.iter()).enumerate() {
            writeln!(
                f,
                "  out.l{k} one 0x{} zero 0x{}",
                on.to_hex_string(),
                off.to_hex_string()
            )?;
        }
        for clause in &self.clauses {
            let lits: Vec<String> = clause
                .iter()
                .map(|l| {
                    let neg = if l.negated { "!" } else { "" };
                    match l.slot {
                        Slot::Input(i) => format!("{neg}in{}.l{}", i / width + 1, i % width),
                        Slot::Output(k) => format!("{neg}out.l{k}"),
                    }
                })
                .collect();
            writeln!(f, "  ({})", lits.join(" | "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::logic_from_str;
    use itertools::Itertools;

    fn check_rows(gate: GateKind, rows: &[&str]) {
        let enc = LogicEncoding::U01X;
        let values = enc.values();
        for (i, row) in rows.iter().enumerate() {
            let expected = logic_from_str(row);
            for (j, e) in expected.iter().enumerate() {
                let got = gate.evaluate(&[values[i], values[j]], enc);
                assert_eq!(got, *e, "{gate}({}, {})", values[i], values[j]);
            }
        }
    }

    #[test]
    fn test_evaluate() {
        check_rows(GateKind::And, &["U0UU", "0000", "U01X", "U0XX"]);
        check_rows(GateKind::Or, &["UU1U", "U01X", "1111", "UX1X"]);
        check_rows(GateKind::Xor, &["UUUU", "U01X", "U10X", "UXXX"]);
        check_rows(GateKind::SetControl, &["UU1X", "U01X", "U11X", "UX1X"]);
        check_rows(GateKind::ResetControl, &["UU0X", "U00X", "U10X", "UX0X"]);
    }

    #[test]
    fn test_tristate() {
        use Logic::*;
        let t = GateKind::TristateBuffer;
        assert_eq!(t.evaluate(&[One, Zero], LogicEncoding::L01), Zero);
        assert_eq!(t.evaluate(&[One, Zero], LogicEncoding::L01X), DontCare);
        assert_eq!(t.evaluate(&[One, Zero], LogicEncoding::U01X), Unknown);
        assert_eq!(t.evaluate(&[One, DontCare], LogicEncoding::L01X), DontCare);
        assert_eq!(t.evaluate(&[One, DontCare], LogicEncoding::U01X), Unknown);
        assert_eq!(t.evaluate(&[Zero, Unknown], LogicEncoding::U01X), Unknown);
        assert_eq!(GateKind::TristateInverter.evaluate(&[Zero, One], LogicEncoding::L01), One);
    }

    #[test]
    fn test_parse() {
        for g in GateKind::ALL {
            assert_eq!(g.name().parse::<GateKind>(), Ok(g));
        }
        assert_eq!("SET_CONTROL".parse::<GateKind>(), Ok(GateKind::SetControl));
        assert!("latch".parse::<GateKind>().is_err());
    }

    #[test]
    fn test_and_01() {
        let t = ClauseTable::new(TableKind::Gate(GateKind::And), LogicEncoding::L01);
        assert_eq!(t.clauses().len(), 3);
        assert_eq!(t.nb_literals(), 7);
    }

    #[test]
    fn test_value_constraint() {
        let t = ClauseTable::new(
            TableKind::ValueConstraint(LogicConstraint::OnlyLogicOne),
            LogicEncoding::L01X,
        );
        assert_eq!(
            t.clauses(),
            &[vec![TableLiteral {
                slot: Slot::Input(1),
                negated: false
            }]]
        );
        let t = ClauseTable::new(
            TableKind::ValueConstraint(LogicConstraint::NoConstraint),
            LogicEncoding::U01X,
        );
        assert!(t.clauses().is_empty());
    }

    #[test]
    fn test_cover_all_tables() {
        // Every table fits in the size limit
        for (g, enc) in GateKind::ALL
            .into_iter()
            .cartesian_product(LogicEncoding::ALL)
        {
            let t = ClauseTable::new(TableKind::Gate(g), enc);
            assert!(!t.clauses().is_empty(), "{g} {enc}");
        }
    }

    #[test]
    fn test_cover() {
        // x0 | x1 over two variables
        let mut target = Lut::zero(2);
        target.set_bit(1);
        target.set_bit(2);
        target.set_bit(3);
        let cubes = cover(&target, &Lut::zero(2));
        assert_eq!(cubes.len(), 2);
        assert!(cubes.iter().all(|c| c.care.count_ones() == 1));
    }
}
