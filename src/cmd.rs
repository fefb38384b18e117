//! Command line interface

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use kdam::{tqdm, BarExt};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};

use tpgenc::logic::{logic_from_str, logic_to_string};
use tpgenc::solver::{
    BmcProxy, BmcResult, BmcSettings, BmcSolverProxy, SatResult, SatSolver, SatSolverProxy,
    SolverProxy, SolverSettings, Value,
};
use tpgenc::{
    GateKind, Logic, LogicConstraint, LogicContainer, LogicContainer01, LogicContainer01F,
    LogicContainer01X, LogicContainerU01F, LogicContainerU01X, LogicEncoder, LogicEncoding,
};

/// Call a function generic over the container type with the container of an encoding
macro_rules! with_container {
    ($encoding:expr, $f:ident($($arg:expr),*)) => {
        match $encoding {
            LogicEncoding::L01 => $f::<LogicContainer01>($($arg),*),
            LogicEncoding::L01X => $f::<LogicContainer01X>($($arg),*),
            LogicEncoding::L01F => $f::<LogicContainer01F>($($arg),*),
            LogicEncoding::U01X => $f::<LogicContainerU01X>($($arg),*),
            LogicEncoding::U01F => $f::<LogicContainerU01F>($($arg),*),
        }
    };
}

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Print the truth table of a gate
    ///
    /// Each row lists the input values and every output value accepted by the solver.
    /// Forgetful encodings (01F, U01F) may answer X where the exact value is 0 or 1.
    #[clap()]
    Table(TableArgs),

    /// Check the encoder against the multi-valued semantics
    ///
    /// Every gate and detector is checked exhaustively for every encoding, then randomly
    /// generated n-ary gates are checked against their balanced tree.
    #[clap(alias = "check")]
    Selfcheck(SelfcheckArgs),

    /// Bounded model checking of a binary counter
    ///
    /// The counter starts at zero; the target is the all-ones state, first reached after
    /// 2^bits - 1 transitions.
    #[clap()]
    Counter(CounterArgs),

    /// Write the clauses of a gate in DIMACS format
    ///
    /// The comment lines give the literals of each input and of the output.
    #[clap()]
    Export(ExportArgs),
}

fn sat_encoder() -> LogicEncoder<SatSolverProxy> {
    LogicEncoder::new(SatSolverProxy::new(SatSolver::Minisat))
}

/// All tuples of values of the encoding, in table order
fn value_tuples(encoding: LogicEncoding, n: usize) -> Vec<Vec<Logic>> {
    (0..n)
        .map(|_| encoding.values().iter().copied())
        .multi_cartesian_product()
        .collect()
}

/// Container fixed to a value, either as a constant or by unit clauses
fn fixed_input<C: LogicContainer>(enc: &mut LogicEncoder<SatSolverProxy>, value: Logic, constant: bool) -> C {
    if constant {
        return enc.new_constant_container(value);
    }
    let c = enc.new_logic_container();
    enc.encode_logic_value(&c, value);
    c
}

/// All values a container takes in the solutions, sorted
fn solutions<C: LogicContainer>(enc: &mut LogicEncoder<SatSolverProxy>, c: &C) -> Vec<Logic> {
    let mut ret = Vec::new();
    while enc.solver_mut().solve() == SatResult::Sat {
        ret.push(enc.solved_logic_value(c));
        if enc.is_constant_logic_value(c) {
            break;
        }
        let blocking: Vec<_> = c
            .literals()
            .iter()
            .map(|l| {
                if enc.solver().literal_value(*l) == Value::Positive {
                    !*l
                } else {
                    *l
                }
            })
            .collect();
        enc.solver_mut().commit(&blocking);
    }
    ret.sort();
    ret.dedup();
    ret
}

/// Output values a gate may take: the exact value, or X for a forgotten boolean
fn allowed(gate: GateKind, values: &[Logic], encoding: LogicEncoding) -> Vec<Logic> {
    let exact = gate.evaluate(values, encoding);
    let mut ret = vec![exact];
    if encoding.is_forgetful() && exact.is_valid_01() {
        ret.push(Logic::DontCare);
    }
    ret.sort();
    ret
}

fn format_values(values: &[Logic]) -> String {
    values.iter().map(|v| v.to_string()).join("/")
}

fn gate_solutions<C: LogicContainer>(gate: GateKind, values: &[Logic], constants: u32, in_place: bool) -> Vec<Logic> {
    let mut enc = sat_encoder();
    let inputs: Vec<C> = values
        .iter()
        .enumerate()
        .map(|(i, v)| fixed_input(&mut enc, *v, constants >> i & 1 != 0))
        .collect();
    let out = if in_place {
        let out = enc.new_logic_container();
        enc.encode_gate_into(gate, &inputs, &out);
        out
    } else {
        enc.encode_gate(gate, &inputs)
    };
    solutions(&mut enc, &out)
}

fn print_table<C: LogicContainer>(gate: GateKind) {
    let mut enc = sat_encoder();
    let inputs: Vec<C> = (0..gate.arity()).map(|_| enc.new_logic_container()).collect();
    let out: C = enc.new_logic_container();
    let before = enc.solver().statistics().clauses;
    enc.encode_gate_into(gate, &inputs, &out);
    println!(
        "{gate} ({}): {} clauses",
        C::ENCODING,
        enc.solver().statistics().clauses - before
    );

    let names = gate.input_names();
    println!("{} | out", names.join(" "));
    for values in value_tuples(C::ENCODING, gate.arity()) {
        let cols: Vec<String> = names
            .iter()
            .zip(&values)
            .map(|(n, v)| format!("{:<w$}", v.to_string(), w = n.len()))
            .collect();
        let outs = gate_solutions::<C>(gate, &values, 0, true);
        println!("{} | {}", cols.join(" "), format_values(&outs));
    }
}

/// Number of mismatches between a gate and its semantics, in both forms and with constant inputs
fn check_gate<C: LogicContainer>(gate: GateKind) -> usize {
    let mut failures = 0;
    for values in value_tuples(C::ENCODING, gate.arity()) {
        let expected = allowed(gate, &values, C::ENCODING);
        let exact = gate.evaluate(&values, C::ENCODING);
        let got = gate_solutions::<C>(gate, &values, 0, true);
        if got != expected {
            error!(
                %gate,
                encoding = %C::ENCODING,
                inputs = %logic_to_string(&values),
                "in-place form answers {}, expected {}",
                format_values(&got),
                format_values(&expected)
            );
            failures += 1;
        }
        for constants in 0..1u32 << gate.arity() {
            let got = gate_solutions::<C>(gate, &values, constants, false);
            if !got.contains(&exact) || !got.iter().all(|v| expected.contains(v)) {
                error!(
                    %gate,
                    encoding = %C::ENCODING,
                    inputs = %logic_to_string(&values),
                    constants,
                    "value form answers {}, expected {}",
                    format_values(&got),
                    format_values(&expected)
                );
                failures += 1;
            }
        }
    }
    failures
}

fn detect<C, F>(values: &[Logic], f: F) -> Vec<Logic>
where
    C: LogicContainer,
    F: FnOnce(&mut LogicEncoder<SatSolverProxy>, &[C]) -> LogicContainer01,
{
    let mut enc = sat_encoder();
    let inputs: Vec<C> = values.iter().map(|v| fixed_input(&mut enc, *v, false)).collect();
    let out = f(&mut enc, &inputs);
    solutions(&mut enc, &out)
}

/// Number of mismatches of the value, constraint, equivalence and 01-difference detectors
fn check_detectors<C: LogicContainer>() -> usize {
    let mut failures = 0;
    let mut check = |name: &str, values: &[Logic], got: Vec<Logic>, expected: bool| {
        if got != vec![Logic::from_bool(expected)] {
            error!(
                encoding = %C::ENCODING,
                inputs = %logic_to_string(values),
                "{name} detector answers {}, expected {}",
                format_values(&got),
                Logic::from_bool(expected)
            );
            failures += 1;
        }
    };
    let all = C::ENCODING.values();
    for v in all {
        for q in all {
            let got = detect::<C, _>(&[*v], |enc, c| enc.encode_logic_value_detector(&c[0], *q));
            check(&format!("value {q}"), &[*v], got, v == q);
        }
        for constraint in LogicConstraint::ALL {
            let got = detect::<C, _>(&[*v], |enc, c| {
                enc.encode_logic_value_constraint_detector(&c[0], constraint)
            });
            check(&format!("constraint {constraint}"), &[*v], got, constraint.accepts(*v));
        }
    }
    for values in value_tuples(C::ENCODING, 2) {
        let (a, b) = (values[0], values[1]);
        let got = detect::<C, _>(&values, |enc, c| enc.encode_logic_equivalence_detector(&c[0], &c[1]));
        check("equivalence", &values, got, a == b);
        let got = detect::<C, _>(&values, |enc, c| enc.encode_logic_01_difference_detector(&c[0], &c[1]));
        check("01-difference", &values, got, a.is_valid_01() && b.is_valid_01() && a != b);
    }
    failures
}

/// Output values of a balanced tree of two-input gates, each of which may forget
fn tree_outputs(base: GateKind, values: &[Logic], encoding: LogicEncoding) -> Vec<Logic> {
    let combine = |a: &[Logic], b: &[Logic]| -> Vec<Logic> {
        a.iter()
            .cartesian_product(b)
            .flat_map(|(x, y)| allowed(base, &[*x, *y], encoding))
            .sorted()
            .dedup()
            .collect()
    };
    match values.len() {
        1 => allowed(GateKind::Buffer, values, encoding),
        2 => allowed(base, values, encoding),
        3 => combine(&allowed(base, &values[..2], encoding), &values[2..]),
        n => combine(
            &tree_outputs(base, &values[..n / 2], encoding),
            &tree_outputs(base, &values[n / 2..], encoding),
        ),
    }
}

/// Check a random n-ary gate in both forms; returns the number of mismatches
fn check_random_tree<C: LogicContainer>(rng: &mut SmallRng, width: usize) -> usize {
    let nary: Vec<GateKind> = GateKind::ALL.into_iter().filter(|g| g.is_nary()).collect();
    let gate = nary[rng.gen_range(0..nary.len())];
    let all = C::ENCODING.values();
    let n = rng.gen_range(1..=width);
    let values: Vec<Logic> = (0..n).map(|_| all[rng.gen_range(0..all.len())]).collect();
    let constants: Vec<bool> = (0..n).map(|_| rng.gen_ratio(1, 4)).collect();

    let (base, inverted) = match gate {
        GateKind::Nand => (GateKind::And, true),
        GateKind::Nor => (GateKind::Or, true),
        GateKind::Xnor => (GateKind::Xor, true),
        g => (g, false),
    };
    let invert = |v: Logic| if inverted { v.invert() } else { v };
    let exact = invert(
        values[1..]
            .iter()
            .fold(values[0], |acc, v| base.evaluate(&[acc, *v], C::ENCODING)),
    );
    let expected: Vec<Logic> = tree_outputs(base, &values, C::ENCODING)
        .into_iter()
        .map(invert)
        .sorted()
        .collect();

    let mut failures = 0;
    for in_place in [true, false] {
        let mut enc = sat_encoder();
        let inputs: Vec<C> = values
            .iter()
            .zip(&constants)
            .map(|(v, c)| fixed_input(&mut enc, *v, *c && !in_place))
            .collect();
        let out = if in_place {
            let out = enc.new_logic_container();
            enc.encode_gate_all_into(gate, &inputs, &out);
            out
        } else {
            enc.encode_gate_all(gate, &inputs)
        };
        let got = solutions(&mut enc, &out);
        let ok = if in_place {
            got == expected
        } else {
            got.contains(&exact) && got.iter().all(|v| expected.contains(v))
        };
        if !ok {
            error!(
                %gate,
                encoding = %C::ENCODING,
                inputs = %logic_to_string(&values),
                in_place,
                "tree answers {}, expected {}",
                format_values(&got),
                format_values(&expected)
            );
            failures += 1;
        }
    }
    failures
}

fn export_gate<C: LogicContainer>(gate: GateKind, values: Option<&str>, path: &Path) -> io::Result<()> {
    let mut enc = LogicEncoder::new(SatSolverProxy::new(SatSolver::DimacsExport(path.to_path_buf())));
    let inputs: Vec<C> = (0..gate.arity()).map(|_| enc.new_logic_container()).collect();
    let out: C = enc.new_logic_container();
    enc.encode_gate_into(gate, &inputs, &out);
    if let Some(values) = values {
        let values = logic_from_str(values);
        if values.len() != gate.arity() || !values.iter().all(|v| C::ENCODING.supports(*v)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Gate {gate} expects {} values among {}",
                    gate.arity(),
                    logic_to_string(C::ENCODING.values())
                ),
            ));
        }
        enc.encode_logic_value_vec(&inputs, &values);
    }
    for (name, c) in gate.input_names().iter().zip(&inputs) {
        info!("{name}: {c}");
    }
    info!("out: {out}");

    enc.solver_mut().solve();
    if let Some(e) = enc.solver().last_error() {
        return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
    }
    info!(
        path = %path.display(),
        variables = enc.solver().nb_variables(),
        clauses = enc.solver().clauses().len(),
        "wrote DIMACS file"
    );
    Ok(())
}

/// Command arguments for gate tables
#[derive(Args)]
pub struct TableArgs {
    /// Gate to show
    gate: GateKind,

    /// Logic encoding: 01, 01X, 01F, U01X or U01F
    #[arg(short = 'e', long, default_value = "U01X")]
    encoding: LogicEncoding,
}

impl TableArgs {
    pub fn run(&self) -> io::Result<()> {
        with_container!(self.encoding, print_table(self.gate));
        Ok(())
    }
}

/// Command arguments for the self-check
#[derive(Args)]
pub struct SelfcheckArgs {
    /// Seed for the random gates
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Maximum number of inputs of the random gates
    #[arg(long, default_value_t = 8, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    width: usize,

    /// Number of random gates per encoding
    #[arg(long, default_value_t = 100)]
    samples: usize,
}

impl SelfcheckArgs {
    pub fn run(&self) -> io::Result<()> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let per_encoding = GateKind::ALL.len() + 1 + self.samples;
        let mut progress = tqdm!(total = LogicEncoding::ALL.len() * per_encoding);
        progress.set_description("Checks");

        let mut failures = 0;
        for encoding in LogicEncoding::ALL {
            progress.set_postfix(format!("encoding={encoding}"));
            for gate in GateKind::ALL {
                failures += with_container!(encoding, check_gate(gate));
                progress.update(1)?;
            }
            failures += with_container!(encoding, check_detectors());
            progress.update(1)?;
            for _ in 0..self.samples {
                failures += with_container!(encoding, check_random_tree(&mut rng, self.width));
                progress.update(1)?;
            }
        }
        progress.write(format!(
            "Checked {} gates, 4 detectors and {} random gates for {} encodings",
            GateKind::ALL.len(),
            self.samples,
            LogicEncoding::ALL.len()
        ))?;
        if failures > 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Self-check failed with {failures} failures"),
            ));
        }
        info!("All checks passed");
        Ok(())
    }
}

/// Command arguments for the counter model checking
#[derive(Args)]
pub struct CounterArgs {
    /// Number of bits of the counter
    #[arg(value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    bits: usize,

    /// Deepest timeframe explored
    #[arg(long, default_value_t = 100)]
    max_depth: usize,

    /// Time limit in seconds
    #[arg(short = 't', long)]
    timeout: Option<f64>,
}

impl CounterArgs {
    pub fn run(&self) -> io::Result<()> {
        let settings = SolverSettings {
            timeout: self.timeout.map(Duration::from_secs_f64),
            ..Default::default()
        };
        let bmc = BmcSettings {
            max_depth: self.max_depth,
        };
        let mut enc = LogicEncoder::new(BmcSolverProxy::with_settings(settings, bmc));

        let state: Vec<LogicContainer01> = (0..self.bits).map(|_| enc.new_state_container()).collect();
        let mut carry: LogicContainer01 = enc.new_constant_container(Logic::One);
        let mut next = Vec::new();
        for s in &state {
            next.push(enc.encode_xor(s, &carry));
            carry = enc.encode_and(s, &carry);
        }
        enc.encode_next_state_vec(&state, &next);
        for s in &state {
            enc.encode_initial_state_value(s, Logic::Zero);
            enc.encode_target_state_value(s, Logic::One);
        }

        let res = enc.solver_mut().solve();
        let depth = enc.solver().last_depth();
        println!("{res} at depth {depth}");
        match res {
            BmcResult::Reachable => {
                for t in 0..=depth {
                    enc.solver_mut().set_target_timeframe(t);
                    println!("{t:>4}: {}", logic_to_string(&enc.solved_logic_values(&state)));
                }
                enc.solver_mut().set_target_timeframe(0);
            }
            BmcResult::Timeout => {
                if let Some(e) = enc.solver().last_error() {
                    return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
                }
            }
            BmcResult::Unreachable | BmcResult::MaxIterationsReached => (),
        }
        println!("{}", enc.solver().statistics());
        Ok(())
    }
}

/// Command arguments for DIMACS export
#[derive(Args)]
pub struct ExportArgs {
    /// Gate to export
    gate: GateKind,

    /// Logic encoding: 01, 01X, 01F, U01X or U01F
    #[arg(short = 'e', long, default_value = "U01X")]
    encoding: LogicEncoding,

    /// Values of the inputs, one character each (U, 0, 1 or X)
    #[arg(long)]
    values: Option<String>,

    /// Output file
    #[arg(short = 'o', long)]
    output: PathBuf,
}

impl ExportArgs {
    pub fn run(&self) -> io::Result<()> {
        with_container!(
            self.encoding,
            export_gate(self.gate, self.values.as_deref(), &self.output)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_sizes() {
        assert!(Cli::try_parse_from(["tpgenc", "counter", "0"]).is_err());
        assert!(Cli::try_parse_from(["tpgenc", "selfcheck", "--width", "0"]).is_err());
        let cli = Cli::try_parse_from(["tpgenc", "counter", "2", "--max-depth", "5"]).unwrap();
        match cli.command {
            Commands::Counter(a) => {
                assert_eq!(a.bits, 2);
                assert_eq!(a.max_depth, 5);
            }
            _ => panic!("Expected the counter command"),
        }
    }

    #[test]
    fn test_counter_run() {
        let args = CounterArgs {
            bits: 2,
            max_depth: 10,
            timeout: None,
        };
        assert!(args.run().is_ok());
    }

    #[test]
    fn test_selfcheck_run() {
        let args = SelfcheckArgs {
            seed: 3,
            width: 3,
            samples: 2,
        };
        assert!(args.run().is_ok());
    }
}
