//! DIMACS export of clause databases

use std::io::{self, Write};

use super::ClauseDatabase;
use crate::Literal;

fn write_clause<W: Write>(w: &mut W, clause: &[Literal]) -> io::Result<()> {
    for l in clause {
        write!(w, "{} ", l.to_dimacs())?;
    }
    writeln!(w, "0")
}

/// Write a CNF instance in DIMACS format
///
/// Variable `v` of the proxy is DIMACS variable `v + 1`, so the constant variable is 1.
pub fn write_cnf<W: Write>(
    w: &mut W,
    nb_vars: usize,
    clauses: &ClauseDatabase<Literal>,
    comments: &[String],
) -> io::Result<()> {
    for c in comments {
        writeln!(w, "c {c}")?;
    }
    writeln!(w, "p cnf {} {}", nb_vars, clauses.len())?;
    for clause in clauses.iter() {
        write_clause(w, clause)?;
    }
    Ok(())
}

/// Write a weighted partial MaxSAT instance in (pre-2022) WCNF format
///
/// Hard clauses get the weight `top`, one more than the sum of all soft weights.
pub fn write_wcnf<W: Write>(
    w: &mut W,
    nb_vars: usize,
    hard: &ClauseDatabase<Literal>,
    soft: &[(Vec<Literal>, u64)],
    comments: &[String],
) -> io::Result<()> {
    let top = soft.iter().map(|(_, weight)| weight).sum::<u64>() + 1;
    for c in comments {
        writeln!(w, "c {c}")?;
    }
    writeln!(w, "p wcnf {} {} {}", nb_vars, hard.len() + soft.len(), top)?;
    for clause in hard.iter() {
        write!(w, "{top} ")?;
        write_clause(w, clause)?;
    }
    for (clause, weight) in soft {
        write!(w, "{weight} ")?;
        write_clause(w, clause)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cnf() {
        let a = Literal::from_var(1);
        let b = Literal::from_var(2);
        let mut db = ClauseDatabase::new();
        db.push(&[Literal::one()]);
        db.push(&[a, !b]);
        let mut out = Vec::new();
        write_cnf(&mut out, 3, &db, &["test".to_owned()]).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s, "c test\np cnf 3 2\n1 0\n2 -3 0\n");
    }

    #[test]
    fn test_wcnf() {
        let a = Literal::from_var(1);
        let mut db = ClauseDatabase::new();
        db.push(&[Literal::one()]);
        let soft = vec![(vec![a], 3), (vec![!a], 2)];
        let mut out = Vec::new();
        write_wcnf(&mut out, 2, &db, &soft, &[]).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s, "p wcnf 2 3 6\n6 1 0\n3 2 0\n2 -2 0\n");
    }
}
