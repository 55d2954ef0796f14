//! A standalone model checker, independent of the search loop: load an
//! externally supplied assignment and check it against every clause
//! still live in the clause database (spec.md §8's validation mode).
use crate::{
    assign::AssignIF,
    solver::Solver,
    types::{Lit, MaybeInconsistent, SolverError},
};

pub trait ValidatorIF {
    /// Load a full assignment (one signed literal per variable) at the
    /// root level.
    ///
    /// # Errors
    ///
    /// Returns an error if the assignment is empty or self-contradictory.
    fn inject_assignment(&mut self, vec: &[i32]) -> MaybeInconsistent;

    /// Returns `None` if the loaded assignment satisfies every clause,
    /// otherwise the external literals of the first clause it violates.
    fn validate(&self) -> Option<Vec<i32>>;
}

impl ValidatorIF for Solver {
    fn inject_assignment(&mut self, vec: &[i32]) -> MaybeInconsistent {
        if vec.is_empty() {
            return Err(SolverError::EmptyClause);
        }
        for &x in vec {
            self.asg.assign_at_rootlevel(Lit::from_i32(x))?;
        }
        Ok(())
    }

    fn validate(&self) -> Option<Vec<i32>> {
        for c in self.cdb.clause.iter().skip(1) {
            if c.is_garbage() {
                continue;
            }
            if !c.lits.iter().any(|&l| self.asg.value_lit(l) == Some(true)) {
                return Some(c.lits.iter().map(|l| l.to_i32()).collect());
            }
        }
        for (code, ws) in self.cdb.watches.iter().enumerate() {
            let l0 = Lit::new(code / 2, code % 2 == 1);
            for w in ws {
                if w.is_binary() && l0.code() < w.blocker.code() {
                    let l1 = w.blocker;
                    if self.asg.value_lit(l0) != Some(true) && self.asg.value_lit(l1) != Some(true) {
                        return Some(vec![l0.to_i32(), l1.to_i32()]);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, solver::SatSolverIF, types::CNFDescription};

    fn cnf(nv: usize) -> CNFDescription {
        CNFDescription {
            num_of_variables: nv,
            num_of_clauses: 0,
            pathname: String::new(),
        }
    }

    #[test]
    fn validates_a_correct_assignment() {
        let config = Config::default();
        let mut solver = Solver::build(&config, &cnf(2));
        solver.add_clause(&[1, 2]).unwrap();
        let mut checker = Solver::build(&config, &cnf(2));
        checker.add_clause(&[1, 2]).unwrap();
        checker.inject_assignment(&[1, -2]).unwrap();
        assert_eq!(checker.validate(), None);
        let _ = solver;
    }

    #[test]
    fn flags_a_violated_clause() {
        let config = Config::default();
        let mut checker = Solver::build(&config, &cnf(2));
        checker.add_clause(&[1, 2]).unwrap();
        checker.inject_assignment(&[-1, -2]).unwrap();
        assert!(checker.validate().is_some());
    }
}
