//! Construction and clause ingestion (spec.md §4.1, §7).
use {
    super::Solver,
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, ClauseDBIF},
        config::Config,
        congruence::Congruence,
        extend::ExtensionStack,
        factor::Factorer,
        probe::Prober,
        processor::Eliminator,
        restart::Restarter,
        state::State,
        substitute::Substitutor,
        sweep::Sweeper,
        types::*,
        var::Var,
        walk::Walker,
    },
};
use super::vivify::Vivifier;

impl Solver {
    /// Construct an empty solver sized for `cnf`. Parsing a DIMACS file is
    /// deliberately not this crate's job (spec.md's non-goal); the caller
    /// reads the file and feeds clauses through `add_clause`.
    pub fn build(config: &Config, cnf: &CNFDescription) -> Solver {
        Solver {
            asg: AssignStack::instantiate(config, cnf),
            cdb: ClauseDB::instantiate(config, cnf),
            rst: Restarter::instantiate(config, cnf),
            state: State::instantiate(config, cnf),
            elim: Eliminator::instantiate(config, cnf),
            sub: Substitutor::instantiate(config, cnf),
            prober: Prober::instantiate(config, cnf),
            sweeper: Sweeper::instantiate(config, cnf),
            cong: Congruence::instantiate(config, cnf),
            factorer: Factorer::instantiate(config, cnf),
            walker: Walker::instantiate(config, cnf),
            vivifier: Vivifier::instantiate(config, cnf),
            extend: ExtensionStack::new(),
            config: config.clone(),
            ok: true,
        }
    }

    /// Grow every per-variable table by one and return the new variable's
    /// id; used by factoring to introduce a fresh definitional variable
    /// mid-search.
    pub fn new_var(&mut self) -> VarId {
        let vi = self.asg.num_vars;
        self.asg.num_vars += 1;
        self.asg.assign.push(None);
        self.asg.var.push(Var::default());
        self.asg.vmtf = crate::var::Vmtf::new(self.asg.num_vars);
        let reward = vec![0.0; self.asg.num_vars];
        self.asg.heap.push(vi, &reward);
        self.cdb.watches.push(Vec::new());
        self.cdb.watches.push(Vec::new());
        self.cdb.touched.push(false);
        vi
    }
}

/// Ingest one externally-numbered clause (1-based signed integers, no
/// embedded terminating zero -- the caller already split on it). Detects
/// duplicate literals and tautologies; rejects out-of-range literals
/// without mutating solver state (spec.md §7).
pub fn add_clause(solver: &mut Solver, lits: &[i32]) -> MaybeInconsistent {
    if !solver.ok {
        return Ok(());
    }
    for &x in lits {
        if x == 0 || x.unsigned_abs() as usize > solver.asg.num_vars() {
            return Err(SolverError::InvalidLiteral);
        }
    }
    let mut v: Vec<Lit> = lits.iter().map(|&x| Lit::from_i32(x)).collect();
    v.sort_unstable();
    v.dedup();
    if v.windows(2).any(|w| w[0] == !w[1]) {
        return Ok(()); // tautology: no-op
    }
    let result = match v.len() {
        0 => Err(SolverError::EmptyClause),
        1 => solver.asg.assign_at_rootlevel(v[0]),
        2 => {
            solver.cdb.new_binary_clause(v[0], v[1]);
            Ok(())
        }
        _ => {
            solver.cdb.new_irredundant_clause(v);
            Ok(())
        }
    };
    if result.is_err() {
        solver.ok = false;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SatSolverIF;

    fn cnf(nv: usize) -> CNFDescription {
        CNFDescription {
            num_of_variables: nv,
            num_of_clauses: 0,
            pathname: String::new(),
        }
    }

    #[test]
    fn rejects_out_of_range_literal_without_mutation() {
        let config = Config::default();
        let mut solver = Solver::build(&config, &cnf(2));
        assert_eq!(solver.add_clause(&[1, 5]), Err(SolverError::InvalidLiteral));
        assert!(solver.ok);
    }

    #[test]
    fn drops_a_tautological_clause() {
        let config = Config::default();
        let mut solver = Solver::build(&config, &cnf(2));
        assert!(solver.add_clause(&[1, -1, 2]).is_ok());
        assert_eq!(solver.cdb.num_clause(), 0);
    }

    #[test]
    fn unit_clause_assigns_at_root() {
        let config = Config::default();
        let mut solver = Solver::build(&config, &cnf(2));
        assert!(solver.add_clause(&[1]).is_ok());
        assert_eq!(solver.asg.value_lit(Lit::from_i32(1)), Some(true));
    }
}
