//! SAT-sweeping: for each candidate variable, build a small local clause
//! environment (a BFS neighborhood over shared clauses) and brute-force
//! check it against an embedded mini sub-solver ("kitten") to discover
//! literal equivalences missed by binary-clause-only substitution
//! (spec.md §5.6).
use crate::{
    assign::AssignIF,
    cdb::ClauseDB,
    config::Config,
    types::*,
};

pub struct Sweeper {
    pub active: bool,
    depth: usize,
    max_depth: usize,
    max_vars: usize,
    max_clauses: usize,
    clause_budget: usize,
    complete: bool,
}

impl Default for Sweeper {
    fn default() -> Sweeper {
        Sweeper {
            active: false,
            depth: 2,
            max_depth: 4,
            max_vars: 100_000,
            max_clauses: 100_000,
            clause_budget: 2048,
            complete: false,
        }
    }
}

impl Instantiate for Sweeper {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Sweeper {
        Sweeper {
            active: !config.without_sweep && config.preprocessweep,
            depth: config.sweepdepth,
            max_depth: config.sweepmaxdepth,
            max_vars: config.sweepmaxvars,
            max_clauses: config.sweepmaxclauses,
            clause_budget: config.sweepclauses,
            complete: config.sweepcomplete,
        }
    }
}

/// A tiny brute-force solver over a handful of variables, used to decide
/// equivalence questions ("kitten"): does every satisfying assignment of
/// `clauses` give `a` and `b` the same value?
struct Kitten<'a> {
    vars: &'a [VarId],
    clauses: &'a [Vec<Lit>],
}

impl<'a> Kitten<'a> {
    /// Returns `Some(true)` if `a == b` in every model, `Some(false)` if
    /// `a == !b` in every model, `None` if neither holds or the
    /// environment is unsatisfiable (vacuously both, which is useless).
    fn check_equivalence(&self, a: VarId, b: VarId) -> Option<bool> {
        let n = self.vars.len();
        if n > 20 {
            return None; // brute force is only viable on tiny environments
        }
        let index = |v: VarId| self.vars.iter().position(|&x| x == v).unwrap();
        let ai = index(a);
        let bi = index(b);
        let mut same = true;
        let mut opposite = true;
        let mut any_model = false;
        for mask in 0u32..(1u32 << n) {
            let val = |i: usize| (mask >> i) & 1 == 1;
            let ok = self.clauses.iter().all(|c| {
                c.iter().any(|&l| {
                    let vi = index(l.vi());
                    val(vi) == l.is_pos()
                })
            });
            if !ok {
                continue;
            }
            any_model = true;
            if val(ai) != val(bi) {
                same = false;
            }
            if val(ai) == val(bi) {
                opposite = false;
            }
        }
        if !any_model {
            return None;
        }
        if same {
            Some(true)
        } else if opposite {
            Some(false)
        } else {
            None
        }
    }
}

impl Sweeper {
    /// BFS outward from `v` through shared-clause adjacency, up to `depth`
    /// hops or the clause/variable budget, whichever comes first.
    fn environment(&self, cdb: &ClauseDB, v: VarId, nv: usize) -> (Vec<VarId>, Vec<Vec<Lit>>) {
        let depth = self.depth.min(self.max_depth);
        let mut vars = vec![v];
        let mut seen_var = vec![false; nv];
        seen_var[v] = true;
        let mut clauses = Vec::new();
        let mut seen_clause = vec![false; cdb.clause.len()];
        let mut frontier = vec![v];
        for _ in 0..depth {
            let mut next = Vec::new();
            for &fv in &frontier {
                for (cid, c) in cdb.clause.iter().enumerate().skip(1) {
                    if c.is_garbage() || seen_clause[cid] {
                        continue;
                    }
                    if c.lits.iter().any(|l| l.vi() == fv) {
                        if clauses.len() >= self.clause_budget || clauses.len() >= self.max_clauses {
                            continue;
                        }
                        seen_clause[cid] = true;
                        clauses.push(c.lits.clone());
                        for &l in &c.lits {
                            if !seen_var[l.vi()] {
                                seen_var[l.vi()] = true;
                                vars.push(l.vi());
                                next.push(l.vi());
                                if vars.len() >= self.max_vars {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            frontier = next;
            if frontier.is_empty() || vars.len() >= self.max_vars {
                break;
            }
        }
        (vars, clauses)
    }

    /// Scan free variable pairs sharing an environment and report any
    /// equivalence found; callers fold results into the substitution
    /// machinery (spec.md §5.6's consumer is `substitute.rs`).
    pub fn find_equivalences(&mut self, asg: &dyn AssignIF, cdb: &ClauseDB) -> Vec<(Lit, Lit)> {
        if !self.active {
            return Vec::new();
        }
        let nv = asg.num_vars();
        let mut found = Vec::new();
        let candidates: Vec<VarId> = (0..nv)
            .filter(|&v| !asg.is_eliminated(v) && asg.value_lit(Lit::new(v, false)).is_none())
            .collect();
        let rounds = if self.complete { candidates.len() } else { candidates.len().min(64) };
        for &v in candidates.iter().take(rounds) {
            let (vars, clauses) = self.environment(cdb, v, nv);
            if vars.len() < 2 {
                continue;
            }
            let kitten = Kitten { vars: &vars, clauses: &clauses };
            for &u in vars.iter().filter(|&&u| u != v) {
                if let Some(polarity) = kitten.check_equivalence(v, u) {
                    found.push((Lit::new(v, false), Lit::new(u, !polarity)));
                }
            }
        }
        found
    }
}
