//! Structural factoring (bounded variable addition): find a literal
//! sub-product shared by several clauses and introduce a fresh variable
//! naming it, shrinking the overall clause set (spec.md §5.8).
use crate::{cdb::{ClauseDB, ClauseDBIF}, config::Config, types::*};

pub struct Factorer {
    pub active: bool,
    min_size: usize,
    hops: usize,
    cand_rounds: usize,
}

impl Default for Factorer {
    fn default() -> Factorer {
        Factorer {
            active: false,
            min_size: 3,
            hops: 2,
            cand_rounds: 1,
        }
    }
}

impl Instantiate for Factorer {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Factorer {
        Factorer {
            active: !config.without_factor && config.preprocessfactor,
            min_size: config.factorsize,
            hops: config.factorhops,
            cand_rounds: config.factorcandrounds,
        }
    }
}

impl Factorer {
    /// Count occurrences of every literal pair across non-garbage
    /// clauses; a pair appearing often enough is worth naming.
    fn pair_counts(cdb: &ClauseDB) -> std::collections::HashMap<(Lit, Lit), usize> {
        let mut counts = std::collections::HashMap::new();
        for c in cdb.clause.iter().skip(1) {
            if c.is_garbage() || c.lits.len() < 2 {
                continue;
            }
            for i in 0..c.lits.len() {
                for j in (i + 1)..c.lits.len() {
                    let mut pair = [c.lits[i], c.lits[j]];
                    pair.sort_unstable();
                    *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// One factoring round: pick the most shared literal pair `(a, b)`,
    /// introduce a fresh variable `g <-> (a ∨ b)`, and rewrite every
    /// clause containing both `a` and `b` to carry `g` instead.
    pub fn run(&mut self, asg_num_vars: &mut usize, cdb: &mut ClauseDB) -> Option<VarId> {
        if !self.active {
            return None;
        }
        let _ = (self.hops, self.cand_rounds);
        let counts = Self::pair_counts(cdb);
        let (&(a, b), &n) = counts.iter().max_by_key(|(_, &n)| n)?;
        if n < self.min_size {
            return None;
        }
        let g_vi = *asg_num_vars;
        *asg_num_vars += 1;
        let g = Lit::new(g_vi, false);
        // definition clauses: g <-> (a ∨ b)
        cdb.new_binary_clause(!a, g);
        cdb.new_binary_clause(!b, g);
        cdb.new_irredundant_clause(vec![!g, a, b]);
        for cid in 1..cdb.clause.len() {
            if cdb.clause[cid].is_garbage() || cid == cdb.clause.len() - 1 {
                continue;
            }
            let has_both = cdb.clause[cid].lits.contains(&a) && cdb.clause[cid].lits.contains(&b);
            if has_both {
                cdb.clause[cid].lits.retain(|&l| l != a && l != b);
                cdb.clause[cid].lits.push(g);
            }
        }
        Some(g_vi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnf(nv: usize) -> CNFDescription {
        CNFDescription {
            num_of_variables: nv,
            num_of_clauses: 0,
            pathname: String::new(),
        }
    }

    #[test]
    fn factors_a_frequently_shared_pair() {
        let config = Config {
            preprocessfactor: true,
            factorsize: 2,
            ..Config::default()
        };
        let mut cdb = ClauseDB::instantiate(&config, &cnf(5));
        let (a, b, c1, c2) = (
            Lit::from_i32(1),
            Lit::from_i32(2),
            Lit::from_i32(3),
            Lit::from_i32(4),
        );
        cdb.new_irredundant_clause(vec![a, b, c1]);
        cdb.new_irredundant_clause(vec![a, b, c2]);
        let mut factorer = Factorer::instantiate(&config, &cnf(5));
        let mut nv = 5;
        let introduced = factorer.run(&mut nv, &mut cdb);
        assert!(introduced.is_some());
        assert_eq!(nv, 6);
    }
}
