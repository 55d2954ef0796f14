//! Backbone probing and transitive reduction over the binary implication
//! graph (spec.md §5.4-§5.5).
//!
//! Both passes are failed-literal probes: assume a literal, propagate, and
//! either learn a forced backbone unit from a root-level conflict or
//! detect a redundant binary implied by a longer chain.
use crate::{
    assign::{AssignIF, AssignStack},
    cdb::{watch::WatchDBIF, ClauseDB, ClauseDBIF},
    config::Config,
    types::*,
};

pub struct Prober {
    pub active: bool,
    rounds: usize,
    transitive_active: bool,
    transitive_keep: bool,
}

impl Default for Prober {
    fn default() -> Prober {
        Prober {
            active: true,
            rounds: 1,
            transitive_active: true,
            transitive_keep: false,
        }
    }
}

impl Instantiate for Prober {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Prober {
        Prober {
            active: config.preprocessbackbone,
            rounds: config.proberounds,
            transitive_active: !config.without_transitive,
            transitive_keep: config.transitivekeep,
        }
    }
}

impl Prober {
    /// Assume `l`, propagate to a fixpoint, and undo. A root-level conflict
    /// means `¬l` is a backbone unit; returns `Some(forced unit)` or
    /// `None` if the probe was inconclusive.
    fn probe_one(asg: &mut AssignStack, cdb: &mut ClauseDB, l: Lit) -> Option<Lit> {
        if asg.value_lit(l).is_some() {
            return None;
        }
        asg.assign_by_decision(l);
        let result = asg.propagate_probe(cdb);
        asg.cancel_until(asg.decision_level() - 1, cdb);
        if result.is_err() {
            Some(!l)
        } else {
            None
        }
    }

    /// Probe both literals of every free variable; a polarity whose
    /// assumption conflicts at the root proves the other polarity is a
    /// backbone fact (spec.md §5.4).
    pub fn backbone(&mut self, asg: &mut AssignStack, cdb: &mut ClauseDB) -> MaybeInconsistent {
        if !self.active {
            return Ok(());
        }
        for _ in 0..self.rounds {
            let mut forced = Vec::new();
            for v in 0..asg.num_vars() {
                if asg.is_eliminated(v) || asg.value_lit(Lit::new(v, false)).is_some() {
                    continue;
                }
                if let Some(unit) = Self::probe_one(asg, cdb, Lit::new(v, false)) {
                    forced.push(unit);
                } else if let Some(unit) = Self::probe_one(asg, cdb, Lit::new(v, true)) {
                    forced.push(unit);
                }
            }
            for unit in forced {
                asg.assign_at_rootlevel(unit)?;
            }
            asg.propagate(cdb).map_err(|_| SolverError::EmptyClause)?;
        }
        Ok(())
    }

    /// Drop a binary clause `(¬l ∨ l')` when `l'` is already reachable
    /// from `l` through a longer chain of other binaries -- a BFS per
    /// literal over the implication graph, skipping the direct edge
    /// (spec.md §5.5).
    pub fn transitive_reduction(&mut self, cdb: &mut ClauseDB, nv: usize) {
        if !self.transitive_active {
            return;
        }
        for code in 0..2 * nv {
            let l = Lit::new(code / 2, code % 2 == 1);
            let direct: Vec<Lit> = cdb
                .watcher_list(l)
                .iter()
                .filter(|w| w.is_binary())
                .map(|w| w.blocker)
                .collect();
            for &target in &direct {
                if reachable_without_direct_edge(cdb, l, target, nv) {
                    if self.transitive_keep {
                        continue;
                    }
                    detach_binary(&mut cdb.watches[l.code()], target);
                    detach_binary(&mut cdb.watches[(!target).code()], !l);
                    cdb.num_bin -= 1;
                }
            }
        }
    }
}

fn detach_binary(ws: &mut Vec<crate::cdb::watch::Watch>, blocker: Lit) {
    if let Some(n) = ws.iter().position(|w| w.is_binary() && w.blocker == blocker) {
        ws.detach(n);
    }
}

fn reachable_without_direct_edge(cdb: &ClauseDB, from: Lit, to: Lit, nv: usize) -> bool {
    let mut visited = vec![false; 2 * nv];
    let mut stack = vec![from];
    visited[from.code()] = true;
    let mut first = true;
    while let Some(cur) = stack.pop() {
        for w in cdb.watcher_list(cur) {
            if !w.is_binary() {
                continue;
            }
            if first && cur == from && w.blocker == to {
                continue; // skip the direct edge itself
            }
            if !visited[w.blocker.code()] {
                if w.blocker == to {
                    return true;
                }
                visited[w.blocker.code()] = true;
                stack.push(w.blocker);
            }
        }
        first = false;
    }
    false
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
    fn backbone_probe_derives_a_forced_unit() {
        let config = Config {
            preprocessbackbone: true,
            ..Config::default()
        };
        let mut asg = AssignStack::instantiate(&config, &cnf(2));
        let mut cdb = ClauseDB::instantiate(&config, &cnf(2));
        let (l1, l2) = (Lit::from_i32(1), Lit::from_i32(2));
        // ¬1 -> 2 and ¬1 -> ¬2 means 1 must be true.
        cdb.new_binary_clause(l1, l2);
        cdb.new_binary_clause(l1, !l2);
        let mut prober = Prober::instantiate(&config, &cnf(2));
        assert!(prober.backbone(&mut asg, &mut cdb).is_ok());
        assert_eq!(asg.value_lit(l1), Some(true));
    }
}
