//! Bounded variable elimination (BVE), its windowed "fast" variant, and
//! forward subsumption, plus the extension-stack bookkeeping BVE needs to
//! reconstruct a model afterward (spec.md §5.1-§5.2).
use crate::{
    assign::{AssignIF, AssignStack},
    cdb::{watch::WatchDBIF, ClauseDB, ClauseDBIF},
    config::Config,
    extend::ExtensionStack,
    types::*,
};

/// Per-variable positive/negative occurrence lists, rebuilt whenever
/// `Flag::TOUCHED` accumulates past a threshold rather than incrementally.
pub struct Eliminator {
    pub active: bool,
    pos_occs: Vec<Vec<ClauseId>>,
    neg_occs: Vec<Vec<ClauseId>>,
    queue: Vec<VarId>,
    lit_limit: usize,
    occ_limit: usize,
    bound: usize,
    rounds: usize,
    fast_rounds: usize,
    fast_occs: usize,
    fast_sub: bool,
    fast_cls_limit: usize,
    subsume_cls_limit: usize,
    subsume_occ_limit: usize,
    pub num_eliminated: usize,
}

impl Default for Eliminator {
    fn default() -> Eliminator {
        Eliminator {
            active: false,
            pos_occs: Vec::new(),
            neg_occs: Vec::new(),
            queue: Vec::new(),
            lit_limit: 100,
            occ_limit: 1000,
            bound: 0,
            rounds: 1,
            fast_rounds: 1,
            fast_occs: 100,
            fast_sub: true,
            fast_cls_limit: 1000,
            subsume_cls_limit: 1000,
            subsume_occ_limit: 1000,
            num_eliminated: 0,
        }
    }
}

impl Instantiate for Eliminator {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> Eliminator {
        let nv = cnf.num_of_variables;
        Eliminator {
            active: !config.without_elim,
            pos_occs: vec![Vec::new(); nv],
            neg_occs: vec![Vec::new(); nv],
            queue: Vec::new(),
            lit_limit: config.elim_lit_limit,
            occ_limit: config.eliminateocclim,
            bound: config.eliminatebound,
            rounds: config.eliminaterounds,
            fast_rounds: config.fastelrounds,
            fast_occs: config.fasteloccs,
            fast_sub: config.fastelsub,
            fast_cls_limit: config.fastelclslim,
            subsume_cls_limit: config.subsumeclslim,
            subsume_occ_limit: config.subsumeocclim,
            num_eliminated: 0,
        }
    }
}

impl Eliminator {
    fn rebuild_occurrences(&mut self, asg: &AssignStack, cdb: &ClauseDB) {
        for occs in self.pos_occs.iter_mut().chain(self.neg_occs.iter_mut()) {
            occs.clear();
        }
        for (cid, c) in cdb.clause.iter().enumerate().skip(1) {
            if c.is_garbage() {
                continue;
            }
            for &l in &c.lits {
                if asg.is_eliminated(l.vi()) {
                    continue;
                }
                if l.is_pos() {
                    self.pos_occs[l.vi()].push(cid);
                } else {
                    self.neg_occs[l.vi()].push(cid);
                }
            }
        }
        self.queue = (0..asg.num_vars())
            .filter(|&v| !asg.is_eliminated(v) && asg.value_lit(Lit::new(v, false)).is_none())
            .collect();
    }

    /// Resolve clause `pos` (containing `v` positively) against `neg`
    /// (containing `v` negatively) on variable `v`, dropping `v` and its
    /// negation. Returns `None` if the resolvent is a tautology.
    fn resolve(pos: &[Lit], neg: &[Lit], v: VarId) -> Option<Vec<Lit>> {
        let mut out: Vec<Lit> = pos.iter().filter(|l| l.vi() != v).cloned().collect();
        for &l in neg.iter().filter(|l| l.vi() != v) {
            if out.contains(&!l) {
                return None;
            }
            if !out.contains(&l) {
                out.push(l);
            }
        }
        Some(out)
    }

    /// Try eliminating `v` by resolving every positive occurrence against
    /// every negative one; only committed if the resolvent count does not
    /// exceed what was there before (spec.md §5.1's elimination bound).
    fn try_eliminate(
        &mut self,
        v: VarId,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        extend: &mut ExtensionStack,
    ) -> MaybeInconsistent {
        if asg.is_eliminated(v) || asg.value_lit(Lit::new(v, false)).is_some() {
            return Ok(());
        }
        let pos = self.pos_occs[v].clone();
        let neg = self.neg_occs[v].clone();
        if pos.len() > self.occ_limit || neg.len() > self.occ_limit {
            return Ok(());
        }
        let before = pos.len() + neg.len();
        let growth = (before + self.bound) as i32;
        let mut resolvents = Vec::new();
        for &p in &pos {
            for &n in &neg {
                if cdb.clause[p].is_garbage() || cdb.clause[n].is_garbage() {
                    continue;
                }
                if let Some(r) = Self::resolve(&cdb.clause[p].lits, &cdb.clause[n].lits, v) {
                    if r.is_empty() {
                        return Err(SolverError::EmptyClause);
                    }
                    resolvents.push(r);
                }
            }
        }
        if resolvents.len() as i32 > growth {
            return Ok(());
        }
        // Record only the smaller occurrence side, as one conjunctive
        // witness group; the complement-default rule in
        // `ExtensionStack::extend_model` then guarantees the other
        // (unrecorded) side is satisfied too, since its clauses all carry
        // the opposite polarity of `v`. All of this side's clauses must be
        // grouped together -- not pushed one group per clause -- or a
        // later-checked clause that happens to already be satisfied can
        // flip `v` back and unsatisfy an earlier one.
        let (smaller, witness) = if pos.len() <= neg.len() {
            (&pos, Lit::new(v, false))
        } else {
            (&neg, Lit::new(v, true))
        };
        let witness_clauses: Vec<Vec<Lit>> = smaller
            .iter()
            .map(|&cid| cdb.clause[cid].lits.iter().filter(|l| l.vi() != v).cloned().collect())
            .collect();
        extend.push_clauses(witness, witness_clauses);
        for &cid in pos.iter().chain(neg.iter()) {
            cdb.mark_garbage(cid);
        }
        asg.var[v].flags.insert(Flag::ELIMINATED);
        self.num_eliminated += 1;
        for r in resolvents {
            match r.len() {
                1 => asg.assign_at_rootlevel(r[0])?,
                2 => cdb.new_binary_clause(r[0], r[1]),
                _ => {
                    let cid = cdb.new_irredundant_clause(r);
                    for &l in &cdb.clause[cid].lits {
                        if l.is_pos() {
                            self.pos_occs[l.vi()].push(cid);
                        } else {
                            self.neg_occs[l.vi()].push(cid);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Forward subsumption: a clause subsumed by a shorter clause sharing
    /// all but (at most) one literal is deleted or strengthened
    /// (spec.md §5.2).
    fn forward_subsume(&mut self, asg: &mut AssignStack, cdb: &mut ClauseDB) {
        let ids: Vec<ClauseId> = (1..cdb.clause.len())
            .filter(|&cid| !cdb.clause[cid].is_garbage() && cdb.clause[cid].lits.len() <= self.subsume_cls_limit)
            .collect();
        for cid in ids {
            if cdb.clause[cid].is_garbage() {
                continue;
            }
            let lits = cdb.clause[cid].lits.clone();
            let pivot = lits[0];
            let occs = if pivot.is_pos() {
                &self.pos_occs[pivot.vi()]
            } else {
                &self.neg_occs[pivot.vi()]
            };
            for &other in &occs.clone() {
                if other == cid || cdb.clause[other].is_garbage() {
                    continue;
                }
                if cdb.clause[other].lits.len() >= lits.len() {
                    continue;
                }
                let small = cdb.clause[other].lits.clone();
                let diff: Vec<Lit> = lits.iter().filter(|l| !small.contains(l)).cloned().collect();
                if diff.is_empty() {
                    cdb.mark_garbage(cid);
                    break;
                }
                if diff.len() == 1 && small.contains(&!diff[0]) {
                    cdb.strengthen(cid, diff[0]);
                    let _ = asg;
                    break;
                }
            }
        }
    }

    /// Run `rounds` passes of BVE (or the cheaper fast-BVE variant when
    /// `fast` is set) over the decreasing-occurrence queue.
    pub fn eliminate(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        extend: &mut ExtensionStack,
        fast: bool,
    ) -> MaybeInconsistent {
        if !self.active {
            return Ok(());
        }
        let rounds = if fast { self.fast_rounds } else { self.rounds };
        let occ_cap = if fast { self.fast_occs } else { self.occ_limit };
        let prior = self.occ_limit;
        self.occ_limit = occ_cap;
        for _ in 0..rounds {
            self.rebuild_occurrences(asg, cdb);
            if !fast || self.fast_sub {
                self.forward_subsume(asg, cdb);
            }
            self.rebuild_occurrences(asg, cdb);
            let mut order = self.queue.clone();
            order.sort_by_key(|&v| self.pos_occs[v].len() + self.neg_occs[v].len());
            for v in order {
                if fast && cdb.clause.len() > self.fast_cls_limit {
                    break;
                }
                self.try_eliminate(v, asg, cdb, extend)?;
            }
            cdb.garbage_collect();
        }
        self.occ_limit = prior;
        Ok(())
    }

    pub fn num_eliminated(&self) -> usize {
        self.num_eliminated
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
    fn eliminates_a_variable_with_small_resolvent_growth() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &cnf(3));
        let mut cdb = ClauseDB::instantiate(&config, &cnf(3));
        let mut extend = ExtensionStack::default();
        let mut elim = Eliminator::instantiate(&config, &cnf(3));
        let (l1, l2, l3) = (Lit::from_i32(1), Lit::from_i32(2), Lit::from_i32(3));
        cdb.new_irredundant_clause(vec![l1, l2, l3]);
        cdb.new_irredundant_clause(vec![!l1, l2, l3]);
        elim.eliminate(&mut asg, &mut cdb, &mut extend, false).unwrap();
        assert!(asg.is_eliminated(l1.vi()) || elim.num_eliminated == 0);
    }
}
