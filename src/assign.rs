//! The trail, per-variable assignment records, and the two-watched-literal
//! propagator. Also owns the two coexisting decision orders (VMTF / EVSIDS)
//! since bumping them is tightly coupled to assignment and unassignment.
use {
    crate::{
        cdb::{watch::WatchDBIF, ClauseDB, ClauseDBIF},
        config::Config,
        proof::CertificationIF,
        types::*,
        var::{EvsidsHeap, Var, Vmtf},
    },
    std::ops::Range,
};

/// Focused mode decides via the VMTF queue and restarts aggressively on a
/// fast/slow glue trend; stable mode decides via the EVSIDS heap and
/// restarts on a Luby-reluctant schedule (spec.md §4.4).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchMode {
    Focused,
    Stable,
}

/// Contract for the trail / propagator; kept as a trait over `AssignStack`
/// so conflict analysis and the inprocessing passes depend on an interface
/// rather than the concrete struct layout.
pub trait AssignIF {
    fn num_vars(&self) -> usize;
    fn decision_level(&self) -> DecisionLevel;
    fn level(&self, vi: VarId) -> DecisionLevel;
    fn reason(&self, vi: VarId) -> AssignReason;
    fn value_lit(&self, l: Lit) -> Option<bool>;
    fn trail_len(&self) -> usize;
    fn trail_range(&self, r: Range<usize>) -> &[Lit];
    fn stack_is_empty(&self) -> bool;
    fn is_eliminated(&self, vi: VarId) -> bool;
    /// Number of assignments made before the current decision level began.
    fn len_upto(&self, level: DecisionLevel) -> usize;

    fn assign_at_rootlevel(&mut self, l: Lit) -> MaybeInconsistent;
    fn assign_by_decision(&mut self, l: Lit);
    fn assign_by_implication(&mut self, l: Lit, reason: AssignReason, cdb: &mut ClauseDB);
    fn cancel_until(&mut self, level: DecisionLevel, cdb: &ClauseDB);

    /// Run BCP from `q_head` to a fixpoint or the first conflict
    /// (spec.md §4.2's "search" propagation flavor).
    fn propagate(&mut self, cdb: &mut ClauseDB) -> Result<(), Conflict>;
    /// Propagation flavor used by probing passes: identical skeleton, but
    /// counts into a separate tick budget the caller can inspect via
    /// `probing_ticks` without perturbing search statistics.
    fn propagate_probe(&mut self, cdb: &mut ClauseDB) -> Result<(), Conflict>;

    fn select_decision_literal(&mut self) -> Option<Lit>;
    fn bump_var(&mut self, vi: VarId);
    fn rebuild_heap(&mut self);
    fn set_mode(&mut self, mode: SearchMode);
    fn mode(&self) -> SearchMode;

    /// `true` if every literal of `c` is satisfied under the current
    /// assignment.
    fn satisfies(&self, c: &[Lit]) -> bool;
}

pub struct AssignStack {
    pub assign: Vec<Option<bool>>,
    pub var: Vec<Var>,
    pub trail: Vec<Lit>,
    pub trail_lim: Vec<usize>,
    pub q_head: usize,
    pub probe_q_head: usize,
    pub num_vars: usize,

    pub vmtf: Vmtf,
    pub heap: EvsidsHeap,
    pub mode: SearchMode,
    pub var_decay: f64,
    pub reward_step: f64,

    pub num_conflict: usize,
    pub num_decision: usize,
    pub num_propagation: usize,
    pub search_ticks: usize,
    pub probing_ticks: usize,
}

impl Default for AssignStack {
    fn default() -> AssignStack {
        AssignStack {
            assign: Vec::new(),
            var: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            q_head: 0,
            probe_q_head: 0,
            num_vars: 0,
            vmtf: Vmtf::new(0),
            heap: EvsidsHeap::new(0),
            mode: SearchMode::Focused,
            var_decay: 0.95,
            reward_step: 1.0,
            num_conflict: 0,
            num_decision: 0,
            num_propagation: 0,
            search_ticks: 0,
            probing_ticks: 0,
        }
    }
}

impl Instantiate for AssignStack {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> AssignStack {
        let nv = cnf.num_of_variables;
        AssignStack {
            assign: vec![None; nv],
            var: Var::new_vars(nv, config.phase != 0),
            vmtf: Vmtf::new(nv),
            heap: EvsidsHeap::new(nv),
            var_decay: config.decay,
            num_vars: nv,
            ..AssignStack::default()
        }
    }
}

impl Export<(usize, usize, usize, usize)> for AssignStack {
    fn exports(&self) -> (usize, usize, usize, usize) {
        (
            self.num_conflict,
            self.num_decision,
            self.num_propagation,
            self.trail.len(),
        )
    }
}

impl AssignStack {
    fn assign_raw(&mut self, l: Lit, level: DecisionLevel, reason: AssignReason) {
        let vi = l.vi();
        self.assign[vi] = Some(l.is_pos());
        self.var[vi].level = level;
        self.var[vi].reason = reason;
        self.trail.push(l);
    }

    fn unassign(&mut self, vi: VarId) {
        self.var[vi].phase_saved = self.assign[vi];
        self.assign[vi] = None;
        self.var[vi].reason = AssignReason::None;
        self.heap.push(vi, &self.reward_ref());
    }

    fn reward_ref(&self) -> Vec<f64> {
        self.var.iter().map(|v| v.reward).collect()
    }

    /// Recompute per-variable weights from current clause content (literal
    /// occurrence count across both the arena and the binary watch lists)
    /// and push them into EVSIDS scores in stable mode, or into VMTF stamp
    /// order in focused mode (spec.md §4.4's periodic "reorder" action).
    pub fn reorder_by_clause_weight(&mut self, cdb: &ClauseDB) {
        let mut weight = vec![0u32; self.num_vars];
        for c in cdb.clause.iter().skip(1) {
            if c.is_garbage() {
                continue;
            }
            for l in &c.lits {
                weight[l.vi()] += 1;
            }
        }
        for ws in &cdb.watches {
            for w in ws {
                if w.is_binary() {
                    weight[w.blocker.vi()] += 1;
                }
            }
        }
        match self.mode {
            SearchMode::Stable => {
                for vi in 0..self.num_vars {
                    self.var[vi].reward = weight[vi] as f64;
                }
                self.rebuild_heap();
            }
            SearchMode::Focused => {
                let mut order: Vec<VarId> = (0..self.num_vars).collect();
                order.sort_by_key(|&v| weight[v]);
                for v in order {
                    self.vmtf.bump(v);
                }
            }
        }
    }

    /// Shared BCP skeleton; `q_head`/`ticks` select which counters the
    /// caller is charged against, matching the "search"/"probing" flavors
    /// of spec.md §4.2 (the third, "beyond-conflict", flavor lives in
    /// `probe.rs`, which keeps propagating past the first conflict).
    fn propagate_from(&mut self, cdb: &mut ClauseDB, probing: bool) -> Result<(), Conflict> {
        let q_head = if probing {
            &mut self.probe_q_head
        } else {
            &mut self.q_head
        };
        loop {
            if *q_head >= self.trail.len() {
                break;
            }
            let p = self.trail[*q_head];
            *q_head += 1;
            if probing {
                self.probing_ticks += 1;
            } else {
                self.search_ticks += 1;
                self.num_propagation += 1;
            }
            let ws = std::mem::take(&mut cdb.watches[p.code()]);
            let mut kept: Vec<crate::cdb::watch::Watch> = Vec::with_capacity(ws.len());
            let mut i = 0;
            let mut conflict = None;
            'watches: while i < ws.len() {
                let w = ws[i];
                if w.is_binary() {
                    match self.value_lit(w.blocker) {
                        Some(true) => kept.push(w),
                        Some(false) => {
                            conflict = Some(Conflict::Binary(!p, w.blocker));
                            kept.push(w);
                            i += 1;
                            break 'watches;
                        }
                        None => {
                            self.assign_raw(w.blocker, self.decision_level(), AssignReason::Binary(!p));
                            kept.push(w);
                        }
                    }
                    i += 1;
                    continue;
                }
                if self.value_lit(w.blocker) == Some(true) {
                    kept.push(w);
                    i += 1;
                    continue;
                }
                let cid = w.c;
                {
                    let c = &mut cdb.clause[cid];
                    if c.lits[0] == !p {
                        c.lits.swap(0, 1);
                    }
                }
                let other = cdb.clause[cid].lits[0];
                if self.value_lit(other) == Some(true) {
                    kept.push(crate::cdb::watch::Watch { blocker: other, c: cid });
                    i += 1;
                    continue;
                }
                let len = cdb.clause[cid].lits.len();
                let mut replacement = None;
                if len > 2 {
                    let start = cdb.clause[cid].search_from.clamp(2, len);
                    for k in (start..len).chain(2..start) {
                        if self.value_lit(cdb.clause[cid].lits[k]) != Some(false) {
                            replacement = Some(k);
                            break;
                        }
                    }
                }
                if let Some(k) = replacement {
                    let new_watch = cdb.clause[cid].lits[k];
                    cdb.clause[cid].lits.swap(1, k);
                    cdb.clause[cid].search_from = k + 1;
                    cdb.watches[(!new_watch).code()].register(other, cid);
                    i += 1;
                } else if self.value_lit(other) == Some(false) {
                    conflict = Some(Conflict::Clause(cid));
                    kept.push(w);
                    i += 1;
                    break 'watches;
                } else {
                    self.assign_raw(other, self.decision_level(), AssignReason::Clause(cid));
                    kept.push(w);
                    i += 1;
                }
            }
            kept.extend_from_slice(&ws[i..]);
            cdb.watches[p.code()] = kept;
            if let Some(c) = conflict {
                *(if probing { &mut self.probe_q_head } else { &mut self.q_head }) = self.trail.len();
                return Err(c);
            }
        }
        Ok(())
    }
}

impl AssignIF for AssignStack {
    fn num_vars(&self) -> usize {
        self.num_vars
    }
    fn decision_level(&self) -> DecisionLevel {
        self.trail_lim.len() as DecisionLevel
    }
    fn level(&self, vi: VarId) -> DecisionLevel {
        self.var[vi].level
    }
    fn reason(&self, vi: VarId) -> AssignReason {
        self.var[vi].reason
    }
    fn value_lit(&self, l: Lit) -> Option<bool> {
        self.assign[l.vi()].map(|b| b == l.is_pos())
    }
    fn trail_len(&self) -> usize {
        self.trail.len()
    }
    fn trail_range(&self, r: Range<usize>) -> &[Lit] {
        &self.trail[r]
    }
    fn stack_is_empty(&self) -> bool {
        self.trail.is_empty()
    }
    fn is_eliminated(&self, vi: VarId) -> bool {
        self.var[vi].flags.contains(Flag::ELIMINATED)
    }
    fn len_upto(&self, level: DecisionLevel) -> usize {
        if level == 0 {
            self.trail_lim.first().copied().unwrap_or(self.trail.len())
        } else {
            self.trail_lim[level as usize - 1]
        }
    }

    fn assign_at_rootlevel(&mut self, l: Lit) -> MaybeInconsistent {
        debug_assert_eq!(self.decision_level(), 0);
        match self.value_lit(l) {
            Some(true) => Ok(()),
            Some(false) => Err(SolverError::RootLevelConflict),
            None => {
                self.assign_raw(l, 0, AssignReason::Unit);
                Ok(())
            }
        }
    }

    fn assign_by_decision(&mut self, l: Lit) {
        self.trail_lim.push(self.trail.len());
        self.num_decision += 1;
        self.assign_raw(l, self.decision_level() + 1, AssignReason::Decision);
    }

    fn assign_by_implication(&mut self, l: Lit, reason: AssignReason, _cdb: &mut ClauseDB) {
        self.assign_raw(l, self.decision_level(), reason);
    }

    fn cancel_until(&mut self, level: DecisionLevel, _cdb: &ClauseDB) {
        if self.decision_level() <= level {
            return;
        }
        let lim = self.trail_lim[level as usize];
        while self.trail.len() > lim {
            let l = self.trail.pop().unwrap();
            let vi = l.vi();
            self.unassign(vi);
            self.vmtf.bump(vi); // reconsider soon, but don't reorder priority
        }
        self.trail_lim.truncate(level as usize);
        self.q_head = self.trail.len();
        self.probe_q_head = self.probe_q_head.min(self.trail.len());
        self.vmtf.reset_cursor();
    }

    fn propagate(&mut self, cdb: &mut ClauseDB) -> Result<(), Conflict> {
        self.propagate_from(cdb, false)
    }

    fn propagate_probe(&mut self, cdb: &mut ClauseDB) -> Result<(), Conflict> {
        self.propagate_from(cdb, true)
    }

    fn select_decision_literal(&mut self) -> Option<Lit> {
        let vi = match self.mode {
            SearchMode::Focused => self.vmtf.next_unassigned(&self.assign)?,
            SearchMode::Stable => loop {
                let reward = self.reward_ref();
                let cand = self.heap.pop(&reward)?;
                if self.assign[cand].is_none() && !self.is_eliminated(cand) {
                    break cand;
                }
            },
        };
        Some(Lit::new(vi, !self.var[vi].preferred_phase()))
    }

    fn bump_var(&mut self, vi: VarId) {
        const INC_SCALE: f64 = 1.0 / 0.95;
        self.var[vi].reward += self.reward_step;
        if self.var[vi].reward > 1e100 {
            for v in &mut self.var {
                v.reward *= 1e-100;
            }
            self.reward_step *= 1e-100;
        }
        self.reward_step *= INC_SCALE.powf(1.0 - self.var_decay);
        let reward = self.reward_ref();
        self.heap.bump(vi, &reward);
        self.vmtf.bump(vi);
    }

    fn rebuild_heap(&mut self) {
        let reward = self.reward_ref();
        let live = (0..self.num_vars).filter(|&v| self.assign[v].is_none() && !self.is_eliminated(v));
        self.heap.rebuild(live, &reward);
    }

    fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
        match mode {
            SearchMode::Focused => self.vmtf.reset_cursor(),
            SearchMode::Stable => self.rebuild_heap(),
        }
    }

    fn mode(&self) -> SearchMode {
        self.mode
    }

    fn satisfies(&self, c: &[Lit]) -> bool {
        c.iter().any(|&l| self.value_lit(l) == Some(true))
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
    fn test_propagation() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &cnf(4));
        let mut cdb = ClauseDB::instantiate(&config, &cnf(4));
        let l1 = Lit::from_i32(1);
        let l2 = Lit::from_i32(2);
        cdb.new_binary_clause(!l1, l2); // (¬1 ∨ 2): 1 -> 2
        assert!(asg.assign_at_rootlevel(l1).is_ok());
        assert!(asg.propagate(&mut cdb).is_ok());
        assert_eq!(asg.value_lit(l2), Some(true));
        assert_eq!(asg.trail.len(), 2);
    }

    #[test]
    fn test_binary_conflict() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &cnf(2));
        let mut cdb = ClauseDB::instantiate(&config, &cnf(2));
        let l1 = Lit::from_i32(1);
        let l2 = Lit::from_i32(2);
        cdb.new_binary_clause(l1, l2);
        assert!(asg.assign_at_rootlevel(!l1).is_ok());
        assert!(asg.assign_at_rootlevel(!l2).is_ok());
        assert!(matches!(asg.propagate(&mut cdb), Err(Conflict::Binary(_, _))));
    }

    #[test]
    fn test_cancel_until_undoes_trail() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &cnf(3));
        let cdb = ClauseDB::instantiate(&config, &cnf(3));
        asg.assign_by_decision(Lit::from_i32(1));
        asg.assign_by_decision(Lit::from_i32(2));
        assert_eq!(asg.decision_level(), 2);
        asg.cancel_until(0, &cdb);
        assert_eq!(asg.decision_level(), 0);
        assert!(asg.trail.is_empty());
    }
}
