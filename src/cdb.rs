//! The clause arena: storage, watch-list maintenance, garbage collection,
//! reduction, and activity bookkeeping for every non-binary clause.
//!
//! Binary clauses never enter `clause`; they live only as watch pairs
//! (spec.md §3), so `ClauseDB::num_bin` is tracked separately from
//! `clause.len()`.
pub mod watch;

use {
    crate::{
        config::Config,
        proof::{CertificationIF, CertifiedRecord, Certifier},
        types::*,
    },
    std::collections::VecDeque,
    watch::{Watch, WatchDBIF},
};

/// One clause's header plus its literal tail. Binary clauses never become a
/// `Clause` value.
#[derive(Clone, Debug)]
pub struct Clause {
    pub lits: Vec<Lit>,
    pub flags: CFlag,
    /// glue (LBD); meaningless (left at 0) for irredundant clauses
    pub rank: u32,
    pub activity: f64,
    /// index into `lits[2..]` where the next watch-replacement search
    /// should resume (the "searched" hint)
    pub search_from: usize,
    /// decaying recency counter, bumped whenever the clause is used in
    /// conflict analysis; consulted by `reduce` alongside glue
    pub used: u8,
}

impl Default for Clause {
    fn default() -> Clause {
        Clause {
            lits: Vec::new(),
            flags: CFlag::empty(),
            rank: 0,
            activity: 0.0,
            search_from: 2,
            used: 0,
        }
    }
}

impl Clause {
    pub fn is_learnt(&self) -> bool {
        self.flags.contains(CFlag::LEARNT)
    }
    pub fn is_garbage(&self) -> bool {
        self.flags.contains(CFlag::GARBAGE)
    }
}

impl std::ops::Index<usize> for Clause {
    type Output = Lit;
    fn index(&self, i: usize) -> &Lit {
        &self.lits[i]
    }
}

const MAX_USED: u8 = 255;

/// Owns the arena, every literal's watch list, and the certification
/// stream. Binary clauses bypass `clause` entirely.
pub struct ClauseDB {
    pub clause: Vec<Clause>,
    pub watches: Vec<Vec<Watch>>,
    pub num_bin: usize,
    pub num_learnt: usize,
    pub activity_inc: f64,
    pub activity_decay: f64,
    pub tier1: u32,
    pub tier2: u32,
    pub next_reduce: usize,
    pub touched: Vec<bool>,
    pub certifier: Certifier,
    pub eagersubsume: bool,
    eagersubsume_window: usize,
    recent_learnt: VecDeque<ClauseId>,
}

impl Default for ClauseDB {
    fn default() -> ClauseDB {
        ClauseDB {
            clause: vec![Clause::default()],
            watches: Vec::new(),
            num_bin: 0,
            num_learnt: 0,
            activity_inc: 1.0,
            activity_decay: 0.999,
            tier1: 3,
            tier2: 6,
            next_reduce: 1000,
            touched: Vec::new(),
            certifier: Certifier::default(),
            eagersubsume: false,
            eagersubsume_window: 16,
            recent_learnt: VecDeque::new(),
        }
    }
}

impl Instantiate for ClauseDB {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> ClauseDB {
        let nv = cnf.num_of_variables;
        ClauseDB {
            clause: Vec::with_capacity(cnf.num_of_clauses + 1),
            watches: vec![Vec::new(); 2 * nv.max(1)],
            touched: vec![false; nv],
            tier1: config.reducehigh,
            tier2: config.reducelow,
            next_reduce: config.reduce,
            certifier: Certifier::new(config.use_certification),
            eagersubsume: config.eagersubsume,
            eagersubsume_window: config.eagersubsume_window.max(1),
            ..ClauseDB::default()
        }
    }
}

impl std::ops::Index<ClauseId> for ClauseDB {
    type Output = Clause;
    fn index(&self, cid: ClauseId) -> &Clause {
        &self.clause[cid]
    }
}

impl std::ops::IndexMut<ClauseId> for ClauseDB {
    fn index_mut(&mut self, cid: ClauseId) -> &mut Clause {
        &mut self.clause[cid]
    }
}

/// Contract for everything that adds, removes, or scores clauses; `ClauseDB`
/// is the sole implementor, kept as a trait (teacher's "IF" convention) so
/// tests can assert against the interface.
pub trait ClauseDBIF {
    fn num_clause(&self) -> usize;
    fn watcher_list(&self, l: Lit) -> &[Watch];
    /// Register a two-literal clause as a pair of watches; never enters
    /// `clause`.
    fn new_binary_clause(&mut self, l0: Lit, l1: Lit);
    /// Register an irredundant clause of size ≥ 3.
    fn new_irredundant_clause(&mut self, lits: Vec<Lit>) -> ClauseId;
    /// Register a learnt (redundant) clause of size ≥ 3 with a known glue.
    fn new_redundant_clause(&mut self, lits: Vec<Lit>, glue: u32) -> ClauseId;
    fn mark_garbage(&mut self, cid: ClauseId);
    /// Remove `lit` from clause `cid`'s tail, re-watching if a watched
    /// literal was removed; used by shrinking/vivification/substitution.
    fn strengthen(&mut self, cid: ClauseId, lit: Lit);
    fn bump_activity(&mut self, cid: ClauseId);
    fn scale_activity(&mut self);
    /// Sparse GC: compacts the arena, dropping garbage clauses and
    /// rewriting every watch/reason reference that survives.
    fn garbage_collect(&mut self);
    fn tier_of(&self, glue: u32) -> Tier;
    /// Eager subsumption window (spec.md §4.3 step 10): check the clause
    /// just learned against the last `eagersubsume_window` learnt clauses
    /// and garbage-collect any of them it's a multiset-subset of.
    fn eager_subsume(&mut self, new_cid: ClauseId);
}

impl ClauseDBIF for ClauseDB {
    fn num_clause(&self) -> usize {
        self.clause.len() - 1 + self.num_bin
    }

    fn watcher_list(&self, l: Lit) -> &[Watch] {
        &self.watches[l.code()]
    }

    fn new_binary_clause(&mut self, l0: Lit, l1: Lit) {
        self.watches[(!l0).code()].register(l1, NULL_CLAUSE);
        self.watches[(!l1).code()].register(l0, NULL_CLAUSE);
        self.num_bin += 1;
        self.certifier.add(&[l0, l1]);
    }

    fn new_irredundant_clause(&mut self, lits: Vec<Lit>) -> ClauseId {
        debug_assert!(lits.len() >= 3);
        self.certifier.add(&lits);
        let cid = self.clause.len();
        let l0 = lits[0];
        let l1 = lits[1];
        self.clause.push(Clause {
            lits,
            ..Clause::default()
        });
        self.watches[(!l0).code()].register(l1, cid);
        self.watches[(!l1).code()].register(l0, cid);
        cid
    }

    fn new_redundant_clause(&mut self, lits: Vec<Lit>, glue: u32) -> ClauseId {
        debug_assert!(lits.len() >= 3);
        self.certifier.add(&lits);
        let cid = self.clause.len();
        let l0 = lits[0];
        let l1 = lits[1];
        self.clause.push(Clause {
            lits,
            flags: CFlag::LEARNT,
            rank: glue,
            ..Clause::default()
        });
        self.watches[(!l0).code()].register(l1, cid);
        self.watches[(!l1).code()].register(l0, cid);
        self.num_learnt += 1;
        cid
    }

    fn mark_garbage(&mut self, cid: ClauseId) {
        if self.clause[cid].is_garbage() {
            return;
        }
        self.certifier.delete(&self.clause[cid].lits.clone());
        let c = &mut self.clause[cid];
        c.flags.insert(CFlag::GARBAGE);
        if c.is_learnt() {
            self.num_learnt -= 1;
        }
        let l0 = c.lits[0];
        let l1 = c.lits[1];
        self.watches[(!l0).code()].detach_with(cid);
        self.watches[(!l1).code()].detach_with(cid);
    }

    fn strengthen(&mut self, cid: ClauseId, lit: Lit) {
        let was_watched = self.clause[cid].lits[0] == lit || self.clause[cid].lits[1] == lit;
        self.certifier.delete(&self.clause[cid].lits.clone());
        {
            let c = &mut self.clause[cid];
            c.lits.retain(|&l| l != lit);
        }
        self.certifier.add(&self.clause[cid].lits.clone());
        if was_watched {
            self.watches[(!lit).code()].detach_with(cid);
            let l0 = self.clause[cid].lits[0];
            let new_blocker = self.clause[cid].lits[1];
            self.watches[(!l0).code()].register(new_blocker, cid);
        }
    }

    fn bump_activity(&mut self, cid: ClauseId) {
        let inc = self.activity_inc;
        let c = &mut self.clause[cid];
        c.activity += inc;
        c.used = c.used.saturating_add(1).min(MAX_USED);
        if c.activity > 1e100 {
            for c in &mut self.clause[1..] {
                c.activity *= 1e-100;
            }
            self.activity_inc *= 1e-100;
        }
    }

    fn scale_activity(&mut self) {
        self.activity_inc /= self.activity_decay;
    }

    fn garbage_collect(&mut self) {
        for ws in &mut self.watches {
            ws.retain(|w| w.is_binary() || !self.clause[w.c].is_garbage());
        }
    }

    fn tier_of(&self, glue: u32) -> Tier {
        if glue <= self.tier1 {
            Tier::Core
        } else if glue <= self.tier2 {
            Tier::Mid
        } else {
            Tier::Local
        }
    }

    fn eager_subsume(&mut self, new_cid: ClauseId) {
        if !self.eagersubsume {
            return;
        }
        let new_lits = self.clause[new_cid].lits.clone();
        let window: Vec<ClauseId> = self.recent_learnt.iter().cloned().collect();
        for old_cid in window {
            if old_cid == new_cid || self.clause[old_cid].is_garbage() {
                continue;
            }
            let subsumed = {
                let old_lits = &self.clause[old_cid].lits;
                old_lits.len() > new_lits.len() && new_lits.iter().all(|l| old_lits.contains(l))
            };
            if subsumed {
                self.mark_garbage(old_cid);
            }
        }
        self.recent_learnt.push_back(new_cid);
        if self.recent_learnt.len() > self.eagersubsume_window {
            self.recent_learnt.pop_front();
        }
    }
}

impl ClauseDB {
    /// Delete a fraction of redundant clauses, preferring high glue and low
    /// `used`; clauses in `protected` (currently reasons) are skipped
    /// (spec.md §4.4's reduce policy). Core-tier clauses (`tier_of`) are
    /// never candidates; Local-tier ones are spent first, and Mid-tier ones
    /// are only reached if Local alone can't supply half the pool.
    pub fn reduce(&mut self, protected: impl Fn(ClauseId) -> bool) -> usize {
        let mut mid: Vec<ClauseId> = Vec::new();
        let mut local: Vec<ClauseId> = Vec::new();
        for cid in 1..self.clause.len() {
            let c = &self.clause[cid];
            if !c.is_learnt() || c.is_garbage() || protected(cid) {
                continue;
            }
            match self.tier_of(c.rank) {
                Tier::Core => {}
                Tier::Mid => mid.push(cid),
                Tier::Local => local.push(cid),
            }
        }
        {
            let clause = &self.clause;
            let by_rank_used = |a: &ClauseId, b: &ClauseId| {
                let ca = &clause[*a];
                let cb = &clause[*b];
                (cb.rank, ca.used).cmp(&(ca.rank, cb.used))
            };
            local.sort_by(by_rank_used);
            mid.sort_by(by_rank_used);
        }
        let n = (mid.len() + local.len() + 1) / 2;
        let from_local = n.min(local.len());
        for &cid in &local[..from_local] {
            self.mark_garbage(cid);
        }
        let from_mid = (n - from_local).min(mid.len());
        for &cid in &mid[..from_mid] {
            self.mark_garbage(cid);
        }
        self.garbage_collect();
        self.next_reduce += self.next_reduce / 5 + 100;
        self.recompute_tiers();
        from_local + from_mid
    }

    /// Recompute the Core/Mid glue bounds from the current learnt-clause
    /// glue distribution (spec.md §4.3 step 5): tier1 tracks the median
    /// glue, tier2 the third quartile, so the Core/Mid/Local split follows
    /// how the search is actually learning rather than staying pinned to
    /// the config defaults for the whole run. Left unchanged when there
    /// aren't enough learnt clauses yet for the distribution to be
    /// meaningful.
    fn recompute_tiers(&mut self) {
        let mut glues: Vec<u32> = self.clause[1..]
            .iter()
            .filter(|c| c.is_learnt() && !c.is_garbage())
            .map(|c| c.rank)
            .collect();
        if glues.len() < 16 {
            return;
        }
        glues.sort_unstable();
        let pct = |q: usize| glues[(glues.len() * q / 100).min(glues.len() - 1)];
        self.tier1 = pct(50).max(2);
        self.tier2 = pct(75).max(self.tier1 + 1);
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
    fn binary_clause_never_enters_the_arena() {
        let mut cdb = ClauseDB::instantiate(&Config::default(), &cnf(4));
        let l0 = Lit::from_i32(1);
        let l1 = Lit::from_i32(2);
        cdb.new_binary_clause(l0, l1);
        assert_eq!(cdb.clause.len(), 1); // only the sentinel
        assert_eq!(cdb.num_bin, 1);
        assert_eq!(cdb.watcher_list(!l0).len(), 1);
        assert!(cdb.watcher_list(!l0)[0].is_binary());
    }

    #[test]
    fn reduce_keeps_core_tier() {
        let mut cdb = ClauseDB::instantiate(&Config::default(), &cnf(10));
        let lits = |a: i32, b: i32, c: i32| vec![Lit::from_i32(a), Lit::from_i32(b), Lit::from_i32(c)];
        let core = cdb.new_redundant_clause(lits(1, 2, 3), 2);
        let local = cdb.new_redundant_clause(lits(4, 5, 6), 20);
        let n = cdb.reduce(|_| false);
        assert_eq!(n, 1);
        assert!(!cdb.clause[core].is_garbage());
        assert!(cdb.clause[local].is_garbage());
    }
}
