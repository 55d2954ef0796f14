//! PAWS-style local-search walk: a phase generator that climbs toward
//! fewer unsatisfied clauses by additively reweighting them, independent
//! of the CDCL trail (spec.md §5.9). Its output feeds the `Walking`
//! rephase slot.
use crate::{cdb::ClauseDB, config::Config, types::*};

/// Minimal xorshift64* generator: no external RNG dependency is pulled in
/// for what is, here, just tie-breaking.
struct Xorshift64(u64);

impl Xorshift64 {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

pub struct Walker {
    pub active: bool,
    ticks_budget: usize,
    noise_pct: u32,
    rng: Xorshift64,
}

impl Default for Walker {
    fn default() -> Walker {
        Walker {
            active: true,
            ticks_budget: 100_000,
            noise_pct: 3,
            rng: Xorshift64(0x9E3779B97F4A7C15),
        }
    }
}

impl Instantiate for Walker {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Walker {
        Walker {
            active: !config.without_walk,
            ticks_budget: config.walkticks,
            noise_pct: config.walknoise,
            rng: Xorshift64(0x9E3779B97F4A7C15 ^ (config.walkticks as u64)),
        }
    }
}

impl Walker {
    fn all_clauses(cdb: &ClauseDB) -> Vec<Vec<Lit>> {
        let mut out: Vec<Vec<Lit>> = cdb
            .clause
            .iter()
            .skip(1)
            .filter(|c| !c.is_garbage())
            .map(|c| c.lits.clone())
            .collect();
        for (code, ws) in cdb.watches.iter().enumerate() {
            let l = Lit::new(code / 2, code % 2 == 1);
            for w in ws {
                if w.is_binary() && l.code() < w.blocker.code() {
                    out.push(vec![l, w.blocker]);
                }
            }
        }
        out
    }

    /// Run a bounded number of flips of a greedy/random walk (PAWS: flip
    /// the variable in a random unsatisfied clause that most reduces the
    /// weighted unsat count, occasionally flipping randomly instead).
    /// Returns the best phase assignment found.
    pub fn run(&mut self, num_vars: usize, cdb: &ClauseDB) -> Vec<bool> {
        let clauses = Self::all_clauses(cdb);
        let mut phase: Vec<bool> = (0..num_vars).map(|_| self.rng.next() & 1 == 1).collect();
        if !self.active || clauses.is_empty() {
            return phase;
        }
        let mut weight = vec![1u32; clauses.len()];
        let satisfied = |phase: &[bool], c: &[Lit]| c.iter().any(|l| phase[l.vi()] == l.is_pos());
        let mut best = phase.clone();
        let mut best_unsat = clauses.iter().filter(|c| !satisfied(&phase, c)).count();
        for _ in 0..self.ticks_budget {
            let unsat: Vec<usize> = (0..clauses.len()).filter(|&i| !satisfied(&phase, &clauses[i])).collect();
            if unsat.is_empty() {
                best = phase.clone();
                break;
            }
            let pick = unsat[self.rng.below(unsat.len())];
            let c = &clauses[pick];
            let vi = if self.rng.below(100) < self.noise_pct as usize {
                c[self.rng.below(c.len())].vi()
            } else {
                // greedy: the variable in `c` whose flip clears the most
                // weight of currently-unsatisfied clauses while breaking
                // the fewest satisfied ones.
                c.iter()
                    .map(|l| l.vi())
                    .max_by_key(|&vi| {
                        phase[vi] = !phase[vi];
                        let gain: i64 = unsat.iter().filter(|&&i| satisfied(&phase, &clauses[i])).map(|&i| weight[i] as i64).sum();
                        phase[vi] = !phase[vi];
                        gain
                    })
                    .unwrap()
            };
            phase[vi] = !phase[vi];
            for &i in &unsat {
                if !satisfied(&phase, &clauses[i]) {
                    weight[i] += 1;
                }
            }
            let unsat_now = clauses.iter().filter(|c| !satisfied(&phase, c)).count();
            if unsat_now < best_unsat {
                best_unsat = unsat_now;
                best = phase.clone();
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::ClauseDBIF;

    fn cnf(nv: usize) -> CNFDescription {
        CNFDescription {
            num_of_variables: nv,
            num_of_clauses: 0,
            pathname: String::new(),
        }
    }

    #[test]
    fn finds_a_satisfying_phase_for_an_easy_instance() {
        let config = Config {
            walkticks: 500,
            ..Config::default()
        };
        let mut cdb = ClauseDB::instantiate(&config, &cnf(2));
        let (a, b) = (Lit::from_i32(1), Lit::from_i32(2));
        cdb.new_binary_clause(a, b);
        cdb.new_binary_clause(!a, !b);
        let mut walker = Walker::instantiate(&config, &cnf(2));
        let phase = walker.run(2, &cdb);
        let c1 = phase[0] || phase[1];
        let c2 = !phase[0] || !phase[1];
        assert!(c1 && c2);
    }
}
