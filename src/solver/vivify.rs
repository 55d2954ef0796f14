//! Vivification: shrink a clause by assuming its literals' negations one
//! at a time and propagating, keeping only the prefix actually needed
//! before a conflict or an already-falsified tail (spec.md §5's
//! inprocessing schedule).
use super::Solver;
use crate::{
    assign::AssignIF,
    cdb::{ClauseDB, ClauseDBIF},
    state::Stat,
    types::*,
};

pub struct Vivifier {
    pub active: bool,
    irredundant_too: bool,
    tier_ticks: [usize; 3],
}

impl Default for Vivifier {
    fn default() -> Vivifier {
        Vivifier {
            active: true,
            irredundant_too: false,
            tier_ticks: [100_000, 100_000, 100_000],
        }
    }
}

impl Instantiate for Vivifier {
    fn instantiate(config: &crate::config::Config, _cnf: &CNFDescription) -> Vivifier {
        Vivifier {
            active: !config.without_vivify,
            irredundant_too: config.vivifyirr,
            tier_ticks: [config.vivifytier1, config.vivifytier2, config.vivifytier3],
        }
    }
}

/// Try shrinking clause `cid` in place. Returns `true` if it changed
/// (shrunk or proven garbage). The solver must be at decision level 0.
fn vivify_clause(asg: &mut impl AssignIF, cdb: &mut ClauseDB, cid: ClauseId) -> bool {
    debug_assert_eq!(asg.decision_level(), 0);
    let lits = cdb.clause[cid].lits.clone();
    let mut keep = Vec::new();
    let mut changed = false;
    for &l in &lits {
        match asg.value_lit(l) {
            Some(true) => {
                asg.cancel_until(0, cdb);
                cdb.mark_garbage(cid);
                return true;
            }
            Some(false) => {
                changed = true; // already falsified at the root: drop it
                continue;
            }
            None => {}
        }
        asg.assign_by_decision(!l);
        match asg.propagate(cdb) {
            Err(_) => {
                keep.push(l);
                changed = true;
                break;
            }
            Ok(()) => keep.push(l),
        }
    }
    asg.cancel_until(0, cdb);
    if !changed || keep.len() == lits.len() || keep.len() < 2 {
        return false;
    }
    for &l in &lits {
        if !keep.contains(&l) {
            cdb.strengthen(cid, l);
        }
    }
    true
}

/// Run one vivification sweep over eligible clauses: irredundant ones
/// only if configured, learnt ones always, bucketed by a combined tier
/// ticks budget (spec.md §5's per-pass effort cap).
pub fn run(solver: &mut Solver) -> MaybeInconsistent {
    if !solver.vivifier.active || solver.asg.decision_level() != 0 {
        return Ok(());
    }
    let mut ids: Vec<ClauseId> = (1..solver.cdb.clause.len())
        .filter(|&cid| {
            let c = &solver.cdb.clause[cid];
            !c.is_garbage() && (c.is_learnt() || solver.vivifier.irredundant_too)
        })
        .collect();
    if solver.config.vivifysort {
        ids.sort_by_key(|&cid| solver.cdb.clause[cid].lits.len());
    }
    let budget: usize = solver.vivifier.tier_ticks.iter().sum();
    let mut ticks = 0usize;
    for cid in ids {
        if solver.cdb.clause[cid].is_garbage() {
            continue;
        }
        ticks += solver.cdb.clause[cid].lits.len();
        if ticks > budget {
            break;
        }
        if vivify_clause(&mut solver.asg, &mut solver.cdb, cid) {
            solver.state[Stat::Vivify] += 1;
        }
    }
    solver.cdb.garbage_collect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assign::AssignStack, config::Config};

    fn cnf(nv: usize) -> CNFDescription {
        CNFDescription {
            num_of_variables: nv,
            num_of_clauses: 0,
            pathname: String::new(),
        }
    }

    #[test]
    fn shrinks_a_clause_whose_tail_is_already_implied() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &cnf(3));
        let mut cdb = ClauseDB::instantiate(&config, &cnf(3));
        let (a, b, c) = (Lit::from_i32(1), Lit::from_i32(2), Lit::from_i32(3));
        cdb.new_binary_clause(!a, b); // a -> b
        let cid = cdb.new_irredundant_clause(vec![a, b, c]);
        let changed = vivify_clause(&mut asg, &mut cdb, cid);
        assert!(changed);
    }
}
