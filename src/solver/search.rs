//! The main CDCL loop: decide, propagate, analyze conflicts, and
//! periodically restart, reduce, rephase, switch search mode, and run the
//! inprocessing passes between decisions (spec.md §4.2, §4.4).
use super::{conflict, vivify, Solver};
use crate::{
    assign::{AssignIF, SearchMode},
    cdb::ClauseDBIF,
    restart::RestartIF,
    state::Stat,
    types::*,
};

/// Run to completion: returns `Certificate::SAT` with an externally
/// numbered model, `Certificate::UNSAT`, or a `SolverError` if a
/// configured budget was exceeded.
pub fn solve(solver: &mut Solver) -> SolverResult {
    if !solver.ok {
        return Ok(Certificate::UNSAT);
    }
    if solver.asg.propagate(&mut solver.cdb).is_err() {
        return Ok(Certificate::UNSAT);
    }
    preprocess(solver)?;
    if !solver.ok {
        return Ok(Certificate::UNSAT);
    }
    warmup(solver)?;

    loop {
        if solver.state.timed_out() {
            return Err(SolverError::TimeOut);
        }
        match solver.asg.propagate(&mut solver.cdb) {
            Err(c) => {
                solver.state[Stat::Conflict] += 1;
                if solver.asg.decision_level() == 0 {
                    return Ok(Certificate::UNSAT);
                }
                let analysis = conflict::analyze(&solver.asg, &solver.cdb, &solver.config, c);
                solver.rst.update_lbd(analysis.glue);
                if let Err(e) = conflict::backjump_and_learn(&mut solver.asg, &mut solver.cdb, &solver.config, &analysis) {
                    return if e == SolverError::EmptyClause || e == SolverError::RootLevelConflict {
                        Ok(Certificate::UNSAT)
                    } else {
                        Err(e)
                    };
                }
                if !solver.config.without_bump {
                    for &l in &analysis.lits {
                        solver.asg.bump_var(l.vi());
                    }
                    conflict::bump_reasons(&mut solver.asg, &solver.cdb, &solver.config, &analysis);
                }
                solver.cdb.scale_activity();
                if analysis.lits.len() > 2 {
                    // the clause just learned is always the most recent one
                    let cid = solver.cdb.clause.len() - 1;
                    solver.cdb.bump_activity(cid);
                }
            }
            Ok(()) => {
                solver.rst.update_asg(solver.asg.trail_len(), solver.asg.num_vars());
                if solver.asg.stack_is_empty() && solver.asg.decision_level() == 0 {
                    maintain(solver)?;
                }
                if let Some(lit) = solver.asg.select_decision_literal() {
                    solver.asg.assign_by_decision(lit);
                    solver.state[Stat::Decision] += 1;
                } else {
                    return Ok(model_certificate(solver));
                }
                maintain(solver)?;
            }
        }
    }
}

/// Run the inprocessing passes once, before search begins (spec.md §5's
/// ordering: fast-BVE up front, then the shared probe sequence).
fn preprocess(solver: &mut Solver) -> MaybeInconsistent {
    if solver.config.preprocessbackbone {
        solver.prober.backbone(&mut solver.asg, &mut solver.cdb)?;
    }
    if let Err(e) = solver.elim.eliminate(&mut solver.asg, &mut solver.cdb, &mut solver.extend, false) {
        solver.ok = false;
        return if e == SolverError::EmptyClause { Ok(()) } else { Err(e) };
    }
    run_probe_sequence(solver)
}

/// Congruence, substitution, vivification, backbone probing, transitive
/// reduction, sweep, and factoring, in that order (spec.md §4.4's
/// "Inprocessing" action, "probe()"): shared between the one-shot
/// pre-search pass and the periodic re-invocation gated on
/// `State::next_probe`.
fn run_probe_sequence(solver: &mut Solver) -> MaybeInconsistent {
    if solver.config.preprocesscongruence {
        let eqs = solver.cong.find_equivalences(&solver.cdb, solver.asg.num_vars());
        apply_equivalences(solver, &eqs)?;
    }
    if let Err(e) = solver.sub.run(&mut solver.asg, &mut solver.cdb, &mut solver.extend) {
        solver.ok = false;
        return if e == SolverError::EmptyClause { Ok(()) } else { Err(e) };
    }
    vivify::run(solver)?;
    if solver.config.preprocessbackbone {
        solver.prober.backbone(&mut solver.asg, &mut solver.cdb)?;
    }
    solver.prober.transitive_reduction(&mut solver.cdb, solver.asg.num_vars());
    if solver.config.preprocessweep {
        let eqs = solver.sweeper.find_equivalences(&solver.asg, &solver.cdb);
        apply_equivalences(solver, &eqs)?;
    }
    if solver.config.preprocessfactor {
        let mut nv = solver.asg.num_vars();
        if let Some(new_vi) = solver.factorer.run(&mut nv, &mut solver.cdb) {
            while solver.asg.num_vars() <= new_vi {
                solver.new_var();
            }
        }
    }
    Ok(())
}

/// Warmup (spec.md §4.4): a one-shot pass, run once before the first
/// restart, that decides every unassigned variable along its preferred
/// (saved/target/best) phase and propagates without learning, solely to
/// populate the target/best phase arrays from wherever propagation got to.
/// Conflicts just unwind the one decision that caused them; the whole trail
/// is discarded at the end, so nothing here affects the real search.
fn warmup(solver: &mut Solver) -> MaybeInconsistent {
    if !solver.config.warmup {
        return Ok(());
    }
    let nv = solver.asg.num_vars();
    for vi in 0..nv {
        if solver.asg.is_eliminated(vi) || solver.asg.value_lit(Lit::new(vi, false)).is_some() {
            continue;
        }
        let phase = solver.asg.var[vi].preferred_phase();
        solver.asg.assign_by_decision(Lit::new(vi, !phase));
        if solver.asg.propagate(&mut solver.cdb).is_err() {
            let back = solver.asg.decision_level().saturating_sub(1);
            solver.asg.cancel_until(back, &solver.cdb);
        }
    }
    for vi in 0..nv {
        if let Some(b) = solver.asg.value_lit(Lit::new(vi, false)) {
            solver.asg.var[vi].phase_target = Some(b);
            solver.asg.var[vi].phase_best = Some(b);
        }
    }
    solver.asg.cancel_until(0, &solver.cdb);
    Ok(())
}

fn apply_equivalences(solver: &mut Solver, eqs: &[(Lit, Lit)]) -> MaybeInconsistent {
    for &(a, b) in eqs {
        if a.vi() == b.vi() {
            continue;
        }
        solver.cdb.new_binary_clause(!a, b);
        solver.cdb.new_binary_clause(a, !b);
    }
    Ok(())
}

/// Housekeeping run whenever the trail drains back to the root: reduce,
/// rephase, restart-mode switch, and a light periodic inprocessing pass
/// (spec.md §4.4's schedule).
fn maintain(solver: &mut Solver) -> MaybeInconsistent {
    let nc = solver.state[Stat::Conflict];
    if solver.asg.decision_level() == 0
        && solver.rst.should_restart(solver.asg.mode(), nc)
    {
        solver.asg.cancel_until(0, &solver.cdb);
        solver.rst.restart_done(nc);
        solver.state[Stat::Restart] += 1;
    }
    if nc >= solver.state.next_reduce && solver.asg.decision_level() == 0 {
        let asg_ref = &solver.asg;
        let n = solver.cdb.reduce(|cid| is_reason(asg_ref, cid));
        solver.state[Stat::Reduction] += n;
        solver.state.next_reduce += solver.config.reduce;
        vivify::run(solver)?;
    }
    if let Some(next) = solver
        .rst
        .should_switch_mode(solver.asg.mode(), nc, solver.asg.search_ticks)
    {
        solver.asg.set_mode(next);
        if next == SearchMode::Stable {
            rephase(solver);
        }
    }
    if nc >= solver.state.next_reorder && solver.asg.decision_level() == 0 {
        let reorder_in_focused = solver.config.reorder >= 2;
        if solver.config.reorder >= 1 && (reorder_in_focused || solver.asg.mode() == SearchMode::Stable) {
            solver.asg.reorder_by_clause_weight(&solver.cdb);
        }
        solver.state.next_reorder += solver.config.rephase.max(1);
    }
    if nc >= solver.state.next_probe && solver.asg.decision_level() == 0 {
        run_probe_sequence(solver)?;
        solver.state.next_probe += solver.config.proberounds.max(1) * 1000;
    }
    if nc >= solver.state.next_eliminate && solver.asg.decision_level() == 0 {
        let fast = solver.config.fastel;
        if let Err(e) = solver.elim.eliminate(&mut solver.asg, &mut solver.cdb, &mut solver.extend, fast) {
            solver.ok = false;
            if e != SolverError::EmptyClause {
                return Err(e);
            }
        }
        solver.state.next_eliminate += solver.config.eliminate.max(1) * 1000;
    }
    if !solver.state.quiet && nc > 0 && nc % 5000 == 0 {
        let eliminated = solver.elim.num_eliminated();
        solver
            .state
            .progress(&solver.asg, &solver.cdb, eliminated, Some(mode_label(solver.asg.mode())));
    }
    Ok(())
}

fn is_reason(asg: &crate::assign::AssignStack, cid: ClauseId) -> bool {
    asg.var
        .iter()
        .any(|v| matches!(v.reason, AssignReason::Clause(c) if c == cid))
}

fn mode_label(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Focused => "focused",
        SearchMode::Stable => "stable",
    }
}

/// Rotate the rephase schedule and seed phases accordingly: a walk pass
/// for `Walking`, the recorded best/saved phases otherwise.
fn rephase(solver: &mut Solver) {
    use crate::state::RephaseMode;
    match solver.state.next_rephase_mode() {
        RephaseMode::Walking => {
            let phases = solver.walker.run(solver.asg.num_vars(), &solver.cdb);
            for (vi, p) in phases.into_iter().enumerate() {
                solver.asg.var[vi].phase_target = Some(p);
            }
        }
        RephaseMode::Best => {
            for v in &mut solver.asg.var {
                if let Some(p) = v.phase_best {
                    v.phase_target = Some(p);
                }
            }
        }
        RephaseMode::Inverted => {
            for v in &mut solver.asg.var {
                let p = v.phase_saved.unwrap_or(v.phase_initial);
                v.phase_target = Some(!p);
            }
        }
        RephaseMode::Original => {
            for v in &mut solver.asg.var {
                v.phase_target = Some(v.phase_initial);
            }
        }
    }
}

fn model_certificate(solver: &Solver) -> Certificate {
    let mut model: Vec<Option<bool>> = (0..solver.asg.num_vars())
        .map(|vi| solver.asg.value_lit(Lit::new(vi, false)))
        .collect();
    solver.extend.extend_model(&mut model);
    let ints = model
        .into_iter()
        .enumerate()
        .map(|(vi, v)| Lit::new(vi, !v.unwrap_or(false)).to_i32())
        .collect();
    Certificate::SAT(ints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, solver::SatSolverIF};

    fn cnf(nv: usize) -> CNFDescription {
        CNFDescription {
            num_of_variables: nv,
            num_of_clauses: 0,
            pathname: String::new(),
        }
    }

    #[test]
    fn solves_a_trivial_satisfiable_instance() {
        let config = Config::default();
        let mut solver = Solver::build(&config, &cnf(2));
        solver.add_clause(&[1, 2]).unwrap();
        solver.add_clause(&[-1, 2]).unwrap();
        assert!(matches!(solver.solve(), Ok(Certificate::SAT(_))));
    }

    #[test]
    fn detects_a_trivial_unsat_instance() {
        let config = Config::default();
        let mut solver = Solver::build(&config, &cnf(1));
        solver.add_clause(&[1]).unwrap();
        solver.add_clause(&[-1]).unwrap();
        assert_eq!(solver.solve(), Ok(Certificate::UNSAT));
    }
}
