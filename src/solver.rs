//! Top-level orchestration: `Solver` bundles every subsystem and exposes
//! the public `build`/`add_clause`/`solve` API (spec.md §4, §7).
pub mod build;
pub mod conflict;
pub mod search;
pub mod vivify;

use crate::{
    assign::AssignStack,
    cdb::ClauseDB,
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
    walk::Walker,
};
use vivify::Vivifier;

/// Everything the search loop touches, plus every inprocessing pass it
/// schedules between conflicts (spec.md §4.4, §5).
pub struct Solver {
    pub asg: AssignStack,
    pub cdb: ClauseDB,
    pub rst: Restarter,
    pub state: State,
    pub elim: Eliminator,
    pub sub: Substitutor,
    pub prober: Prober,
    pub sweeper: Sweeper,
    pub cong: Congruence,
    pub factorer: Factorer,
    pub walker: Walker,
    pub vivifier: Vivifier,
    pub extend: ExtensionStack,
    pub config: Config,
    /// Set once the formula is known UNSAT (an empty clause was derived,
    /// at ingestion time or later); every subsequent API call becomes a
    /// no-op (spec.md §7's "stays permanently inconsistent").
    pub ok: bool,
}

/// Public entry points a caller (the CLI binary, or an embedder) uses.
pub trait SatSolverIF {
    fn add_clause(&mut self, lits: &[i32]) -> MaybeInconsistent;
    fn solve(&mut self) -> SolverResult;
}

impl SatSolverIF for Solver {
    fn add_clause(&mut self, lits: &[i32]) -> MaybeInconsistent {
        build::add_clause(self, lits)
    }

    fn solve(&mut self) -> SolverResult {
        search::solve(self)
    }
}
