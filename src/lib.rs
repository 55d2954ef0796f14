#![doc(html_root_url = "https://docs.rs/cdcl-sat/0.1.0")]
/*!
# A CDCL SAT Solver Core

A from-scratch CDCL solver library built around the usual pipeline:

- two-watched-literal Boolean constraint propagation
- 1UIP conflict-driven clause learning with single-level minimization
- VMTF (focused mode) and EVSIDS (stable mode) decision heuristics
- Luby and Glucose-style EMA-gated restarts
- an inprocessing suite: subsumption/BVE, equivalence substitution,
  backbone probing, transitive reduction, SAT sweeping, AND-gate
  congruence closure, structural factoring, vivification, and a
  PAWS-style local-search walk used to seed rephasing

Parsing DIMACS files and printing results is deliberately left to the
`cdcl-sat` binary; this crate's API is `Solver::build` + `add_clause` +
`solve`.
*/
/// Crate `types` provides the literal/variable/clause id types and the
/// cross-cutting traits (`Instantiate`, `Export`).
pub mod types;
/// Crate `config` provides the solver's configuration and CLI surface.
pub mod config;
/// Crate `var` provides the per-variable record and decision-order
/// structures (VMTF queue, EVSIDS heap).
pub mod var;
/// Crate `assign` owns the trail, the watch-based propagator, and
/// decision-literal selection.
pub mod assign;
/// Crate `cdb` provides the clause arena, watch lists, and clause
/// database maintenance (reduce, garbage collection).
pub mod cdb;
/// Crate `restart` provides Luby and EMA-based restart heuristics.
pub mod restart;
/// Crate `state` is a collection of search-wide statistics and the
/// progress dashboard.
pub mod state;
/// Crate `proof` implements the DRAT certification stream.
pub mod proof;
/// Crate `extend` reconstructs a model over eliminated variables.
pub mod extend;
/// Crate `solver` provides the top-level API as a SAT solver.
pub mod solver;
/// Crate `processor` implements clause subsumption and variable
/// elimination (BVE).
pub mod processor;
/// Crate `substitute` implements equivalence substitution via strongly
/// connected components of the binary implication graph.
pub mod substitute;
/// Crate `probe` implements backbone probing and binary-implication
/// transitive reduction.
pub mod probe;
/// Crate `sweep` implements SAT-sweeping equivalence discovery.
pub mod sweep;
/// Crate `congruence` implements AND-gate congruence closure.
pub mod congruence;
/// Crate `factor` implements structural factoring (bounded variable
/// addition).
pub mod factor;
/// Crate `walk` implements a PAWS-style local-search phase generator.
pub mod walk;
/// Crate `validator` implements a standalone model checker.
pub mod validator;
