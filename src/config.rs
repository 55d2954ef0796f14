//! Solver configuration and CLI option plumbing.
use {
    crate::types::DecisionLevel,
    std::path::PathBuf,
    structopt::StructOpt,
};

/// Crate version, exposed for `--version` and proof-file headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Every tunable named in the external interface (clause DB, restart,
/// inprocessing passes). `Default` is written by hand, not derived, so each
/// field's rationale can live next to its value the way the teacher's
/// `config.rs` does.
#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "cdcl-sat", about, author)]
pub struct Config {
    //
    //## I/O
    //
    /// A DIMACS format CNF file; omitted to read from stdin.
    #[structopt(parse(from_os_str))]
    pub cnf_filename: PathBuf,

    /// Interval (in conflicts) for dumping a CSV development trace; 0 disables it.
    #[structopt(long = "stat", default_value = "0")]
    pub dump_interval: usize,

    /// Output directory for the trace/proof files.
    #[structopt(long = "dir", short = "o", default_value = ".", parse(from_os_str))]
    pub output_dirname: PathBuf,

    /// DRAT proof output path; only written when `use_certification` is set.
    #[structopt(long = "proof", default_value = "proof.out", short = "p", parse(from_os_str))]
    pub proof_filename: PathBuf,

    /// Disable any progress message.
    #[structopt(long = "quiet", short = "q")]
    pub quiet_mode: bool,

    /// Result filename; empty means stdout.
    #[structopt(long = "result", short = "r", default_value = "", parse(from_os_str))]
    pub result_filename: PathBuf,

    /// Use the Glucose-style multi-line progress report instead of CSV.
    #[structopt(long = "log", short = "l")]
    pub use_log: bool,

    /// Emit a DRAT certification stream.
    #[structopt(long = "certify", short = "c")]
    pub use_certification: bool,

    /// CPU time budget in seconds; `solve()` returns `TimeOut` past this.
    #[structopt(long = "to", default_value = "10000.0")]
    pub timeout: f64,

    //
    //## clause DB / reduce
    //
    /// Soft limit on #clauses kept by the arena (0 = unbounded).
    #[structopt(long = "cl", default_value = "0")]
    pub clause_limit: usize,

    /// Disable periodic clause reduction.
    #[structopt(long = "without-reduce", short = "R")]
    pub without_reduce: bool,

    /// Conflicts between reduce passes before the limit first ratchets up.
    #[structopt(long = "reduce", default_value = "1000")]
    pub reduce: usize,

    /// Glue bound of the "core" tier (never reduced).
    #[structopt(long = "reduce-high", default_value = "3")]
    pub reducehigh: u32,

    /// Glue bound of the "mid" tier.
    #[structopt(long = "reduce-low", default_value = "6")]
    pub reducelow: u32,

    //
    //## conflict analysis
    //
    /// Threshold (in backtrack levels) below which chronological
    /// backtracking is used instead of jumping to the 1UIP level.
    #[structopt(long = "chronoBT", short = "C", default_value = "100")]
    pub chronobt: DecisionLevel,

    /// Number of levels chronoBT is allowed to skip before falling back
    /// to non-chronological backtracking (spec.md's "chronolevels").
    #[structopt(long = "chronolevels", default_value = "100")]
    pub chronolevels: DecisionLevel,

    /// Score/activity decay rate.
    #[structopt(long = "decay", default_value = "0.95")]
    pub decay: f64,

    /// Enable learned-clause minimization.
    #[structopt(long = "no-minimize")]
    pub without_minimize: bool,

    /// Recursion bound for minimization's ancestor walk.
    #[structopt(long = "minimizedepth", default_value = "1000")]
    pub minimizedepth: usize,

    /// Enable learned-clause shrinking (same-level block collapsing).
    #[structopt(long = "no-shrink")]
    pub without_shrink: bool,

    /// Enable bumping of analyzed variables.
    #[structopt(long = "no-bump")]
    pub without_bump: bool,

    /// Enable reason-side bumping of ancestors of analyzed literals.
    #[structopt(long = "bumpreasons")]
    pub bumpreasons: bool,

    /// Multiplicative rate applied to the reason-side bump budget.
    #[structopt(long = "bumpreasonsrate", default_value = "0.1")]
    pub bumpreasonsrate: f64,

    /// Hard cap on ancestors visited per conflict for reason-side bumping.
    #[structopt(long = "bumpreasonslimit", default_value = "1000")]
    pub bumpreasonslimit: usize,

    /// Enable eager subsumption of a learned clause against the last K
    /// learned clauses.
    #[structopt(long = "eagersubsume")]
    pub eagersubsume: bool,

    /// Size of the eager-subsumption window K.
    #[structopt(long = "eagersubsume-window", default_value = "16")]
    pub eagersubsume_window: usize,

    //
    //## restart / search mode
    //
    /// Enable geometric (Luby/reluctant-doubling) stable-mode restarts.
    #[structopt(long = "without-stabilizer", short = "S")]
    pub without_stab: bool,

    /// Window length for the slow assignment-trail average.
    #[structopt(long = "ra", default_value = "3500")]
    pub restart_asg_len: usize,

    /// Blocking restart threshold (Glucose's R).
    #[structopt(long = "rb", default_value = "1.40")]
    pub restart_blocking: f64,

    /// Window length for the glue (LBD) average.
    #[structopt(long = "rl", default_value = "50")]
    pub restart_lbd_len: usize,

    /// Minimum conflicts between restarts.
    #[structopt(long = "rs", default_value = "50")]
    pub restart_step: usize,

    /// Forcing restart threshold (Glucose's K).
    #[structopt(long = "rt", default_value = "1.2")]
    pub restart_threshold: f64,

    /// Conflict budget spent in one mode (focused or stable) before a
    /// mode switch is considered.
    #[structopt(long = "modeinit", default_value = "10000")]
    pub modeinit: usize,

    /// Growth factor applied to the mode-switch conflict budget each time.
    #[structopt(long = "modeint", default_value = "1.5")]
    pub modeint: f64,

    /// Disable the stable/focused mode switch entirely (always focused).
    #[structopt(long = "no-stable")]
    pub without_stable: bool,

    /// Conflicts between rephase events in stable mode.
    #[structopt(long = "rephase", default_value = "1000")]
    pub rephase: usize,

    /// Reorder variable weights in stable mode (`2` to also reorder in
    /// focused mode).
    #[structopt(long = "reorder", default_value = "1")]
    pub reorder: u32,

    /// Run the one-shot warmup propagation pass before the first restart.
    #[structopt(long = "warmup")]
    pub warmup: bool,

    /// Initial phase polarity hint (0 = negative, 1 = positive).
    #[structopt(long = "phase", default_value = "0")]
    pub phase: u32,

    /// Disable dynamic strategy adaptation.
    #[structopt(long = "no-adaptive-strategy", short = "G")]
    pub without_adaptive_strategy: bool,

    //
    //## BVE / fast-BVE
    //
    /// Disable bounded variable elimination entirely.
    #[structopt(long = "without-elim", short = "E")]
    pub without_elim: bool,

    /// Conflicts between eliminate() rounds.
    #[structopt(long = "eliminate", default_value = "0")]
    pub eliminate: usize,

    /// Occurrence-count cutoff a variable must be under to be a candidate.
    #[structopt(long = "eliminateocclim", default_value = "0")]
    pub eliminateocclim: usize,

    /// Grow bound: extra resolvents tolerated per elimination.
    #[structopt(long = "eg", default_value = "0")]
    pub eliminatebound: usize,

    /// Maximum #literals accepted for a resolvent.
    #[structopt(long = "el", default_value = "100")]
    pub elim_lit_limit: usize,

    /// Maximum number of BVE rounds per call.
    #[structopt(long = "eliminaterounds", default_value = "1")]
    pub eliminaterounds: usize,

    /// Enable the cheaper fast-BVE pre-pass.
    #[structopt(long = "fastel")]
    pub fastel: bool,

    /// Rounds of fast-BVE run before each full BVE round.
    #[structopt(long = "fastelrounds", default_value = "1")]
    pub fastelrounds: usize,

    /// Per-polarity occurrence cap used by fast-BVE.
    #[structopt(long = "fasteloccs", default_value = "8")]
    pub fasteloccs: usize,

    /// Enable fast-BVE's heuristic forward-subsumption check.
    #[structopt(long = "fastelsub")]
    pub fastelsub: bool,

    /// Clause-size cutoff for fast-BVE's subsumption check.
    #[structopt(long = "fastelclslim", default_value = "32")]
    pub fastelclslim: usize,

    /// Overall conflict budget between fast-BVE invocations.
    #[structopt(long = "fastelim", default_value = "0")]
    pub fastelim: usize,

    /// Enable forward subsumption checking (also used standalone by
    /// other passes as a building block).
    #[structopt(long = "no-forward")]
    pub without_forward: bool,

    /// Clause-size cutoff above which forward subsumption is skipped.
    #[structopt(long = "subsumeclslim", default_value = "1000")]
    pub subsumeclslim: usize,

    /// Occurrence-count cutoff for subsumption candidate generation.
    #[structopt(long = "subsumeocclim", default_value = "1000")]
    pub subsumeocclim: usize,

    //
    //## substitution
    //
    /// Disable equivalence substitution.
    #[structopt(long = "no-substitute")]
    pub without_substitute: bool,

    /// Maximum substitution rounds per invocation.
    #[structopt(long = "substituterounds", default_value = "1")]
    pub substituterounds: usize,

    /// Ticks budget for one substitution pass.
    #[structopt(long = "substituteeffort", default_value = "100000")]
    pub substituteeffort: usize,

    //
    //## sweep
    //
    /// Disable SAT-sweeping.
    #[structopt(long = "no-sweep")]
    pub without_sweep: bool,

    /// Breadth-first neighborhood depth used to build a sweep environment.
    #[structopt(long = "sweepdepth", default_value = "2")]
    pub sweepdepth: usize,

    /// Number of variables swept per invocation.
    #[structopt(long = "sweepvars", default_value = "0")]
    pub sweepvars: usize,

    /// Clause budget for one variable's sweep environment.
    #[structopt(long = "sweepclauses", default_value = "2048")]
    pub sweepclauses: usize,

    /// Hard cap on the BFS depth regardless of `sweepdepth`.
    #[structopt(long = "sweepmaxdepth", default_value = "4")]
    pub sweepmaxdepth: usize,

    /// Hard cap on variables touched by sweep.
    #[structopt(long = "sweepmaxvars", default_value = "100000")]
    pub sweepmaxvars: usize,

    /// Hard cap on clauses touched by sweep.
    #[structopt(long = "sweepmaxclauses", default_value = "100000")]
    pub sweepmaxclauses: usize,

    /// Rounds of flipping the embedded sub-solver performs to diversify models.
    #[structopt(long = "sweepfliprounds", default_value = "1")]
    pub sweepfliprounds: usize,

    /// Run sweep to exhaustion (ignore per-call variable budget).
    #[structopt(long = "sweepcomplete")]
    pub sweepcomplete: bool,

    //
    //## congruence closure
    //
    /// Disable AND/XOR/ITE congruence closure.
    #[structopt(long = "no-congruence")]
    pub without_congruence: bool,

    /// Enable AND-gate extraction.
    #[structopt(long = "congruenceands")]
    pub congruenceands: bool,

    /// Enable XOR-gate extraction.
    #[structopt(long = "congruencexors")]
    pub congruencexors: bool,

    /// Enable ITE-gate extraction.
    #[structopt(long = "congruenceites")]
    pub congruenceites: bool,

    /// Maximum arity accepted for an AND gate.
    #[structopt(long = "congruenceandarity", default_value = "32")]
    pub congruenceandarity: usize,

    /// Maximum arity accepted for an XOR gate.
    #[structopt(long = "congruencexorarity", default_value = "8")]
    pub congruencexorarity: usize,

    /// Required count of same-parity clauses (2^(k-1)) before an XOR gate
    /// of arity k is accepted.
    #[structopt(long = "congruencexorcounts", default_value = "1")]
    pub congruencexorcounts: usize,

    //
    //## transitive reduction
    //
    /// Disable transitive reduction of binary clauses.
    #[structopt(long = "no-transitive")]
    pub without_transitive: bool,

    /// Keep (don't delete) redundant binaries found by transitive reduction;
    /// used only to validate the pass.
    #[structopt(long = "transitivekeep")]
    pub transitivekeep: bool,

    //
    //## vivification
    //
    /// Disable vivification.
    #[structopt(long = "no-vivify")]
    pub without_vivify: bool,

    /// Also vivify irredundant clauses (not just learnt tiers).
    #[structopt(long = "vivifyirr")]
    pub vivifyirr: bool,

    /// Ticks budget for the tier-1 (core) vivification round.
    #[structopt(long = "vivifytier1", default_value = "100000")]
    pub vivifytier1: usize,

    /// Ticks budget for the tier-2 (mid) vivification round.
    #[structopt(long = "vivifytier2", default_value = "100000")]
    pub vivifytier2: usize,

    /// Ticks budget for the tier-3 (local) vivification round.
    #[structopt(long = "vivifytier3", default_value = "100000")]
    pub vivifytier3: usize,

    /// Sort clauses by ascending literal occurrence count before vivifying.
    #[structopt(long = "vivifysort")]
    pub vivifysort: bool,

    /// Only vivify tiers reachable in the current (focused/stable) mode.
    #[structopt(long = "vivifyfocusedtiers")]
    pub vivifyfocusedtiers: bool,

    /// Flip rounds used while deciding an outcome for one clause.
    #[structopt(long = "vivifyfliprounds", default_value = "1")]
    pub vivifyfliprounds: usize,

    //
    //## factoring (bounded variable addition)
    //
    /// Disable structural factoring.
    #[structopt(long = "no-factor")]
    pub without_factor: bool,

    /// Minimum shared sub-product size worth factoring out.
    #[structopt(long = "factorsize", default_value = "3")]
    pub factorsize: usize,

    /// Maximum hop depth used by the precise structural-path scorer.
    #[structopt(long = "factorhops", default_value = "2")]
    pub factorhops: usize,

    /// Use the precise (path-counting) structural scorer instead of the
    /// fast watch-size heuristic.
    #[structopt(long = "factorstructural")]
    pub factorstructural: bool,

    /// Initial ticks budget for one factoring round.
    #[structopt(long = "factoriniticks", default_value = "100000")]
    pub factoriniticks: usize,

    /// Candidate literals considered per factoring round.
    #[structopt(long = "factorcandrounds", default_value = "1")]
    pub factorcandrounds: usize,

    /// Maximum factoring rounds per invocation.
    #[structopt(long = "factorrounds", default_value = "1")]
    pub factorrounds: usize,

    //
    //## probing schedule
    //
    /// Conflicts between probe() invocations (congruence, substitute,
    /// vivify, backbone, transitive, sweep, factor).
    #[structopt(long = "proberounds", default_value = "1")]
    pub proberounds: usize,

    /// Run congruence closure during preprocessing (before first search).
    #[structopt(long = "preprocesscongruence")]
    pub preprocesscongruence: bool,

    /// Run backbone probing during preprocessing.
    #[structopt(long = "preprocessbackbone")]
    pub preprocessbackbone: bool,

    /// Run sweep during preprocessing.
    #[structopt(long = "preprocessweep")]
    pub preprocessweep: bool,

    /// Run factoring during preprocessing.
    #[structopt(long = "preprocessfactor")]
    pub preprocessfactor: bool,

    //
    //## local-search walk
    //
    /// Disable the PAWS-style local-search walk used to seed phases.
    #[structopt(long = "no-walk")]
    pub without_walk: bool,

    /// Ticks budget for one walk invocation.
    #[structopt(long = "walkticks", default_value = "100000")]
    pub walkticks: usize,

    /// Probability (in percent) of a purely random walk step.
    #[structopt(long = "walknoise", default_value = "3")]
    pub walknoise: u32,

    /// "Lucky" one-shot full-random-restart probability check before walk.
    #[structopt(long = "lucky")]
    pub lucky: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            cnf_filename: PathBuf::new(),
            dump_interval: 0,
            output_dirname: PathBuf::from("."),
            proof_filename: PathBuf::from("proof.out"),
            quiet_mode: false,
            result_filename: PathBuf::new(),
            use_log: false,
            use_certification: false,
            timeout: 10_000.0,

            clause_limit: 0,
            without_reduce: false,
            reduce: 1000,
            reducehigh: 3,
            reducelow: 6,

            chronobt: 100,
            chronolevels: 100,
            decay: 0.95,
            without_minimize: false,
            minimizedepth: 1000,
            without_shrink: false,
            without_bump: false,
            bumpreasons: false,
            bumpreasonsrate: 0.1,
            bumpreasonslimit: 1000,
            eagersubsume: false,
            eagersubsume_window: 16,

            without_stab: false,
            restart_asg_len: 3500,
            restart_blocking: 1.40,
            restart_lbd_len: 50,
            restart_step: 50,
            restart_threshold: 1.2,
            modeinit: 10_000,
            modeint: 1.5,
            without_stable: false,
            rephase: 1000,
            reorder: 1,
            warmup: false,
            phase: 0,
            without_adaptive_strategy: false,

            without_elim: false,
            eliminate: 0,
            eliminateocclim: 0,
            eliminatebound: 0,
            elim_lit_limit: 100,
            eliminaterounds: 1,
            fastel: false,
            fastelrounds: 1,
            fasteloccs: 8,
            fastelsub: false,
            fastelclslim: 32,
            fastelim: 0,
            without_forward: false,
            subsumeclslim: 1000,
            subsumeocclim: 1000,

            without_substitute: false,
            substituterounds: 1,
            substituteeffort: 100_000,

            without_sweep: false,
            sweepdepth: 2,
            sweepvars: 0,
            sweepclauses: 2048,
            sweepmaxdepth: 4,
            sweepmaxvars: 100_000,
            sweepmaxclauses: 100_000,
            sweepfliprounds: 1,
            sweepcomplete: false,

            without_congruence: false,
            congruenceands: true,
            congruencexors: true,
            congruenceites: true,
            congruenceandarity: 32,
            congruencexorarity: 8,
            congruencexorcounts: 1,

            without_transitive: false,
            transitivekeep: false,

            without_vivify: false,
            vivifyirr: false,
            vivifytier1: 100_000,
            vivifytier2: 100_000,
            vivifytier3: 100_000,
            vivifysort: false,
            vivifyfocusedtiers: false,
            vivifyfliprounds: 1,

            without_factor: false,
            factorsize: 3,
            factorhops: 2,
            factorstructural: false,
            factoriniticks: 100_000,
            factorcandrounds: 1,
            factorrounds: 1,

            proberounds: 1,
            preprocesscongruence: false,
            preprocessbackbone: false,
            preprocessweep: false,
            preprocessfactor: false,

            without_walk: false,
            walkticks: 100_000,
            walknoise: 3,
            lucky: false,
        }
    }
}

impl<T> From<T> for Config
where
    PathBuf: From<T>,
{
    fn from(path: T) -> Config {
        let mut config = Config::default();
        config.cnf_filename = PathBuf::from(path);
        config
    }
}

impl Config {
    /// Room for post-parse option fixups (teacher's hook; nothing to
    /// normalize today beyond what structopt already validated).
    #[allow(unused_mut)]
    pub fn override_args(mut self) -> Config {
        self
    }
}
