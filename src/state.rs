//! Search-wide bookkeeping: statistics counters, elapsed time, the
//! inprocessing schedule, and the progress dashboard.
//!
//! No `log`/`tracing` dependency is introduced here, matching the teacher:
//! `State` owns a `fmt::Display` report and prints it directly, compiling
//! down to almost nothing when `quiet_mode` is set.
use {
    crate::{assign::AssignStack, cdb::ClauseDB, config::Config, types::*},
    std::{
        fmt,
        ops::{Index, IndexMut},
        path::Path,
        time::Instant,
    },
};

/// Index into `State::stats`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stat {
    Conflict = 0,
    Decision,
    Restart,
    BlockRestart,
    Propagation,
    Reduction,
    LearntUnit,
    SumLBD,
    NumBin,
    NumLBD2,
    Eliminate,
    Substitute,
    Vivify,
    Probe,
    Sweep,
    Congruence,
    Factor,
    Walk,
    EndOfStatIndex,
}

/// One rotation step of the rephase schedule (spec.md §4.4): best, walking,
/// inverted, then back to best/walking/original.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RephaseMode {
    Best,
    Walking,
    Inverted,
    Original,
}

const REPHASE_SCHEDULE: [RephaseMode; 6] = [
    RephaseMode::Best,
    RephaseMode::Walking,
    RephaseMode::Inverted,
    RephaseMode::Best,
    RephaseMode::Walking,
    RephaseMode::Original,
];

pub struct State {
    pub stats: Vec<usize>,
    pub target: String,
    pub start: Instant,
    pub timeout: f64,

    pub next_reduce: usize,
    pub next_probe: usize,
    pub next_eliminate: usize,
    pub next_reorder: usize,
    pub rephase_idx: usize,
    pub next_rephase: usize,
    pub rephase_step: usize,

    pub progress_count: usize,
    pub quiet: bool,
    pub use_log: bool,
}

impl Instantiate for State {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> State {
        State {
            stats: vec![0; Stat::EndOfStatIndex as usize],
            target: if cnf.pathname.is_empty() {
                "--".to_string()
            } else {
                Path::new(&cnf.pathname)
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| cnf.pathname.clone())
            },
            start: Instant::now(),
            timeout: config.timeout,
            next_reduce: config.reduce,
            next_probe: config.proberounds.max(1) * 1000,
            next_eliminate: config.eliminate.max(1) * 1000,
            next_reorder: config.rephase,
            rephase_idx: 0,
            next_rephase: config.rephase,
            rephase_step: config.rephase,
            progress_count: 0,
            quiet: config.quiet_mode,
            use_log: config.use_log,
        }
    }
}

impl Index<Stat> for State {
    type Output = usize;
    fn index(&self, i: Stat) -> &usize {
        &self.stats[i as usize]
    }
}

impl IndexMut<Stat> for State {
    fn index_mut(&mut self, i: Stat) -> &mut usize {
        &mut self.stats[i as usize]
    }
}

impl State {
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn timed_out(&self) -> bool {
        self.timeout > 0.0 && self.elapsed() > self.timeout
    }

    /// Advance the rephase rotation and return the next schedule entry.
    pub fn next_rephase_mode(&mut self) -> RephaseMode {
        let m = REPHASE_SCHEDULE[self.rephase_idx % REPHASE_SCHEDULE.len()];
        self.rephase_idx += 1;
        m
    }

    pub fn progress(&mut self, asg: &AssignStack, cdb: &ClauseDB, eliminated_vars: usize, mes: Option<&str>) {
        if self.quiet {
            return;
        }
        self.progress_count += 1;
        let nv = asg.num_vars();
        let fixed = asg.len_upto(0);
        let solved = fixed + eliminated_vars;
        let pct = 100.0 * solved as f64 / nv.max(1) as f64;
        if self.use_log {
            println!(
                "{:>6},{:>9.2},{:>8},{:>8},{:>8},{:>6.2},{:>8},{:>8},{:>8}",
                self.progress_count,
                self.elapsed(),
                self.stats[Stat::Conflict as usize],
                self.stats[Stat::Decision as usize],
                nv - solved,
                pct,
                cdb.num_clause(),
                self.stats[Stat::Restart as usize],
                self.stats[Stat::Reduction as usize],
            );
        } else {
            let msg = mes.unwrap_or("search");
            println!(
                "{:32}|time:{:>10.2} |mode:{:>9}",
                self.target,
                self.elapsed(),
                msg
            );
            println!(
                "#conflict:{:>10}, #decision:{:>10}, #propagate:{:>12}",
                self.stats[Stat::Conflict as usize],
                self.stats[Stat::Decision as usize],
                self.stats[Stat::Propagation as usize],
            );
            println!(
                "  Assignment|#rem:{:>9}, #fix:{:>9}, #elm:{:>9}, prog%:{:>8.4}",
                nv - solved,
                fixed,
                eliminated_vars,
                pct,
            );
            println!(
                "     Restart|#blk:{:>9}, #rst:{:>9}, #rdc:{:>9}, #cls:{:>9}",
                self.stats[Stat::BlockRestart as usize],
                self.stats[Stat::Restart as usize],
                self.stats[Stat::Reduction as usize],
                cdb.num_clause(),
            );
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:32}|time:{:>10.2}", self.target, self.elapsed())
    }
}
