//! Restart heuristics and the focused/stable mode switch.
//!
//! Focused mode restarts aggressively off a fast/slow glue trend (Glucose's
//! blocking/forcing EMAs); stable mode restarts on a Luby-reluctant
//! doubling schedule (spec.md §4.4).
use crate::{assign::SearchMode, config::Config, types::*};

/// Standard Luby sequence: 1,1,2,1,1,2,4,1,1,2,1,1,2,4,8,...
pub fn luby(base: f64, mut x: usize) -> f64 {
    x += 1;
    let mut size = 1;
    let mut seq = 0;
    while size < x {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != x {
        size = (size - 1) / 2;
        seq -= 1;
        x %= size;
    }
    base * 2f64.powi(seq)
}

pub trait RestartIF {
    fn update_lbd(&mut self, glue: u32);
    fn update_asg(&mut self, trail_len: usize, num_vars: usize);
    /// Called once per conflict; returns `true` if a restart should happen
    /// under the current mode.
    fn should_restart(&mut self, mode: SearchMode, num_conflict: usize) -> bool;
    fn restart_done(&mut self, num_conflict: usize);
    /// Returns the next mode when a mode switch is due, else `None`.
    fn should_switch_mode(&mut self, mode: SearchMode, num_conflict: usize, ticks: usize) -> Option<SearchMode>;
    fn num_restart(&self) -> usize;
    fn num_block(&self) -> usize;
}

pub struct Restarter {
    lbd_ema: Ema2,
    asg_ema: Ema2,
    blocking_threshold: f64,
    forcing_threshold: f64,
    min_conflicts_between_restarts: usize,
    last_restart: usize,
    luby_base: f64,
    luby_idx: usize,
    without_stab: bool,
    mode_budget: usize,
    mode_growth: f64,
    mode_started_at_conflict: usize,
    mode_started_at_ticks: usize,
    num_restart: usize,
    num_block: usize,
}

impl Instantiate for Restarter {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Restarter {
        Restarter {
            lbd_ema: Ema2::new(config.restart_lbd_len, 16),
            asg_ema: Ema2::new(config.restart_asg_len, 16),
            blocking_threshold: config.restart_blocking,
            forcing_threshold: config.restart_threshold,
            min_conflicts_between_restarts: config.restart_step,
            last_restart: 0,
            luby_base: config.restart_step as f64,
            luby_idx: 0,
            without_stab: config.without_stab,
            mode_budget: config.modeinit,
            mode_growth: config.modeint,
            mode_started_at_conflict: 0,
            mode_started_at_ticks: 0,
            num_restart: 0,
            num_block: 0,
        }
    }
}

impl RestartIF for Restarter {
    fn update_lbd(&mut self, glue: u32) {
        self.lbd_ema.update(glue as f64);
    }
    fn update_asg(&mut self, trail_len: usize, num_vars: usize) {
        let frac = trail_len as f64 / num_vars.max(1) as f64;
        self.asg_ema.update(frac);
    }

    fn should_restart(&mut self, mode: SearchMode, num_conflict: usize) -> bool {
        if num_conflict - self.last_restart < self.min_conflicts_between_restarts {
            return false;
        }
        match mode {
            SearchMode::Focused => {
                if self.asg_ema.trend() > self.blocking_threshold {
                    self.num_block += 1;
                    return false;
                }
                self.lbd_ema.trend() > self.forcing_threshold
            }
            SearchMode::Stable => {
                let len = luby(self.luby_base, self.luby_idx);
                (num_conflict - self.last_restart) as f64 >= len
            }
        }
    }

    fn restart_done(&mut self, num_conflict: usize) {
        self.last_restart = num_conflict;
        self.luby_idx += 1;
        self.num_restart += 1;
    }

    fn should_switch_mode(
        &mut self,
        mode: SearchMode,
        num_conflict: usize,
        ticks: usize,
    ) -> Option<SearchMode> {
        if self.without_stab {
            return None;
        }
        if num_conflict - self.mode_started_at_conflict < self.mode_budget
            && ticks - self.mode_started_at_ticks < self.mode_budget * 64
        {
            return None;
        }
        self.mode_started_at_conflict = num_conflict;
        self.mode_started_at_ticks = ticks;
        self.mode_budget = ((self.mode_budget as f64) * self.mode_growth) as usize;
        self.luby_idx = 0;
        Some(match mode {
            SearchMode::Focused => SearchMode::Stable,
            SearchMode::Stable => SearchMode::Focused,
        })
    }

    fn num_restart(&self) -> usize {
        self.num_restart
    }
    fn num_block(&self) -> usize {
        self.num_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luby_matches_known_prefix() {
        let seq: Vec<f64> = (0..7).map(|i| luby(1.0, i)).collect();
        assert_eq!(seq, vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn stable_mode_waits_for_the_luby_length() {
        let config = Config::default();
        let mut r = Restarter::instantiate(&config, &CNFDescription::default());
        assert!(!r.should_restart(SearchMode::Stable, config.restart_step - 1));
    }
}
