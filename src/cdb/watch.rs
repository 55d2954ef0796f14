//! Per-literal watch lists.
use crate::types::*;

/// API for a watcher list: `register`, `detach`, `update_blocker` and so on.
pub trait WatchDBIF {
    /// Add a new watch to this list.
    fn register(&mut self, blocker: Lit, c: ClauseId);
    /// Remove the *n*-th watch. `O(1)`.
    fn detach(&mut self, n: usize);
    /// Remove the watch pointing at `cid`. `O(n)`.
    fn detach_with(&mut self, cid: ClauseId);
    /// Update the cached blocking literal of the watch pointing at `cid`.
    fn update_blocker(&mut self, cid: ClauseId, l: Lit);
}

/// One entry of a watch list.
///
/// `c == NULL_CLAUSE` marks a *binary* watch: the clause never lives in the
/// arena, and `blocker` carries the binary clause's other literal directly
/// (spec.md §3: "Binary clauses are NOT stored in the arena"). Otherwise
/// this is a large-clause watch: `blocker` is any literal of the clause
/// used to skip propagation when it is already satisfied, and `c` is the
/// arena reference.
#[derive(Clone, Copy, Debug)]
pub struct Watch {
    pub blocker: Lit,
    pub c: ClauseId,
}

impl Default for Watch {
    fn default() -> Watch {
        Watch {
            blocker: NULL_LIT,
            c: crate::types::NULL_CLAUSE,
        }
    }
}

impl Watch {
    pub fn is_binary(&self) -> bool {
        self.c == crate::types::NULL_CLAUSE
    }
}

impl WatchDBIF for Vec<Watch> {
    fn register(&mut self, blocker: Lit, c: ClauseId) {
        self.push(Watch { blocker, c });
    }
    fn detach(&mut self, n: usize) {
        self.swap_remove(n);
    }
    fn detach_with(&mut self, cid: ClauseId) {
        for (n, w) in self.iter().enumerate() {
            if w.c == cid {
                self.swap_remove(n);
                return;
            }
        }
    }
    fn update_blocker(&mut self, cid: ClauseId, l: Lit) {
        for w in self.iter_mut() {
            if w.c == cid {
                w.blocker = l;
                return;
            }
        }
    }
}
