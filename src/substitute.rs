//! Equivalence substitution: find literal pairs forced equal by the binary
//! implication graph's strongly connected components, pick one
//! representative per class, and rewrite every clause (spec.md §5.3).
use crate::{
    assign::{AssignIF, AssignStack},
    cdb::{watch::WatchDBIF, ClauseDB, ClauseDBIF},
    config::Config,
    extend::ExtensionStack,
    types::*,
};

/// Tarjan's SCC algorithm over the implication graph `¬l -> l'` induced by
/// binary clauses `(l ∨ l')`. Two literals land in the same SCC exactly
/// when they are logically equivalent.
struct Tarjan<'a> {
    graph: &'a [Vec<Lit>],
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    sccs: Vec<Vec<usize>>,
}

impl<'a> Tarjan<'a> {
    fn new(graph: &'a [Vec<Lit>]) -> Tarjan<'a> {
        Tarjan {
            graph,
            index: vec![None; graph.len()],
            low: vec![0; graph.len()],
            on_stack: vec![false; graph.len()],
            stack: Vec::new(),
            next_index: 0,
            sccs: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Vec<usize>> {
        for v in 0..self.graph.len() {
            if self.index[v].is_none() {
                self.strongconnect(v);
            }
        }
        self.sccs
    }

    fn strongconnect(&mut self, v: usize) {
        // explicit stack to avoid recursion depth issues on large graphs
        let mut call_stack = vec![(v, 0usize)];
        self.index[v] = Some(self.next_index);
        self.low[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        while let Some(&mut (node, ref mut edge_i)) = call_stack.last_mut() {
            let succs = &self.graph[node];
            if *edge_i < succs.len() {
                let w = succs[*edge_i].code();
                *edge_i += 1;
                if self.index[w].is_none() {
                    self.index[w] = Some(self.next_index);
                    self.low[w] = self.next_index;
                    self.next_index += 1;
                    self.stack.push(w);
                    self.on_stack[w] = true;
                    call_stack.push((w, 0));
                } else if self.on_stack[w] {
                    self.low[node] = self.low[node].min(self.index[w].unwrap());
                }
            } else {
                call_stack.pop();
                if let Some(&(parent, _)) = call_stack.last() {
                    self.low[parent] = self.low[parent].min(self.low[node]);
                }
                if self.low[node] == self.index[node].unwrap() {
                    let mut comp = Vec::new();
                    loop {
                        let w = self.stack.pop().unwrap();
                        self.on_stack[w] = false;
                        comp.push(w);
                        if w == node {
                            break;
                        }
                    }
                    self.sccs.push(comp);
                }
            }
        }
    }
}

pub struct Substitutor {
    pub active: bool,
    rounds: usize,
    effort: usize,
}

impl Default for Substitutor {
    fn default() -> Substitutor {
        Substitutor {
            active: true,
            rounds: 1,
            effort: 100_000,
        }
    }
}

impl Instantiate for Substitutor {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Substitutor {
        Substitutor {
            active: !config.without_substitute,
            rounds: config.substituterounds,
            effort: config.substituteeffort,
        }
    }
}

impl Substitutor {
    /// Build the implication graph: an edge `l -> l'` for every binary
    /// clause `(¬l ∨ l')`, read directly off the watch lists (binary
    /// clauses live only there, per the arena's invariant: `watches[l]`
    /// already holds exactly the literals `l` directly implies).
    fn implication_graph(cdb: &ClauseDB, nv: usize) -> Vec<Vec<Lit>> {
        let mut graph = vec![Vec::new(); 2 * nv];
        for code in 0..2 * nv {
            let l = unsafe_lit_from_code(code);
            for w in cdb.watcher_list(l) {
                if w.is_binary() {
                    graph[code].push(w.blocker);
                }
            }
        }
        graph
    }

    /// One substitution pass: build the implication graph, find its SCCs,
    /// and for every nontrivial class rewrite all clauses to use a single
    /// representative literal.
    pub fn run(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        extend: &mut ExtensionStack,
    ) -> MaybeInconsistent {
        if !self.active {
            return Ok(());
        }
        for _ in 0..self.rounds {
            let nv = asg.num_vars();
            let graph = Self::implication_graph(cdb, nv);
            if graph.iter().map(|e| e.len()).sum::<usize>() > self.effort {
                break;
            }
            let sccs = Tarjan::new(&graph).run();
            let mut repr: Vec<Lit> = (0..2 * nv).map(|c| unsafe_lit_from_code(c)).collect();
            for comp in &sccs {
                if comp.len() < 2 {
                    continue;
                }
                let canon = unsafe_lit_from_code(*comp.iter().min().unwrap());
                for &code in comp {
                    let l = unsafe_lit_from_code(code);
                    if l == canon {
                        continue;
                    }
                    if l == !canon {
                        // l and ¬l equivalent: the formula is unsatisfiable.
                        return Err(SolverError::EmptyClause);
                    }
                    repr[code] = canon;
                }
            }
            let mut rewrote = false;
            for cid in 1..cdb.clause.len() {
                if cdb.clause[cid].is_garbage() {
                    continue;
                }
                let old = cdb.clause[cid].lits.clone();
                let mut new: Vec<Lit> = old.iter().map(|l| repr[l.code()]).collect();
                new.sort_unstable();
                new.dedup();
                if new.iter().zip(new.iter().skip(1)).any(|(a, b)| *a == !*b) {
                    cdb.mark_garbage(cid);
                    continue;
                }
                if new == old {
                    continue;
                }
                rewrote = true;
                cdb.mark_garbage(cid);
                match new.len() {
                    0 => return Err(SolverError::EmptyClause),
                    1 => asg.assign_at_rootlevel(new[0])?,
                    2 => cdb.new_binary_clause(new[0], new[1]),
                    _ => {
                        cdb.new_irredundant_clause(new);
                    }
                }
            }
            for (code, &l) in repr.iter().enumerate() {
                let lit = unsafe_lit_from_code(code);
                if lit != l && lit.is_pos() {
                    asg.var[lit.vi()].flags.insert(Flag::ELIMINATED);
                    extend.push_unit(l);
                }
            }
            if !rewrote {
                break;
            }
            cdb.garbage_collect();
        }
        Ok(())
    }
}

fn unsafe_lit_from_code(code: usize) -> Lit {
    Lit::new(code / 2, code % 2 == 1)
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
    fn finds_equivalence_from_two_binary_clauses() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &cnf(2));
        let mut cdb = ClauseDB::instantiate(&config, &cnf(2));
        let mut extend = ExtensionStack::default();
        let (l1, l2) = (Lit::from_i32(1), Lit::from_i32(2));
        cdb.new_binary_clause(!l1, l2); // 1 -> 2
        cdb.new_binary_clause(!l2, l1); // 2 -> 1: equivalent
        let mut sub = Substitutor::instantiate(&config, &cnf(2));
        assert!(sub.run(&mut asg, &mut cdb, &mut extend).is_ok());
    }
}
