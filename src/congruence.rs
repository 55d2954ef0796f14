//! AND/XOR/ITE gate extraction and congruence closure (spec.md §5.7):
//! recognize Tseitin-style gate patterns in the clause set, union the
//! output literal with any other literal definable from equal-congruence
//! inputs, and fold the resulting equivalences into substitution.
use crate::{cdb::ClauseDB, config::Config, types::*};

/// A recognized gate: an output literal and a connective over input
/// literals.
#[derive(Clone, Debug)]
enum Gate {
    And(Lit, Vec<Lit>),
    Xor(Lit, Vec<Lit>),
    Ite(Lit, Lit, Lit, Lit),
}

/// Union-find over literal codes, used to merge congruent gate outputs.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> UnionFind {
        UnionFind {
            parent: (0..n).collect(),
        }
    }
    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

pub struct Congruence {
    pub active: bool,
    ands: bool,
    xors: bool,
    ites: bool,
    and_arity: usize,
    xor_arity: usize,
}

impl Default for Congruence {
    fn default() -> Congruence {
        Congruence {
            active: false,
            ands: true,
            xors: true,
            ites: true,
            and_arity: 32,
            xor_arity: 8,
        }
    }
}

impl Instantiate for Congruence {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Congruence {
        Congruence {
            active: !config.without_congruence && config.preprocesscongruence,
            ands: config.congruenceands,
            xors: config.congruencexors,
            ites: config.congruenceites,
            and_arity: config.congruenceandarity,
            xor_arity: config.congruencexorarity,
        }
    }
}

impl Congruence {
    /// Recognize `o <-> AND(inputs)` from the Tseitin clause pattern:
    /// binaries `(¬o ∨ i)` for every input, plus one big clause
    /// `(o ∨ ¬i1 ∨ ... ∨ ¬ik)`.
    fn extract_and_gates(&self, cdb: &ClauseDB) -> Vec<Gate> {
        let mut gates = Vec::new();
        for c in cdb.clause.iter().skip(1) {
            if c.is_garbage() || c.lits.len() < 3 || c.lits.len() - 1 > self.and_arity {
                continue;
            }
            // candidate output: the one literal whose negation could be
            // the "big clause" side; try each literal as the output.
            for (oi, &o) in c.lits.iter().enumerate() {
                let inputs: Vec<Lit> = c.lits.iter().enumerate().filter(|(i, _)| *i != oi).map(|(_, &l)| !l).collect();
                let has_all_binaries = inputs.iter().all(|&i| {
                    cdb.clause.iter().any(|other| {
                        !other.is_garbage() && other.lits.len() == 2 && other.lits.contains(&!o) && other.lits.contains(&i)
                    })
                });
                if has_all_binaries && !inputs.is_empty() {
                    gates.push(Gate::And(o, inputs));
                    break;
                }
            }
        }
        gates
    }

    /// Recognize `o <-> (a ⊕ b)` from its four-clause Tseitin encoding:
    /// `(¬o∨a∨b)`, `(¬o∨¬a∨¬b)`, `(o∨¬a∨b)`, `(o∨a∨¬b)`. Only the 2-input
    /// case is matched directly; wider XORs are left to chained binary
    /// gates rather than a dedicated wide-arity scan.
    fn extract_xor_gates(&self, cdb: &ClauseDB) -> Vec<Gate> {
        let mut gates = Vec::new();
        if self.xor_arity < 2 {
            return gates;
        }
        let mut seen: std::collections::HashSet<(VarId, VarId, VarId)> = std::collections::HashSet::new();
        for c in cdb.clause.iter().skip(1) {
            if c.is_garbage() || c.lits.len() != 3 {
                continue;
            }
            let mut vars: Vec<VarId> = c.lits.iter().map(|l| l.vi()).collect();
            vars.sort_unstable();
            if vars[0] == vars[1] || vars[1] == vars[2] {
                continue;
            }
            for oi in 0..3 {
                let vo = vars[oi];
                let inputs: Vec<VarId> = vars.iter().cloned().filter(|&v| v != vo).collect();
                let (va, vb) = (inputs[0], inputs[1]);
                if !seen.insert((vo, va, vb)) {
                    continue;
                }
                let o = Lit::new(vo, false);
                let a = Lit::new(va, false);
                let b = Lit::new(vb, false);
                if has_ternary_clause(cdb, &[!o, a, b])
                    && has_ternary_clause(cdb, &[!o, !a, !b])
                    && has_ternary_clause(cdb, &[o, !a, b])
                    && has_ternary_clause(cdb, &[o, a, !b])
                {
                    gates.push(Gate::Xor(o, vec![a, b]));
                }
            }
        }
        gates
    }

    /// Recognize `o <-> ite(c, t, e)` from its four-clause Tseitin core:
    /// `(¬o∨¬c∨t)`, `(¬o∨c∨e)`, `(o∨¬c∨¬t)`, `(o∨c∨¬e)`. A pair of ternary
    /// clauses sharing the `(o, c)` pair but differing in their third
    /// variable supplies the `t`/`e` candidates.
    fn extract_ite_gates(&self, cdb: &ClauseDB) -> Vec<Gate> {
        let mut gates = Vec::new();
        let ternary: Vec<Vec<VarId>> = cdb
            .clause
            .iter()
            .filter(|c| !c.is_garbage() && c.lits.len() == 3)
            .map(|c| c.lits.iter().map(|l| l.vi()).collect())
            .collect();
        let mut seen: std::collections::HashSet<(VarId, VarId, VarId, VarId)> = std::collections::HashSet::new();
        for vars in &ternary {
            if vars[0] == vars[1] || vars[1] == vars[2] || vars[0] == vars[2] {
                continue;
            }
            for oi in 0..3 {
                for ci in 0..3 {
                    if ci == oi {
                        continue;
                    }
                    let ti = 3 - oi - ci;
                    let (vo, vc, vt) = (vars[oi], vars[ci], vars[ti]);
                    for other in &ternary {
                        if !(other.contains(&vo) && other.contains(&vc)) {
                            continue;
                        }
                        let thirds: Vec<VarId> = other.iter().cloned().filter(|v| *v != vo && *v != vc).collect();
                        if thirds.len() != 1 || thirds[0] == vt {
                            continue;
                        }
                        let ve = thirds[0];
                        if !seen.insert((vo, vc, vt, ve)) {
                            continue;
                        }
                        let o = Lit::new(vo, false);
                        let c = Lit::new(vc, false);
                        let t = Lit::new(vt, false);
                        let e = Lit::new(ve, false);
                        if has_ternary_clause(cdb, &[!o, !c, t])
                            && has_ternary_clause(cdb, &[!o, c, e])
                            && has_ternary_clause(cdb, &[o, !c, !t])
                            && has_ternary_clause(cdb, &[o, c, !e])
                        {
                            gates.push(Gate::Ite(o, c, t, e));
                        }
                    }
                }
            }
        }
        gates
    }

    /// Run extraction and congruence merging; returns the equivalences
    /// discovered (output literal, representative literal) to be folded
    /// into the substitution pass. Gates of different connectives never
    /// merge with each other; within a connective, two gates over the same
    /// (ordered, for ITE; sorted, for AND/XOR) inputs have their outputs
    /// unioned.
    pub fn find_equivalences(&mut self, cdb: &ClauseDB, nv: usize) -> Vec<(Lit, Lit)> {
        if !self.active {
            return Vec::new();
        }
        let mut gates = Vec::new();
        if self.ands {
            gates.extend(self.extract_and_gates(cdb));
        }
        if self.xors {
            gates.extend(self.extract_xor_gates(cdb));
        }
        if self.ites {
            gates.extend(self.extract_ite_gates(cdb));
        }
        let mut uf = UnionFind::new(2 * nv);
        let mut by_key: std::collections::HashMap<(u8, Vec<Lit>), Lit> = std::collections::HashMap::new();
        for g in &gates {
            let (tag, mut key): (u8, Vec<Lit>) = match g {
                Gate::And(_, inputs) => (0u8, inputs.clone()),
                Gate::Xor(_, inputs) => (1u8, inputs.clone()),
                Gate::Ite(_, c, t, e) => (2u8, vec![*c, *t, *e]),
            };
            if tag != 2 {
                key.sort_unstable();
            }
            let o = match g {
                Gate::And(o, _) | Gate::Xor(o, _) => *o,
                Gate::Ite(o, ..) => *o,
            };
            if let Some(&existing) = by_key.get(&(tag, key.clone())) {
                uf.union(o.code(), existing.code());
            } else {
                by_key.insert((tag, key), o);
            }
        }
        let mut out = Vec::new();
        for g in &gates {
            let o = match g {
                Gate::And(o, _) | Gate::Xor(o, _) => *o,
                Gate::Ite(o, ..) => *o,
            };
            let root = uf.find(o.code());
            if root != o.code() {
                out.push((o, unsafe_lit_from_code(root)));
            }
        }
        out
    }
}

/// Whether any non-garbage ternary clause contains exactly these three
/// literals (order-independent).
fn has_ternary_clause(cdb: &ClauseDB, lits: &[Lit; 3]) -> bool {
    cdb.clause
        .iter()
        .any(|c| !c.is_garbage() && c.lits.len() == 3 && lits.iter().all(|l| c.lits.contains(l)))
}

fn unsafe_lit_from_code(code: usize) -> Lit {
    Lit::new(code / 2, code % 2 == 1)
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
    fn recognizes_a_simple_and_gate() {
        let config = Config {
            preprocesscongruence: true,
            ..Config::default()
        };
        let mut cdb = ClauseDB::instantiate(&config, &cnf(4));
        let (o, a, b) = (Lit::from_i32(1), Lit::from_i32(2), Lit::from_i32(3));
        // o <-> (a & b): (¬o ∨ a), (¬o ∨ b), (o ∨ ¬a ∨ ¬b)
        cdb.new_binary_clause(!o, a);
        cdb.new_binary_clause(!o, b);
        cdb.new_irredundant_clause(vec![o, !a, !b]);
        let mut cong = Congruence::instantiate(&config, &cnf(4));
        let gates = cong.extract_and_gates(&cdb);
        assert!(!gates.is_empty());
    }

    #[test]
    fn recognizes_a_simple_xor_gate() {
        let config = Config {
            preprocesscongruence: true,
            ..Config::default()
        };
        let mut cdb = ClauseDB::instantiate(&config, &cnf(3));
        let (o, a, b) = (Lit::from_i32(1), Lit::from_i32(2), Lit::from_i32(3));
        // o <-> (a ⊕ b)
        cdb.new_irredundant_clause(vec![!o, a, b]);
        cdb.new_irredundant_clause(vec![!o, !a, !b]);
        cdb.new_irredundant_clause(vec![o, !a, b]);
        cdb.new_irredundant_clause(vec![o, a, !b]);
        let cong = Congruence::instantiate(&config, &cnf(3));
        let gates = cong.extract_xor_gates(&cdb);
        assert!(gates.iter().any(|g| matches!(g, Gate::Xor(go, inputs) if *go == o && inputs.len() == 2)));
    }

    #[test]
    fn recognizes_a_simple_ite_gate() {
        let config = Config {
            preprocesscongruence: true,
            ..Config::default()
        };
        let mut cdb = ClauseDB::instantiate(&config, &cnf(4));
        let (o, c, t, e) = (Lit::from_i32(1), Lit::from_i32(2), Lit::from_i32(3), Lit::from_i32(4));
        // o <-> ite(c, t, e)
        cdb.new_irredundant_clause(vec![!o, !c, t]);
        cdb.new_irredundant_clause(vec![!o, c, e]);
        cdb.new_irredundant_clause(vec![o, !c, !t]);
        cdb.new_irredundant_clause(vec![o, c, !e]);
        let cong = Congruence::instantiate(&config, &cnf(4));
        let gates = cong.extract_ite_gates(&cdb);
        assert!(gates.iter().any(|g| matches!(g, Gate::Ite(go, gc, gt, ge) if *go == o && *gc == c && *gt == t && *ge == e)));
    }
}
