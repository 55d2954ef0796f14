//! Extension stack: records left behind by BVE/substitution so a model over
//! the reduced formula can be extended to a model over the original one.
use crate::types::{Lit, VarId};

/// One eliminated variable's replay record. `Clauses` holds every clause
/// recorded on that variable's smaller occurrence side, treated as a single
/// conjunctive group: the witness is only free to take its complement when
/// *all* of them are already satisfied by their other literals. `Unit` is an
/// unconditional forced literal (substitution's representative collapse has
/// no clauses to check).
#[derive(Clone, Debug)]
enum Group {
    Clauses { witness: Lit, clauses: Vec<Vec<Lit>> },
    Unit(Lit),
}

/// A stack of per-variable witness groups (spec.md §6), replayed in reverse
/// of elimination order so a variable eliminated while resolving on an
/// already-eliminated one is fixed before the latter is reconsidered.
#[derive(Clone, Debug, Default)]
pub struct ExtensionStack {
    groups: Vec<Group>,
}

impl ExtensionStack {
    pub fn new() -> ExtensionStack {
        ExtensionStack { groups: Vec::new() }
    }

    /// Record every clause on one eliminated variable's smaller occurrence
    /// side as a single group: `clauses[i]` is what remains of that clause
    /// once `witness` is dropped.
    pub fn push_clauses(&mut self, witness: Lit, clauses: Vec<Vec<Lit>>) {
        self.groups.push(Group::Clauses { witness, clauses });
    }

    /// Record a unit forced purely by the elimination bookkeeping (no
    /// other literals to satisfy).
    pub fn push_unit(&mut self, witness: Lit) {
        self.groups.push(Group::Unit(witness));
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Walk the groups in reverse; for a `Clauses` group, flip the witness
    /// to its complement only if every clause in the group already holds
    /// without it -- never per-clause, so one already-satisfied clause
    /// can't overwrite a value another clause in the same group still
    /// needs the witness to force.
    pub fn extend_model(&self, model: &mut [Option<bool>]) {
        let holds = |model: &[Option<bool>], l: Lit| model[l.vi()] == Some(l.is_pos());
        for g in self.groups.iter().rev() {
            match g {
                Group::Unit(witness) => {
                    model[witness.vi()] = Some(witness.is_pos());
                }
                Group::Clauses { witness, clauses } => {
                    let all_satisfied = clauses.iter().all(|rest| rest.iter().any(|&l| holds(model, l)));
                    model[witness.vi()] = Some(if all_satisfied { !witness.is_pos() } else { witness.is_pos() });
                }
            }
        }
    }

    /// Variables mentioned anywhere on the stack; used to size the model
    /// array before extension and to exclude these variables from the
    /// externally reported decision set.
    pub fn eliminated_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.groups.iter().map(|g| match g {
            Group::Unit(w) | Group::Clauses { witness: w, .. } => w.vi(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_witness_when_unsatisfied() {
        let mut stack = ExtensionStack::new();
        // eliminated clause (x ∨ ¬y), witness = x
        stack.push_clauses(Lit::from_i32(1), vec![vec![Lit::from_i32(-2)]]);
        let mut model = vec![None, Some(true)]; // y = true, so ¬y is false
        stack.extend_model(&mut model);
        assert_eq!(model[0], Some(true)); // x must be flipped true
    }

    #[test]
    fn leaves_witness_when_satisfied() {
        let mut stack = ExtensionStack::new();
        stack.push_clauses(Lit::from_i32(1), vec![vec![Lit::from_i32(-2)]]);
        let mut model = vec![Some(false), Some(false)]; // ¬y is true already
        stack.extend_model(&mut model);
        assert_eq!(model[0], Some(false));
    }

    /// Regression for the extension-stack soundness bug: with two clauses
    /// on the recorded side, (v ∨ a) and (v ∨ b), and a model where a holds
    /// but b doesn't, v must be forced true -- a per-clause group split
    /// would let the (v ∨ a) clause's already-satisfied verdict flip v back
    /// to false and falsify (v ∨ b).
    #[test]
    fn does_not_let_one_satisfied_clause_overwrite_another_in_the_same_group() {
        let mut stack = ExtensionStack::new();
        let v = Lit::from_i32(1);
        let a = Lit::from_i32(2);
        let b = Lit::from_i32(3);
        stack.push_clauses(v, vec![vec![a], vec![b]]);
        let mut model = vec![None, Some(true), Some(false)]; // a = true, b = false
        stack.extend_model(&mut model);
        assert_eq!(model[0], Some(true)); // v must be forced true to satisfy (v ∨ b)
    }
}
