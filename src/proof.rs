//! DRAT-compatible proof stream: an "add" record for every derived clause,
//! a "delete" record for every deleted one (spec.md §6).
use crate::types::Lit;

/// One line of the proof stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertifiedRecord {
    Add(Vec<i32>),
    Delete(Vec<i32>),
}

pub trait CertificationIF {
    fn add(&mut self, lits: &[Lit]);
    fn delete(&mut self, lits: &[Lit]);
    /// Render the accumulated stream as DRAT text, `d `-prefixed deletions,
    /// each record terminated by `0`.
    fn to_text(&self) -> String;
}

/// Buffers the proof stream in memory; `solver_build`/the CLI binary decide
/// whether and where to flush it. A no-op when certification is disabled,
/// so the hot clause-creation path pays nothing beyond one branch.
#[derive(Clone, Debug, Default)]
pub struct Certifier {
    enabled: bool,
    records: Vec<CertifiedRecord>,
}

impl Certifier {
    pub fn new(enabled: bool) -> Certifier {
        Certifier {
            enabled,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[CertifiedRecord] {
        &self.records
    }
}

impl CertificationIF for Certifier {
    fn add(&mut self, lits: &[Lit]) {
        if self.enabled {
            self.records
                .push(CertifiedRecord::Add(lits.iter().map(|l| l.to_i32()).collect()));
        }
    }
    fn delete(&mut self, lits: &[Lit]) {
        if self.enabled {
            self.records.push(CertifiedRecord::Delete(
                lits.iter().map(|l| l.to_i32()).collect(),
            ));
        }
    }
    fn to_text(&self) -> String {
        let mut out = String::new();
        for r in &self.records {
            match r {
                CertifiedRecord::Add(v) => {
                    for x in v {
                        out.push_str(&x.to_string());
                        out.push(' ');
                    }
                    out.push_str("0\n");
                }
                CertifiedRecord::Delete(v) => {
                    out.push_str("d ");
                    for x in v {
                        out.push_str(&x.to_string());
                        out.push(' ');
                    }
                    out.push_str("0\n");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_certifier_records_nothing() {
        let mut c = Certifier::new(false);
        c.add(&[Lit::from_i32(1), Lit::from_i32(2)]);
        assert!(c.records().is_empty());
    }

    #[test]
    fn enabled_certifier_renders_drat_text() {
        let mut c = Certifier::new(true);
        c.add(&[Lit::from_i32(1), Lit::from_i32(-2)]);
        c.delete(&[Lit::from_i32(1), Lit::from_i32(-2)]);
        assert_eq!(c.to_text(), "1 -2 0\nd 1 -2 0\n");
    }
}
