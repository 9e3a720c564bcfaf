//! The per-document changeset: an add-set/remove-set pair with lazy
//! allocation, a fire counter, and the end-of-pass literal normalization.

use std::collections::BTreeSet;
use std::io;

use rdfedit_model::ns::{rdf, xsd};
use rdfedit_model::{Document, Term, Triple};

use crate::engine::rebuild;
use crate::report::Reporter;

/// The pending edit of one document.
///
/// Invariant: removals are triples of the pre-pass document; additions are
/// new well-formed triples. The final state of the document is
/// `(original - removals) + additions`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Changeset {
    /// Triples to add.
    pub additions: BTreeSet<Triple>,
    /// Triples to remove.
    pub removals: BTreeSet<Triple>,
}

/// Accumulates the changeset of one document pass.
///
/// The changeset is allocated on the first fire, which also logs the
/// document header; later fires reuse it and bump the counter.
#[derive(Debug, Default)]
pub struct Accumulator {
    changeset: Option<Changeset>,
    fires: u64,
}

impl Accumulator {
    /// A fresh accumulator for one document pass.
    pub fn new() -> Accumulator {
        Accumulator::default()
    }

    /// Record a rule fire and return the changeset, allocating it and
    /// logging the document header on the first call.
    pub fn touch(
        &mut self,
        report: &mut Reporter,
        doc_name: &str,
    ) -> io::Result<&mut Changeset> {
        if self.changeset.is_none() {
            report.log_line(&format!("..Ontology <{doc_name}>"))?;
        }
        self.fires += 1;
        Ok(self.changeset.get_or_insert_with(Changeset::default))
    }

    /// The number of rule fires so far.
    pub fn fires(&self) -> u64 {
        self.fires
    }

    /// Whether any rule fired.
    pub fn changed(&self) -> bool {
        self.fires > 0
    }

    /// The changeset, if any rule fired.
    pub fn changeset(&self) -> Option<&Changeset> {
        self.changeset.as_ref()
    }

    /// Rewrite every plain-string-typed literal without a language tag,
    /// so output literals carry a determinate language or no such datatype.
    ///
    /// Runs once at document end, over the original triples, independent of
    /// which rule (if any) touched each literal. A no-op unless some rule
    /// fired.
    pub fn normalize(&mut self, doc: &Document) {
        if self.fires == 0 {
            return;
        }
        let Some(cs) = &mut self.changeset else {
            return;
        };
        for t in doc.triples() {
            if let Term::Literal {
                datatype: Some(dt),
                language: None,
                ..
            } = &t.o
            {
                let dt = dt.as_ref();
                if (dt == rdf::langString || dt == xsd::string) && !cs.removals.contains(t) {
                    cs.removals.insert(t.clone());
                    cs.additions.insert(Triple::new(
                        t.s.clone(),
                        t.p.clone(),
                        rebuild(&t.o, t.o.text()),
                    ));
                }
            }
        }
    }

    /// Whether applying the changeset would leave the document unchanged.
    ///
    /// True when additions and removals cancel out exactly, which covers
    /// both the nothing-fired case and rules firing without net content
    /// delta.
    pub fn is_net_empty(&self) -> bool {
        match &self.changeset {
            None => true,
            Some(cs) => cs.additions == cs.removals,
        }
    }

    /// Apply the changeset to `doc`: removals first, then additions.
    pub fn apply(&self, doc: &mut Document) {
        let Some(cs) = &self.changeset else { return };
        for t in &cs.removals {
            doc.remove(t);
        }
        for t in &cs.additions {
            doc.insert(t.clone());
        }
    }
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
