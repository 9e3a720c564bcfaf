//! I define [`Document`].

use std::collections::{BTreeMap, BTreeSet};

use crate::ns::rdf;
use crate::{Term, Triple};

/// An RDF document held entirely in memory.
///
/// Triples live in a sorted set, so iterating a document is deterministic
/// regardless of the order in which triples were inserted. Prefix
/// declarations and the base IRI found while parsing are carried alongside
/// the triples, so they can be replayed when the document is written back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    triples: BTreeSet<Triple>,
    prefixes: BTreeMap<String, String>,
    base: Option<String>,
}

impl Document {
    /// An empty document.
    pub fn new() -> Document {
        Document::default()
    }

    /// The number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether this document contains no triple.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Add a triple, returning `false` if it was already present.
    pub fn insert(&mut self, t: Triple) -> bool {
        self.triples.insert(t)
    }

    /// Remove a triple, returning `false` if it was not present.
    pub fn remove(&mut self, t: &Triple) -> bool {
        self.triples.remove(t)
    }

    /// Whether the given triple is present.
    pub fn contains(&self, t: &Triple) -> bool {
        self.triples.contains(t)
    }

    /// Iterate over all triples, in sorted order.
    pub fn triples(&self) -> impl Iterator<Item = &Triple> + '_ {
        self.triples.iter()
    }

    /// Record a prefix declaration, replacing any previous binding of `prefix`.
    pub fn declare_prefix(&mut self, prefix: impl Into<String>, ns: impl Into<String>) {
        self.prefixes.insert(prefix.into(), ns.into());
    }

    /// The prefix declarations carried by this document, keyed by prefix.
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// The base IRI, if one was declared.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Record the base IRI.
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = Some(base.into());
    }

    /// Iterate over the objects of all triples with the given subject and
    /// predicate IRI.
    pub fn objects_of<'s, 'a>(
        &'s self,
        s: &'a Term,
        p_iri: &'a str,
    ) -> impl Iterator<Item = &'s Term> + 'a
    where
        's: 'a,
    {
        self.triples
            .iter()
            .filter(move |t| &t.s == s && t.p.as_iri() == Some(p_iri))
            .map(|t| &t.o)
    }

    /// The first subject (in sorted order) declared with `rdf:type <class_iri>`.
    pub fn first_subject_of_type(&self, class_iri: &str) -> Option<&Term> {
        self.triples
            .iter()
            .find(|t| t.p.as_iri() == Some(rdf::type_) && t.o.as_iri() == Some(class_iri))
            .map(|t| &t.s)
    }
}

impl Extend<Triple> for Document {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter)
    }
}

impl FromIterator<Triple> for Document {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Document {
        let mut doc = Document::new();
        doc.extend(iter);
        doc
    }
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
