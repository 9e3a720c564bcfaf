//! Per-document namespace state: the registered prefix table, the
//! suppression set, the post-pass handling of Namespace rules, and the
//! final import-dependency recomputation.

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use rdfedit_model::ns::{dct, owl, rdf, rdfs, skos, sm, xsd};
use rdfedit_model::{Document, Term, Triple};

use crate::changeset::Accumulator;
use crate::report::Reporter;
use crate::rules::{DependencyMode, Rule, RuleBody};

/// Well-known vocabulary namespaces that are never auto-imported or
/// auto-retired; they keep whatever import the document already had.
const WELL_KNOWN: [&str; 7] = [
    owl::PREFIX,
    skos::PREFIX,
    rdfs::PREFIX,
    rdf::PREFIX,
    xsd::PREFIX,
    dct::PREFIX,
    sm::PREFIX,
];

/// Predicates whose objects never justify an import: they point at other
/// documents or versions, not at terms the document uses.
const EXEMPT_PREDICATES: [&str; 7] = [
    owl::imports,
    owl::versionIRI,
    rdfs::seeAlso,
    owl::backwardCompatibleWith,
    owl::priorVersion,
    owl::incompatibleWith,
    sm::specificationURL,
];

/// The namespace bookkeeping of one document pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NamespaceState {
    /// namespace → prefix, registered while rules fire
    registered: BTreeMap<String, String>,
    suppressed: BTreeSet<String>,
    pending_removal: bool,
    force_output: bool,
}

impl NamespaceState {
    /// Fresh state for one document pass.
    pub fn new() -> NamespaceState {
        NamespaceState::default()
    }

    /// Register `ns` under `prefix` (first registration wins), queueing
    /// `old_ns` for suppression.
    pub fn register(&mut self, ns: &str, prefix: Option<&str>, old_ns: Option<&str>) {
        if let Some(old) = old_ns {
            self.suppressed.insert(old.to_string());
        }
        if let Some(prefix) = prefix {
            if !self.registered.contains_key(ns) {
                self.registered.insert(ns.to_string(), prefix.to_string());
            }
        }
    }

    /// The namespaces to omit from output declarations and imports.
    pub fn suppressed(&self) -> &BTreeSet<String> {
        &self.suppressed
    }

    /// Whether a prefix-declaration removal forces output for this
    /// document even with an empty net diff.
    pub fn pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Whether a `dependencies="all"` rule forces output unconditionally.
    pub fn force_output(&self) -> bool {
        self.force_output
    }

    /// The registered, non-suppressed bindings, as (prefix, namespace).
    pub fn output_bindings(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.registered
            .iter()
            .filter(|(ns, _)| !self.suppressed.contains(*ns))
            .map(|(ns, prefix)| (prefix.as_str(), ns.as_str()))
    }

    /// Run the per-document part of one Namespace rule, after all triple
    /// rules. Other rule kinds have no per-document part.
    pub fn apply_ontology_rule(
        &mut self,
        rule: &Rule,
        doc: &Document,
        acc: &mut Accumulator,
        report: &mut Reporter,
        doc_name: &str,
    ) -> io::Result<()> {
        let RuleBody::Namespace {
            from,
            to,
            prefix,
            remove_prefix,
            dependencies,
        } = &rule.body
        else {
            return Ok(());
        };

        if let Some(from) = from {
            self.suppressed.insert(from.clone());
        }
        if let (Some(prefix), Some(to)) = (prefix, to) {
            self.register(to, Some(prefix), from.as_deref());
        }

        // A declaration naming the removed prefix or the old namespace is
        // itself a change, even when no triple was touched.
        if remove_prefix.is_some() || from.is_some() {
            for (p, ns) in doc.prefixes() {
                if Some(p.as_str()) == remove_prefix.as_deref()
                    || Some(ns.as_str()) == from.as_deref()
                {
                    acc.touch(report, doc_name)?;
                    self.pending_removal = true;
                    self.suppressed.insert(ns.clone());
                    report.log_line(&format!("....remove prefix declaration {p}: <{ns}>"))?;
                }
            }
        }

        if let Some(mode) = dependencies {
            if *mode == DependencyMode::All {
                self.force_output = true;
                acc.touch(report, doc_name)?;
            }
            // absorb the document's own declarations so the recomputation
            // can retire the unused ones too
            for (p, ns) in doc.prefixes() {
                if !self.registered.contains_key(ns)
                    && !WELL_KNOWN.iter().any(|w| w == ns)
                {
                    self.registered.insert(ns.clone(), p.clone());
                }
            }
        }
        Ok(())
    }

    /// Recompute which registered namespaces are still used after the
    /// pending edits, drop the rest into the suppression set, and adjust
    /// the ontology subject's import statements to match.
    ///
    /// Returns the ontology URI, used as the output base.
    pub fn recompute(
        &mut self,
        doc: &Document,
        acc: &mut Accumulator,
        report: &mut Reporter,
        doc_name: &str,
    ) -> io::Result<Option<String>> {
        let effective = effective_triples(doc, acc);
        let ontology = effective
            .iter()
            .find(|t| t.p.as_iri() == Some(rdf::type_) && t.o.as_iri() == Some(owl::Ontology))
            .map(|t| t.s.clone());

        if self.registered.is_empty() {
            return Ok(ontology.map(|s| s.text().to_string()));
        }

        // every reference value that can justify an import
        let mut used: BTreeSet<&str> = BTreeSet::new();
        for t in &effective {
            used.insert(t.s.text());
            used.insert(t.p.text());
            if t.o.is_iri() && !EXEMPT_PREDICATES.iter().any(|p| *p == t.p.text()) {
                used.insert(t.o.text());
            }
        }

        // keep a namespace only if some retained value extends it without
        // a path separator in the remainder; this heuristic can both
        // under- and over-match for hierarchical URI families (known
        // limitation, kept as-is)
        let registered = std::mem::take(&mut self.registered);
        let candidates: Vec<String> = registered.keys().cloned().collect();
        for (ns, prefix) in registered {
            let in_use = used
                .iter()
                .any(|v| v.strip_prefix(ns.as_str()).is_some_and(|rest| !rest.contains('/')));
            if in_use {
                self.registered.insert(ns, prefix);
            } else {
                self.suppressed.insert(ns);
            }
        }

        let Some(onto) = ontology else {
            report.warn("no ontology URI")?;
            return Ok(None);
        };
        let onto_uri = onto.text().to_string();

        // iterate every registration, including the ones just retired, so
        // their leftover imports are removed too
        for ns in candidates {
            let import = Triple::new(onto.clone(), Term::iri(owl::imports), Term::iri(ns.clone()));
            if self.suppressed.contains(&ns) {
                if effective.contains(&import) {
                    let cs = acc.touch(report, doc_name)?;
                    if !cs.additions.remove(&import) {
                        cs.removals.insert(import);
                    }
                    report.log_line(&format!("----Remove import: {ns}"))?;
                }
            } else if !effective.contains(&import) && ns != onto_uri {
                let cs = acc.touch(report, doc_name)?;
                cs.additions.insert(import);
                report.log_line(&format!("----Add import: {ns}"))?;
            }
        }
        Ok(Some(onto_uri))
    }
}

/// The document's triples as they will stand once the changeset applies.
fn effective_triples(doc: &Document, acc: &Accumulator) -> BTreeSet<Triple> {
    let mut triples: BTreeSet<Triple> = doc.triples().cloned().collect();
    if let Some(cs) = acc.changeset() {
        for t in &cs.removals {
            triples.remove(t);
        }
        for t in &cs.additions {
            triples.insert(t.clone());
        }
    }
    triples
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const ONTO: &str = "http://example.org/onto";

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Term::iri(s), Term::iri(p), Term::iri(o))
    }

    fn ontology_doc(extra: &[Triple]) -> Document {
        let mut doc: Document = [t(ONTO, rdf::type_, owl::Ontology)].into_iter().collect();
        doc.extend(extra.iter().cloned());
        doc
    }

    fn namespace_rule(
        from: Option<&str>,
        to: Option<&str>,
        prefix: Option<&str>,
        remove_prefix: Option<&str>,
        dependencies: Option<DependencyMode>,
    ) -> Rule {
        Rule {
            body: RuleBody::Namespace {
                from: from.map(String::from),
                to: to.map(String::from),
                prefix: prefix.map(String::from),
                remove_prefix: remove_prefix.map(String::from),
                dependencies,
            },
            continues: false,
        }
    }

    #[test]
    fn register_first_prefix_wins() {
        let mut ns = NamespaceState::new();
        ns.register("http://a/", Some("a"), None);
        ns.register("http://a/", Some("other"), None);
        ns.register("http://b/", None, Some("http://old/"));
        let bindings: Vec<_> = ns.output_bindings().collect();
        assert_eq!(bindings, [("a", "http://a/")]);
        assert!(ns.suppressed().contains("http://old/"));
    }

    #[test]
    fn used_namespace_gets_an_import() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let doc = ontology_doc(&[t(
            "http://x",
            "http://example.org/p",
            "http://new.example/Thing",
        )]);
        acc.touch(&mut report, "doc")?;
        ns.register("http://new.example/", Some("new"), None);
        let base = ns.recompute(&doc, &mut acc, &mut report, "doc")?;
        assert_eq!(base.as_deref(), Some(ONTO));
        let cs = acc.changeset().unwrap();
        assert!(cs
            .additions
            .contains(&t(ONTO, owl::imports, "http://new.example/")));
        Ok(())
    }

    #[test]
    fn unused_namespace_is_suppressed_and_import_removed() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let doc = ontology_doc(&[t(ONTO, owl::imports, "http://old.example/")]);
        acc.touch(&mut report, "doc")?;
        ns.register("http://old.example/", Some("old"), None);
        ns.recompute(&doc, &mut acc, &mut report, "doc")?;
        assert!(ns.suppressed().contains("http://old.example/"));
        let cs = acc.changeset().unwrap();
        assert!(cs
            .removals
            .contains(&t(ONTO, owl::imports, "http://old.example/")));
        Ok(())
    }

    #[test]
    fn import_exempt_objects_do_not_count_as_usage() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        // the only mention is through seeAlso, which never justifies an import
        let doc = ontology_doc(&[t(ONTO, rdfs::seeAlso, "http://new.example/Doc")]);
        acc.touch(&mut report, "doc")?;
        ns.register("http://new.example/", Some("new"), None);
        ns.recompute(&doc, &mut acc, &mut report, "doc")?;
        assert!(ns.suppressed().contains("http://new.example/"));
        Ok(())
    }

    #[test]
    fn path_separator_in_remainder_is_not_usage() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let doc = ontology_doc(&[t(
            "http://x",
            "http://example.org/p",
            "http://fam.example/sub/Thing",
        )]);
        acc.touch(&mut report, "doc")?;
        ns.register("http://fam.example/", Some("fam"), None);
        ns.recompute(&doc, &mut acc, &mut report, "doc")?;
        assert!(ns.suppressed().contains("http://fam.example/"));
        Ok(())
    }

    #[test]
    fn self_referential_namespace_is_not_imported() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let doc = ontology_doc(&[t("http://x", "http://example.org/p", "http://example.org/ontoX")]);
        acc.touch(&mut report, "doc")?;
        // "used" through ontoX, equal to the ontology URI modulo suffix
        ns.register(ONTO, Some("self"), None);
        ns.recompute(&doc, &mut acc, &mut report, "doc")?;
        let cs = acc.changeset().unwrap();
        assert!(!cs.additions.iter().any(|tr| tr.p.as_iri() == Some(owl::imports)
            && tr.o.as_iri() == Some(ONTO)));
        Ok(())
    }

    #[test]
    fn missing_ontology_subject_warns_and_skips_imports() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let doc: Document = [t("http://x", "http://example.org/p", "http://new.example/A")]
            .into_iter()
            .collect();
        acc.touch(&mut report, "doc")?;
        ns.register("http://new.example/", Some("new"), None);
        let base = ns.recompute(&doc, &mut acc, &mut report, "doc")?;
        assert_eq!(base, None);
        assert_eq!(report.counters.warnings, 1);
        let cs = acc.changeset().unwrap();
        assert!(cs.additions.is_empty());
        Ok(())
    }

    #[test]
    fn remove_prefix_marks_document_changed() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let mut doc = ontology_doc(&[]);
        doc.declare_prefix("old", "http://old.example/");
        let rule = namespace_rule(None, None, None, Some("old"), None);
        ns.apply_ontology_rule(&rule, &doc, &mut acc, &mut report, "doc")?;
        assert!(ns.pending_removal());
        assert!(acc.changed());
        assert!(ns.suppressed().contains("http://old.example/"));
        Ok(())
    }

    #[test]
    fn from_matching_declared_namespace_marks_changed() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let mut doc = ontology_doc(&[]);
        doc.declare_prefix("old", "http://old.example/");
        let rule = namespace_rule(
            Some("http://old.example/"),
            Some("http://new.example/"),
            None,
            None,
            None,
        );
        ns.apply_ontology_rule(&rule, &doc, &mut acc, &mut report, "doc")?;
        assert!(ns.pending_removal());
        assert!(acc.changed());
        Ok(())
    }

    #[test]
    fn dependencies_all_forces_output_and_absorbs_declarations() -> io::Result<()> {
        let mut report = Reporter::quiet();
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let mut doc = ontology_doc(&[]);
        doc.declare_prefix("ex", "http://example.org/voc/");
        doc.declare_prefix("owl", owl::PREFIX);
        let rule = namespace_rule(None, None, None, None, Some(DependencyMode::All));
        ns.apply_ontology_rule(&rule, &doc, &mut acc, &mut report, "doc")?;
        assert!(ns.force_output());
        assert!(acc.changed());
        // the document's own declaration is absorbed, the well-known one not
        let bindings: Vec<_> = ns.output_bindings().collect();
        assert_eq!(bindings, [("ex", "http://example.org/voc/")]);
        Ok(())
    }
}
