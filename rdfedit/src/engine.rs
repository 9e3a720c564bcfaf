//! The triple rule dispatcher and its value constructor.
//!
//! For each triple of a document, rules are tried in declared order; a
//! firing rule schedules the triple for removal plus at most one
//! replacement, and stops further rules for that triple unless it carries
//! the continuation flag.

use std::io;

use rdfedit_model::ns::{owl, rdf, rdfs, xsd};
use rdfedit_model::{Document, Term, Triple};

use crate::changeset::Accumulator;
use crate::namespaces::NamespaceState;
use crate::report::Reporter;
use crate::rules::{Positions, PropertyKind, Rule, RuleBody};

/// Build a new value of the same kind as `old`, carrying `new_text`.
///
/// References and blank nodes just take the new text. For literals, a
/// language-string datatype without a language tag defaults the language to
/// `"en"`; an explicit plain-string datatype, or any language tag, drops
/// the datatype; anything else keeps the original datatype. This keeps
/// redundant or conflicting string datatypes out of the output.
pub fn rebuild(old: &Term, new_text: &str) -> Term {
    match old {
        Term::Iri(_) => Term::iri(new_text),
        Term::Blank(_) => Term::blank(new_text),
        Term::Literal {
            datatype, language, ..
        } => {
            let mut language = language.clone();
            let mut datatype = datatype.clone();
            if datatype.as_deref() == Some(rdf::langString) && language.is_none() {
                language = Some("en".into());
                datatype = None;
            }
            if datatype.as_deref() == Some(xsd::string) || language.is_some() {
                datatype = None;
            }
            Term::Literal {
                text: new_text.into(),
                datatype,
                language,
            }
        }
    }
}

/// Try every rule against one triple, in order, with short-circuit.
#[allow(clippy::too_many_arguments)]
pub fn apply_rules(
    rules: &[Rule],
    doc: &Document,
    t: &Triple,
    acc: &mut Accumulator,
    ns: &mut NamespaceState,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<()> {
    for rule in rules {
        if apply_rule(rule, doc, t, acc, ns, report, doc_name)? && !rule.continues {
            break;
        }
    }
    Ok(())
}

/// Try one rule against one triple; `Ok(true)` means the rule fired.
#[allow(clippy::too_many_arguments)]
fn apply_rule(
    rule: &Rule,
    doc: &Document,
    t: &Triple,
    acc: &mut Accumulator,
    ns: &mut NamespaceState,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<bool> {
    match &rule.body {
        RuleBody::Replace {
            from,
            to,
            positions,
            predicate,
        } => replace_rule(from, to.as_deref(), *positions, predicate.as_deref(), t, acc, report, doc_name),
        RuleBody::Delete {
            from,
            positions,
            predicate,
        } => delete_rule(from, *positions, predicate.as_deref(), t, acc, report, doc_name),
        RuleBody::Edit {
            from,
            to,
            predicate,
        } => edit_rule(from, to, predicate.as_deref(), t, acc, report, doc_name),
        RuleBody::Type { from, to, kind } => {
            type_rule(from, to, *kind, doc, t, acc, report, doc_name)
        }
        RuleBody::Namespace {
            from, to, prefix, ..
        } => namespace_rule(
            from.as_deref(),
            to.as_deref(),
            prefix.as_deref(),
            t,
            acc,
            ns,
            report,
            doc_name,
        ),
    }
}

/// The position of a whole-value match, committed in s→p→o order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Matched {
    Subject,
    Predicate,
    Object,
}

fn match_position(from: &str, positions: Positions, t: &Triple) -> Option<Matched> {
    if positions.s && t.s.text() == from {
        Some(Matched::Subject)
    } else if positions.p && t.p.text() == from {
        Some(Matched::Predicate)
    } else if positions.o && t.o.text() == from {
        Some(Matched::Object)
    } else {
        None
    }
}

fn selector_mismatch(predicate: Option<&str>, t: &Triple) -> bool {
    predicate.is_some_and(|p| p != t.p.text())
}

#[allow(clippy::too_many_arguments)]
fn replace_rule(
    from: &str,
    to: Option<&str>,
    positions: Positions,
    predicate: Option<&str>,
    t: &Triple,
    acc: &mut Accumulator,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<bool> {
    if selector_mismatch(predicate, t) {
        return Ok(false);
    }
    let Some(position) = match_position(from, positions, t) else {
        return Ok(false);
    };
    let cs = acc.touch(report, doc_name)?;
    cs.removals.insert(t.clone());
    if let Some(to) = to {
        let new = match position {
            Matched::Subject => Triple::new(rebuild(&t.s, to), t.p.clone(), t.o.clone()),
            Matched::Predicate => Triple::new(t.s.clone(), rebuild(&t.p, to), t.o.clone()),
            Matched::Object => Triple::new(t.s.clone(), t.p.clone(), rebuild(&t.o, to)),
        };
        report.log_line(&format!("....Change {t} to {new}"))?;
        cs.additions.insert(new);
    } else {
        report.log_line(&format!("....Delete {t}"))?;
    }
    if position == Matched::Predicate {
        report.warn(&format!("Changed property type in use {t}"))?;
    }
    Ok(true)
}

fn delete_rule(
    from: &str,
    positions: Positions,
    predicate: Option<&str>,
    t: &Triple,
    acc: &mut Accumulator,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<bool> {
    if selector_mismatch(predicate, t) {
        return Ok(false);
    }
    if match_position(from, positions, t).is_none() {
        return Ok(false);
    }
    let cs = acc.touch(report, doc_name)?;
    cs.removals.insert(t.clone());
    report.log_line(&format!("....Delete {t}"))?;
    Ok(true)
}

fn edit_rule(
    from: &str,
    to: &str,
    predicate: Option<&str>,
    t: &Triple,
    acc: &mut Accumulator,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<bool> {
    if !t.o.text().contains(from) || selector_mismatch(predicate, t) {
        return Ok(false);
    }
    let new_text = t.o.text().replace(from, to);
    let new = Triple::new(t.s.clone(), t.p.clone(), rebuild(&t.o, &new_text));
    let cs = acc.touch(report, doc_name)?;
    cs.removals.insert(t.clone());
    cs.additions.insert(new.clone());
    report.log_line(&format!("....Replace substring {t} with {new}"))?;
    Ok(true)
}

#[allow(clippy::too_many_arguments)]
fn type_rule(
    from: &str,
    to: &str,
    kind: Option<PropertyKind>,
    doc: &Document,
    t: &Triple,
    acc: &mut Accumulator,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<bool> {
    if t.p.text() == from {
        // The predicate is itself an instance of the retyped term; left
        // untouched and flagged for review, and reported not-fired so
        // later rules still run.
        acc.touch(report, doc_name)?;
        report.warn(&format!(
            "Changed property type in use, inspect {t}"
        ))?;
        return Ok(false);
    }
    if t.o.text() != from {
        return Ok(false);
    }
    let cs = acc.touch(report, doc_name)?;
    report.log_line(&format!("....Change type reference {t} to <{to}>"))?;
    cs.removals.insert(t.clone());
    let p_iri = t.p.as_iri();
    if kind == Some(PropertyKind::DatatypeProperty) && p_iri == Some(owl::onClass) {
        // the restriction edge must match the new property kind
        cs.additions.insert(Triple::new(
            t.s.clone(),
            Term::iri(owl::onDataRange),
            rebuild(&t.o, to),
        ));
    } else if kind == Some(PropertyKind::ObjectProperty) && p_iri == Some(owl::onDataRange) {
        cs.additions.insert(Triple::new(
            t.s.clone(),
            Term::iri(owl::onClass),
            rebuild(&t.o, to),
        ));
    } else if p_iri != Some(owl::imports) {
        cs.additions
            .insert(Triple::new(t.s.clone(), t.p.clone(), rebuild(&t.o, to)));
    } else {
        // imports are recomputed centrally once all rules have run
        report.log_line(&format!("....Conditional import <{to}>"))?;
    }
    if let Some(kind) = kind {
        coerce_property_kind(kind, doc, t, acc, report, doc_name)?;
    }
    Ok(true)
}

/// Locate the declaration of the restricted property or class and flip its
/// type between `owl:ObjectProperty` and `owl:DatatypeProperty`.
fn coerce_property_kind(
    kind: PropertyKind,
    doc: &Document,
    t: &Triple,
    acc: &mut Accumulator,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<()> {
    let declaration = match t.p.as_iri() {
        Some(rdfs::range) => Some(t.s.clone()),
        Some(owl::someValuesFrom | owl::allValuesFrom | owl::onClass | owl::onDataRange) => {
            // should be exactly one onProperty edge on the restriction
            doc.objects_of(&t.s, owl::onProperty).next().cloned()
        }
        _ => {
            report.warn(&format!("Could not find property definition for {t}"))?;
            return Ok(());
        }
    };
    let Some(target) = declaration else {
        report.warn(&format!("Could not find property definition for {t}"))?;
        return Ok(());
    };
    let (old_kind, new_kind, label) = match kind {
        PropertyKind::ObjectProperty => (owl::DatatypeProperty, owl::ObjectProperty, "ObjectProperty"),
        PropertyKind::DatatypeProperty => (owl::ObjectProperty, owl::DatatypeProperty, "DatatypeProperty"),
    };
    let old = Triple::new(target.clone(), Term::iri(rdf::type_), Term::iri(old_kind));
    if doc.contains(&old) {
        let cs = acc.touch(report, doc_name)?;
        cs.removals.insert(old);
        cs.additions
            .insert(Triple::new(target.clone(), Term::iri(rdf::type_), Term::iri(new_kind)));
        report.log_line(&format!("...... <{}> changed to {label}", target.text()))?;
    } else {
        report.warn(&format!("Could not determine type of <{}>", target.text()))?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn namespace_rule(
    from: Option<&str>,
    to: Option<&str>,
    prefix: Option<&str>,
    t: &Triple,
    acc: &mut Accumulator,
    ns: &mut NamespaceState,
    report: &mut Reporter,
    doc_name: &str,
) -> io::Result<bool> {
    // a rule without "from" only registers a prefix, in the ontology pass
    let (Some(from), Some(to)) = (from, to) else {
        return Ok(false);
    };
    let m_s = t.s.text().starts_with(from);
    let m_p = t.p.text().starts_with(from);
    let m_o = t.o.text().starts_with(from);
    if !(m_s || m_p || m_o) {
        return Ok(false);
    }
    ns.register(to, prefix, Some(from));
    let cs = acc.touch(report, doc_name)?;
    cs.removals.insert(t.clone());
    if m_o && t.p.as_iri() == Some(owl::imports) && t.o.text() == from {
        // deleting the old import; dependency recomputation decides later
        // whether the new namespace needs one
        report.log_line(&format!("....Conditional import <{to}>"))?;
    } else {
        let swap = |term: &Term, matched: bool| {
            if matched {
                rebuild(term, &format!("{to}{}", &term.text()[from.len()..]))
            } else {
                term.clone()
            }
        };
        let new = Triple::new(swap(&t.s, m_s), swap(&t.p, m_p), swap(&t.o, m_o));
        report.log_line(&format!("....Namespace change {t} to {new}"))?;
        cs.additions.insert(new);
    }
    Ok(true)
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn rebuild_reference() {
        assert_eq!(
            rebuild(&Term::iri("http://old"), "http://new"),
            Term::iri("http://new")
        );
        assert_eq!(rebuild(&Term::blank("b0"), "b1"), Term::blank("b1"));
    }

    #[test_case(Term::literal("hello"), Term::literal("hello"); "plain stays plain")]
    #[test_case(Term::literal_lang("hello", "fr"), Term::literal_lang("hello", "fr"); "language preserved")]
    #[test_case(
        Term::literal_typed("hello", rdf::langString),
        Term::literal_lang("hello", "en");
        "lang string defaults to en"
    )]
    #[test_case(
        Term::literal_typed("hello", xsd::string),
        Term::literal("hello");
        "explicit string datatype dropped"
    )]
    #[test_case(
        Term::literal_typed("5", "http://www.w3.org/2001/XMLSchema#integer"),
        Term::literal_typed("5", "http://www.w3.org/2001/XMLSchema#integer");
        "other datatype preserved"
    )]
    fn rebuild_literal_round_trip(old: Term, expected: Term) {
        assert_eq!(rebuild(&old, old.text()), expected);
    }

    fn triple(s: &str, p: &str, o: Term) -> Triple {
        Triple::new(Term::iri(s), Term::iri(p), o)
    }

    fn replace(from: &str, to: Option<&str>, positions: &str) -> Rule {
        Rule {
            body: RuleBody::Replace {
                from: from.into(),
                to: to.map(String::from),
                positions: Positions::parse(positions),
                predicate: None,
            },
            continues: false,
        }
    }

    fn run(rules: &[Rule], doc: &Document) -> (Accumulator, NamespaceState, Reporter) {
        let mut acc = Accumulator::new();
        let mut ns = NamespaceState::new();
        let mut report = Reporter::quiet();
        for t in doc.triples() {
            apply_rules(rules, doc, t, &mut acc, &mut ns, &mut report, "doc").unwrap();
        }
        (acc, ns, report)
    }

    #[test]
    fn replace_object() {
        // Scenario A
        let doc: Document = [triple(
            "http://x",
            "http://example.org/knows",
            Term::iri("http://example.org/ThingA"),
        )]
        .into_iter()
        .collect();
        let rules = [replace(
            "http://example.org/ThingA",
            Some("http://example.org/ThingB"),
            "o",
        )];
        let (acc, _, _) = run(&rules, &doc);
        let cs = acc.changeset().unwrap();
        assert_eq!(cs.removals.len(), 1);
        assert!(cs.additions.contains(&triple(
            "http://x",
            "http://example.org/knows",
            Term::iri("http://example.org/ThingB"),
        )));
    }

    #[test]
    fn replace_ignores_unmatched_positions() {
        let doc: Document = [triple(
            "http://example.org/ThingA",
            "http://example.org/knows",
            Term::iri("http://y"),
        )]
        .into_iter()
        .collect();
        let rules = [replace("http://example.org/ThingA", Some("http://z"), "o")];
        let (acc, _, _) = run(&rules, &doc);
        assert!(acc.changeset().is_none());
    }

    #[test]
    fn replace_predicate_warns() {
        let doc: Document = [triple(
            "http://x",
            "http://example.org/knows",
            Term::iri("http://y"),
        )]
        .into_iter()
        .collect();
        let rules = [replace(
            "http://example.org/knows",
            Some("http://example.org/met"),
            "spo",
        )];
        let (acc, _, report) = run(&rules, &doc);
        assert_eq!(report.counters.warnings, 1);
        assert!(acc.changeset().unwrap().additions.contains(&triple(
            "http://x",
            "http://example.org/met",
            Term::iri("http://y"),
        )));
    }

    #[test]
    fn replace_respects_selector() {
        let doc: Document = [triple(
            "http://x",
            "http://example.org/knows",
            Term::iri("http://y"),
        )]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Replace {
                from: "http://y".into(),
                to: Some("http://z".into()),
                positions: Positions::ALL,
                predicate: Some("http://example.org/other".into()),
            },
            continues: false,
        }];
        let (acc, _, _) = run(&rules, &doc);
        assert!(acc.changeset().is_none());
    }

    #[test]
    fn delete_only_matching_triples() {
        // Scenario B
        let deprecated = Term::iri("http://example.org/Deprecated");
        let doc: Document = [
            triple("http://x", rdf::type_, deprecated.clone()),
            triple("http://x", "http://example.org/label", Term::literal("x")),
        ]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Delete {
                from: "http://example.org/Deprecated".into(),
                positions: Positions::ALL,
                predicate: None,
            },
            continues: false,
        }];
        let (acc, _, _) = run(&rules, &doc);
        let cs = acc.changeset().unwrap();
        assert_eq!(cs.removals.len(), 1);
        assert!(cs.additions.is_empty());
        assert!(cs.removals.contains(&triple("http://x", rdf::type_, deprecated)));
    }

    #[test]
    fn edit_substring_preserves_language() {
        // Scenario C
        let doc: Document = [triple(
            "http://x",
            "http://example.org/comment",
            Term::literal_lang("the surface of the Earth is round", "en"),
        )]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Edit {
                from: "the Earth".into(),
                to: "a planet".into(),
                predicate: None,
            },
            continues: false,
        }];
        let (acc, _, _) = run(&rules, &doc);
        let cs = acc.changeset().unwrap();
        assert!(cs.additions.contains(&triple(
            "http://x",
            "http://example.org/comment",
            Term::literal_lang("the surface of a planet is round", "en"),
        )));
    }

    #[test]
    fn short_circuit_and_continue() {
        let doc: Document = [triple(
            "http://x",
            "http://example.org/p",
            Term::literal("alpha beta"),
        )]
        .into_iter()
        .collect();
        let edit = |from: &str, to: &str, continues| Rule {
            body: RuleBody::Edit {
                from: from.into(),
                to: to.into(),
                predicate: None,
            },
            continues,
        };

        // first rule stops the second
        let (acc, _, _) = run(&[edit("alpha", "ALPHA", false), edit("beta", "BETA", false)], &doc);
        let texts: Vec<_> = acc
            .changeset()
            .unwrap()
            .additions
            .iter()
            .map(|t| t.o.text().to_string())
            .collect();
        assert_eq!(texts, ["ALPHA beta"]);

        // with the continuation flag both fire
        let (acc, _, _) = run(&[edit("alpha", "ALPHA", true), edit("beta", "BETA", false)], &doc);
        let texts: Vec<_> = acc
            .changeset()
            .unwrap()
            .additions
            .iter()
            .map(|t| t.o.text().to_string())
            .collect();
        assert_eq!(texts, ["ALPHA beta", "alpha BETA"]);
    }

    #[test]
    fn type_rule_flips_restriction_and_declaration() {
        // Scenario E: retyping with kind=ObjectProperty flips the
        // onDataRange edge and the property declaration
        let restriction = Term::blank("r0");
        let doc: Document = [
            Triple::new(
                restriction.clone(),
                Term::iri(owl::onProperty),
                Term::iri("http://example.org/hasSite"),
            ),
            Triple::new(
                restriction.clone(),
                Term::iri(owl::onDataRange),
                Term::iri("http://example.org/T"),
            ),
            triple("http://example.org/hasSite", rdf::type_, Term::iri(owl::DatatypeProperty)),
        ]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Type {
                from: "http://example.org/T".into(),
                to: "http://example.org/U".into(),
                kind: Some(PropertyKind::ObjectProperty),
            },
            continues: false,
        }];
        let (acc, _, report) = run(&rules, &doc);
        let cs = acc.changeset().unwrap();
        assert!(cs.additions.contains(&Triple::new(
            restriction.clone(),
            Term::iri(owl::onClass),
            Term::iri("http://example.org/U"),
        )));
        assert!(cs.removals.contains(&triple(
            "http://example.org/hasSite",
            rdf::type_,
            Term::iri(owl::DatatypeProperty),
        )));
        assert!(cs.additions.contains(&triple(
            "http://example.org/hasSite",
            rdf::type_,
            Term::iri(owl::ObjectProperty),
        )));
        assert_eq!(report.counters.warnings, 0);
    }

    #[test]
    fn type_rule_range_declaration_is_the_subject() {
        let doc: Document = [
            triple(
                "http://example.org/hasSite",
                rdfs::range,
                Term::iri("http://example.org/T"),
            ),
            triple("http://example.org/hasSite", rdf::type_, Term::iri(owl::ObjectProperty)),
        ]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Type {
                from: "http://example.org/T".into(),
                to: xsd::string.into(),
                kind: Some(PropertyKind::DatatypeProperty),
            },
            continues: false,
        }];
        let (acc, _, _) = run(&rules, &doc);
        let cs = acc.changeset().unwrap();
        assert!(cs.additions.contains(&triple(
            "http://example.org/hasSite",
            rdf::type_,
            Term::iri(owl::DatatypeProperty),
        )));
        assert!(cs.additions.contains(&triple(
            "http://example.org/hasSite",
            rdfs::range,
            Term::iri(xsd::string),
        )));
    }

    #[test]
    fn type_rule_missing_declaration_warns() {
        let doc: Document = [triple(
            "http://example.org/hasSite",
            rdfs::range,
            Term::iri("http://example.org/T"),
        )]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Type {
                from: "http://example.org/T".into(),
                to: "http://example.org/U".into(),
                kind: Some(PropertyKind::ObjectProperty),
            },
            continues: false,
        }];
        let (_, _, report) = run(&rules, &doc);
        assert_eq!(report.counters.warnings, 1);
    }

    #[test]
    fn type_rule_predicate_match_warns_without_firing() {
        let doc: Document = [triple(
            "http://x",
            "http://example.org/T",
            Term::iri("http://y"),
        )]
        .into_iter()
        .collect();
        let rules = [
            Rule {
                body: RuleBody::Type {
                    from: "http://example.org/T".into(),
                    to: "http://example.org/U".into(),
                    kind: None,
                },
                continues: false,
            },
            replace("http://y", Some("http://z"), "o"),
        ];
        let (acc, _, report) = run(&rules, &doc);
        assert_eq!(report.counters.warnings, 1);
        // reported not-fired, so the later replace still ran
        assert!(acc.changeset().unwrap().additions.contains(&triple(
            "http://x",
            "http://example.org/T",
            Term::iri("http://z"),
        )));
    }

    #[test]
    fn namespace_rewrites_all_matching_positions() {
        let doc: Document = [triple(
            "http://old.example/A",
            "http://old.example/p",
            Term::iri("http://other.example/B"),
        )]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Namespace {
                from: Some("http://old.example/".into()),
                to: Some("http://new.example/".into()),
                prefix: Some("new".into()),
                remove_prefix: None,
                dependencies: None,
            },
            continues: false,
        }];
        let (acc, ns, _) = run(&rules, &doc);
        let cs = acc.changeset().unwrap();
        assert!(cs.additions.contains(&triple(
            "http://new.example/A",
            "http://new.example/p",
            Term::iri("http://other.example/B"),
        )));
        assert_eq!(cs.additions.len(), 1);
        assert!(ns.suppressed().contains("http://old.example/"));
    }

    #[test]
    fn namespace_deletes_exact_import() {
        let doc: Document = [
            triple(
                "http://example.org/onto",
                owl::imports,
                Term::iri("http://old.example/"),
            ),
            triple(
                "http://example.org/onto",
                owl::imports,
                Term::iri("http://old.example/sub"),
            ),
        ]
        .into_iter()
        .collect();
        let rules = [Rule {
            body: RuleBody::Namespace {
                from: Some("http://old.example/".into()),
                to: Some("http://new.example/".into()),
                prefix: None,
                remove_prefix: None,
                dependencies: None,
            },
            continues: false,
        }];
        let (acc, _, _) = run(&rules, &doc);
        let cs = acc.changeset().unwrap();
        // the exact import is deleted outright, the other one rewritten
        assert_eq!(cs.removals.len(), 2);
        assert_eq!(cs.additions.len(), 1);
        assert!(cs.additions.contains(&triple(
            "http://example.org/onto",
            owl::imports,
            Term::iri("http://new.example/sub"),
        )));
    }
}
