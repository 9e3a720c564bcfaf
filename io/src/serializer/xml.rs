//! An RDF/XML writer: one `rdf:Description` element per subject, with the
//! namespace declarations of the root element restricted to the bindings
//! not in the suppression set.
//!
//! Predicates must be written as qualified names. When no usable binding
//! covers a predicate's namespace, a prefix `nsN` is generated for it:
//! declared on the root element, or inline on the property element when the
//! namespace is suppressed (so that it still does not appear in the root
//! declarations).

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use rdfedit_model::ns::rdf;
use rdfedit_model::{Document, Term};

use super::WriterConfig;
use crate::Error;

pub(crate) fn write_document<W: Write>(
    doc: &Document,
    config: &WriterConfig,
    w: &mut W,
) -> Result<(), Error> {
    let qnames = assign_qnames(doc, config)?;

    w.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    w.write_all(b"<rdf:RDF")?;
    if let Some(base) = &config.base {
        w.write_all(b"\n   xml:base=")?;
        write_attr(w, base)?;
    }
    for (prefix, ns) in &qnames.root_decls {
        if prefix.is_empty() {
            w.write_all(b"\n   xmlns=")?;
        } else {
            write!(w, "\n   xmlns:{prefix}=")?;
        }
        write_attr(w, ns)?;
    }
    w.write_all(b"\n>\n")?;

    let mut prev_subject: Option<&Term> = None;
    for t in doc.triples() {
        if prev_subject != Some(&t.s) {
            if prev_subject.is_some() {
                w.write_all(b"  </rdf:Description>\n")?;
            }
            match &t.s {
                Term::Iri(iri) => {
                    w.write_all(b"  <rdf:Description rdf:about=")?;
                    write_attr(w, iri)?;
                }
                Term::Blank(label) => {
                    w.write_all(b"  <rdf:Description rdf:nodeID=")?;
                    write_attr(w, label)?;
                }
                Term::Literal { .. } => return Err(Error::LiteralSubject),
            }
            w.write_all(b">\n")?;
            prev_subject = Some(&t.s);
        }
        write_property(w, t.p.text(), &t.o, &qnames)?;
    }
    if prev_subject.is_some() {
        w.write_all(b"  </rdf:Description>\n")?;
    }
    w.write_all(b"</rdf:RDF>\n")?;
    Ok(())
}

fn write_property<W: Write>(
    w: &mut W,
    p_iri: &str,
    o: &Term,
    qnames: &QNames,
) -> Result<(), Error> {
    let (prefix, local) = qnames.get(p_iri);
    let tag = if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    };
    write!(w, "    <{tag}")?;
    if let Some(ns) = qnames.inline_decls.get(prefix) {
        write!(w, " xmlns:{prefix}=")?;
        write_attr(w, ns)?;
    }
    match o {
        Term::Iri(iri) => {
            w.write_all(b" rdf:resource=")?;
            write_attr(w, iri)?;
            w.write_all(b"/>\n")?;
        }
        Term::Blank(label) => {
            w.write_all(b" rdf:nodeID=")?;
            write_attr(w, label)?;
            w.write_all(b"/>\n")?;
        }
        Term::Literal {
            text,
            datatype,
            language,
        } => {
            if let Some(lang) = language {
                w.write_all(b" xml:lang=")?;
                write_attr(w, lang)?;
            } else if let Some(dt) = datatype {
                w.write_all(b" rdf:datatype=")?;
                write_attr(w, dt)?;
            }
            w.write_all(b">")?;
            write_text(w, text)?;
            writeln!(w, "</{tag}>")?;
        }
    }
    Ok(())
}

/// The qualified names chosen for every predicate of the document.
struct QNames {
    /// predicate IRI → (prefix, local name)
    by_iri: BTreeMap<String, (String, String)>,
    /// prefix → namespace, declared on the root element
    root_decls: BTreeMap<String, String>,
    /// prefix → namespace, declared inline where used (suppressed namespaces)
    inline_decls: BTreeMap<String, String>,
}

impl QNames {
    fn get(&self, iri: &str) -> (&str, &str) {
        let (prefix, local) = &self.by_iri[iri];
        (prefix, local)
    }
}

/// Choose a qualified name for every predicate, generating prefixes where
/// the configured bindings leave a predicate's namespace uncovered.
fn assign_qnames(doc: &Document, config: &WriterConfig) -> Result<QNames, Error> {
    // Bindings usable for qualified names: the configured ones minus the
    // suppressed namespaces, with rdf: pinned to its standard namespace.
    let mut root_decls: BTreeMap<String, String> = config
        .prefixes
        .iter()
        .filter(|(p, ns)| !config.suppress.contains(*ns) && p.as_str() != "rdf")
        .map(|(p, ns)| (p.clone(), ns.clone()))
        .collect();
    root_decls.insert("rdf".to_string(), rdf::PREFIX.to_string());

    let by_ns: BTreeMap<&str, &str> = root_decls
        .iter()
        .map(|(p, ns)| (ns.as_str(), p.as_str()))
        .collect();
    // namespace → generated prefix, shared by all predicates in it
    let mut generated: BTreeMap<String, String> = BTreeMap::new();
    let mut by_iri = BTreeMap::new();
    let mut counter = 0;

    let predicates: BTreeSet<&str> = doc.triples().map(|t| t.p.text()).collect();
    for iri in predicates {
        let (ns, local) = match declared_split(iri, &by_ns) {
            Some(split) => split,
            None => split_iri(iri).ok_or_else(|| Error::XmlName(iri.to_string()))?,
        };
        let prefix = match (by_ns.get(ns), generated.get(ns)) {
            (Some(prefix), _) => prefix.to_string(),
            (None, Some(prefix)) => prefix.clone(),
            (None, None) => {
                counter += 1;
                let mut prefix = format!("ns{counter}");
                while root_decls.contains_key(&prefix) {
                    counter += 1;
                    prefix = format!("ns{counter}");
                }
                generated.insert(ns.to_string(), prefix.clone());
                prefix
            }
        };
        by_iri.insert(iri.to_string(), (prefix, local.to_string()));
    }

    // Suppressed namespaces are declared where used, the rest on the root.
    let mut inline_decls = BTreeMap::new();
    for (ns, prefix) in generated {
        if config.suppress.contains(&ns) {
            inline_decls.insert(prefix, ns);
        } else {
            root_decls.insert(prefix, ns);
        }
    }

    Ok(QNames {
        by_iri,
        root_decls,
        inline_decls,
    })
}

/// Split `iri` on the longest declared namespace leaving a valid local name.
fn declared_split<'a>(
    iri: &'a str,
    by_ns: &BTreeMap<&'a str, &str>,
) -> Option<(&'a str, &'a str)> {
    let mut best: Option<(&str, &str)> = None;
    for ns in by_ns.keys() {
        if let Some(local) = iri.strip_prefix(ns) {
            if is_xml_name(local) && best.map_or(true, |(b, _)| ns.len() > b.len()) {
                best = Some((&iri[..ns.len()], local));
            }
        }
    }
    best
}

/// Split `iri` into a namespace and the longest valid XML name suffix.
fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let mut split = None;
    for (i, c) in iri.char_indices().rev() {
        if !is_name_char(c) {
            break;
        }
        if is_name_start(c) && i > 0 {
            split = Some(i);
        }
    }
    split.map(|i| (&iri[..i], &iri[i..]))
}

// Conservative (ASCII-only) XML name characters; anything beyond that is
// written with a generated prefix closer to the fragment boundary, or
// rejected.
fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_xml_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => chars.all(is_name_char),
        _ => false,
    }
}

fn write_attr<W: Write>(w: &mut W, value: &str) -> io::Result<()> {
    w.write_all(b"\"")?;
    let mut buf = [0u8; 4];
    for c in value.chars() {
        match c {
            '&' => w.write_all(b"&amp;")?,
            '<' => w.write_all(b"&lt;")?,
            '>' => w.write_all(b"&gt;")?,
            '"' => w.write_all(b"&quot;")?,
            '\n' => w.write_all(b"&#10;")?,
            '\r' => w.write_all(b"&#13;")?,
            '\t' => w.write_all(b"&#9;")?,
            c => w.write_all(c.encode_utf8(&mut buf).as_bytes())?,
        }
    }
    w.write_all(b"\"")
}

fn write_text<W: Write>(w: &mut W, text: &str) -> io::Result<()> {
    let mut buf = [0u8; 4];
    for c in text.chars() {
        match c {
            '&' => w.write_all(b"&amp;")?,
            '<' => w.write_all(b"&lt;")?,
            '>' => w.write_all(b"&gt;")?,
            '\r' => w.write_all(b"&#13;")?,
            c => w.write_all(c.encode_utf8(&mut buf).as_bytes())?,
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
