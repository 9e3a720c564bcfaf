//! A Turtle writer: prefix block first, then triples grouped by subject,
//! with predicate and object lists factored.
//!
//! Only the prefixes actually used by some term are declared, so namespaces
//! refactored away do not linger in the output.

use std::collections::BTreeSet;
use std::io::{self, Write};

use rdfedit_model::ns::rdf;
use rdfedit_model::{Document, Term, Triple};

use super::WriterConfig;
use crate::lazy_regex;
use crate::Error;

pub(crate) fn write_document<W: Write>(
    doc: &Document,
    config: &WriterConfig,
    w: &mut W,
) -> Result<(), Error> {
    let bindings: Vec<(&str, &str)> = config
        .prefixes
        .iter()
        .filter(|(_, ns)| !config.suppress.contains(*ns))
        .map(|(p, ns)| (p.as_str(), ns.as_str()))
        .collect();
    let used = used_namespaces(doc, &bindings);

    if let Some(base) = &config.base {
        writeln!(w, "@base <{base}> .")?;
    }
    for (prefix, ns) in &bindings {
        if used.contains(ns) {
            writeln!(w, "@prefix {prefix}: <{ns}> .")?;
        }
    }
    if (config.base.is_some() || !used.is_empty()) && !doc.is_empty() {
        writeln!(w)?;
    }

    let mut prev: Option<&Triple> = None;
    for t in doc.triples() {
        if matches!(t.s, Term::Literal { .. }) {
            return Err(Error::LiteralSubject);
        }
        match prev {
            Some(p) if p.s == t.s && p.p == t.p => {
                w.write_all(b" ,\n        ")?;
                write_term(w, &t.o, &bindings)?;
            }
            Some(p) if p.s == t.s => {
                w.write_all(b" ;\n    ")?;
                write_predicate(w, &t.p, &bindings)?;
                w.write_all(b" ")?;
                write_term(w, &t.o, &bindings)?;
            }
            _ => {
                if prev.is_some() {
                    w.write_all(b" .\n\n")?;
                }
                write_term(w, &t.s, &bindings)?;
                w.write_all(b" ")?;
                write_predicate(w, &t.p, &bindings)?;
                w.write_all(b" ")?;
                write_term(w, &t.o, &bindings)?;
            }
        }
        prev = Some(t);
    }
    if prev.is_some() {
        w.write_all(b" .\n")?;
    }
    Ok(())
}

/// The namespaces of the bindings that the writer will actually use.
fn used_namespaces<'a>(doc: &Document, bindings: &'a [(&'a str, &'a str)]) -> BTreeSet<&'a str> {
    let mut used = BTreeSet::new();
    for t in doc.triples() {
        if let Term::Iri(iri) = &t.s {
            mark(iri, bindings, &mut used);
        }
        if let Term::Iri(iri) = &t.p {
            // rdf:type is written as 'a', which needs no prefix
            if t.p.as_iri() != Some(rdf::type_) {
                mark(iri, bindings, &mut used);
            }
        }
        match &t.o {
            Term::Iri(iri) => mark(iri, bindings, &mut used),
            Term::Literal {
                datatype: Some(dt),
                language: None,
                ..
            } => mark(dt, bindings, &mut used),
            _ => (),
        }
    }
    used
}

fn mark<'a>(iri: &str, bindings: &'a [(&'a str, &'a str)], used: &mut BTreeSet<&'a str>) {
    if let Some((_, ns, _)) = choose_prefixed(iri, bindings) {
        used.insert(ns);
    }
}

fn write_predicate<W: Write>(w: &mut W, p: &Term, bindings: &[(&str, &str)]) -> io::Result<()> {
    if p.as_iri() == Some(rdf::type_) {
        w.write_all(b"a")
    } else {
        write_term(w, p, bindings)
    }
}

fn write_term<W: Write>(w: &mut W, t: &Term, bindings: &[(&str, &str)]) -> io::Result<()> {
    match t {
        Term::Iri(iri) => write_iri(w, iri, bindings),
        Term::Blank(label) => write!(w, "_:{label}"),
        Term::Literal {
            text,
            datatype,
            language,
        } => {
            w.write_all(b"\"")?;
            write_quoted(w, text)?;
            w.write_all(b"\"")?;
            if let Some(lang) = language {
                write!(w, "@{lang}")
            } else if let Some(dt) = datatype {
                w.write_all(b"^^")?;
                write_iri(w, dt, bindings)
            } else {
                Ok(())
            }
        }
    }
}

fn write_iri<W: Write>(w: &mut W, iri: &str, bindings: &[(&str, &str)]) -> io::Result<()> {
    match choose_prefixed(iri, bindings) {
        Some((prefix, _, local)) => write!(w, "{prefix}:{local}"),
        None => write!(w, "<{iri}>"),
    }
}

/// Find the binding with the longest namespace which is a prefix of `iri`
/// and leaves a local name Turtle can write without escaping.
fn choose_prefixed<'a, 'b>(
    iri: &'b str,
    bindings: &'a [(&'a str, &'a str)],
) -> Option<(&'a str, &'a str, &'b str)> {
    let mut best: Option<(&'a str, &'a str, &'b str)> = None;
    for &(prefix, ns) in bindings {
        if let Some(local) = iri.strip_prefix(ns) {
            if !local.is_empty()
                && PN_LOCAL.is_match(local)
                && best.map_or(true, |(_, b, _)| ns.len() > b.len())
            {
                best = Some((prefix, ns, local));
            }
        }
    }
    best
}

fn write_quoted<W: Write>(w: &mut W, text: &str) -> io::Result<()> {
    let mut buf = [0u8; 4];
    for c in text.chars() {
        match c {
            '"' => w.write_all(b"\\\"")?,
            '\\' => w.write_all(b"\\\\")?,
            '\n' => w.write_all(b"\\n")?,
            '\r' => w.write_all(b"\\r")?,
            '\t' => w.write_all(b"\\t")?,
            c if (c as u32) < 0x20 || c == '\u{7f}' => write!(w, "\\u{:04X}", c as u32)?,
            c => w.write_all(c.encode_utf8(&mut buf).as_bytes())?,
        }
    }
    Ok(())
}

// Raw IRI suffixes never contain backslashes, so the PN_LOCAL_ESC
// alternative of the grammar is left out: a suffix needing it is written
// as a full IRI instead.
lazy_regex!(
    PN_LOCAL = r"(?x)^
    #(PN_CHARS_U | ':' | [0-9] | PERCENT)
    (
        [A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\u{10000}-\u{EFFFF}_:0-9]
        | % [0-9A-Fa-f]{2}
    )
    # ((PN_CHARS | '.' | ':' | PERCENT)* (PN_CHARS | ':' | PERCENT))?
    (
        (
            [A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\u{10000}-\u{EFFFF}_0-9\u{00B7}\u{0300}-\u{036F}\u{203F}-\u{2040}.:-]
            | % [0-9A-Fa-f]{2}
        )*
        (
            [A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\u{10000}-\u{EFFFF}_0-9\u{00B7}\u{0300}-\u{036F}\u{203F}-\u{2040}:-]
            | % [0-9A-Fa-f]{2}
        )
    )?
$"
);

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
