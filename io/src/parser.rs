//! Parse Turtle and RDF/XML files into [`Document`]s,
//! keeping track of the prefix declarations and base IRI found on the way.

use std::fs;
use std::path::Path;

use rdfedit_model::{Document, Term, Triple};
use rio_api::model::{Literal, Subject, Term as RioTerm};
use rio_api::parser::TriplesParser;
use rio_turtle::TurtleParser;
use rio_xml::RdfXmlParser;

use crate::lazy_regex;
use crate::{Error, Syntax};

/// Parse the file at `path`, deriving the base IRI from its location.
pub fn parse_path(path: impl AsRef<Path>, syntax: Syntax) -> Result<Document, Error> {
    let path = path.as_ref();
    let src = fs::read_to_string(path)?;
    parse_str(&src, syntax, file_base_iri(path).as_deref())
}

/// Parse a complete document from a string.
///
/// `base` is used to resolve relative IRIs; a document can still override it
/// with its own `@base` directive or `xml:base` attribute.
pub fn parse_str(src: &str, syntax: Syntax, base: Option<&str>) -> Result<Document, Error> {
    match syntax {
        Syntax::Turtle => parse_turtle(src, base),
        Syntax::RdfXml => parse_rdf_xml(src, base),
    }
}

fn parse_turtle(src: &str, base: Option<&str>) -> Result<Document, Error> {
    let mut doc = Document::new();
    scan_turtle_prologue(src, &mut doc);
    let mut parser = TurtleParser::new(src.as_bytes(), parse_base(base)?);
    while !parser.is_end() {
        parser.parse_step(&mut |t| -> Result<(), Error> {
            doc.insert(convert_triple(&t)?);
            Ok(())
        })?;
    }
    Ok(doc)
}

fn parse_rdf_xml(src: &str, base: Option<&str>) -> Result<Document, Error> {
    let mut doc = Document::new();
    scan_xml_prologue(src, &mut doc);
    let mut parser = RdfXmlParser::new(src.as_bytes(), parse_base(base)?);
    while !parser.is_end() {
        parser.parse_step(&mut |t| -> Result<(), Error> {
            doc.insert(convert_triple(&t)?);
            Ok(())
        })?;
    }
    Ok(doc)
}

/// Record `@prefix`/`PREFIX` and `@base`/`BASE` directives.
///
/// The directives are also consumed by the Turtle parser itself; this scan
/// only keeps a copy so that they can be replayed at serialization time.
fn scan_turtle_prologue(src: &str, doc: &mut Document) {
    lazy_regex!(PREFIX_DECL = r"(?mi)^[ \t]*@?prefix[ \t]+([^\s:]*):[ \t]*<([^>]*)>");
    lazy_regex!(BASE_DECL = r"(?mi)^[ \t]*@?base[ \t]+<([^>]*)>");
    for cap in PREFIX_DECL.captures_iter(src) {
        doc.declare_prefix(&cap[1], &cap[2]);
    }
    if let Some(cap) = BASE_DECL.captures(src) {
        doc.set_base(&cap[1]);
    }
}

/// Record the `xmlns` bindings and `xml:base` of the document element.
///
/// Any malformed XML is left for the parser itself to report.
fn scan_xml_prologue(src: &str, doc: &mut Document) {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(src.as_bytes());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                for attr in e.attributes().flatten() {
                    let key = attr.key.into_inner();
                    let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) else {
                        continue;
                    };
                    if key == b"xml:base" {
                        doc.set_base(value.as_ref());
                    } else if key == b"xmlns" {
                        doc.declare_prefix("", value.as_ref());
                    } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                        if let Ok(prefix) = std::str::from_utf8(prefix) {
                            doc.declare_prefix(prefix, value.as_ref());
                        }
                    }
                }
                return;
            }
            Ok(Event::Eof) | Err(_) => return,
            _ => (),
        }
        buf.clear();
    }
}

fn parse_base(base: Option<&str>) -> Result<Option<oxiri::Iri<String>>, Error> {
    match base {
        None => Ok(None),
        Some(b) => oxiri::Iri::parse(b.to_string())
            .map(Some)
            .map_err(|_| Error::InvalidBaseIri(b.to_string())),
    }
}

fn file_base_iri(path: &Path) -> Option<String> {
    let abs = path.canonicalize().ok()?;
    Some(format!("file://{}", abs.display()).replace(' ', "%20"))
}

fn convert_triple(t: &rio_api::model::Triple) -> Result<Triple, Error> {
    Ok(Triple::new(
        convert_subject(&t.subject)?,
        Term::iri(t.predicate.iri),
        convert_term(&t.object)?,
    ))
}

fn convert_subject(s: &Subject) -> Result<Term, Error> {
    match s {
        Subject::NamedNode(n) => Ok(Term::iri(n.iri)),
        Subject::BlankNode(b) => Ok(Term::blank(b.id)),
        Subject::Triple(_) => Err(Error::QuotedTriple),
    }
}

fn convert_term(t: &RioTerm) -> Result<Term, Error> {
    match t {
        RioTerm::NamedNode(n) => Ok(Term::iri(n.iri)),
        RioTerm::BlankNode(b) => Ok(Term::blank(b.id)),
        RioTerm::Literal(l) => Ok(convert_literal(l)),
        RioTerm::Triple(_) => Err(Error::QuotedTriple),
    }
}

fn convert_literal(l: &Literal) -> Term {
    match l {
        Literal::Simple { value } => Term::literal(*value),
        Literal::LanguageTaggedString { value, language } => Term::literal_lang(*value, *language),
        Literal::Typed { value, datatype } => Term::literal_typed(*value, datatype.iri),
    }
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
