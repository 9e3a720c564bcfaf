//! Parsers and serializers for the RDF concrete syntaxes handled by the
//! refactoring tool, based on [`rio_turtle`](https://docs.rs/rio_turtle/)
//! and [`rio_xml`](https://docs.rs/rio_xml/).

pub mod parser;

pub mod serializer;

pub use parser::{parse_path, parse_str};
pub use serializer::{serialize, serialize_to_string, WriterConfig};

/// Define a lazily-compiled [`regex::Regex`] as a static variable.
macro_rules! lazy_regex {
    ($name:ident = $re:expr) => {
        lazy_static::lazy_static! {
            static ref $name: regex::Regex = regex::Regex::new($re).unwrap();
        }
    };
}
pub(crate) use lazy_regex;

/// A concrete RDF syntax.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Syntax {
    /// The [Turtle](https://www.w3.org/TR/turtle/) syntax.
    Turtle,
    /// The [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/) syntax.
    RdfXml,
}

impl Syntax {
    /// Guess the syntax from a file extension (leading dot accepted).
    pub fn from_extension(ext: &str) -> Option<Syntax> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "ttl" | "turtle" => Some(Syntax::Turtle),
            "owl" | "rdf" | "xml" => Some(Syntax::RdfXml),
            _ => None,
        }
    }

    /// Resolve a syntax name as given on the command line.
    pub fn from_name(name: &str) -> Option<Syntax> {
        match name.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Some(Syntax::Turtle),
            "rdf-xml" | "rdfxml" | "xml" => Some(Syntax::RdfXml),
            _ => None,
        }
    }
}

/// Any error which can be raised while reading or writing an RDF document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Syntax error reported by the Turtle parser
    #[error("{0}")]
    Turtle(#[from] rio_turtle::TurtleError),
    /// Syntax error reported by the RDF/XML parser
    #[error("{0}")]
    RdfXml(#[from] rio_xml::RdfXmlError),
    /// The base IRI could not be parsed
    #[error("invalid base IRI: {0:?}")]
    InvalidBaseIri(String),
    /// The document contains a quoted triple, which this tool does not handle
    #[error("quoted triples are not supported")]
    QuotedTriple,
    /// The IRI cannot be split into a namespace and a valid XML name
    #[error("cannot write {0:?} as an XML qualified name")]
    XmlName(String),
    /// A literal was found in subject position
    #[error("cannot serialize a literal in subject position")]
    LiteralSubject,
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("ttl", Some(Syntax::Turtle))]
    #[test_case(".ttl", Some(Syntax::Turtle); "dotted ttl")]
    #[test_case("owl", Some(Syntax::RdfXml))]
    #[test_case(".RDF", Some(Syntax::RdfXml))]
    #[test_case("xml", Some(Syntax::RdfXml))]
    #[test_case("jsonld", None)]
    fn from_extension(ext: &str, expected: Option<Syntax>) {
        assert_eq!(Syntax::from_extension(ext), expected);
    }

    #[test_case("turtle", Some(Syntax::Turtle))]
    #[test_case("rdf-xml", Some(Syntax::RdfXml))]
    #[test_case("RDFXML", Some(Syntax::RdfXml))]
    #[test_case("n3", None)]
    fn from_name(name: &str, expected: Option<Syntax>) {
        assert_eq!(Syntax::from_name(name), expected);
    }
}
