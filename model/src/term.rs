//! I define [`Term`], the atomic value of the data model.

use std::fmt;

/// A single RDF term: a reference (IRI), a blank node, or a literal.
///
/// Every term has a *text*, returned by [`Term::text`]:
/// the IRI for references, the label for blank nodes,
/// and the lexical form for literals.
/// Refactoring rules match on text,
/// so a rule written against an IRI also matches a literal
/// spelling out the same characters — this mirrors how such rules
/// are written in practice (the author knows which one they mean).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A reference value, holding a full (expanded) IRI.
    Iri(Box<str>),
    /// A blank node, holding its label without the `_:` marker.
    Blank(Box<str>),
    /// A literal value.
    Literal {
        /// The lexical form.
        text: Box<str>,
        /// The datatype IRI, when one is explicit.
        ///
        /// Plain and language-tagged literals carry `None`.
        datatype: Option<Box<str>>,
        /// The language tag, for language-tagged strings.
        language: Option<Box<str>>,
    },
}

impl Term {
    /// Create a reference term from an IRI.
    pub fn iri(iri: impl Into<Box<str>>) -> Term {
        Term::Iri(iri.into())
    }

    /// Create a blank node term from a label (without the `_:` marker).
    pub fn blank(label: impl Into<Box<str>>) -> Term {
        Term::Blank(label.into())
    }

    /// Create a plain literal (no datatype, no language tag).
    pub fn literal(text: impl Into<Box<str>>) -> Term {
        Term::Literal {
            text: text.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a language-tagged literal.
    pub fn literal_lang(text: impl Into<Box<str>>, tag: impl Into<Box<str>>) -> Term {
        Term::Literal {
            text: text.into(),
            datatype: None,
            language: Some(tag.into()),
        }
    }

    /// Create a typed literal.
    pub fn literal_typed(text: impl Into<Box<str>>, datatype: impl Into<Box<str>>) -> Term {
        Term::Literal {
            text: text.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// The text of this term: IRI, blank node label, or lexical form.
    pub fn text(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::Blank(label) => label,
            Term::Literal { text, .. } => text,
        }
    }

    /// Whether this term is a reference.
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// The IRI of this term, if it is a reference.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Whether this term is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// The datatype IRI of this term, if it is a typed literal.
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Term::Literal { datatype, .. } => datatype.as_deref(),
            _ => None,
        }
    }

    /// The language tag of this term, if it is a language-tagged literal.
    pub fn language(&self) -> Option<&str> {
        match self {
            Term::Literal { language, .. } => language.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    /// N-Triples-like rendering, used by the change log.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal {
                text,
                datatype,
                language,
            } => {
                f.write_str("\"")?;
                for c in text.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        _ => fmt::Write::write_char(f, c)?,
                    }
                }
                f.write_str("\"")?;
                if let Some(tag) = language {
                    write!(f, "@{tag}")?;
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")?;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn text_of_each_kind() {
        assert_eq!(Term::iri("http://example.org/a").text(), "http://example.org/a");
        assert_eq!(Term::blank("b0").text(), "b0");
        assert_eq!(Term::literal("hello").text(), "hello");
        assert_eq!(Term::literal_lang("hello", "en").text(), "hello");
        assert_eq!(
            Term::literal_typed("42", "http://www.w3.org/2001/XMLSchema#integer").text(),
            "42"
        );
    }

    #[test]
    fn accessors() {
        let r = Term::iri("http://example.org/a");
        assert!(r.is_iri());
        assert_eq!(r.as_iri(), Some("http://example.org/a"));
        assert_eq!(r.datatype(), None);

        let l = Term::literal_lang("hello", "en");
        assert!(l.is_literal());
        assert_eq!(l.as_iri(), None);
        assert_eq!(l.language(), Some("en"));
        assert_eq!(l.datatype(), None);

        let t = Term::literal_typed("42", "http://www.w3.org/2001/XMLSchema#integer");
        assert_eq!(t.datatype(), Some("http://www.w3.org/2001/XMLSchema#integer"));
        assert_eq!(t.language(), None);
    }

    #[test_case(Term::iri("http://example.org/a"), "<http://example.org/a>"; "reference")]
    #[test_case(Term::blank("b0"), "_:b0"; "blank node")]
    #[test_case(Term::literal("hello"), "\"hello\""; "plain literal")]
    #[test_case(Term::literal_lang("hello", "en"), "\"hello\"@en"; "language tagged")]
    #[test_case(
        Term::literal_typed("42", "http://www.w3.org/2001/XMLSchema#integer"),
        "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>";
        "typed"
    )]
    #[test_case(Term::literal("line\nbreak \"quoted\""), "\"line\\nbreak \\\"quoted\\\"\""; "escaped")]
    fn display(term: Term, expected: &str) {
        assert_eq!(term.to_string(), expected);
    }

    #[test]
    fn equality_distinguishes_kind() {
        assert_ne!(Term::iri("x"), Term::literal("x"));
        assert_ne!(Term::literal("x"), Term::literal_lang("x", "en"));
        assert_ne!(
            Term::literal("x"),
            Term::literal_typed("x", "http://www.w3.org/2001/XMLSchema#string")
        );
        assert_eq!(Term::iri("x"), Term::iri("x"));
    }

    #[test]
    fn ordering_is_total_and_stable() {
        let mut terms = vec![
            Term::literal("b"),
            Term::iri("http://example.org/b"),
            Term::blank("z"),
            Term::iri("http://example.org/a"),
            Term::literal("a"),
        ];
        terms.sort();
        let sorted: Vec<_> = terms.iter().map(Term::text).collect();
        assert_eq!(sorted, ["http://example.org/a", "http://example.org/b", "z", "a", "b"]);
    }
}
