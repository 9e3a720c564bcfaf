//! Write [`Document`]s back to Turtle or RDF/XML.

mod turtle;
mod xml;

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use rdfedit_model::Document;

use crate::{Error, Syntax};

/// Serializer configuration.
///
/// It carries the prefix bindings to declare, an optional base IRI to
/// announce in the output, and a set of namespaces which must not be
/// declared even if a binding exists for them.
#[derive(Clone, Debug, Default)]
pub struct WriterConfig {
    pub(crate) prefixes: BTreeMap<String, String>,
    pub(crate) base: Option<String>,
    pub(crate) suppress: BTreeSet<String>,
}

impl WriterConfig {
    /// Build a new default [`WriterConfig`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Transform a [`WriterConfig`] by setting the prefix bindings
    /// (prefix to namespace IRI; the empty prefix is the default namespace).
    pub fn with_prefixes(mut self, prefixes: BTreeMap<String, String>) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Transform a [`WriterConfig`] by setting the base IRI,
    /// written as `@base` in Turtle and `xml:base` in RDF/XML.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Transform a [`WriterConfig`] by setting the namespaces to suppress.
    pub fn with_suppressed(mut self, suppress: BTreeSet<String>) -> Self {
        self.suppress = suppress;
        self
    }
}

/// Serialize `doc` in the given syntax.
pub fn serialize<W: io::Write>(
    doc: &Document,
    syntax: Syntax,
    config: &WriterConfig,
    w: &mut W,
) -> Result<(), Error> {
    match syntax {
        Syntax::Turtle => turtle::write_document(doc, config, w),
        Syntax::RdfXml => xml::write_document(doc, config, w),
    }
}

/// Serialize `doc` to a string.
pub fn serialize_to_string(
    doc: &Document,
    syntax: Syntax,
    config: &WriterConfig,
) -> Result<String, Error> {
    let mut buf = Vec::new();
    serialize(doc, syntax, config, &mut buf)?;
    Ok(String::from_utf8(buf).expect("serializers only write UTF-8"))
}
