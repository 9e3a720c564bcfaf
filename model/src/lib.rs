//! A concrete, self-contained data model for tools that rewrite RDF graphs.
//!
//! I define [`Term`], [`Triple`] and [`Document`]:
//! a document is one source file's set of triples
//! together with its namespace-prefix bindings.
//! The [`ns`] module provides IRI constants for the vocabularies
//! a refactoring engine needs to recognize
//! (RDF, RDFS, XSD, OWL, Dublin Core terms, SKOS
//! and the OMG specification-metadata vocabulary).
//!
//! Terms are plain owned values with a total order,
//! so triple sets iterate deterministically
//! and can be diffed with ordinary set operations.
#![deny(missing_docs)]

pub mod document;
pub mod ns;
pub mod term;
pub mod triple;

pub use document::Document;
pub use term::Term;
pub use triple::Triple;
