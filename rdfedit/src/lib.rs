//! Batch refactoring of RDF/OWL document trees.
//!
//! A run loads an XML rule configuration ([`rules::RuleSet`]), walks a
//! source tree for RDF documents, applies the rules to every triple of
//! every document ([`engine`]), reconciles namespace declarations and
//! `owl:imports` statements with the result ([`namespaces`]), and writes
//! back only the documents that actually changed ([`driver`]).

pub mod changeset;
pub mod context;
pub mod driver;
pub mod engine;
pub mod namespaces;
pub mod report;
pub mod rules;
pub mod walk;

pub use context::RunContext;
pub use driver::{refactor_path, refactor_tree, transform, Outcome};
pub use report::{Counters, Noise, Reporter};
pub use rules::{Rule, RuleSet};

/// Any error which can abort a refactoring run.
///
/// Malformed documents and unresolvable rule situations are reported as
/// warnings and do not raise this; only configuration, I/O and syntax
/// errors do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the log, the script, or an output file
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A source document could not be parsed
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        source: rdfedit_io::Error,
    },
    /// An output document could not be written
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        source: rdfedit_io::Error,
    },
    /// The source tree could not be traversed
    #[error("{0}")]
    Walk(#[from] walkdir::Error),
}
