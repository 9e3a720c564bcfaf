//! The run context: everything a refactoring run threads through its
//! calls, instead of global mutable state.

use std::path::PathBuf;

use rdfedit_io::Syntax;

use crate::report::Reporter;
use crate::rules::RuleSet;

/// One refactoring run: the loaded rules, the paths and options chosen on
/// the command line, and the reporter.
///
/// The rules are read-only after load; all per-document state lives in the
/// document pass itself, so nothing here prevents documents from being
/// processed in parallel except the single-writer reporter.
#[derive(Debug)]
pub struct RunContext {
    /// The loaded rule configuration.
    pub rules: RuleSet,
    /// The root of the source tree.
    pub source: PathBuf,
    /// Mirror output under this root instead of writing in place.
    pub destination: Option<PathBuf>,
    /// File extensions to process.
    pub extensions: Vec<String>,
    /// Suffix inserted before the extension of every output file
    /// (command-line override or the configuration's `changeSuffix`).
    pub change_suffix: Option<String>,
    /// Output syntax; `None` keeps each document's input syntax.
    pub format: Option<Syntax>,
    /// Log, script and counters.
    pub report: Reporter,
}

impl RunContext {
    /// A context with default options, useful for tests and embedding.
    pub fn new(rules: RuleSet, source: impl Into<PathBuf>, report: Reporter) -> RunContext {
        let change_suffix = rules.change_suffix.clone();
        RunContext {
            rules,
            source: source.into(),
            destination: None,
            extensions: vec![".rdf".to_string(), ".owl".to_string()],
            change_suffix,
            format: None,
            report,
        }
    }
}
