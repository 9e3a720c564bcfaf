//! The document driver: one full pass over one document, and the
//! filesystem wrappers processing a single path or a whole tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rdfedit_io::{serialize, Syntax, WriterConfig};
use rdfedit_model::ns::owl;
use rdfedit_model::{Document, Triple};

use crate::changeset::Accumulator;
use crate::context::RunContext;
use crate::engine;
use crate::namespaces::NamespaceState;
use crate::report::Reporter;
use crate::rules::RuleSet;
use crate::{walk, Error};

/// What a changed document pass produced, beyond the document itself.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// Rule fires during the pass.
    pub changes: u64,
    /// Warnings recorded during the pass.
    pub warnings: u64,
    /// Prefix bindings for output: the parsed ones overlaid with the
    /// registered, non-suppressed namespaces.
    pub bindings: BTreeMap<String, String>,
    /// Namespaces to omit from output declarations.
    pub suppress: BTreeSet<String>,
    /// The base IRI for output, normally the ontology URI.
    pub base: Option<String>,
    /// The triples added, for the change-log dump.
    pub added: BTreeSet<Triple>,
    /// The triples removed, for the change-log dump.
    pub removed: BTreeSet<Triple>,
}

/// Apply `rules` to `doc` in place.
///
/// Returns `None` when the document ends up unchanged (and needs no
/// rewrite), `Some` with the serialization parameters otherwise. Rules run
/// against the pre-pass triples only; the computed diff is applied at the
/// end of the pass.
pub fn transform(
    rules: &RuleSet,
    doc: &mut Document,
    name: &str,
    report: &mut Reporter,
) -> io::Result<Option<Outcome>> {
    let warnings_before = report.counters.warnings;
    let mut acc = Accumulator::new();
    let mut ns = NamespaceState::new();

    for t in doc.triples() {
        engine::apply_rules(&rules.rules, doc, t, &mut acc, &mut ns, report, name)?;
    }
    for rule in &rules.rules {
        ns.apply_ontology_rule(rule, doc, &mut acc, report, name)?;
    }
    let mut base = None;
    if acc.changed() || ns.force_output() {
        base = ns.recompute(doc, &mut acc, report, name)?;
    }
    acc.normalize(doc);

    if acc.is_net_empty() && !ns.pending_removal() && !ns.force_output() {
        return Ok(None);
    }

    let (added, removed) = match acc.changeset() {
        Some(cs) => (cs.additions.clone(), cs.removals.clone()),
        None => Default::default(),
    };
    acc.apply(doc);

    let mut bindings = doc.prefixes().clone();
    for (prefix, namespace) in ns.output_bindings() {
        bindings.insert(prefix.to_string(), namespace.to_string());
    }
    let base = base
        .or_else(|| doc.first_subject_of_type(owl::Ontology).map(|s| s.text().to_string()))
        .or_else(|| doc.base().map(str::to_string));

    Ok(Some(Outcome {
        changes: acc.fires(),
        warnings: report.counters.warnings - warnings_before,
        bindings,
        suppress: ns.suppressed().clone(),
        base,
        added,
        removed,
    }))
}

/// Refactor the single document at `src`, writing to `dest` (or in place)
/// when it changes. Returns the number of rule fires.
pub fn refactor_path(ctx: &mut RunContext, src: &Path, dest: Option<&Path>) -> Result<u64, Error> {
    let syntax = src
        .extension()
        .and_then(|e| e.to_str())
        .and_then(Syntax::from_extension)
        .unwrap_or(Syntax::RdfXml);

    log::info!("parsing {}", src.display());
    if ctx.report.noise.reads {
        ctx.report.log_line(&format!("Read: {}", src.display()))?;
    }
    let mut doc = rdfedit_io::parse_path(src, syntax).map_err(|source| Error::Parse {
        path: src.display().to_string(),
        source,
    })?;
    ctx.report.counters.files_scanned += 1;

    let name = src.display().to_string();
    let Some(outcome) = transform(&ctx.rules, &mut doc, &name, &mut ctx.report)? else {
        return Ok(0);
    };

    let out_path = output_path(dest.unwrap_or(src), ctx.change_suffix.as_deref());
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let out_syntax = ctx.format.unwrap_or(syntax);
    let mut config = WriterConfig::new()
        .with_prefixes(outcome.bindings.clone())
        .with_suppressed(outcome.suppress.clone());
    if let Some(base) = &outcome.base {
        config = config.with_base(base.clone());
    }
    let mut out = BufWriter::new(File::create(&out_path).map_err(|source| Error::Write {
        path: out_path.display().to_string(),
        source: source.into(),
    })?);
    serialize(&doc, out_syntax, &config, &mut out).map_err(|source| Error::Write {
        path: out_path.display().to_string(),
        source,
    })?;
    out.flush()?;

    ctx.report.counters.files_changed += 1;
    ctx.report.counters.total_changes += outcome.changes;
    let made = format!(
        "Made {} changes with {} warnings in: {}",
        outcome.changes,
        outcome.warnings,
        out_path.display()
    );
    log::info!("{made}");
    println!("+{made}");
    ctx.report.log_line(&made)?;
    ctx.report.script_entry(&out_path.display().to_string())?;

    if ctx.report.noise.triples {
        ctx.report.log_line("\n-------------added triples---------------")?;
        for t in &outcome.added {
            ctx.report.log_line(&t.to_string())?;
        }
        ctx.report.log_line("\n-------------removed triples-------------")?;
        for t in &outcome.removed {
            ctx.report.log_line(&t.to_string())?;
        }
        ctx.report.log_line("\n-----------------------------------------\n")?;
    }
    Ok(outcome.changes)
}

/// Refactor every selected document under the context's source root.
pub fn refactor_tree(ctx: &mut RunContext) -> Result<(), Error> {
    let source = ctx.source.clone();
    let suffix = ctx.change_suffix.clone();
    for entry in walk::walk(&source, &ctx.rules.exclude) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            if ctx.report.noise.dirs {
                ctx.report
                    .log_line(&format!("Directory: {}", entry.path().display()))?;
            }
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !walk::selects(&name, &ctx.extensions, suffix.as_deref()) {
            continue;
        }
        let dest = ctx.destination.as_ref().map(|d| {
            let rel = entry.path().strip_prefix(&source).unwrap_or_else(|_| entry.path());
            d.join(rel)
        });
        refactor_path(ctx, entry.path(), dest.as_deref())?;
    }
    Ok(())
}

/// Insert the change-suffix before the file extension, if one is set.
fn output_path(path: &Path, change_suffix: Option<&str>) -> PathBuf {
    let Some(suffix) = change_suffix else {
        return path.to_path_buf();
    };
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let new_name = match name.rfind('.') {
        Some(dot) => format!("{}{}{}", &name[..dot], suffix, &name[dot..]),
        None => format!("{name}{suffix}"),
    };
    path.with_file_name(new_name)
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("dir/Agents.rdf", None, "dir/Agents.rdf")]
    #[test_case("dir/Agents.rdf", Some("_CHANGED"), "dir/Agents_CHANGED.rdf")]
    #[test_case("Agents.tar.rdf", Some("_X"), "Agents.tar_X.rdf")]
    #[test_case("noext", Some("_X"), "noext_X")]
    fn output_paths(path: &str, suffix: Option<&str>, expected: &str) {
        assert_eq!(
            output_path(Path::new(path), suffix),
            PathBuf::from(expected)
        );
    }
}
