//! The `rdfedit` command line tool.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;

use rdfedit::report::{Noise, Reporter};
use rdfedit::rules::RuleSet;
use rdfedit::{driver, RunContext};
use rdfedit_io::Syntax;

/// A sample rule configuration, printed by `--example`.
const EXAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rules changeSuffix="_CHANGED" exclude="etc+About.rdf">
    <type from="https://example.org/fnd/Places/Site"
          to="http://www.w3.org/2001/XMLSchema#string" kind="DatatypeProperty" />
    <type from="https://example.org/fnd/Values/Percentage"
          to="https://example.org/fnd/Values/PercentageValue" kind="ObjectProperty" />
    <replace from="https://example.org/fnd/Roles/ThingInRole"
             to="https://example.org/fnd/Roles/EntityInRole" match="so" />
    <edit from="surface of the Earth" to="surface of a planet" />
    <delete from="https://example.org/fnd/Roles/DontCare" />
    <namespace from="https://example.org/fnd/Relations/"
               to="https://example.org/fnd/Context/" prefix="fnd-ctx" />
    <namespace to="http://www.omg.org/techprocess/ab/SpecificationMetadata/"
               prefix="sm" dependencies="adjust" />
</rules>
"#;

/// Apply batch refactoring rules to a tree of RDF/OWL documents.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// The XML rule configuration file
    #[arg(required_unless_present = "example")]
    rules: Option<PathBuf>,

    /// The root of the tree of documents to refactor
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Mirror output under this directory instead of writing in place
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// File extension to process (repeatable)
    #[arg(short, long = "extension", default_values = [".rdf", ".owl"])]
    extensions: Vec<String>,

    /// Override the configuration's change-suffix
    #[arg(short, long)]
    suffix: Option<String>,

    /// Change-log file (default: refactor-log.txt beside the rules file)
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Post-process command template; {} stands for the output path
    #[arg(short, long, default_value = r#"changed "{}""#)]
    command: String,

    /// Post-process script file (default: changed-files.sh beside the rules file)
    #[arg(short = 'b', long)]
    script: Option<PathBuf>,

    /// Output syntax (turtle or rdf-xml; default: same as input)
    #[arg(short, long, value_parser = parse_syntax)]
    format: Option<Syntax>,

    /// Log detail flags: t triples, r reads, d directories
    #[arg(short, long, default_value = "trd")]
    noise: String,

    /// Print an example rule configuration and exit
    #[arg(long)]
    example: bool,
}

fn parse_syntax(name: &str) -> Result<Syntax, String> {
    Syntax::from_name(name).ok_or_else(|| format!("unknown syntax {name:?} (turtle or rdf-xml)"))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.example {
        print!("{EXAMPLE}");
        return Ok(());
    }
    let rules_path = cli.rules.as_deref().expect("enforced by clap");
    let rules = RuleSet::load(rules_path)
        .with_context(|| format!("cannot load rules from {}", rules_path.display()))?;

    let beside_rules = |name: &str| rules_path.with_file_name(name);
    let log_path = cli.log.unwrap_or_else(|| beside_rules("refactor-log.txt"));
    let script_path = cli.script.unwrap_or_else(|| beside_rules("changed-files.sh"));
    let log = File::create(&log_path)
        .with_context(|| format!("cannot write change log {}", log_path.display()))?;
    let script = File::create(&script_path)
        .with_context(|| format!("cannot write script {}", script_path.display()))?;
    let mut report = Reporter::new(
        Box::new(BufWriter::new(log)),
        Box::new(BufWriter::new(script)),
        cli.command,
        Noise::parse(&cli.noise),
    );

    println!("Rules file: {}", rules_path.display());
    println!("Refactoring in: {}", cli.source.display());
    let start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    report.log_line(&format!("Time: {start}"))?;
    report.log_line(&format!("Refactor directory:  {}", cli.source.display()))?;
    report.log_line(&format!("Refactor rules file: {}", rules_path.display()))?;

    let mut ctx = RunContext::new(rules, cli.source, report);
    ctx.destination = cli.destination;
    ctx.extensions = cli.extensions;
    if cli.suffix.is_some() {
        ctx.change_suffix = cli.suffix;
    }
    ctx.format = cli.format;

    driver::refactor_tree(&mut ctx)?;

    let summary = ctx.report.summary();
    ctx.report.log_line(&summary)?;
    ctx.report.flush()?;
    println!("\n{summary}");
    println!("Post-process script in: {}", script_path.display());
    println!("Change log in: {}", log_path.display());
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
