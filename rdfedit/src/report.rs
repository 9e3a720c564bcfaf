//! The run reporter: the user-facing change log, the post-process script,
//! the noise flags gating log detail, and the process-wide counters.
//!
//! The change log is an artifact of the run, written regardless of the
//! `log` crate's level; developer diagnostics go through `log` macros.

use std::io::{self, Write};

/// Which optional detail goes to the change log.
///
/// Parsed from a flag string: `t` dumps added/removed triples per changed
/// document, `r` logs every file read, `d` logs every directory visited.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Noise {
    /// Dump the added and removed triples of every changed document.
    pub triples: bool,
    /// Log every file read.
    pub reads: bool,
    /// Log every directory visited.
    pub dirs: bool,
}

impl Noise {
    /// Scan `flags` for the letters `t`, `r` and `d`.
    pub fn parse(flags: &str) -> Noise {
        Noise {
            triples: flags.contains('t'),
            reads: flags.contains('r'),
            dirs: flags.contains('d'),
        }
    }
}

impl Default for Noise {
    fn default() -> Noise {
        Noise::parse("trd")
    }
}

/// Process-wide counters, monotonically increasing over a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counters {
    /// Documents parsed.
    pub files_scanned: u64,
    /// Documents written back.
    pub files_changed: u64,
    /// Rule fires over all written documents.
    pub total_changes: u64,
    /// Warnings recorded.
    pub warnings: u64,
}

/// The two append-only output streams of a run plus its counters.
pub struct Reporter {
    log: Box<dyn Write>,
    script: Box<dyn Write>,
    command: String,
    /// Log detail flags.
    pub noise: Noise,
    /// Run counters.
    pub counters: Counters,
}

impl Reporter {
    /// Build a reporter writing the change log to `log` and the
    /// post-process script to `script`; `command` is the script line
    /// template, with `{}` standing for the output path.
    pub fn new(
        log: Box<dyn Write>,
        script: Box<dyn Write>,
        command: impl Into<String>,
        noise: Noise,
    ) -> Reporter {
        Reporter {
            log,
            script,
            command: command.into(),
            noise,
            counters: Counters::default(),
        }
    }

    /// A reporter that discards both streams; counters still accumulate.
    pub fn quiet() -> Reporter {
        Reporter::new(
            Box::new(io::sink()),
            Box::new(io::sink()),
            "changed \"{}\"",
            Noise::default(),
        )
    }

    /// Append one line to the change log.
    pub fn log_line(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.log, "{message}")
    }

    /// Record a warning: counted, logged, never fatal.
    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        self.counters.warnings += 1;
        log::warn!("{message}");
        writeln!(self.log, "----Warning {message}")
    }

    /// Append one templated command invocation to the post-process script.
    pub fn script_entry(&mut self, output_path: &str) -> io::Result<()> {
        writeln!(self.script, "{}", self.command.replace("{}", output_path))
    }

    /// The final summary line, valid at any point of the run.
    pub fn summary(&self) -> String {
        let c = self.counters;
        format!(
            "Refactor complete with {} changes and {} warnings in {} files of {} files scanned.",
            c.total_changes, c.warnings, c.files_changed, c.files_scanned
        )
    }

    /// Flush both streams.
    pub fn flush(&mut self) -> io::Result<()> {
        self.log.flush()?;
        self.script.flush()
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("command", &self.command)
            .field("noise", &self.noise)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
