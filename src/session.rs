//! Line-oriented driver around parse, eval and print.
//!
//! A [`Session`] owns its own [`Environment`], so independent sessions never
//! observe each other's bindings. Input is consumed one line at a time: lines
//! starting with the comment prefix and blank lines are skipped, every other
//! line is parsed as exactly one expression (anything after it is ignored)
//! and evaluated. Each result is written as `=> <value>`.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use log::{debug, trace};

use crate::Error;
use crate::ast::Value;
use crate::environment::Environment;
use crate::evaluator::{create_global_env, eval};
use crate::parser::parse_prefix;

/// What a run does after a line fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Report the error and stop reading input
    #[default]
    Abort,
    /// Report the error and carry on with the next line
    Continue,
}

/// Configuration for a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub error_policy: ErrorPolicy,
    /// Lines whose first character is this one are skipped
    pub comment_prefix: char,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            error_policy: ErrorPolicy::Abort,
            comment_prefix: ';',
        }
    }
}

/// Summary of a finished [`Session::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All input was consumed; `evaluated` counts failed lines too
    Completed { evaluated: usize, failed: usize },
    /// Stopped at the 1-based `line` because of `error`
    Aborted { line: usize, error: Error },
}

impl RunOutcome {
    /// True when every evaluated line succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { failed: 0, .. })
    }
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    env: Environment,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            config,
            env: create_global_env(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// True for comment lines and lines holding only whitespace.
    pub fn is_skipped(&self, line: &str) -> bool {
        line.starts_with(self.config.comment_prefix) || line.trim().is_empty()
    }

    /// Evaluate a single line. Skipped lines produce `Ok(None)`.
    pub fn eval_line(&self, line: &str) -> Result<Option<Value>, Error> {
        if self.is_skipped(line) {
            trace!("skipping line {line:?}");
            return Ok(None);
        }

        let (expr, rest) = parse_prefix(line)?;
        let rest = rest.trim();
        if !rest.is_empty() {
            debug!("ignoring trailing input {rest:?}");
        }

        trace!("eval {expr}");
        eval(&expr, &self.env).map(Some)
    }

    /// True when the raw bytes of a line start with the comment prefix.
    fn is_comment(&self, line: &[u8]) -> bool {
        let mut prefix = [0u8; 4];
        line.starts_with(self.config.comment_prefix.encode_utf8(&mut prefix).as_bytes())
    }

    /// Evaluate `input` line by line, writing results to `out` and
    /// diagnostics to `diag`.
    ///
    /// Lines are read as raw bytes. Comment lines are skipped before any
    /// decoding; invalid UTF-8 elsewhere is replaced with U+FFFD.
    /// Evaluation errors are reported on `diag` and handled according to the
    /// configured [`ErrorPolicy`]. Only I/O failures are returned as `Err`.
    pub fn run<R, W, E>(&self, mut input: R, out: &mut W, diag: &mut E) -> io::Result<RunOutcome>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let mut evaluated = 0;
        let mut failed = 0;
        let mut line_number = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let raw = strip_line_ending(&buf);
            if self.is_comment(raw) {
                trace!("skipping comment line {line_number}");
                continue;
            }
            let line = String::from_utf8_lossy(raw);
            if matches!(line, Cow::Owned(_)) {
                debug!("line {line_number} is not valid UTF-8, decoding lossily");
            }

            match self.eval_line(&line) {
                Ok(None) => {}
                Ok(Some(value)) => {
                    evaluated += 1;
                    writeln!(out, "=> {value}")?;
                }
                Err(error) => {
                    writeln!(diag, "{error}")?;
                    match self.config.error_policy {
                        ErrorPolicy::Abort => {
                            debug!("aborting at line {line_number}: {error:#}");
                            out.flush()?;
                            return Ok(RunOutcome::Aborted {
                                line: line_number,
                                error,
                            });
                        }
                        ErrorPolicy::Continue => {
                            debug!("line {line_number} failed: {error:#}");
                            evaluated += 1;
                            failed += 1;
                        }
                    }
                }
            }
        }

        out.flush()?;
        debug!("run complete: {evaluated} evaluated, {failed} failed");
        Ok(RunOutcome::Completed { evaluated, failed })
    }
}

/// Drop a trailing `\n` or `\r\n`.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
