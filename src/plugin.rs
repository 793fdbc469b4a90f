//! Plugin registration and the execution pipeline.
//!
//! Each plugin is an external program that reads the serialized document on
//! stdin. Plugins run one after another in registration order; a failing
//! plugin never stops the ones after it.

use std::fmt;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::patch::{set_output_base, PatchError};

pub const OUT_SEPARATOR: &str = ":out=";
pub const PLUGIN_ERR_PREFIX: &str = "[goir:plugin]";

/// One registered consumer: a command line and its output directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(rename = "out")]
    pub output_dir: String,
}

impl PluginSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>, output_dir: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            output_dir: output_dir.into(),
        }
    }

    pub(crate) fn validate(self) -> Result<Self, ConfigError> {
        let malformed = |reason| ConfigError::Malformed {
            value: self.to_string(),
            reason,
        };
        if self.program.trim().is_empty() {
            return Err(malformed("empty command"));
        }
        if self.output_dir.trim().is_empty() {
            return Err(malformed("empty output directory"));
        }
        Ok(self)
    }
}

impl fmt::Display for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, "{OUT_SEPARATOR}{}", self.output_dir)
    }
}

/// Parses `"<program> [args...]:out=<dir>"`. The last `:out=` wins, so
/// arguments may contain colons.
impl FromStr for PluginSpec {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| ConfigError::Malformed {
            value: value.to_owned(),
            reason,
        };
        let (command, out) = value
            .rsplit_once(OUT_SEPARATOR)
            .ok_or_else(|| malformed("missing `:out=<dir>`"))?;
        let mut words = command.split_whitespace();
        let program = words.next().ok_or_else(|| malformed("empty command"))?;
        let out = out.trim();
        if out.is_empty() {
            return Err(malformed("empty output directory"));
        }
        Ok(Self {
            program: program.to_owned(),
            args: words.map(str::to_owned).collect(),
            output_dir: out.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PluginNotFound,
    PluginExecutionError,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{command}: {message} ({path})")]
pub struct PluginError {
    pub command: String,
    /// Resolved executable, or the program name when resolution failed
    pub path: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Every failure of a run, one `[goir:plugin]` line each.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct PipelineError {
    pub failures: Vec<PluginError>,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{PLUGIN_ERR_PREFIX} {failure}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PluginOutcome {
    pub plugin: PluginSpec,
    pub result: Result<(), PluginError>,
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub outcomes: Vec<PluginOutcome>,
}

impl PipelineReport {
    pub fn failures(&self) -> impl Iterator<Item = &PluginError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn into_result(self) -> Result<(), PipelineError> {
        let failures: Vec<PluginError> = self
            .outcomes
            .into_iter()
            .filter_map(|o| o.result.err())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(PipelineError { failures })
        }
    }
}

pub struct Pipeline<'a> {
    plugins: &'a [PluginSpec],
}

impl<'a> Pipeline<'a> {
    pub fn new(plugins: &'a [PluginSpec]) -> Self {
        Self { plugins }
    }

    /// Feeds `payload` to every plugin with its own `output_base`.
    ///
    /// Only a payload that cannot be patched stops the run early; plugin
    /// failures are recorded in the report.
    pub fn run(&self, payload: &[u8]) -> Result<PipelineReport, PatchError> {
        let mut report = PipelineReport::default();
        for plugin in self.plugins {
            let patched = set_output_base(payload, &plugin.output_dir)?;
            let result = invoke(plugin, &patched);
            if let Err(err) = &result {
                warn!(plugin = %plugin.program, kind = ?err.kind, "{err}");
            }
            report.outcomes.push(PluginOutcome {
                plugin: plugin.clone(),
                result,
            });
        }
        Ok(report)
    }
}

fn invoke(plugin: &PluginSpec, payload: &[u8]) -> Result<(), PluginError> {
    let path = which::which(&plugin.program).map_err(|e| PluginError {
        command: plugin.program.clone(),
        path: plugin.program.clone(),
        kind: FailureKind::PluginNotFound,
        message: e.to_string(),
    })?;
    let failed = |message: String| PluginError {
        command: plugin.program.clone(),
        path: path.display().to_string(),
        kind: FailureKind::PluginExecutionError,
        message,
    };

    info!(plugin = %plugin.program, path = %path.display(), out = %plugin.output_dir, "running plugin");
    let mut child = Command::new(&path)
        .args(&plugin.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| failed(e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        let written = stdin.write_all(payload);
        // closing stdin signals end of input
        drop(stdin);
        match written {
            // the plugin exited or closed stdin early; its exit status decides
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!(plugin = %plugin.program, "plugin stopped reading its input");
            }
            Err(e) => {
                let _ = child.wait();
                return Err(failed(e.to_string()));
            }
            Ok(()) => {}
        }
    }

    let status = child.wait().map_err(|e| failed(e.to_string()))?;
    if !status.success() {
        return Err(failed(status.to_string()));
    }
    info!(plugin = %plugin.program, "plugin finished");
    Ok(())
}
