//! Support for writing plugins in Rust.
//!
//! A plugin reads the whole document from stdin, decodes it and hands it to
//! a callback. Errors are reported as `[goir:plugin] <name>: <error>` on
//! stderr and turn into a failing exit status, which the pipeline records
//! as a plugin execution error.
//!
//! ```no_run
//! use std::process::ExitCode;
//!
//! fn main() -> ExitCode {
//!     goir::sdk::Plugin::new("my-plugin").init(|data| {
//!         for pkg in &data.packages {
//!             println!("{}", pkg.name);
//!         }
//!         Ok::<_, goir::sdk::BoxError>(())
//!     })
//! }
//! ```

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

pub use crate::ir::Data;
use crate::plugin::PLUGIN_ERR_PREFIX;

/// Boxed error returned by plugin callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("reading input: {0}")]
    Read(#[source] io::Error),

    #[error("decoding input: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Plugin(BoxError),
}

#[derive(Debug, Clone)]
pub struct Plugin {
    name: String,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads `input` to the end and decodes the document.
    pub fn decode(&self, mut input: impl Read) -> Result<Data, SdkError> {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf).map_err(SdkError::Read)?;
        Ok(serde_json::from_slice(&buf)?)
    }

    /// Decodes `input` and runs `f` on the document.
    pub fn run_with<R, F, E>(&self, input: R, f: F) -> Result<(), SdkError>
    where
        R: Read,
        F: FnOnce(&Data) -> Result<(), E>,
        E: Into<BoxError>,
    {
        let data = self.decode(input)?;
        f(&data).map_err(|e| SdkError::Plugin(e.into()))
    }

    /// Runs `f` on the document read from stdin and maps the result to the
    /// process exit status.
    pub fn init<F, E>(&self, f: F) -> ExitCode
    where
        F: FnOnce(&Data) -> Result<(), E>,
        E: Into<BoxError>,
    {
        match self.run_with(io::stdin().lock(), f) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{}", self.report(&err));
                ExitCode::FAILURE
            }
        }
    }

    /// The line printed for a failed run.
    pub fn report(&self, err: &dyn fmt::Display) -> String {
        format!("{PLUGIN_ERR_PREFIX} {}: {err}", self.name)
    }
}

/// `output_base` joined with `rel`.
pub fn output_path(data: &Data, rel: impl AsRef<std::path::Path>) -> PathBuf {
    PathBuf::from(&data.output_base).join(rel)
}
