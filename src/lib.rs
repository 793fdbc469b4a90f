//! Go declarations to a JSON IR, fed to generator plugins.
//!
//! - `collector` walks one parsed file and builds its IR record, using
//!   `normalize` for type expressions, `classify` for comments and `binder`
//!   for methods.
//! - `program` walks a directory tree and groups files by package.
//! - `plugin` runs each registered plugin with its own `output_base`.
//! - `sdk` is the plugin side: decode the document from stdin and report
//!   failures.

pub mod binder;
pub mod classify;
pub mod collector;
pub mod config;
pub mod error;
pub mod ir;
pub mod normalize;
pub mod patch;
pub mod plugin;
pub mod program;
pub mod sdk;

pub use collector::collect_file;
pub use config::Config;
pub use error::Error;
pub use ir::Data;
pub use plugin::{Pipeline, PipelineReport, PluginSpec};
pub use program::{aggregate, collect_dir};

/// What a run produced.
#[derive(Debug)]
pub enum Outcome {
    /// Pretty-printed document; no plugin was started
    Debug(String),
    Plugins(PipelineReport),
}

/// Collects `config.input`, then either renders the document or runs every
/// plugin on it.
pub fn run(config: &Config) -> Result<Outcome, Error> {
    let data = collect_dir(&config.input)?;
    if config.debug {
        return Ok(Outcome::Debug(serde_json::to_string_pretty(&data)?));
    }
    let payload = serde_json::to_vec(&data)?;
    let report = Pipeline::new(&config.plugins).run(&payload)?;
    Ok(Outcome::Plugins(report))
}
