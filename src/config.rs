//! Run configuration: command-line values merged over an optional TOML file.
//!
//! ```toml
//! input = "./internal"
//!
//! [[plugins]]
//! program = "gen_db"
//! args = ["--flag"]
//! out = "./internal/db"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::plugin::PluginSpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid plugin value `{value}`: {reason}")]
    Malformed { value: String, reason: &'static str },

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The on-disk config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line. Plugin registrations are unparsed.
#[derive(Debug, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub debug: bool,
    pub plugins: Vec<String>,
}

/// Everything a run needs, built once before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub debug: bool,
    /// Registration order is execution order
    pub plugins: Vec<PluginSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            debug: false,
            plugins: Vec::new(),
        }
    }
}

impl Config {
    /// File plugins run first, command-line plugins after them. A
    /// command-line input directory replaces the file's.
    pub fn build(file: Option<ConfigFile>, cli: Overrides) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let mut plugins = file
            .plugins
            .into_iter()
            .map(PluginSpec::validate)
            .collect::<Result<Vec<_>, _>>()?;
        for raw in &cli.plugins {
            plugins.push(raw.parse()?);
        }
        Ok(Self {
            input: cli
                .input
                .or(file.input)
                .unwrap_or_else(|| Config::default().input),
            debug: cli.debug || file.debug,
            plugins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_to_current_directory() {
        let config = Config::build(None, Overrides::default()).expect("config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_plugins_come_first() {
        let mut tmp = tempfile::NamedTempFile::new().expect("tmp");
        write!(
            tmp,
            "input = \"src\"\n\n[[plugins]]\nprogram = \"gen_a\"\nargs = [\"-v\"]\nout = \"./a\"\n"
        )
        .expect("write");
        let file = ConfigFile::load(tmp.path()).expect("load");
        let config = Config::build(
            Some(file),
            Overrides {
                plugins: vec!["gen_b:out=./b".into()],
                ..Default::default()
            },
        )
        .expect("config");

        assert_eq!(config.input, PathBuf::from("src"));
        assert_eq!(
            config.plugins,
            vec![
                PluginSpec::new("gen_a", vec!["-v".into()], "./a"),
                PluginSpec::new("gen_b", Vec::new(), "./b"),
            ]
        );
    }

    #[test]
    fn command_line_input_wins() {
        let file = ConfigFile {
            input: Some("from_file".into()),
            ..Default::default()
        };
        let cli = Overrides {
            input: Some("from_cli".into()),
            debug: true,
            ..Default::default()
        };
        let config = Config::build(Some(file), cli).expect("config");
        assert_eq!(config.input, PathBuf::from("from_cli"));
        assert!(config.debug);
    }

    #[test]
    fn invalid_entries_are_rejected() {
        let file = ConfigFile {
            plugins: vec![PluginSpec::new("gen", Vec::new(), " ")],
            ..Default::default()
        };
        assert!(matches!(
            Config::build(Some(file), Overrides::default()),
            Err(ConfigError::Malformed { .. })
        ));

        let mut tmp = tempfile::NamedTempFile::new().expect("tmp");
        write!(tmp, "[[plugins]]\nprogram = \"gen\"\n").expect("write");
        assert!(matches!(
            ConfigFile::load(tmp.path()),
            Err(ConfigError::Toml { .. })
        ));
    }
}
