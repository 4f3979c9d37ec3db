//! Machine configuration.
//!
//! Values are layered, highest priority first: command-line flags (applied by
//! the CLI), `BFVM_*` environment variables, the `[machine]` table of
//! `$XDG_CONFIG_HOME/bfvm.toml`, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cell::{CellKind, OverflowPolicy};
use crate::io::{EofPolicy, OutputMode};
use crate::tape::DEFAULT_TAPE_LEN;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("tape length must be at least 1")]
    EmptyTape,
}

/// Everything the machine needs to know besides the program itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub tape_len: usize,
    pub cell: CellKind,
    pub overflow: OverflowPolicy,
    pub eof: EofPolicy,
    /// `None` picks [`OutputMode::default_for`] the cell kind.
    pub output: Option<OutputMode>,
    /// `None` runs without a step limit.
    pub max_steps: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            tape_len: DEFAULT_TAPE_LEN,
            cell: CellKind::default(),
            overflow: OverflowPolicy::default(),
            eof: EofPolicy::default(),
            output: None,
            max_steps: None,
        }
    }
}

/// On-disk form; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    machine: MachineSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MachineSection {
    tape_len: Option<usize>,
    cell: Option<CellKind>,
    overflow: Option<OverflowPolicy>,
    eof: Option<EofPolicy>,
    output: Option<OutputMode>,
    max_steps: Option<u64>,
}

impl MachineConfig {
    /// Defaults, then the config file, then the process environment.
    ///
    /// With `path == None` the XDG location is tried and silently skipped
    /// when absent; an explicit path must exist.
    ///
    /// The result is not validated: callers layer their own overrides on top
    /// and then call [`MachineConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match path {
            Some(path) => config.apply_file(path)?,
            None => {
                if let Some(path) = default_config_path().filter(|p| p.is_file()) {
                    config.apply_file(&path)?;
                }
            }
        }

        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.apply_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config file applied");
        Ok(())
    }

    fn apply_toml(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let section = file.machine;

        if let Some(tape_len) = section.tape_len {
            self.tape_len = tape_len;
        }
        if let Some(cell) = section.cell {
            self.cell = cell;
        }
        if let Some(overflow) = section.overflow {
            self.overflow = overflow;
        }
        if let Some(eof) = section.eof {
            self.eof = eof;
        }
        if section.output.is_some() {
            self.output = section.output;
        }
        if section.max_steps.is_some() {
            self.max_steps = section.max_steps;
        }
        Ok(())
    }

    /// Apply `BFVM_*` overrides using `lookup` to read variables. Blank values
    /// are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
        where
            T: std::str::FromStr,
            T::Err: std::fmt::Display,
        {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Env {
                var,
                message: e.to_string(),
            })
        }

        let value = |var: &str| match lookup(var) {
            Some(raw) if raw.trim().is_empty() => {
                warn!(var, "ignoring empty environment variable");
                None
            }
            other => other,
        };

        if let Some(raw) = value("BFVM_TAPE_LEN") {
            self.tape_len = parse("BFVM_TAPE_LEN", &raw)?;
        }
        if let Some(raw) = value("BFVM_CELL") {
            self.cell = parse("BFVM_CELL", &raw)?;
        }
        if let Some(raw) = value("BFVM_OVERFLOW") {
            self.overflow = parse("BFVM_OVERFLOW", &raw)?;
        }
        if let Some(raw) = value("BFVM_EOF") {
            self.eof = parse("BFVM_EOF", &raw)?;
        }
        if let Some(raw) = value("BFVM_OUTPUT") {
            self.output = Some(parse("BFVM_OUTPUT", &raw)?);
        }
        if let Some(raw) = value("BFVM_MAX_STEPS") {
            self.max_steps = Some(parse("BFVM_MAX_STEPS", &raw)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tape_len == 0 {
            return Err(ConfigError::EmptyTape);
        }
        Ok(())
    }

    /// The output mode actually used, resolving `None` from the cell kind.
    pub fn output_mode(&self) -> OutputMode {
        self.output.unwrap_or_else(|| OutputMode::default_for(self.cell))
    }
}

/// `$XDG_CONFIG_HOME/bfvm.toml`, or `None` when no home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;

    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bfvm.toml");
    Some(path)
}
