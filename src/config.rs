/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Engine configuration loaded from TOML.
//!
//! ```toml
//! [scope]
//! default_bound = 2
//! int_range = { low = -8, high = 7 }
//!
//! [scope.overrides]
//! Algorithm = 7
//!
//! [solve]
//! max_instances = 100
//! time_limit_ms = 5000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scope::Scope;

/// Failure to read or parse a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The TOML was malformed or had the wrong shape.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Limits and switches for one solve request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Stop after this many distinct instances.
    pub max_instances: Option<usize>,
    /// SAT conflicts plus decisions allowed across the whole request.
    pub step_limit: Option<u64>,
    /// Wall-clock limit in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Compute a minimal conflict when the request has no instance.
    pub diagnose: bool,
    /// Upper bound on grounded slots (and on primitive domain sizes).
    pub max_slots: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_instances: None,
            step_limit: None,
            time_limit_ms: None,
            diagnose: true,
            max_slots: 100_000,
        }
    }
}

impl SolveOptions {
    /// Limits the number of yielded instances.
    pub fn with_max_instances(mut self, max: usize) -> Self {
        self.max_instances = Some(max);
        self
    }

    /// Limits SAT steps.
    pub fn with_step_limit(mut self, steps: u64) -> Self {
        self.step_limit = Some(steps);
        self
    }

    /// Limits wall-clock time.
    pub fn with_time_limit_ms(mut self, millis: u64) -> Self {
        self.time_limit_ms = Some(millis);
        self
    }

    /// Enables or disables conflict diagnosis.
    pub fn with_diagnose(mut self, diagnose: bool) -> Self {
        self.diagnose = diagnose;
        self
    }

    /// Sets the slot limit.
    pub fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = max_slots;
        self
    }
}

/// Scope plus solve options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Search scope.
    pub scope: Scope,
    /// Solve options.
    pub solve: SolveOptions,
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, EngineConfig::default());
        assert!(config.solve.diagnose);
    }

    #[test]
    fn parses_scope_and_solve_sections() {
        let config = EngineConfig::from_toml_str(
            r#"
[scope]
default_bound = 2
string_alphabet = ["x", "y"]

[scope.overrides]
Algorithm = 7

[solve]
max_instances = 10
diagnose = false
"#,
        )
        .expect("config parses");
        assert_eq!(config.scope.default_bound, 2);
        assert_eq!(config.scope.bound_for("Algorithm", "Algorithm"), 7);
        assert_eq!(config.scope.string_alphabet, Some(vec!["x".into(), "y".into()]));
        assert_eq!(config.solve.max_instances, Some(10));
        assert!(!config.solve.diagnose);
        assert_eq!(config.solve.max_slots, 100_000);
    }

    #[test]
    fn rejects_wrongly_typed_fields() {
        let err = EngineConfig::from_toml_str("[solve]\nmax_instances = \"many\"\n")
            .expect_err("string is not a count");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "[solve]\nstep_limit = 500").expect("write config");
        let config = EngineConfig::from_file(file.path()).expect("config loads");
        assert_eq!(config.solve.step_limit, Some(500));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::from_file("/definitely/not/here.toml").expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
