//! CLI configuration
//!
//! Log levels per phase and the optional `madlad.json` project file.

use std::collections::HashMap;
use std::path::Path;

use madlad_config::{CompilerConfig, ExecutionMode, LimitConfig, LogLevel, Phase};
use madlad_core::Omega;
use serde::Deserialize;

/// CLI log configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub global: LogLevel,
    pub phases: HashMap<Phase, LogLevel>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LogLevel::Warn,
            phases: HashMap::new(),
        }
    }
}

impl LogConfig {
    pub fn new(global: LogLevel) -> Self {
        Self {
            global,
            phases: HashMap::new(),
        }
    }

    /// Level for a phase, falling back to the global level
    pub fn level_for(&self, phase: Phase) -> LogLevel {
        self.phases.get(&phase).copied().unwrap_or(self.global)
    }
}

/// `madlad.json`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProjectFile {
    pub mode: Option<ExecutionMode>,
    pub dump_bytecode: Option<bool>,
    pub compiler: Option<CompilerConfig>,
    pub limits: Option<LimitConfig>,
    pub initial: Option<Omega>,
    pub log: Option<LogSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LogSection {
    pub level: Option<LogLevel>,
    /// Phase name to level, e.g. `{"vm": "trace"}`
    pub phases: HashMap<String, LogLevel>,
}

impl ProjectFile {
    pub fn read(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("invalid '{}': {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Log settings of the file, `--log-level` taking precedence
    pub fn log_config(&self, flag: Option<LogLevel>) -> Result<Option<LogConfig>, String> {
        let section = self.log.as_ref();
        let Some(global) = flag.or_else(|| section.and_then(|s| s.level)) else {
            return Ok(None);
        };
        let mut config = LogConfig::new(global);
        if let Some(section) = section {
            for (name, level) in &section.phases {
                config.phases.insert(name.parse::<Phase>()?, *level);
            }
        }
        Ok(Some(config))
    }
}
