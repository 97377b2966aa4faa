use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::program::{ProgramType, ThresholdTable};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_program")]
    pub default_program: ProgramType,
    /// Require both rounds of area club visits when visit data is present.
    #[serde(default = "default_true")]
    pub area_visit_gate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_true")]
    pub enable_stdout: bool,
    #[serde(default)]
    pub rules: AlertRulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRulesConfig {
    #[serde(default = "default_true")]
    pub level_gained: bool,
    #[serde(default = "default_true")]
    pub level_lost: bool,
    #[serde(default = "default_true")]
    pub net_loss: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
    pub default_program: Option<ProgramType>,
    pub area_visit_gate: Option<bool>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/recognition-gap/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
        if let Some(program) = overrides.default_program {
            self.analysis.default_program = program;
        }
        if let Some(gate) = overrides.area_visit_gate {
            self.analysis.area_visit_gate = gate;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Threshold table for `program` with the configured visit gate.
    pub fn table_for(&self, program: ProgramType) -> ThresholdTable {
        let table = ThresholdTable::for_program(program);
        if self.analysis.area_visit_gate {
            table
        } else {
            table.without_visit_gate()
        }
    }

    pub fn default_template() -> String {
        let template = r#"[storage]
db_path = "~/.local/share/recognition-gap/history.db"

[analysis]
# "area" or "division"
default_program = "division"
# Require 75% of clubs visited in both rounds when visit counts are supplied
area_visit_gate = true

[server]
host = "127.0.0.1"
port = 3001

[alerts]
enable_stdout = true

[alerts.rules]
level_gained = true
level_lost = true
net_loss = true
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_program: default_program(),
            area_visit_gate: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            rules: AlertRulesConfig::default(),
        }
    }
}

impl Default for AlertRulesConfig {
    fn default() -> Self {
        Self {
            level_gained: true,
            level_lost: true,
            net_loss: true,
        }
    }
}

fn default_db_path() -> String {
    "~/.local/share/recognition-gap/history.db".to_string()
}

fn default_program() -> ProgramType {
    ProgramType::Division
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigOverrides};
    use crate::program::ProgramType;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).unwrap();
        assert_eq!(parsed.analysis.default_program, ProgramType::Division);
        assert!(parsed.analysis.area_visit_gate);
        assert_eq!(parsed.server.port, 3001);
        assert!(parsed.alerts.rules.net_loss);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("[analysis]\narea_visit_gate = false\n").unwrap();
        assert!(!parsed.analysis.area_visit_gate);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert!(parsed
            .table_for(ProgramType::Area)
            .required_visits(8)
            .is_none());
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            db_path: Some("/tmp/history.db".to_string()),
            default_program: Some(ProgramType::Area),
            area_visit_gate: None,
        });
        assert_eq!(config.resolved_db_path().to_str(), Some("/tmp/history.db"));
        assert_eq!(config.analysis.default_program, ProgramType::Area);
        assert!(config.analysis.area_visit_gate);
    }
}
