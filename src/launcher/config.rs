//! Launcher configuration
//!
//! Every field has a default matching the cluster job script, so an empty
//! YAML file (or no file at all) launches the standard job.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    /// When true the training process brings up Elasticsearch itself
    pub setup_with_model: bool,
    /// Passed downstream as `+kill_es`; follows `setup_with_model` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill_es: Option<bool>,
    pub gpu_status: ToolConfig,
    pub search_engine: ToolConfig,
    pub training: TrainingConfig,
    /// Working directory for every child process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub python: String,
    pub script: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment: Option<String>,
    pub train_batch_size: usize,
    pub eval_batch_size: usize,
    pub precision: u32,
    pub num_workers: usize,
    pub extra_overrides: Vec<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            setup_with_model: false,
            kill_es: None,
            gpu_status: ToolConfig::new("nvidia-smi", &["--debug=nvidia-smi.log"]),
            search_engine: ToolConfig::new("elasticsearch", &["-q"]),
            training: TrainingConfig::default(),
            working_dir: None,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            python: "python".to_string(),
            script: "run.py".to_string(),
            experiment: None,
            train_batch_size: 32,
            eval_batch_size: 100,
            precision: 16,
            num_workers: 4,
            extra_overrides: Vec::new(),
        }
    }
}

impl ToolConfig {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl LauncherConfig {
    pub fn kill_es(&self) -> bool {
        self.kill_es.unwrap_or(self.setup_with_model)
    }
}

pub fn load_config(path: &Path) -> Result<LauncherConfig> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read launcher config: {}", path.display()))?;

    // serde_yaml rejects an empty document, treat it as all defaults
    if config_str.trim().is_empty() {
        return Ok(LauncherConfig::default());
    }

    let config: LauncherConfig = serde_yaml::from_str(&config_str)
        .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_job_script() {
        let config = LauncherConfig::default();
        assert!(!config.setup_with_model);
        assert!(!config.kill_es());
        assert_eq!(config.search_engine.program, "elasticsearch");
        assert_eq!(config.gpu_status.program, "nvidia-smi");
        assert_eq!(config.training.script, "run.py");
        assert_eq!(config.training.train_batch_size, 32);
        assert_eq!(config.training.eval_batch_size, 100);
        assert_eq!(config.training.precision, 16);
        assert_eq!(config.training.num_workers, 4);
    }

    #[test]
    fn test_kill_es_follows_setup_with_model() {
        let mut config = LauncherConfig::default();
        config.setup_with_model = true;
        assert!(config.kill_es());

        config.kill_es = Some(false);
        assert!(!config.kill_es());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = concat!(
            "setup_with_model: true\n",
            "training:\n",
            "  num_workers: 8\n",
            "  experiment: retriever_only\n",
        );
        let config: LauncherConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.setup_with_model);
        assert_eq!(config.training.num_workers, 8);
        assert_eq!(config.training.experiment.as_deref(), Some("retriever_only"));
        assert_eq!(config.training.train_batch_size, 32);
        assert_eq!(config.search_engine, ToolConfig::new("elasticsearch", &["-q"]));
    }
}
