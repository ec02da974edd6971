use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilingConfig {
    #[serde(default = "default_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_parallel")]
    pub parallel_columns: bool,
}

fn default_bins() -> usize {
    10
}
fn default_parallel() -> bool {
    true
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            histogram_bins: default_bins(),
            parallel_columns: default_parallel(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_infer_records")]
    pub csv_infer_records: Option<usize>, // None scans the whole file
}

fn default_batch_size() -> usize {
    8192
}
fn default_infer_records() -> Option<usize> {
    Some(1000)
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            csv_infer_records: default_infer_records(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "json".into()
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub profiling: ProfilingConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datalens")
            .join("config.toml")
    }

    pub fn resolved_path() -> PathBuf {
        if let Ok(env_path) = std::env::var("DATALENS_CONFIG") {
            PathBuf::from(env_path) // $DATALENS_CONFIG overrides default config path
        } else {
            Self::config_path()
        }
    }

    pub fn load() -> crate::Result<Self> {
        let path = Self::resolved_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let cfg: Self =
            toml::from_str(content).map_err(|e| crate::DatalensError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.profiling.histogram_bins == 0 {
            return Err(crate::DatalensError::Config(
                "profiling.histogram_bins must be at least 1".into(),
            ));
        }
        if self.loader.batch_size == 0 {
            return Err(crate::DatalensError::Config(
                "loader.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn save(&self) -> crate::Result<()> {
        let path = Self::resolved_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::DatalensError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.profiling.histogram_bins, 10);
        assert!(cfg.profiling.parallel_columns);
        assert_eq!(cfg.loader.csv_infer_records, Some(1000));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = Config::from_toml("[profiling]\nhistogram_bins = 25\n").unwrap();
        assert_eq!(cfg.profiling.histogram_bins, 25);
        assert!(cfg.profiling.parallel_columns);
        assert_eq!(cfg.export.format, "json");
    }

    #[test]
    fn zero_bins_rejected() {
        let err = Config::from_toml("[profiling]\nhistogram_bins = 0\n").unwrap_err();
        assert!(err.to_string().contains("histogram_bins"));
    }
}
