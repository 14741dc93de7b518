use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub daemon: DaemonConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DaemonConfig {
    pub rpc_host: String,
    pub rpc_port: u16,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Upper bound on in-flight block header requests.
    pub max_concurrent_lookups: usize,
    /// Resolve ring member heights with one `get_outs` call.
    pub batch_outputs: bool,
    pub progress_interval: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    pub csv_path: String,
    pub history_db: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon: DaemonConfig::default(),
            analysis: AnalysisConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: "127.0.0.1".into(),
            rpc_port: 38081,
            timeout_secs: 30,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: 4,
            batch_outputs: true,
            progress_interval: 10,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_path: "ring_age_scores.csv".into(),
            history_db: Some("data/ring_reports.db".into()),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn daemon_url(&self) -> String {
        format!("http://{}:{}", self.daemon.rpc_host, self.daemon.rpc_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_stagenet() {
        let config = Config::default();
        assert_eq!(config.daemon_url(), "http://127.0.0.1:38081");
        assert_eq!(config.report.csv_path, "ring_age_scores.csv");
        assert!(config.analysis.batch_outputs);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            [daemon]
            rpc_port = 18081

            [analysis]
            max_concurrent_lookups = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.daemon.rpc_port, 18081);
        assert_eq!(config.daemon.rpc_host, "127.0.0.1");
        assert_eq!(config.analysis.max_concurrent_lookups, 1);
        assert_eq!(config.analysis.progress_interval, 10);
        assert_eq!(config.report.history_db.as_deref(), Some("data/ring_reports.db"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/ringrank.toml");
        assert_eq!(config.daemon.timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::parse("[daemon\nrpc_port = ").is_err());
    }
}
