use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::rollup::Bucketing;

pub const RDA_TABLE_ENV_VAR: &str = "NUTRI_RDA_TABLE";
pub const DEFAULT_BUCKETING_ENV_VAR: &str = "NUTRI_DEFAULT_BUCKETING";
const DEFAULT_LOG_FILTER: &str = "nutri_tally=info";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// JSON RDA table replacing the built-in one.
    pub rda_table_path: Option<PathBuf>,
    pub default_bucketing: Bucketing,
    pub log_filter: String,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rda_table_path: None,
            default_bucketing: Bucketing::Day,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default_bucketing = match lookup(DEFAULT_BUCKETING_ENV_VAR) {
            Some(raw) => raw
                .parse::<Bucketing>()
                .map_err(|e| anyhow!("{}: {}", DEFAULT_BUCKETING_ENV_VAR, e))?,
            None => Bucketing::Day,
        };

        Ok(Self {
            rda_table_path: lookup(RDA_TABLE_ENV_VAR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            default_bucketing,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            json_logs: lookup("LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            (RDA_TABLE_ENV_VAR, "/etc/rda.json"),
            (DEFAULT_BUCKETING_ENV_VAR, "month"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.rda_table_path, Some(PathBuf::from("/etc/rda.json")));
        assert_eq!(config.default_bucketing, Bucketing::Month);
        assert_eq!(config.log_filter, "debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_bad_bucketing_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[(DEFAULT_BUCKETING_ENV_VAR, "fortnight")])).unwrap_err();
        assert!(err.to_string().contains(DEFAULT_BUCKETING_ENV_VAR));
    }
}
