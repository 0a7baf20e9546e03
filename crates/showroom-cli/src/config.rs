// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "showroom";
const DEFAULT_BASE_URL: &str = "http://localhost:4810";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Mock,
    Http,
}

impl SourceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mock" => Some(Self::Mock),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub catalog: Catalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: Catalog::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub source: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub latency: Option<String>,
    pub failure_odds: Option<i64>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            source: Some("mock".to_owned()),
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some("5s".to_owned()),
            latency: Some("1s".to_owned()),
            failure_odds: Some(i64::from(showroom_catalog::DEFAULT_FAILURE_ODDS)),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("SHOWROOM_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set SHOWROOM_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [catalog]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if let Some(source) = &self.catalog.source
            && SourceKind::parse(source).is_none()
        {
            bail!(
                "catalog.source in {} must be \"mock\" or \"http\", got {:?}",
                path.display(),
                source
            );
        }

        if self.source_kind() == SourceKind::Http && self.base_url().is_empty() {
            bail!(
                "catalog.base_url in {} must not be empty when catalog.source is \"http\"",
                path.display()
            );
        }

        if let Some(timeout) = &self.catalog.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "catalog.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(latency) = &self.catalog.latency {
            parse_duration(latency)?;
        }

        if let Some(odds) = self.catalog.failure_odds
            && !(0..=i64::from(u32::MAX)).contains(&odds)
        {
            bail!(
                "catalog.failure_odds in {} must be between 0 and {}, got {}",
                path.display(),
                u32::MAX,
                odds
            );
        }

        Ok(())
    }

    pub fn source_kind(&self) -> SourceKind {
        self.catalog
            .source
            .as_deref()
            .and_then(SourceKind::parse)
            .unwrap_or(SourceKind::Mock)
    }

    pub fn base_url(&self) -> &str {
        self.catalog
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.catalog.timeout.as_deref().unwrap_or("5s"))
    }

    pub fn latency(&self) -> Result<Duration> {
        parse_duration(self.catalog.latency.as_deref().unwrap_or("1s"))
    }

    pub fn failure_odds(&self) -> u32 {
        self.catalog
            .failure_odds
            .and_then(|odds| u32::try_from(odds).ok())
            .unwrap_or(showroom_catalog::DEFAULT_FAILURE_ODDS)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# showroom config\n# Place this file at: {}\n\nversion = 1\n\n[catalog]\n# \"mock\" serves the built-in demo fleet; \"http\" fetches GET <base_url>/vehicles\nsource = \"mock\"\nbase_url = \"{}\"\ntimeout = \"5s\"\n# Mock-only: simulated network latency and 1-in-N synthetic failure odds (0 disables)\nlatency = \"1s\"\nfailure_odds = {}\n",
            path.display(),
            DEFAULT_BASE_URL,
            showroom_catalog::DEFAULT_FAILURE_ODDS,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, SourceKind, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.source_kind(), SourceKind::Mock);
        assert_eq!(config.failure_odds(), 20);
        assert_eq!(config.latency()?, Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[catalog]\nsource = \"mock\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[catalog]"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn http_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[catalog]\nsource = \"http\"\nbase_url = \"http://catalog.example:9000/\"\ntimeout = \"2s\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.source_kind(), SourceKind::Http);
        assert_eq!(config.base_url(), "http://catalog.example:9000");
        assert_eq!(config.timeout()?, Duration::from_secs(2));
        Ok(())
    }

    #[test]
    fn unknown_source_kind_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[catalog]\nsource = \"carrier-pigeon\"\n")?;
        let error = Config::load(&path).expect_err("unknown source should fail");
        let message = error.to_string();
        assert!(message.contains("catalog.source"));
        assert!(message.contains("carrier-pigeon"));
        Ok(())
    }

    #[test]
    fn zero_timeout_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[catalog]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn zero_latency_is_allowed_for_instant_mock_fetches() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[catalog]\nlatency = \"0ms\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.latency()?, Duration::ZERO);
        Ok(())
    }

    #[test]
    fn negative_failure_odds_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[catalog]\nfailure_odds = -1\n")?;
        let error = Config::load(&path).expect_err("negative odds should fail");
        assert!(error.to_string().contains("failure_odds"));
        Ok(())
    }

    #[test]
    fn zero_failure_odds_disable_synthetic_failures() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[catalog]\nfailure_odds = 0\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.failure_odds(), 0);
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("SHOWROOM_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("SHOWROOM_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("SHOWROOM_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("config.toml"));
        Ok(())
    }

    #[test]
    fn duration_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn duration_rejects_invalid_values() {
        for input in ["oops", "-5s", "5h", ""] {
            assert!(parse_duration(input).is_err(), "input {input:?}");
        }
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;

        let config = Config::load(&path)?;
        assert_eq!(config.source_kind(), SourceKind::Mock);
        assert_eq!(config.base_url(), "http://localhost:4810");
        assert_eq!(config.failure_odds(), 20);
        Ok(())
    }
}
