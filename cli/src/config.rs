//! CLI Configuration

use cbc_intake::RequirementProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: Option<String>,
    pub profile: Option<RequirementProfile>,
    pub timeout_secs: Option<u64>,
    pub draft_dir: Option<PathBuf>,
    pub rules_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub default_format: Option<String>,
}

/// Keys accepted by `config set` / `config get`.
pub const KEYS: &[&str] = &[
    "endpoint",
    "profile",
    "timeout_secs",
    "draft_dir",
    "rules_file",
    "log_level",
    "default_format",
];

impl Config {
    pub fn load(profile: Option<&str>) -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        match key {
            "endpoint" => self.endpoint = Some(value),
            "profile" => self.profile = Some(value.parse().map_err(anyhow::Error::msg)?),
            "timeout_secs" => self.timeout_secs = Some(value.parse()?),
            "draft_dir" => self.draft_dir = Some(value.into()),
            "rules_file" => self.rules_file = Some(value.into()),
            "log_level" => self.log_level = Some(value),
            "default_format" => self.default_format = Some(value),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = match key {
            "endpoint" => self.endpoint.clone(),
            "profile" => self.profile.map(|p| p.to_string()),
            "timeout_secs" => self.timeout_secs.map(|t| t.to_string()),
            "draft_dir" => self.draft_dir.as_ref().map(|p| p.display().to_string()),
            "rules_file" => self.rules_file.as_ref().map(|p| p.display().to_string()),
            "log_level" => self.log_level.clone(),
            "default_format" => self.default_format.clone(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        };
        Ok(value)
    }

    /// `~/.cbc-intake`
    pub fn base_dir() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
        Ok(home.join(".cbc-intake"))
    }

    pub fn draft_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.draft_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::base_dir()?.join("drafts")),
        }
    }

    fn config_path(profile: Option<&str>) -> anyhow::Result<PathBuf> {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(Self::base_dir()?.join(filename))
    }
}
