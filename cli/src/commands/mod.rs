//! CLI Commands

pub mod check;
pub mod config;
pub mod draft;
pub mod fill;
pub mod indices;
pub mod rules;
pub mod submit;
pub mod validate;

use anyhow::Context as _;
use cbc_intake::{
    FileDraftStore, FormSession, FormValues, HttpTransport, Presenter, RequirementProfile, RuleSet,
    Validator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Settings resolved from flags, environment and the config file.
pub struct Context {
    pub endpoint: String,
    pub profile: RequirementProfile,
    pub rules_file: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub draft_dir: PathBuf,
}

impl Context {
    pub fn rules(&self) -> anyhow::Result<RuleSet> {
        match &self.rules_file {
            Some(path) => RuleSet::load(path)
                .with_context(|| format!("loading rules from {}", path.display())),
            None => Ok(RuleSet::cbc(self.profile)),
        }
    }

    pub fn validator(&self) -> anyhow::Result<Validator> {
        Ok(Validator::new(self.rules()?)?)
    }

    pub fn drafts(&self) -> Arc<FileDraftStore> {
        Arc::new(FileDraftStore::new(&self.draft_dir))
    }

    pub fn session<P: Presenter>(&self, presenter: P) -> anyhow::Result<FormSession<P>> {
        let transport = HttpTransport::new(&self.endpoint, self.timeout)?;
        Ok(FormSession::new(self.validator()?, Arc::new(transport), presenter))
    }
}

/// Read form values from a JSON object. Non-string scalars are taken as
/// their JSON text; `null` becomes an empty field.
pub fn read_values(path: &Path) -> anyhow::Result<FormValues> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON object", path.display()))?;

    map.into_iter()
        .map(|(name, value)| {
            let raw = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => anyhow::bail!("field {} has unsupported value {}", name, other),
            };
            Ok((name, raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_values_stringifies_scalars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"name":"Asha","age":29,"hb":11.5,"wbc":null,"fatigue":true}"#).unwrap();

        let values = read_values(&path).unwrap();
        assert_eq!(values.get("name"), Some("Asha"));
        assert_eq!(values.get("age"), Some("29"));
        assert_eq!(values.get("hb"), Some("11.5"));
        assert_eq!(values.get("wbc"), Some(""));
        assert_eq!(values.get("fatigue"), Some("true"));
    }

    #[test]
    fn test_read_values_rejects_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"name":["a"]}"#).unwrap();
        assert!(read_values(&path).is_err());
    }
}
