use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub autosave_delay_ms: u64,
    pub generate_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            data_dir: None,
            base_url: None,
            autosave_delay_ms: 2000,
            generate_url: None,
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(roadmap_home()?.join("data")),
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Explicit `generate_url`, else the generator route of `base_url`.
    pub fn generate_url(&self, base_url: Option<&str>) -> Option<String> {
        self.generate_url.clone().or_else(|| {
            base_url.map(|base| format!("{}/v1/generate", base.trim_end_matches('/')))
        })
    }
}

pub fn roadmap_home() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("could not find home directory"))?;
    Ok(home.join(".roadmap"))
}

/// Read the config file. A missing or unreadable file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Config {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match roadmap_home() {
            Ok(home) => home.join("config.toml"),
            Err(_) => return Config::default(),
        },
    };

    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|content| parse_config(&content))
    {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            Config::default()
        }
    }
}

fn parse_config(content: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(content)?)
}
