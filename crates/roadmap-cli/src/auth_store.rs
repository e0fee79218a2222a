use std::collections::BTreeMap;
use std::path::PathBuf;

use roadmap_sync::Identity;

use crate::config::roadmap_home;

#[derive(serde::Serialize, serde::Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    #[serde(default)]
    pub profiles: BTreeMap<String, AuthProfile>,
}

#[derive(serde::Serialize, serde::Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct AuthProfile {
    pub base_url: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub identity: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthProfile {
    pub fn from_identity(base_url: &str, identity: &Identity) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_token: identity.access_token.clone(),
            refresh_token: identity.refresh_token.clone(),
            identity: identity.user_id.clone(),
            email: identity.email.clone(),
        }
    }

    pub fn to_identity(&self) -> Identity {
        Identity {
            user_id: self.identity.clone(),
            email: self.email.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

pub fn auth_config_path() -> anyhow::Result<PathBuf> {
    Ok(roadmap_home()?.join("auth.toml"))
}

pub fn load_auth_config() -> AuthConfig {
    let path = match auth_config_path() {
        Ok(p) => p,
        Err(_) => return AuthConfig::default(),
    };

    if path.exists() {
        if let Ok(content) = std::fs::read_to_string(path) {
            if let Ok(config) = toml::from_str(&content) {
                return config;
            }
        }
    }

    AuthConfig::default()
}

pub fn save_auth_config(config: &AuthConfig) -> anyhow::Result<()> {
    let path = auth_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn resolve_profile(profile: &str) -> Option<AuthProfile> {
    load_auth_config().profiles.get(profile).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_round_trips_identity() {
        let identity = Identity {
            user_id: "u-9".into(),
            email: Some("pm@example.com".into()),
            access_token: "at".into(),
            refresh_token: None,
        };
        let profile = AuthProfile::from_identity("https://api.example", &identity);
        assert_eq!(profile.to_identity(), identity);

        let mut config = AuthConfig::default();
        config.profiles.insert("default".into(), profile);
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AuthConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
