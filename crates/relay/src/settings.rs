use crate::upstream::{Service, Upstream};
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Endpoint(String);

crate::impl_string_newtype!(Endpoint);

/// Credential attached to upstream requests. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AuthToken(String);

crate::impl_string_newtype!(AuthToken);

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelaySettings {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default)]
    pub leetcode_endpoint: Option<Endpoint>,
    #[serde(default)]
    pub github_endpoint: Option<Endpoint>,
    #[serde(default)]
    pub github_token: Option<AuthToken>,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3030))
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            leetcode_endpoint: None,
            github_endpoint: None,
            github_token: None,
        }
    }
}

impl RelaySettings {
    pub fn upstream(&self, service: Service) -> Upstream {
        match service {
            Service::LeetCode => Upstream {
                service,
                endpoint: self
                    .leetcode_endpoint
                    .clone()
                    .unwrap_or_else(|| service.default_endpoint()),
                token: None,
            },
            Service::GitHub => Upstream {
                service,
                endpoint: self
                    .github_endpoint
                    .clone()
                    .unwrap_or_else(|| service.default_endpoint()),
                token: self.github_token.clone(),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_settings_path() -> Result<std::path::PathBuf, SettingsError> {
    let proj_dirs =
        ProjectDirs::from("dev", "portfolio", "relay").ok_or(SettingsError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("relay.toml"))
}

/// Reads `relay.toml` (optional) with `RELAY_*` environment overrides,
/// e.g. `RELAY_GITHUB_TOKEN`.
pub fn load_settings() -> Result<RelaySettings, SettingsError> {
    let path = get_settings_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("RELAY"))
        .build()?;

    Ok(s.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_public_apis() {
        let settings = RelaySettings::default();
        assert_eq!(settings.bind.port(), 3030);

        let leetcode = settings.upstream(Service::LeetCode);
        assert_eq!(leetcode.endpoint.as_str(), "https://leetcode.com/graphql");
        assert!(leetcode.token.is_none());

        let github = settings.upstream(Service::GitHub);
        assert_eq!(github.endpoint.as_str(), "https://api.github.com/graphql");
    }

    #[test]
    fn test_token_only_reaches_github() {
        let settings = RelaySettings {
            github_token: Some(AuthToken::new("ghp_secret")),
            ..Default::default()
        };
        assert!(settings.upstream(Service::LeetCode).token.is_none());
        assert_eq!(
            settings
                .upstream(Service::GitHub)
                .token
                .map(|t| t.as_str().to_string()),
            Some("ghp_secret".to_string())
        );
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let token = AuthToken::new("ghp_secret");
        assert!(!format!("{:?}", token).contains("ghp_secret"));
    }

    #[test]
    fn test_settings_from_toml() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
bind = "0.0.0.0:8080"
leetcode_endpoint = "http://localhost:9000/graphql"
"#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let settings: RelaySettings = s.try_deserialize().unwrap();
        assert_eq!(settings.bind.port(), 8080);
        assert_eq!(
            settings.upstream(Service::LeetCode).endpoint.as_str(),
            "http://localhost:9000/graphql"
        );
        assert!(settings.github_token.is_none());
    }
}
