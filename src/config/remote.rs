//! Remote status and rank service configuration

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Remote service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Ban-status endpoint; the player id is appended as a path segment
    pub status_base_url: Option<String>,

    /// Rank service base URL; rank sync is skipped when unset
    pub rank_base_url: Option<String>,

    /// Status request timeout in seconds
    #[serde(default = "default_timeout")]
    pub status_timeout_secs: u64,

    /// Rank request timeout in seconds
    #[serde(default = "default_timeout")]
    pub rank_timeout_secs: u64,

    /// Season identifier prefix, joined with the season number by `-`
    #[serde(default = "default_season_prefix")]
    pub season_prefix: String,
}

impl RemoteConfig {
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn rank_timeout(&self) -> Duration {
        Duration::from_secs(self.rank_timeout_secs)
    }

    /// Status endpoint, required by anything that runs a pass
    pub fn require_status_url(&self) -> Result<&str, ValidationError> {
        self.status_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ValidationError::MissingRequired("remote.status_base_url"))
    }

    /// Validate remote configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_url(self.status_base_url.as_deref(), "remote.status_base_url")?;
        check_url(self.rank_base_url.as_deref(), "remote.rank_base_url")?;

        if self.status_timeout_secs == 0 || self.status_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("remote.status_timeout_secs"));
        }
        if self.rank_timeout_secs == 0 || self.rank_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("remote.rank_timeout_secs"));
        }
        if self.season_prefix.trim().is_empty() {
            return Err(ValidationError::EmptySeasonPrefix);
        }
        Ok(())
    }
}

fn check_url(url: Option<&str>, field: &'static str) -> Result<(), ValidationError> {
    let Some(url) = url else {
        return Ok(());
    };
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::InvalidUrl(field)),
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            status_base_url: None,
            rank_base_url: None,
            status_timeout_secs: default_timeout(),
            rank_timeout_secs: default_timeout(),
            season_prefix: default_season_prefix(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_season_prefix() -> String {
    "division.bro.official.pc-2018".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_defaults() {
        let config = RemoteConfig::default();
        assert_eq!(config.status_timeout(), Duration::from_secs(10));
        assert_eq!(config.rank_timeout(), Duration::from_secs(10));
        assert_eq!(config.season_prefix, "division.bro.official.pc-2018");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_status_url_required_for_sync() {
        let config = RemoteConfig::default();
        assert_eq!(
            config.require_status_url(),
            Err(ValidationError::MissingRequired("remote.status_base_url"))
        );

        let config = RemoteConfig {
            status_base_url: Some("https://bans.example.com/status".into()),
            ..RemoteConfig::default()
        };
        assert_eq!(
            config.require_status_url(),
            Ok("https://bans.example.com/status")
        );
    }

    #[test]
    fn test_validation_invalid_url() {
        let config = RemoteConfig {
            rank_base_url: Some("ftp://example.com".into()),
            ..RemoteConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("remote.rank_base_url"))
        );

        let config = RemoteConfig {
            status_base_url: Some("not a url".into()),
            ..RemoteConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("remote.status_base_url"))
        );
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = RemoteConfig {
            status_timeout_secs: 0,
            ..RemoteConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTimeout(_))
        ));
    }
}
