use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/brewbot/config.toml";

/// Bot configuration
#[derive(serde::Serialize, serde::Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub channels: Channels,
    pub daily: Daily,
    pub storage: Storage,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct General {
    pub platform_token: String,
    pub home_community_id: u64,
    pub command_prefix: String,
    /// Member ids allowed to run admin subcommands
    pub admins: Vec<u64>,
}

#[derive(serde::Serialize, serde::Deserialize, Default)]
#[serde(default)]
pub struct Channels {
    pub welcome: Option<u64>,
    /// Where level-ups and streak milestones are announced, and where the
    /// external leveling bot posts the messages we infer levels from.
    pub level_announcements: Option<u64>,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Daily {
    /// Daily reset offset in minutes relative to UTC (e.g. -300 for EST).
    /// 0 means the streak day flips at UTC midnight.
    pub utc_offset_minutes: i32,
    /// Retained from an earlier XP system; nothing reads it anymore.
    pub xp_cooldown_seconds: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Storage {
    pub flush_interval_seconds: u64,
}

impl Default for General {
    fn default() -> Self {
        Self {
            platform_token: String::new(),
            home_community_id: 0,
            command_prefix: "!".to_string(),
            admins: Vec::new(),
        }
    }
}

impl Default for Daily {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            xp_cooldown_seconds: 90,
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            flush_interval_seconds: 30,
        }
    }
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(config)
    }

    /// Load the configuration, falling back to defaults when no file exists.
    /// Unreadable or unparsable files still error so a typo does not silently
    /// run the bot with a blank config.
    pub async fn load_or_default() -> Result<Self> {
        match Self::config_path() {
            Ok(path) if !path.exists() => Ok(Self::default()),
            _ => Self::load().await,
        }
    }

    pub fn is_admin(&self, member: crate::ids::MemberId) -> bool {
        self.general.admins.contains(&member.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_parses_to_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.general.command_prefix, "!");
        assert_eq!(cfg.daily.utc_offset_minutes, 0);
        assert_eq!(cfg.storage.flush_interval_seconds, 30);
        assert!(cfg.channels.welcome.is_none());
    }

    #[test]
    fn partial_document_keeps_unlisted_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [general]
            command_prefix = ";"
            admins = [42]

            [daily]
            utc_offset_minutes = -300
            "#,
        )
        .unwrap();
        assert_eq!(cfg.general.command_prefix, ";");
        assert!(cfg.is_admin(crate::ids::MemberId(42)));
        assert!(!cfg.is_admin(crate::ids::MemberId(7)));
        assert_eq!(cfg.daily.utc_offset_minutes, -300);
        assert_eq!(cfg.daily.xp_cooldown_seconds, 90);
    }
}
