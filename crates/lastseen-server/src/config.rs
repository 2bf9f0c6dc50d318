use std::path::PathBuf;

use anyhow::{Result, bail};

use lastseen_core::dispatcher::SeenConfig;

pub struct Config {
    pub db_path: PathBuf,
    pub seen: SeenConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("LASTSEEN_DB_PATH").unwrap_or_else(|| "seen.db".into());
        let nickname = lookup("LASTSEEN_NICK").unwrap_or_else(|| "seenbot".into());

        // Set but empty disables in-channel commands
        let command_prefix = match lookup("LASTSEEN_COMMAND_PREFIX") {
            Some(prefix) if prefix.is_empty() => None,
            Some(prefix) => Some(prefix),
            None => Some("!".into()),
        };

        let bold = match lookup("LASTSEEN_BOLD").as_deref() {
            None => true,
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => bail!("LASTSEEN_BOLD must be a boolean, got {:?}", other),
        };

        Ok(Self {
            db_path: PathBuf::from(db_path),
            seen: SeenConfig {
                nickname,
                command_prefix,
                bold,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("seen.db"));
        assert_eq!(config.seen.nickname, "seenbot");
        assert_eq!(config.seen.command_prefix.as_deref(), Some("!"));
        assert!(config.seen.bold);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("LASTSEEN_DB_PATH", "/var/lib/lastseen/seen.db"),
            ("LASTSEEN_NICK", "Watcher"),
            ("LASTSEEN_COMMAND_PREFIX", ""),
            ("LASTSEEN_BOLD", "off"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/lastseen/seen.db"));
        assert_eq!(config.seen.nickname, "Watcher");
        assert_eq!(config.seen.command_prefix, None);
        assert!(!config.seen.bold);
    }

    #[test]
    fn rejects_bad_bool() {
        assert!(config(&[("LASTSEEN_BOLD", "maybe")]).is_err());
    }
}
