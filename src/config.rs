use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::game::Rules;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings read from a TOML file. Every field is optional.
///
/// ```toml
/// seed = 42
/// state_file = "2048.json"
///
/// [rules]
/// merge = "single"
/// spawn_on_noop = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seed for the tile spawner; absent means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Where the session snapshot is persisted; absent keeps it in memory.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub rules: Rules,
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MergeRule;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.rules.merge, MergeRule::Cascade);
        assert!(cfg.rules.spawn_on_noop);
    }

    #[test]
    fn full_config() {
        let cfg = Config::from_toml_str(
            r#"
            seed = 42
            state_file = "saves/2048.json"

            [rules]
            merge = "single"
            spawn_on_noop = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.state_file, Some(PathBuf::from("saves/2048.json")));
        assert_eq!(cfg.rules, Rules { merge: MergeRule::Single, spawn_on_noop: false });
    }

    #[test]
    fn partial_rules_keep_defaults() {
        let cfg = Config::from_toml_str("[rules]\nmerge = \"single\"\n").unwrap();
        assert_eq!(cfg.rules.merge, MergeRule::Single);
        assert!(cfg.rules.spawn_on_noop);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(Config::from_toml_str("[rules]\nmerge = \"sticky\"\n").is_err());
        assert!(Config::from_toml_str("board_size = 5\n").is_err());
    }

    #[test]
    fn reads_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "seed = 7").unwrap();
        let cfg = Config::from_toml(tmp.path()).unwrap();
        assert_eq!(cfg.seed, Some(7));
    }
}
