use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tuition assumed when nothing valid has been saved.
pub const DEFAULT_TUITION_KRW: u64 = 10_500_000;

/// Saved values outside this range are discarded on load.
pub const MAX_TUITION_KRW: u64 = 1_000_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub tuition_krw: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tuition_krw: DEFAULT_TUITION_KRW,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
    fn reset(&self) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "melt") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("melt_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Unreadable, unparsable, or out-of-range saved values silently fall
    /// back to the default; the meter never fails to start over a bad file.
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                if (1..=MAX_TUITION_KRW).contains(&cfg.tuition_krw) {
                    return cfg;
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }

    fn reset(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Parses a user-entered tuition amount: separators (`,`, `_`, spaces), a
/// leading `₩`, and a trailing `원` are tolerated; everything else must be a
/// digit. Returns `None` for anything unparsable or out of range.
pub fn parse_tuition_input(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('₩').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('원').unwrap_or(trimmed);

    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits
        .parse::<u64>()
        .ok()
        .filter(|n| (1..=MAX_TUITION_KRW).contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_and_load_custom_tuition() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config {
            tuition_krw: 4_200_000,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn garbage_file_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"not json at all").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn out_of_range_value_is_discarded_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);

        store.save(&Config { tuition_krw: 0 }).unwrap();
        assert_eq!(store.load(), Config::default());

        store
            .save(&Config {
                tuition_krw: MAX_TUITION_KRW + 1,
            })
            .unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn reset_removes_the_file_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        store.save(&Config::default()).unwrap();
        assert!(path.exists());

        store.reset().unwrap();
        assert!(!path.exists());
        // A second reset on a missing file is not an error.
        store.reset().unwrap();
    }

    #[test]
    fn tuition_input_parsing() {
        assert_eq!(parse_tuition_input("10500000"), Some(10_500_000));
        assert_eq!(parse_tuition_input("10,500,000"), Some(10_500_000));
        assert_eq!(parse_tuition_input("₩10,500,000"), Some(10_500_000));
        assert_eq!(parse_tuition_input("10 500 000원"), Some(10_500_000));
        assert_eq!(parse_tuition_input("4_200_000"), Some(4_200_000));

        assert_eq!(parse_tuition_input(""), None);
        assert_eq!(parse_tuition_input("abc"), None);
        assert_eq!(parse_tuition_input("10.5"), None);
        assert_eq!(parse_tuition_input("-100"), None);
        assert_eq!(parse_tuition_input("0"), None);
        assert_eq!(parse_tuition_input("1000000001"), None);
    }
}
