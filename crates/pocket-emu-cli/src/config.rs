use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CliConfig {
    /// Directory for `<rom>_<slot>.sav` files.
    pub save_dir: PathBuf,
    /// Hold presentation to the 60 Hz frame interval.
    pub pacing: bool,
    /// Frame-budget multiplier while fast-forward is held.
    pub fast_forward_multiplier: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            pacing: true,
            fast_forward_multiplier: 100,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("pocket-emu").join("config.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("pocket-emu")
            .join("config.toml");
    }

    PathBuf::from("config.toml")
}

pub fn load_from_file(path: &Path) -> CliConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return CliConfig::default(),
    };

    match toml::from_str::<CliConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            CliConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: CliConfig = toml::from_str("pacing = false\n").unwrap();
        assert!(!cfg.pacing);
        assert_eq!(cfg.save_dir, PathBuf::from("saves"));
        assert_eq!(cfg.fast_forward_multiplier, 100);
    }

    #[test]
    fn kebab_case_keys() {
        let cfg: CliConfig =
            toml::from_str("save-dir = \"/tmp/states\"\nfast-forward-multiplier = 8\n").unwrap();
        assert_eq!(cfg.save_dir, PathBuf::from("/tmp/states"));
        assert_eq!(cfg.fast_forward_multiplier, 8);
        assert!(cfg.pacing);
    }

    #[test]
    fn unreadable_file_uses_defaults() {
        let cfg = load_from_file(Path::new("/nonexistent/pocket-emu/config.toml"));
        assert_eq!(cfg, CliConfig::default());
    }
}
