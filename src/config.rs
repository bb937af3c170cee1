use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

pub(crate) const DB_ENV: &str = "INSTALLTUI_DB";
pub(crate) const CURRENCY_ENV: &str = "INSTALLTUI_CURRENCY";
pub(crate) const LANG_ENV: &str = "INSTALLTUI_LANG";
pub(crate) const LOG_ENV: &str = "INSTALLTUI_LOG";

/// Language used for status labels and drafted messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "ar" | "arabic" => Some(Self::Ar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) currency: String,
    pub(crate) locale: Locale,
    pub(crate) log_level: LevelFilter,
}

impl Config {
    /// Resolve from the platform data directory and `INSTALLTUI_*` variables.
    pub(crate) fn load() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "installtui", "InstallTUI")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self::resolve(data_dir, |key| std::env::var(key).ok()))
    }

    /// Build a config rooted at `data_dir`, reading overrides through `lookup`.
    /// Unrecognized values fall back to the defaults.
    pub(crate) fn resolve(data_dir: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup(DB_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(|p| PathBuf::from(crate::run::shellexpand(p.trim())))
            .unwrap_or_else(|| data_dir.join("installtui.db"));
        let currency = lookup(CURRENCY_ENV)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "EGP".into());
        let locale = lookup(LANG_ENV)
            .and_then(|l| Locale::parse(&l))
            .unwrap_or_default();
        let log_level = lookup(LOG_ENV)
            .and_then(|l| l.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::INFO);

        Self {
            db_path,
            log_path: data_dir.join("installtui.log"),
            currency,
            locale,
            log_level,
        }
    }
}

/// Send `tracing` events to the log file; the terminal belongs to the UI.
pub(crate) fn init_logging(config: &Config) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file: {}", config.log_path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve_with(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::resolve(Path::new("/data"), |k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = resolve_with(&[]);
        assert_eq!(config.db_path, PathBuf::from("/data/installtui.db"));
        assert_eq!(config.log_path, PathBuf::from("/data/installtui.log"));
        assert_eq!(config.currency, "EGP");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.log_level, LevelFilter::INFO);
    }

    #[test]
    fn test_overrides() {
        let config = resolve_with(&[
            (DB_ENV, "/tmp/other.db"),
            (CURRENCY_ENV, " USD "),
            (LANG_ENV, "ar"),
            (LOG_ENV, "debug"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.currency, "USD");
        assert_eq!(config.locale, Locale::Ar);
        assert_eq!(config.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = resolve_with(&[
            (DB_ENV, "  "),
            (CURRENCY_ENV, ""),
            (LANG_ENV, "klingon"),
            (LOG_ENV, "loud"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/data/installtui.db"));
        assert_eq!(config.currency, "EGP");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.log_level, LevelFilter::INFO);
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("EN"), Some(Locale::En));
        assert_eq!(Locale::parse("Arabic"), Some(Locale::Ar));
        assert_eq!(Locale::parse("fr"), None);
    }
}
