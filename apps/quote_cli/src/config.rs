use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use quote_core::MediaHost;
use shared::catalog::PriceCatalog;
use tracing::{info, warn};

const SETTINGS_FILE: &str = "quote.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub intake_url: Option<String>,
    pub media_cloud_name: Option<String>,
    pub media_upload_preset: Option<String>,
    pub media_api_base: String,
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/quote.db".into(),
            intake_url: None,
            media_cloud_name: None,
            media_upload_preset: None,
            media_api_base: "https://api.cloudinary.com".into(),
            catalog_path: None,
        }
    }
}

impl Settings {
    /// Applies every value `lookup` knows about, keyed by the lowercase
    /// setting name. Blank values are ignored.
    fn overlay(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = value("database_url") {
            self.database_url = v;
        }
        if let Some(v) = value("intake_url") {
            self.intake_url = Some(v);
        }
        if let Some(v) = value("media_cloud_name") {
            self.media_cloud_name = Some(v);
        }
        if let Some(v) = value("media_upload_preset") {
            self.media_upload_preset = Some(v);
        }
        if let Some(v) = value("media_api_base") {
            self.media_api_base = v;
        }
        if let Some(v) = value("catalog_path") {
            self.catalog_path = Some(PathBuf::from(v));
        }
    }

    /// Photo uploads need both a cloud name and an upload preset.
    pub fn media_host(&self) -> anyhow::Result<Option<MediaHost>> {
        match (&self.media_cloud_name, &self.media_upload_preset) {
            (Some(cloud), Some(preset)) => {
                Ok(Some(MediaHost::new(&self.media_api_base, cloud, preset)?))
            }
            (None, None) => Ok(None),
            _ => {
                warn!("config: media host needs both cloud name and upload preset; photos disabled");
                Ok(None)
            }
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => settings.overlay(|key| file_cfg.get(key).cloned()),
            Err(err) => warn!(path = %path.display(), error = %err, "config: ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("QUOTE_DATABASE_URL") {
        settings.database_url = v;
    }
    settings.overlay(|key| env(&format!("APP__{}", key.to_ascii_uppercase())));

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }
    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }
    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = Path::new(path.split('?').next().unwrap_or_default());
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

/// Loads the price table from `path`, or the standard prices when unset.
/// A configured table must price every size, bracket and add-on.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<PriceCatalog> {
    let Some(path) = path else {
        return Ok(PriceCatalog::standard());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read price catalog '{}'", path.display()))?;
    let catalog = toml::from_str::<PriceCatalog>(&raw)
        .with_context(|| format!("failed to parse price catalog '{}'", path.display()))?;
    catalog
        .validate()
        .with_context(|| format!("rejected price catalog '{}'", path.display()))?;

    info!(path = %path.display(), "config: loaded price catalog");
    Ok(catalog)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
