use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use client_core::{RequestPolicy, RetryPolicy, DEFAULT_BASE_URL};
use serde::Deserialize;
use thiserror::Error;

use crate::ui::{i18n::Language, theme::Theme};

const CONFIG_FILE_NAME: &str = "portal.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub language: Language,
    pub theme: Theme,
    pub color: bool,
    pub guard_routes: bool,
    pub student_id: String,
    pub unit_name: String,
    pub tutor_student_id: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            request_timeout: client_core::transport::DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            language: Language::English,
            theme: Theme::Dark,
            color: true,
            guard_routes: false,
            student_id: "Demo-User".into(),
            unit_name: "Unit 1: Business Environment".into(),
            tutor_student_id: None,
        }
    }
}

impl Settings {
    pub fn request_policy(&self) -> RequestPolicy {
        RequestPolicy {
            timeout: self.request_timeout,
            retry: self.retry,
        }
    }
}

/// On-disk shape; every key is optional and overrides the default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    retry_max_attempts: Option<u32>,
    retry_base_delay_ms: Option<u64>,
    retry_max_delay_ms: Option<u64>,
    language: Option<Language>,
    theme: Option<Theme>,
    color: Option<bool>,
    guard_routes: Option<bool>,
    student_id: Option<String>,
    unit_name: Option<String>,
    tutor_student_id: Option<i64>,
}

/// Defaults, then the config file, then environment variables.
///
/// An explicit `path` must exist. Without one, `./portal.toml` and then the
/// user config directory are tried and silently skipped when absent.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let file = match path {
        Some(path) => Some(read_file_settings(path)?),
        None => match default_config_path() {
            Some(path) => Some(read_file_settings(&path)?),
            None => None,
        },
    };
    if let Some(file) = file {
        apply_file_settings(&mut settings, file);
    }

    apply_env(&mut settings, env);
    Ok(settings)
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("metalearn").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_file_settings(settings: &mut Settings, file: FileSettings) {
    if let Some(v) = file.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file.request_timeout_ms {
        settings.request_timeout = Duration::from_millis(v);
    }
    if let Some(v) = file.retry_max_attempts {
        settings.retry.max_attempts = v.max(1);
    }
    if let Some(v) = file.retry_base_delay_ms {
        settings.retry.base_delay = Duration::from_millis(v);
    }
    if let Some(v) = file.retry_max_delay_ms {
        settings.retry.max_delay = Duration::from_millis(v);
    }
    if let Some(v) = file.language {
        settings.language = v;
    }
    if let Some(v) = file.theme {
        settings.theme = v;
    }
    if let Some(v) = file.color {
        settings.color = v;
    }
    if let Some(v) = file.guard_routes {
        settings.guard_routes = v;
    }
    if let Some(v) = file.student_id {
        settings.student_id = v;
    }
    if let Some(v) = file.unit_name {
        settings.unit_name = v;
    }
    if let Some(v) = file.tutor_student_id {
        settings.tutor_student_id = Some(v);
    }
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    // Later names win.
    for key in ["NEXT_PUBLIC_API_URL", "METALEARN_API_URL", "APP__API_URL"] {
        if let Some(v) = env(key).filter(|v| !v.trim().is_empty()) {
            settings.api_base_url = v.trim().to_string();
        }
    }

    if let Some(v) = parsed::<u64>(&env, "APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout = Duration::from_millis(v);
    }
    if let Some(v) = parsed::<u32>(&env, "APP__RETRY_MAX_ATTEMPTS") {
        settings.retry.max_attempts = v.max(1);
    }
    if let Some(v) = parsed::<u64>(&env, "APP__RETRY_BASE_DELAY_MS") {
        settings.retry.base_delay = Duration::from_millis(v);
    }
    if let Some(v) = parsed::<u64>(&env, "APP__RETRY_MAX_DELAY_MS") {
        settings.retry.max_delay = Duration::from_millis(v);
    }
    if let Some(v) = parsed::<Language>(&env, "APP__LANGUAGE") {
        settings.language = v;
    }
    if let Some(v) = parsed::<Theme>(&env, "APP__THEME") {
        settings.theme = v;
    }
    if let Some(v) = parsed::<bool>(&env, "APP__GUARD_ROUTES") {
        settings.guard_routes = v;
    }
    if let Some(v) = env("APP__STUDENT_ID").filter(|v| !v.trim().is_empty()) {
        settings.student_id = v;
    }
    if let Some(v) = parsed::<i64>(&env, "APP__TUTOR_STUDENT_ID") {
        settings.tutor_student_id = Some(v);
    }
    if env("NO_COLOR").is_some() {
        settings.color = false;
    }
}

fn parsed<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
