use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "academy.toml";
pub const DEFAULT_REFRESH_CHECK_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    /// `None` keeps the session in memory only.
    pub session_file: Option<PathBuf>,
    pub auto_refresh: bool,
    pub refresh_check_secs: u64,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            session_file: default_session_file(),
            auto_refresh: true,
            refresh_check_secs: DEFAULT_REFRESH_CHECK_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    session_file: Option<PathBuf>,
    auto_refresh: Option<bool>,
    refresh_check_secs: Option<u64>,
}

pub fn default_session_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("redconsult_academy").join("session.json"))
}

/// Defaults, then `config_path` (or `academy.toml` in the working directory),
/// then the process environment.
pub fn load_settings(config_path: Option<&Path>) -> IdentitySettings {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    load_settings_with(path, |name| std::env::var(name).ok())
}

pub fn load_settings_with(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> IdentitySettings {
    let mut settings = IdentitySettings::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.supabase_url {
                    settings.supabase_url = Some(v);
                }
                if let Some(v) = file_cfg.supabase_anon_key {
                    settings.supabase_anon_key = Some(v);
                }
                if let Some(v) = file_cfg.session_file {
                    settings.session_file = Some(v);
                }
                if let Some(v) = file_cfg.auto_refresh {
                    settings.auto_refresh = v;
                }
                if let Some(v) = file_cfg.refresh_check_secs {
                    settings.refresh_check_secs = v;
                }
            }
            Err(err) => {
                warn!(path = %config_path.display(), "ignoring unreadable config file: {err}");
            }
        },
        Err(_) => {
            info!(path = %config_path.display(), "no config file, using environment only");
        }
    }

    let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    for name in ["VITE_SUPABASE_URL", "SUPABASE_URL", "APP__SUPABASE_URL"] {
        if let Some(v) = env(name) {
            settings.supabase_url = Some(v);
        }
    }
    for name in [
        "VITE_SUPABASE_ANON_KEY",
        "SUPABASE_ANON_KEY",
        "APP__SUPABASE_ANON_KEY",
    ] {
        if let Some(v) = env(name) {
            settings.supabase_anon_key = Some(v);
        }
    }

    if let Some(v) = env("APP__SESSION_FILE") {
        settings.session_file = Some(PathBuf::from(v));
    }
    if let Some(v) = env("APP__AUTO_REFRESH") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => settings.auto_refresh = true,
            "0" | "false" | "no" | "off" => settings.auto_refresh = false,
            other => warn!(value = other, "APP__AUTO_REFRESH is not a boolean; ignoring"),
        }
    }
    if let Some(v) = env("APP__REFRESH_CHECK_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.refresh_check_secs = parsed.max(1);
        }
    }

    settings
}

impl IdentitySettings {
    /// Problems that will make requests fail later. None of them stop startup.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        match self.supabase_url.as_deref() {
            None => problems.push("identity service URL is missing".to_string()),
            Some(raw) => {
                if let Err(err) = url::Url::parse(raw) {
                    problems.push(format!("identity service URL '{raw}' is invalid: {err}"));
                }
            }
        }
        if self.supabase_anon_key.is_none() {
            problems.push("identity service access key is missing".to_string());
        }
        problems
    }

    pub fn log_summary(&self) {
        info!(
            "URL: {}",
            self.supabase_url.as_deref().unwrap_or("<unset>")
        );
        info!(
            "KEY: {}",
            if self.supabase_anon_key.is_some() {
                "OK"
            } else {
                "MISSING"
            }
        );
        for problem in self.problems() {
            warn!("{problem}; authentication requests will fail");
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
