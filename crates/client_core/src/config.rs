use std::{collections::HashMap, fs, path::Path};

use tracing::warn;

use crate::form::SubmitPolicy;

pub const DEFAULT_API_URL: &str = "https://koders-list-api.vercel.app";
pub const SETTINGS_FILE: &str = "koders.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub submit_policy: SubmitPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            submit_policy: SubmitPolicy::default(),
        }
    }
}

pub fn load_client_settings() -> ClientSettings {
    load_client_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_client_settings_from(path: &Path) -> ClientSettings {
    let file_cfg = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<HashMap<String, String>>(&raw).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            HashMap::new()
        }),
        Err(_) => HashMap::new(),
    };
    resolve_client_settings(&file_cfg, |name| std::env::var(name).ok())
}

/// Defaults, then file values, then environment; `APP__*` names win over the
/// short names. Unknown submit policies are logged and ignored.
pub fn resolve_client_settings(
    file_cfg: &HashMap<String, String>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(v) = file_cfg.get("api_url") {
        settings.api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("submit_policy") {
        apply_policy(&mut settings, v);
    }

    for name in ["KODERS_API_URL", "APP__API_URL"] {
        if let Some(v) = env(name).filter(|v| !v.trim().is_empty()) {
            settings.api_url = v;
        }
    }
    if let Some(v) = env("APP__SUBMIT_POLICY") {
        apply_policy(&mut settings, &v);
    }

    settings.api_url = settings.api_url.trim().trim_end_matches('/').to_string();
    settings
}

fn apply_policy(settings: &mut ClientSettings, raw: &str) {
    match raw.parse() {
        Ok(policy) => settings.submit_policy = policy,
        Err(err) => warn!(%err, "keeping submit policy {}", settings.submit_policy),
    }
}
