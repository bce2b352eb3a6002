use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::Directory;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "booking.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub directory_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            directory_path: None,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    directory: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

/// Defaults, then the TOML file at `path` if it exists, then environment variables.
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!("ignoring unparsable settings file '{}': {err}", path.display()),
        }
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.directory {
        settings.directory_path = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BOOKING_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("BOOKING_DIRECTORY") {
        settings.directory_path = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup("APP__DIRECTORY") {
        settings.directory_path = Some(PathBuf::from(v));
    }

    if let Some(v) = lookup("BOOKING_REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(err) => warn!("ignoring BOOKING_REQUEST_TIMEOUT_SECS={v}: {err}"),
        }
    }
}

pub fn load_directory(path: &Path) -> anyhow::Result<Directory> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read doctor directory '{}'", path.display()))?;
    let directory = Directory::from_json_str(&raw)
        .with_context(|| format!("invalid doctor directory '{}'", path.display()))?;
    Ok(directory)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn unparsable_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("booking.toml");
        fs::write(&path, "request_timeout_secs = [").expect("write settings");

        let settings = load_settings_from(&path);
        assert_eq!(settings.request_timeout_secs, 10);
    }

    #[test]
    fn no_env_leaves_settings_untouched() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |_| None);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("booking.toml");
        fs::write(
            &path,
            "server_url = \"http://clinic.local:8080\"\ndirectory = \"doctors.json\"\nrequest_timeout_secs = 3\n",
        )
        .expect("write settings");

        let raw = fs::read_to_string(&path).expect("read settings");
        let mut settings = Settings::default();
        apply_file_settings(&mut settings, toml::from_str(&raw).expect("parse"));

        assert_eq!(settings.server_url, "http://clinic.local:8080");
        assert_eq!(settings.directory_path, Some(PathBuf::from("doctors.json")));
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn env_overrides_win_and_app_prefix_wins_last() {
        let env = HashMap::from([
            ("BOOKING_SERVER_URL", "http://a.example"),
            ("APP__SERVER_URL", "http://b.example"),
            ("BOOKING_DIRECTORY", "/etc/booking/doctors.json"),
            ("BOOKING_REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]);
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.server_url, "http://b.example");
        assert_eq!(
            settings.directory_path,
            Some(PathBuf::from("/etc/booking/doctors.json"))
        );
        assert_eq!(settings.request_timeout_secs, 10);
    }

    #[test]
    fn loads_directory_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doctors.json");
        fs::write(&path, r#"{"Cardiology": {"Dr. Yates": {}, "Dr. Brown": {}}}"#)
            .expect("write directory");

        let directory = load_directory(&path).expect("directory");
        assert_eq!(directory.doctors("Cardiology"), ["Dr. Yates", "Dr. Brown"]);
    }

    #[test]
    fn directory_errors_name_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doctors.json");
        fs::write(&path, "[1, 2]").expect("write directory");

        let err = load_directory(&path).expect_err("must fail");
        assert!(format!("{err:#}").contains("doctors.json"));
        assert!(load_directory(&dir.path().join("missing.json")).is_err());
    }
}
