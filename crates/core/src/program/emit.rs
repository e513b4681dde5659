//! Write program artifacts to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Program;
use crate::config::{NotificationsConfig, SwConfig};
use crate::Error;

/// Push-backend connection fields for the client-side subscription flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushConfig {
    pub server_url: String,
    pub app_id: String,
    pub api_key: String,
    pub vapid_public_key: String,
}

impl PushConfig {
    /// Side-file contents, or None when no backend field is set.
    pub fn from_notifications(notifications: &NotificationsConfig) -> Option<Self> {
        notifications.has_push_backend().then(|| Self {
            server_url: notifications.server_url.clone(),
            app_id: notifications.app_id.clone(),
            api_key: notifications.api_key.clone(),
            vapid_public_key: notifications.vapid_public_key.clone(),
        })
    }
}

/// Paths written by [`emit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub program: PathBuf,
    pub push: Option<PathBuf>,
}

/// Write the program text to `sw.output`, and the push side file to
/// `sw.push_output` when any push-backend field is set.
pub fn emit(program: &Program, sw: &SwConfig) -> Result<Emitted, Error> {
    write_creating_dirs(&sw.output, &program.to_text()?)?;
    tracing::info!(path = %sw.output.display(), routes = program.routes().len(), "wrote route program");

    let push = match PushConfig::from_notifications(program.notifications()) {
        Some(push) => {
            let json = serde_json::to_string_pretty(&push).map_err(|e| Error::Program(e.to_string()))?;
            write_creating_dirs(&sw.push_output, &json)?;
            tracing::info!(path = %sw.push_output.display(), "wrote push backend config");
            Some(sw.push_output.clone())
        }
        None => None,
    };

    Ok(Emitted { program: sw.output.clone(), push })
}

fn write_creating_dirs(path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn sw_in(dir: &Path) -> SwConfig {
        SwConfig {
            output: dir.join("out/sw-program.json"),
            push_output: dir.join("out/pwa-push.json"),
            public_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_emit_program_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let program = Program::compile(&config, vec!["/index.html".into()]).unwrap();
        let sw = sw_in(dir.path());

        let emitted = emit(&program, &sw).unwrap();
        assert_eq!(emitted.push, None);
        assert!(!sw.push_output.exists());

        let text = fs::read_to_string(&emitted.program).unwrap();
        let loaded = Program::from_text(&text).unwrap();
        assert_eq!(loaded.precache().urls, vec!["/index.html"]);
    }

    #[test]
    fn test_emit_push_side_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.notifications.server_url = "https://push.example.com".into();
        config.notifications.vapid_public_key = "BPkey".into();
        let program = Program::compile(&config, Vec::new()).unwrap();

        let emitted = emit(&program, &sw_in(dir.path())).unwrap();
        let push_path = emitted.push.unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(push_path).unwrap()).unwrap();
        assert_eq!(json["serverUrl"], "https://push.example.com");
        assert_eq!(json["vapidPublicKey"], "BPkey");
        assert_eq!(json["appId"], "");
    }
}
