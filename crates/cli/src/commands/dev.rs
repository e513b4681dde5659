//! Watch mode: regenerate the program when the config file or anything under
//! `sw.public_dir` changes.
//!
//! Changes are detected by polling a fingerprint of modification times and
//! sizes. A rebuild waits until the fingerprint has been stable for the
//! debounce window, and a failed rebuild is logged without stopping the watch.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::Result;
use pwakit_core::config::AppConfig;

use super::generate;

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Default, PartialEq, Eq)]
struct Fingerprint(Vec<(PathBuf, Option<SystemTime>, u64)>);

pub struct Watcher {
    config_file: Option<PathBuf>,
    debounce: Duration,
    public_dir: PathBuf,
    /// Generated artifacts, skipped so our own writes never trigger a rebuild.
    ignore: Vec<PathBuf>,
    seen: Fingerprint,
    changed_at: Option<Instant>,
    rebuilds: usize,
}

impl Watcher {
    pub fn new(config_file: Option<PathBuf>, debounce: Duration) -> Self {
        let mut watcher = Self {
            config_file,
            debounce,
            public_dir: AppConfig::default().sw.public_dir,
            ignore: Vec::new(),
            seen: Fingerprint::default(),
            changed_at: None,
            rebuilds: 0,
        };
        watcher.seen = watcher.scan();
        watcher
    }

    /// Reload the config and regenerate. Returns the report, or `None` when
    /// the rebuild failed (the failure is logged).
    pub fn rebuild(&mut self) -> Option<String> {
        let config = match AppConfig::load_from(self.config_file.as_deref()) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(error = %err, "rebuild failed");
                self.seen = self.scan();
                return None;
            }
        };

        let result = generate::run(&config);
        self.track(&config);
        self.seen = self.scan();

        match result {
            Ok(report) => {
                self.rebuilds += 1;
                tracing::info!(output = %config.sw.output.display(), "rebuilt program");
                Some(report)
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "rebuild failed");
                None
            }
        }
    }

    /// Rescan the watched paths. Returns true once a change has settled for
    /// the debounce window.
    pub fn poll(&mut self, now: Instant) -> bool {
        let current = self.scan();
        if current != self.seen {
            tracing::debug!("change detected");
            self.seen = current;
            self.changed_at = Some(now);
            return false;
        }

        match self.changed_at {
            Some(at) if now.saturating_duration_since(at) >= self.debounce => {
                self.changed_at = None;
                true
            }
            _ => false,
        }
    }

    fn track(&mut self, config: &AppConfig) {
        self.public_dir = fs::canonicalize(&config.sw.public_dir).unwrap_or_else(|_| config.sw.public_dir.clone());
        self.ignore = [&config.sw.output, &config.sw.push_output].into_iter().map(|p| absolute(p)).collect();
    }

    fn scan(&self) -> Fingerprint {
        let mut entries = Vec::new();
        if let Some(file) = &self.config_file {
            stamp(file, &mut entries);
        }
        walk(&self.public_dir, &self.ignore, &mut entries);
        entries.sort();
        Fingerprint(entries)
    }
}

fn stamp(path: &Path, entries: &mut Vec<(PathBuf, Option<SystemTime>, u64)>) {
    if let Ok(meta) = fs::metadata(path) {
        entries.push((path.to_path_buf(), meta.modified().ok(), meta.len()));
    }
}

fn walk(dir: &Path, ignore: &[PathBuf], entries: &mut Vec<(PathBuf, Option<SystemTime>, u64)>) {
    let Ok(read) = fs::read_dir(dir) else {
        return;
    };
    for entry in read.flatten() {
        let path = entry.path();
        if ignore.contains(&path) {
            continue;
        }
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => walk(&path, ignore, entries),
            Ok(_) => stamp(&path, entries),
            Err(_) => {}
        }
    }
}

/// Canonical form of a file path whose file may not exist yet.
fn absolute(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Build once, then rebuild on every settled change until Ctrl+C.
pub async fn run(config_file: Option<PathBuf>) -> Result<String> {
    let mut watcher = Watcher::new(config_file, DEBOUNCE);
    if let Some(report) = watcher.rebuild() {
        println!("{report}");
    }
    tracing::info!(
        config = ?watcher.config_file,
        public_dir = %watcher.public_dir.display(),
        "watching for changes (Ctrl+C to stop)"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if watcher.poll(Instant::now()) {
                    watcher.rebuild();
                }
            }
        }
    }

    Ok(format!("Stopped watching after {} successful builds", watcher.rebuilds))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Site {
        dir: tempfile::TempDir,
        config: PathBuf,
    }

    impl Site {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir_all(dir.path().join("public")).unwrap();
            fs::write(dir.path().join("public/index.html"), "<html>").unwrap();
            let config = dir.path().join("pwakit.toml");
            let site = Self { dir, config };
            site.write_config("*.html");
            site
        }

        fn write_config(&self, precache: &str) {
            let root = self.dir.path().display();
            let text = format!(
                "[sw]\noutput = '{root}/public/sw-program.json'\npush_output = '{root}/public/pwa-push.json'\n\
                 public_dir = '{root}/public'\nprecache = ['{precache}']\n"
            );
            fs::write(&self.config, text).unwrap();
        }

        fn precached(&self) -> Vec<String> {
            let text = fs::read_to_string(self.dir.path().join("public/sw-program.json")).unwrap();
            pwakit_core::Program::from_text(&text).unwrap().precache().urls.clone()
        }
    }

    #[test]
    fn test_own_output_does_not_retrigger() {
        let site = Site::new();
        let mut watcher = Watcher::new(Some(site.config.clone()), DEBOUNCE);

        assert!(watcher.rebuild().is_some());
        assert_eq!(site.precached(), vec!["/index.html"]);

        let now = Instant::now();
        assert!(!watcher.poll(now));
        assert!(!watcher.poll(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_public_dir_change_is_debounced() {
        let site = Site::new();
        let mut watcher = Watcher::new(Some(site.config.clone()), DEBOUNCE);
        watcher.rebuild().unwrap();

        fs::write(site.dir.path().join("public/about.html"), "<p>about</p>").unwrap();
        let now = Instant::now();
        assert!(!watcher.poll(now));
        assert!(!watcher.poll(now + Duration::from_millis(100)));
        assert!(watcher.poll(now + DEBOUNCE));
        assert!(!watcher.poll(now + DEBOUNCE * 2));

        watcher.rebuild().unwrap();
        assert_eq!(site.precached(), vec!["/about.html", "/index.html"]);
    }

    #[test]
    fn test_failed_rebuild_keeps_watching() {
        let site = Site::new();
        let mut watcher = Watcher::new(Some(site.config.clone()), DEBOUNCE);
        watcher.rebuild().unwrap();

        fs::write(&site.config, "origin = 'not a url'\n").unwrap();
        let now = Instant::now();
        assert!(!watcher.poll(now));
        assert!(watcher.poll(now + DEBOUNCE));
        assert!(watcher.rebuild().is_none());

        site.write_config("index.html");
        assert!(!watcher.poll(now + DEBOUNCE * 2));
        assert!(watcher.poll(now + DEBOUNCE * 3));
        assert!(watcher.rebuild().is_some());
        assert_eq!(watcher.rebuilds, 2);
    }
}
