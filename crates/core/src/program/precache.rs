//! Resolve precache glob patterns into site-relative URLs.
//!
//! Patterns are relative to the static asset directory and always anchored
//! at its root: `index.html` means `/index.html`, not any `index.html`.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::RouteError;
use crate::pattern::Pattern;
use crate::Error;

/// Walk `public_dir` and return the URLs of every file matching any pattern,
/// sorted and de-duplicated.
pub fn resolve_precache(patterns: &[String], public_dir: &Path) -> Result<Vec<String>, Error> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let compiled = compile_anchored(patterns)?;
    let mut urls = BTreeSet::new();
    let mut pending = vec![public_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let Some(url) = site_path(public_dir, &path) else {
                tracing::warn!(path = %path.display(), "skipping non UTF-8 path during precache resolution");
                continue;
            };
            if compiled.iter().any(|p| p.matches(&url)) {
                urls.insert(url);
            }
        }
    }

    tracing::debug!(count = urls.len(), dir = %public_dir.display(), "resolved precache manifest");
    Ok(urls.into_iter().collect())
}

fn compile_anchored(patterns: &[String]) -> Result<Vec<Pattern>, Error> {
    let mut compiled = Vec::with_capacity(patterns.len());
    let mut errors = Vec::new();

    for (index, raw) in patterns.iter().enumerate() {
        let trimmed = raw.trim_start_matches("./");
        let anchored = if trimmed.starts_with('/') { trimmed.to_string() } else { format!("/{trimmed}") };
        match Pattern::compile(&anchored) {
            Ok(pattern) => compiled.push(pattern),
            Err(e) => errors.push(RouteError { index, pattern: raw.clone(), reason: e.to_string() }),
        }
    }

    if errors.is_empty() { Ok(compiled) } else { Err(Error::InvalidRoutes(errors)) }
}

/// `<public_dir>/assets/app.js` -> `/assets/app.js`
fn site_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut url = String::new();
    for component in relative.components() {
        url.push('/');
        url.push_str(component.as_os_str().to_str()?);
    }
    Some(url)
}
