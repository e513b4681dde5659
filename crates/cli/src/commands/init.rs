use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub const DEFAULT_PATH: &str = "pwakit.toml";

const TEMPLATE: &str = r#"# pwakit configuration.
# Every option is optional; the defaults work out of the box.
# Environment variables override this file: PWAKIT_ORIGIN, PWAKIT_SW__OUTPUT, ...

# origin = "http://localhost:8080"
# db_path = "./pwakit-cache.sqlite"

[sw]
# output = "./public/sw-program.json"
# public_dir = "./public"
# precache = ["index.html", "assets/**"]

# Routes are matched in order; the first match handles the request.
# Uncommenting any route replaces the whole default list.
#
# [[sw.routes]]
# match = "/api/**"
# strategy = "NetworkFirst"
# cache = "api-cache"
# max_age = 300
# network_timeout_seconds = 3
#
# [[sw.routes]]
# match = "*.{png,jpg,svg}"
# strategy = "CacheFirst"
# cache = "images"
# max_entries = 100
#
# [[sw.routes]]
# match = "/**"
# strategy = "StaleWhileRevalidate"

[notifications]
# enabled = true
# default_icon = "/icons/icon-192.png"
# badge = "/icons/badge-72.png"
# server_url = ""
# app_id = ""
# api_key = ""
# vapid_public_key = ""
"#;

/// Write the starter config unless a file is already there.
pub fn run(path: &Path) -> Result<String> {
    if path.exists() {
        tracing::warn!(path = %path.display(), "config already exists, skipping");
        return Ok(format!("{} already exists. Skipping.", path.display()));
    }

    fs::write(path, TEMPLATE).with_context(|| format!("writing {}", path.display()))?;
    Ok(format!(
        "Created {}\nNext steps:\n  1. Edit {} to set your origin and routes\n  2. Run `pwakit generate`",
        path.display(),
        path.display()
    ))
}
