use anyhow::{Context, Result};
use pwakit_core::Program;
use pwakit_core::config::AppConfig;

/// Report which route handles `input` (a path or an absolute URL).
pub fn run(config: &AppConfig, input: &str) -> Result<String> {
    let program = Program::compile(config, Vec::new()).context("compiling routes")?;
    let path = request_path(input);

    let Some(route) = program.route_for(&path) else {
        return Ok(format!("{path}: no route matches; the request passes through"));
    };

    let mut report = format!(
        "{path}: route {} ({}) -> {}",
        route.index,
        route.pattern.as_str(),
        route.rule.strategy
    );
    if route.rule.strategy.uses_store() {
        report.push_str(&format!(" [{}]", route.cache_name));
    }

    let shadowed: Vec<String> = program
        .routes()
        .iter()
        .skip(route.index + 1)
        .filter(|later| later.matches(&path))
        .map(|later| format!("{} ({})", later.index, later.pattern.as_str()))
        .collect();
    if !shadowed.is_empty() {
        report.push_str(&format!("\n  also matches, never consulted: {}", shadowed.join(", ")));
    }

    Ok(report)
}

fn request_path(input: &str) -> String {
    match pwakit_core::Request::get(input) {
        Ok(request) => request.path().to_string(),
        Err(_) => {
            let path = input.split(['?', '#']).next().unwrap_or_default();
            if path.starts_with('/') { path.to_string() } else { format!("/{path}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_and_shadowed() {
        let report = run(&AppConfig::default(), "/api/users").unwrap();
        assert!(report.starts_with("/api/users: route 0 (/api/**) -> NetworkFirst [api-cache]"));
        assert!(report.contains("also matches, never consulted: 3 (/**)"));
    }

    #[test]
    fn test_image_under_any_directory() {
        let report = run(&AppConfig::default(), "https://example.com/img/logo.png?v=2").unwrap();
        assert!(report.starts_with("/img/logo.png: route 1"));
        assert!(report.contains("CacheFirst [images]"));
    }

    #[test]
    fn test_no_match_passes_through() {
        let mut config = AppConfig::default();
        config.sw.routes = vec![pwakit_core::Rule::new("/api/**", pwakit_core::StrategyKind::NetworkOnly)];

        let report = run(&config, "about").unwrap();
        assert_eq!(report, "/about: no route matches; the request passes through");
    }

    #[test]
    fn test_request_path_strips_query() {
        assert_eq!(request_path("/a.png?x=1#top"), "/a.png");
        assert_eq!(request_path("https://example.com/b"), "/b");
    }
}
