use std::fmt::Write;

use anyhow::{Context, Result};
use pwakit_core::config::AppConfig;
use pwakit_core::{CompiledRoute, Program};

/// Compile the config and render the route table.
pub fn run(config: &AppConfig) -> Result<String> {
    let program = Program::build(config).context("compiling routes")?;

    let mut out = format!("Origin: {}\n\n", program.origin());
    writeln!(
        out,
        "{:<3} {:<28} {:<22} {:<24} {:>9} {:>11} {:>8}",
        "#", "match", "strategy", "cache", "max_age", "max_entries", "timeout"
    )?;
    for route in program.routes() {
        writeln!(out, "{}", row(route))?;
    }

    write!(
        out,
        "\nPrecache: {} files into {}\nNotifications: {}",
        program.precache().urls.len(),
        program.precache().cache_name,
        if program.notifications().enabled { "enabled" } else { "disabled" }
    )?;
    Ok(out)
}

fn row(route: &CompiledRoute) -> String {
    let rule = &route.rule;
    let cache = if rule.strategy.uses_store() { route.cache_name.as_str() } else { "-" };
    let max_age = rule.max_age_seconds.map_or_else(|| "-".to_string(), |s| format!("{s}s"));
    let max_entries = rule.max_entries.map_or_else(|| "-".to_string(), |n| n.to_string());
    let strategy = rule.strategy.to_string();
    let timeout = match rule.strategy {
        pwakit_core::StrategyKind::NetworkFirst => format!("{}ms", rule.network_timeout().as_millis()),
        _ => "-".to_string(),
    };

    format!(
        "{:<3} {:<28} {:<22} {:<24} {:>9} {:>11} {:>8}",
        route.index,
        route.pattern.as_str(),
        strategy,
        cache,
        max_age,
        max_entries,
        timeout
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_lists_default_routes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.sw.public_dir = dir.path().to_path_buf();

        let report = run(&config).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].starts_with("Origin: http://localhost:8080"));
        assert!(lines[3].contains("/api/**") && lines[3].contains("NetworkFirst") && lines[3].contains("3000ms"));
        assert!(lines[6].contains("/**") && lines[6].contains("rt-stalewhilerevalidate"));
        assert!(report.contains("Precache: 0 files into precache-v1"));
    }

    #[test]
    fn test_check_reports_bad_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.sw.public_dir = dir.path().to_path_buf();
        config.sw.routes = vec![pwakit_core::Rule::new("/{a,b", pwakit_core::StrategyKind::CacheOnly)];

        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("/{a,b"));
    }
}
