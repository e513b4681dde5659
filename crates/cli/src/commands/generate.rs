use anyhow::{Context, Result};
use pwakit_core::Program;
use pwakit_core::config::AppConfig;
use pwakit_core::program::emit;

/// Compile the config and write both artifacts.
pub fn run(config: &AppConfig) -> Result<String> {
    let program = Program::build(config).context("compiling routes")?;
    let emitted = emit(&program, &config.sw).context("writing artifacts")?;

    let mut report = format!(
        "Generated route program:\n  Program: {}\n  Routes: {}\n  Precache: {} files",
        emitted.program.display(),
        program.routes().len(),
        program.precache().urls.len()
    );
    if let Some(push) = emitted.push {
        report.push_str(&format!("\n  Push config: {}", push.display()));
    }
    Ok(report)
}
