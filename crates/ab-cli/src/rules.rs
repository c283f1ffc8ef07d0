use std::fs;
use std::path::Path;
use std::time::Instant;

use ab_compiler::{compile_rule_set, CompileOptions, LoadReport};
use ab_core::RuleSet;

#[derive(Debug, Clone)]
pub struct CompileStats {
    pub read_ms: f64,
    pub compile_ms: f64,
    pub bytes: usize,
}

pub fn read_rules(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

/// Read and compile a rule list file.
pub fn compile_file(
    path: &Path,
    options: &CompileOptions,
) -> Result<(RuleSet, LoadReport, CompileStats), String> {
    let start = Instant::now();
    let json = read_rules(path)?;
    let read_ms = start.elapsed().as_secs_f64() * 1000.0;

    let compile_start = Instant::now();
    let (rule_set, report) = compile_rule_set(&json, options)
        .map_err(|e| format!("Failed to compile '{}': {}", path.display(), e))?;
    let compile_ms = compile_start.elapsed().as_secs_f64() * 1000.0;

    log::debug!(
        "compiled '{}': {} rules in {:.1}ms",
        path.display(),
        report.rules,
        compile_ms
    );

    let stats = CompileStats {
        read_ms,
        compile_ms,
        bytes: json.len(),
    };
    Ok((rule_set, report, stats))
}

/// One URL per line; blank lines and `#` comments are skipped.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;

    let urls: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(format!("No URLs in '{}'", path.display()));
    }
    Ok(urls)
}
