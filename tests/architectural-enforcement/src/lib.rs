//! Architectural Enforcement Integration Tests
//!
//! Source-scanning helpers shared by the tests in `tests/`, which enforce:
//! - No sleep() calls in production code (frame pacing in the TUI excepted)
//! - No UI dependencies in the headless core
//! - No transport code in the TUI
//!
//! Paths are resolved from the workspace root, so the tests give the same
//! answer whatever directory `cargo test` runs them from.

use std::fs;
use std::path::{Path, PathBuf};

/// A line of production code that breaks a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// The offending line, trimmed
    pub line: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line_number, self.line)
    }
}

/// The workspace root (two levels above this package)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Read a workspace file, empty if missing
#[must_use]
pub fn read_workspace_file(relative: &str) -> String {
    fs::read_to_string(workspace_root().join(relative)).unwrap_or_default()
}

/// The code part of a line, without a trailing `//` comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Production lines of a source file: everything before `#[cfg(test)]`
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| (idx + 1, line))
        .collect()
}

/// Find production lines under `dir` whose code matches `pred`
///
/// `allow` gets the file, all of its lines and the 0-based index of the
/// match, and may excuse it.
pub fn scan<P, A>(dir: &str, pred: P, allow: A) -> Vec<Violation>
where
    P: Fn(&str) -> bool,
    A: Fn(&Path, &[&str], usize) -> bool,
{
    let mut violations = Vec::new();

    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let all_lines: Vec<&str> = content.lines().collect();

        for (line_number, line) in production_lines(&content) {
            if pred(code_part(line)) && !allow(&path, &all_lines, line_number - 1) {
                violations.push(Violation {
                    path: path.clone(),
                    line_number,
                    line: line.trim().to_string(),
                });
            }
        }
    }

    violations
}

/// Whether a line calls any kind of sleep
#[must_use]
pub fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Whether a sleep sits in frame pacing code (looks for "frame"/"fps" nearby)
#[must_use]
pub fn is_frame_limiting_context(lines: &[&str], current_idx: usize) -> bool {
    let context_range =
        current_idx.saturating_sub(10)..std::cmp::min(current_idx + 5, lines.len());

    lines[context_range].iter().any(|line| {
        let line = line.to_lowercase();
        line.contains("frame") || line.contains("fps") || line.contains("tick_rate")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_limiting_detection() {
        let code = vec![
            "fn render_loop() {",
            "    let frame_duration = Duration::from_millis(100); // 10 FPS",
            "    loop {",
            "        render();",
            "        tokio::time::sleep(frame_duration).await;",
            "    }",
            "}",
        ];
        assert!(is_frame_limiting_context(&code, 4));

        let code = vec!["fn poll() {", "    tokio::time::sleep(d).await;", "}"];
        assert!(!is_frame_limiting_context(&code, 1));
    }

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n#[cfg(test)]\nmod tests {}\n";
        let lines = production_lines(content);
        assert_eq!(lines, vec![(1, "fn a() {}")]);
    }

    #[test]
    fn test_sleep_call_detection() {
        assert!(is_sleep_call("std::thread::sleep(d);"));
        assert!(is_sleep_call("    tokio::time::sleep(d).await;"));
        assert!(!is_sleep_call(code_part("let x = 1; // sleep(1)")));
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
