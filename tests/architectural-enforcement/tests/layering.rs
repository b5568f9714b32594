//! Integration Test: Layering
//!
//! **Policy**: `wisdom-conductor` is headless. It must not depend on or
//! mention terminal crates, so any surface can drive it. The TUI is a
//! renderer: it reaches the endpoint only through the core.

use architectural_enforcement::{read_workspace_file, scan};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// Dependency names declared in a Cargo manifest, including
/// `[target.'cfg(..)'.*]` tables. An unparsable manifest declares nothing.
fn declared_dependencies(manifest: &str) -> Vec<String> {
    let Ok(manifest) = manifest.parse::<toml::Table>() else {
        return Vec::new();
    };

    let mut tables = vec![&manifest];
    if let Some(targets) = manifest.get("target").and_then(toml::Value::as_table) {
        tables.extend(targets.values().filter_map(toml::Value::as_table));
    }

    tables
        .into_iter()
        .flat_map(|table| {
            DEPENDENCY_TABLES
                .iter()
                .filter_map(move |kind| table.get(*kind).and_then(toml::Value::as_table))
        })
        .flat_map(|deps| deps.keys().cloned())
        .collect()
}

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = read_workspace_file("conductor/core/Cargo.toml");
    assert!(!manifest.is_empty(), "conductor/core/Cargo.toml not found");

    let deps = declared_dependencies(&manifest);
    for ui in UI_CRATES {
        assert!(
            !deps.iter().any(|d| d == ui),
            "wisdom-conductor must not depend on {ui}"
        );
    }
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let violations = scan(
        "conductor/core/src",
        |code| UI_CRATES.iter().any(|ui| code.contains(&format!("{ui}::"))),
        |_, _, _| false,
    );

    assert!(
        violations.is_empty(),
        "UI crates referenced from the core:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_tui_has_no_transport() {
    let manifest = read_workspace_file("tui/Cargo.toml");
    assert!(!manifest.is_empty(), "tui/Cargo.toml not found");
    assert!(
        !declared_dependencies(&manifest).iter().any(|d| d == "reqwest"),
        "wisdom-tui must reach the endpoint through wisdom-conductor"
    );

    let violations = scan("tui/src", |code| code.contains("reqwest::"), |_, _, _| false);
    assert!(violations.is_empty(), "reqwest used in the TUI: {violations:?}");
}

#[test]
fn test_declared_dependencies_parser() {
    let manifest = "[package]\nname = \"x\"\n\n[dependencies]\n# comment\nserde = \"1\"\n\n[dev-dependencies]\ntempfile = \"3\"\n";
    assert_eq!(declared_dependencies(manifest), vec!["serde", "tempfile"]);
}

#[test]
fn test_declared_dependencies_dotted_table() {
    let manifest = "[dependencies.reqwest]\nversion = \"0.12\"\nfeatures = [\"json\"]\n";
    assert_eq!(declared_dependencies(manifest), vec!["reqwest"]);
}

#[test]
fn test_declared_dependencies_workspace_inherited() {
    let manifest = "[dependencies]\nreqwest.workspace = true\nratatui = { workspace = true }\n";
    let deps = declared_dependencies(manifest);
    assert!(deps.iter().any(|d| d == "reqwest"));
    assert!(deps.iter().any(|d| d == "ratatui"));
    assert_eq!(deps.len(), 2);
}

#[test]
fn test_declared_dependencies_target_tables() {
    let manifest = "[target.'cfg(unix)'.dependencies]\ncrossterm = \"0.28\"\n\n[target.'cfg(windows)'.dev-dependencies.ratatui]\nversion = \"0.29\"\n";
    let deps = declared_dependencies(manifest);
    assert!(deps.iter().any(|d| d == "crossterm"));
    assert!(deps.iter().any(|d| d == "ratatui"));
}

#[test]
fn test_declared_dependencies_ignores_other_tables() {
    let manifest = "[package]\nname = \"x\"\n\n[features]\nreqwest = []\n\n[workspace.dependencies]\nratatui = \"0.29\"\n";
    assert!(declared_dependencies(manifest).is_empty());
}
