//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and the core MUST NOT sleep.
//! Waiting happens on I/O and channels.
//! **Exceptions**: frame pacing in `tui/src/app.rs`, test code.

use architectural_enforcement::{
    is_frame_limiting_context, is_sleep_call, rust_sources, scan, Violation,
};

fn report(violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\nSleep calls found in production code:\n");
    for violation in violations {
        eprintln!("  {violation}");
    }
    eprintln!("\nAcceptable: frame pacing in the TUI event loop, test code.");

    panic!(
        "Found {} sleep violation(s) in production code",
        violations.len()
    );
}

#[test]
fn test_core_never_sleeps() {
    assert!(!rust_sources("conductor/core/src").is_empty());

    let violations = scan("conductor/core/src", is_sleep_call, |_, _, _| false);
    report(&violations);
}

#[test]
fn test_tui_sleeps_only_for_frame_pacing() {
    assert!(!rust_sources("tui/src").is_empty());

    let violations = scan("tui/src", is_sleep_call, |path, lines, idx| {
        path.ends_with("tui/src/app.rs") && is_frame_limiting_context(lines, idx)
    });
    report(&violations);
}

#[test]
fn test_no_thread_sleep_anywhere() {
    let is_thread_sleep = |code: &str| code.contains("thread::sleep");
    let mut violations = scan("conductor/core/src", is_thread_sleep, |_, _, _| false);
    violations.extend(scan("tui/src", is_thread_sleep, |_, _, _| false));
    report(&violations);
}
