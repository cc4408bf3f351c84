//! Panic hook printing a structured crash report.
//!
//! The report names the generation phase, the file and the history source
//! that were active, followed by the panic message and location.

use super::context::{get_current_context, GenerationContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WIDTH: usize = 76;

/// Install the crash report hook. Call once, early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();

    eprintln!();
    print_rule('╔', '╗');
    print_row("COMPATGEN CRASH REPORT");
    print_rule('╠', '╣');
    print_row(&format!("Version: {VERSION}"));
    print_row(&format!("Platform: {}", std::env::consts::OS));
    print_row(&format!(
        "Time: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    print_rule('╠', '╣');
    print_panic_details(info);
    print_rule('╠', '╣');
    print_context_section(&context);
    print_rule('╠', '╣');
    print_backtrace_section();
}

fn print_panic_details(info: &PanicHookInfo<'_>) {
    print_row(&format!("PANIC: {}", extract_panic_message(info)));
    if let Some(location) = info.location() {
        print_row(&format!(
            "Location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ));
    }
}

fn print_context_section(context: &GenerationContext) {
    print_row("OPERATION CONTEXT:");
    match &context.phase {
        Some(phase) => print_row(&format!("  Phase: {phase}")),
        None => print_row("  Phase: (not set - crash occurred before generation started)"),
    }

    if let Some(metadata) = Span::current().metadata() {
        print_row(&format!("  Span: {}", metadata.name()));
    }
    if let Some(file) = &context.current_file {
        print_row(&format!("  File: {}", file.display()));
    }
    if let Some(source) = &context.history_source {
        print_row(&format!("  History: {source}"));
    }
}

fn print_backtrace_section() {
    if std::env::var("RUST_BACKTRACE").is_ok() {
        print_row("STACK TRACE:");
        print_rule('╚', '╝');
        eprintln!();
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        print_row("Run with RUST_BACKTRACE=1 for stack trace");
        print_rule('╚', '╝');
    }
}

fn print_rule(left: char, right: char) {
    eprintln!("{left}{}{right}", "═".repeat(WIDTH + 2));
}

fn print_row(text: &str) {
    eprintln!("║ {:<WIDTH$} ║", truncate(text, WIDTH));
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}
