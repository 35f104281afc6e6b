//! Terminal output formatting.
//!
//! Human-facing output with colors; everything machine-facing goes
//! through the storage and export paths instead.

use crate::scanner::ScanSummary;
use crate::types::{AuthResult, ScanId};
use console::style;
use std::path::Path;

/// Print the banner shown before a scan starts.
pub fn print_scan_header(scan_id: &ScanId, workers: usize, hosts: usize, tasks: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("Mailsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Scan ID: {}",
        style("•").dim(),
        style(scan_id.short()).dim()
    );
    println!(
        "{} Workers: {}",
        style("•").dim(),
        style(workers).white().bold()
    );
    println!(
        "{} Probing {} hosts ({} tasks)...",
        style("•").dim(),
        style(hosts).white().bold(),
        style(tasks).white().bold()
    );
    println!();
}

/// Print one verified credential as it arrives.
pub fn print_found(count: usize, result: &AuthResult) {
    println!(
        "{} {} - {} - #{}",
        style("[FOUND]").green().bold(),
        style(&result.host).white().bold(),
        result.username,
        count
    );
}

/// Print the end-of-scan summary banner.
pub fn print_summary(summary: &ScanSummary, raw_path: &Path, report_path: &Path) {
    let rule = "═".repeat(63);

    println!();
    println!("{}", style(&rule).cyan());
    println!(
        "                    {} Scan Summary",
        style("Mailsweep").cyan().bold()
    );
    println!("{}", style(&rule).cyan());
    println!();
    println!(
        "  {} {} tasks in {:.2}s with {} workers",
        style("Processed:").bold(),
        summary.tasks_total,
        summary.elapsed.as_secs_f64(),
        summary.workers
    );
    println!(
        "  {} {} working authenticated server{}",
        style("Found:").bold(),
        if summary.found > 0 {
            style(summary.found).green().bold()
        } else {
            style(summary.found).dim()
        },
        if summary.found == 1 { "" } else { "s" }
    );

    if summary.found > 0 {
        println!();
        println!(
            "  {} {}",
            style("Report:").bold(),
            report_path.display()
        );
        println!("  {} {}", style("Raw log:").bold(), raw_path.display());
    }

    println!();
    println!("{}", style(&rule).cyan());
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding an
/// ellipsis if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // Replacement characters from lossy banner decodes must not panic.
        let s = "bannér�with�junk";
        let t = truncate_string(s, 10);
        assert!(t.ends_with("..."));
    }
}
