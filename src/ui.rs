//! Terminal output helpers for the CLI

use console::style;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("WARN:").yellow().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

pub fn display_resolved_version(branch: &str, version: &str) {
    println!(
        "{} {} {}",
        style(branch).bold(),
        style("→").dim(),
        style(version).green().bold()
    );
}

pub fn display_published(tag: &str, remote: &str) {
    println!(
        "{} Published tag {} to {}",
        style("✓").green(),
        style(tag).green().bold(),
        style(remote).bold()
    );
}
