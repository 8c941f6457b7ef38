//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print brand info.
    pub fn brand_info(brand: &str, entries: u32) {
        println!(
            "  {} {} ({} entries)",
            style("*").cyan(),
            style(brand).bold(),
            entries
        );
    }

    /// Print search result.
    pub fn search_result(name: &str, reference: &str, score: f32, description: &str) {
        println!(
            "\n{} {} {} (score: {:.2})",
            style(">>").green(),
            style(name).bold(),
            style(reference).cyan(),
            score
        );
        println!("   {}", content_preview(description, 200));
    }

    /// Print price provenance.
    pub fn provenance(raw: &str, source: Option<&str>) {
        println!("  {} {:?}", style("evidence:").dim(), raw);
        if let Some(source) = source {
            println!("  {} {}", style("source:").dim(), source);
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.len() <= max_len {
        content
    } else {
        format!("{}...", &content[..max_len])
    }
}
