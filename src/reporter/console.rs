use colored::Colorize;

use crate::models::{ProbeResult, ScanConfig, ScanReport};

pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self, target: &str, config: &ScanConfig, words: usize) {
        println!("{} {}", "Target:".bold(), target.white().bold());
        println!(
            "{} {} words, {} threads, {}s timeout",
            "Config:".bold(),
            words,
            config.threads,
            config.timeout_secs
        );
        if !config.extensions.is_empty() {
            println!("{} {}", "Extensions:".bold(), config.extensions.join(", "));
        }
        if config.recursive {
            let depth = if config.recursion_depth == 0 {
                "unlimited".to_string()
            } else {
                config.recursion_depth.to_string()
            };
            println!("{} depth {}", "Recursive:".bold(), depth);
        }
        println!();
    }

    /// One line per finding, colored by status class.
    pub fn format_result(result: &ProbeResult) -> String {
        let status = match result.status {
            200..=299 => result.status.to_string().green(),
            300..=399 => result.status.to_string().cyan(),
            401 | 403 => result.status.to_string().yellow(),
            500..=599 => result.status.to_string().red(),
            _ => result.status.to_string().normal(),
        };

        let mut line = format!("[{}] {:>8}  {}", status, format_size(result.size), result.url);
        if let Some(redirect) = &result.redirect {
            line.push_str(&format!("  -> {}", redirect.dimmed()));
        }
        if result.is_directory {
            line.push_str(&format!("  {}", "(dir)".blue()));
        }
        line
    }

    pub fn print_results(&self, results: &[ProbeResult]) {
        if results.is_empty() {
            return;
        }

        println!("\n{}", "Findings".bold().underline());
        let mut sorted: Vec<&ProbeResult> = results.iter().collect();
        sorted.sort_by(|a, b| a.url.cmp(&b.url));
        for result in sorted {
            println!("{}", Self::format_result(result));
        }
    }

    pub fn print_important(&self, report: &ScanReport) {
        if report.important.is_empty() {
            return;
        }

        println!("\n{}", "High-priority paths".bold().underline());
        let mut important: Vec<_> = report.important.iter().collect();
        important.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.url.cmp(&b.url)));
        for item in important {
            let priority = if item.priority >= 90 {
                item.priority.to_string().red().bold()
            } else {
                item.priority.to_string().yellow()
            };
            println!("  [{}] {} ({})", priority, item.url, item.rules.join(", "));
            if !item.description.is_empty() {
                println!("        {}", item.description.dimmed());
            }
        }
    }

    pub fn print_summary(&self, report: &ScanReport) {
        let stats = &report.statistics;

        println!("\n{}", "Summary".bold().underline());
        println!(
            "{} requests in {:.2}s ({:.1} req/s)",
            stats.total_requests,
            stats.duration_ms as f64 / 1000.0,
            stats.requests_per_second()
        );
        println!("  {}: {}", "Found".green(), stats.successful_requests);
        println!("  {}: {}", "Filtered".cyan(), stats.filtered_results);
        if stats.failed_requests > 0 {
            println!("  {}: {}", "Failed".red(), stats.failed_requests);
        }
        let directories = report.directories().count();
        if directories > 0 {
            println!("  {}: {}", "Directories".blue(), directories);
        }
        if report.cancelled {
            println!("  {}", "Scan cancelled, results are partial".yellow());
        }
        println!();
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.1}MB", b / (KB * KB))
    } else if b >= KB {
        format!("{:.1}KB", b / KB)
    } else {
        format!("{}B", bytes)
    }
}
