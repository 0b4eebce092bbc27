//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use template_lib::{ResourceRequest, Validity};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format millicpus as cores
pub fn format_cpu(millicpus: f64) -> String {
    if millicpus < 0.0 {
        "-".to_string()
    } else if millicpus >= 1000.0 {
        format!("{:.1}", millicpus / 1000.0)
    } else {
        format!("{}m", millicpus)
    }
}

/// Format megabytes as human-readable string
pub fn format_memory(megabytes: f64) -> String {
    if megabytes < 0.0 {
        "-".to_string()
    } else if megabytes >= 1024.0 {
        format!("{:.2}Gi", megabytes / 1024.0)
    } else {
        format!("{}Mi", megabytes)
    }
}

/// Format gigabytes of VRAM
pub fn format_vram(gigabytes: f64) -> String {
    if gigabytes < 0.0 {
        "-".to_string()
    } else {
        format!("{}Gi", gigabytes)
    }
}

/// Format a GPU count; the no-trainings sentinel prints as `-`
pub fn format_gpus(gpus: i64) -> String {
    if gpus < 0 {
        "-".to_string()
    } else {
        gpus.to_string()
    }
}

/// One-line summary of a resource request
pub fn format_request(request: &ResourceRequest) -> String {
    format!(
        "cpu {} / mem {} / gpu {} / vram {}",
        format_cpu(request.cpus),
        format_memory(request.memory),
        format_gpus(request.gpus),
        format_vram(request.vram)
    )
}

/// Color a verdict
pub fn color_validity(validity: Validity) -> String {
    let label = validity.as_str();
    match validity {
        Validity::Success => label.green().to_string(),
        Validity::Warning => label.yellow().to_string(),
        Validity::Error => label.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cpu() {
        assert_eq!(format_cpu(100.0), "100m");
        assert_eq!(format_cpu(2500.0), "2.5");
        assert_eq!(format_cpu(-1.0), "-");
    }

    #[test]
    fn test_format_memory() {
        assert_eq!(format_memory(256.0), "256Mi");
        assert_eq!(format_memory(2048.0), "2.00Gi");
        assert_eq!(format_memory(-1.0), "-");
    }

    #[test]
    fn test_format_request() {
        let request = ResourceRequest::new(10.0, 1, 256.0, 0.0);
        assert_eq!(format_request(&request), "cpu 10m / mem 256Mi / gpu 1 / vram 0Gi");
    }
}
