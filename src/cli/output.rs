//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::group_thousands;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a plain line (text only, ignored in JSON mode)
    pub fn line(&self, message: &str) {
        if self.format == OutputFormat::Text {
            println!("{}", message);
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Callers normally print text themselves; fall back to pretty JSON
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// Formats a byte count like `1,234,567 bytes (1.18 MB)`
pub fn format_size(bytes: usize) -> String {
    format!("{} bytes ({:.2} MB)", group_thousands(bytes), megabytes(bytes))
}

pub fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Percentage by which `new` is smaller than `original`
pub fn reduction_pct(original: usize, new: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - new as f64 / original as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(1_048_576), "1,048,576 bytes (1.00 MB)");
        assert_eq!(format_size(0), "0 bytes (0.00 MB)");
    }

    #[test]
    fn reduction() {
        assert_eq!(reduction_pct(200, 50), 75.0);
        assert_eq!(reduction_pct(0, 0), 0.0);
        assert!(reduction_pct(100, 120) < 0.0);
    }
}
