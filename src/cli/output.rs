//! Output formatting for CLI commands
//!
//! Provides utilities for formatting command output in human-readable
//! or JSON formats. Supports colored output (respects NO_COLOR env var).

use crate::cli::OutputFormat;

/// Color scheme for CLI output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Style for labels/headers
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Style for chunk ids
    pub fn chunk_id(s: &str) -> ColoredString {
        s.cyan()
    }

    /// Style for file paths
    pub fn file_path(s: &str) -> ColoredString {
        s.blue()
    }

    /// Style for numbers/counts
    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for success messages
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    /// Style for error messages
    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    /// Style for dim/secondary text
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    /// Style for the chat prompt and speaker tags
    pub fn prompt(s: &str) -> ColoredString {
        s.green().bold()
    }
}

/// Format bytes into human-readable size
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Format a millisecond duration into a human-readable string
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms as f64 / 1000.0;
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs - (mins * 60.0);
        format!("{mins:.0}m {remaining_secs:.1}s")
    } else if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{ms}ms")
    }
}

/// Format an RFC 3339 timestamp relative to now ("2h ago")
pub fn format_relative_time(timestamp: &str) -> String {
    let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let duration = chrono::Utc::now().signed_duration_since(parsed);

    if duration.num_seconds() < 0 {
        "in the future".to_string()
    } else if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Print `data` as pretty JSON
pub fn print_json<T: serde::Serialize>(data: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print `data` as JSON, or run `human` for the human format
pub fn print_output<T, F>(data: &T, format: OutputFormat, human: F) -> Result<(), serde_json::Error>
where
    T: serde::Serialize,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Human => {
            human(data);
            Ok(())
        }
        OutputFormat::Json => print_json(data),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}", colors::success(message));
}

/// Print a header/title
pub fn print_header(title: &str) {
    println!("{}", colors::label(title));
}
