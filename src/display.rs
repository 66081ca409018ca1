//! Terminal rendering for drive reports

use colored::*;

use crate::config::DisplayConfig;
use crate::disk::DriveEntry;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with 1024-based units, e.g. `465.76 GB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// How full a drive is relative to the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Normal,
    Warning,
    Danger,
}

impl UsageLevel {
    pub fn from_percent(percent: f64, config: &DisplayConfig) -> Self {
        if percent >= config.danger_percent {
            Self::Danger
        } else if percent >= config.warning_percent {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "OK",
            Self::Warning => "Attention",
            Self::Danger => "Warning",
        }
    }
}

fn colored_usage(text: String, level: UsageLevel) -> ColoredString {
    match level {
        UsageLevel::Normal => text.bright_green(),
        UsageLevel::Warning => text.bright_yellow(),
        UsageLevel::Danger => text.bright_red(),
    }
}

/// Render drives as a fixed-width table.
pub fn render_table(drives: &[DriveEntry], config: &DisplayConfig) -> String {
    if drives.is_empty() {
        return format!("{}", "No drive data available yet.".bright_yellow());
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{}\n",
        format!(
            "{:<6} {:<8} {:<15} {:>12} {:>12} {:>12} {:>8}  {:<10} {:<16} {}",
            "Drive", "FS", "Type", "Total", "Used", "Free", "Use%", "Status", "Vendor", "Model"
        )
        .bold()
    ));

    for drive in drives {
        let percent = drive.usage_percent();
        let level = UsageLevel::from_percent(percent, config);
        output.push_str(&format!(
            "{:<6} {:<8} {:<15} {:>12} {:>12} {:>12} {:>8}  {:<10} {:<16} {}\n",
            drive.drive().bright_cyan(),
            drive.file_system(),
            drive.type_label(),
            format_bytes(drive.total_bytes()),
            format_bytes(drive.used_bytes()),
            format_bytes(drive.free_bytes()),
            colored_usage(format!("{:.2}%", percent), level),
            colored_usage(level.label().to_string(), level),
            drive.vendor(),
            drive.model(),
        ));

        if drive.serial() != "Unknown" || drive.interface_type() != "Unknown" {
            output.push_str(&format!(
                "       {} {}  {} {}  {} {}\n",
                "Serial:".dimmed(),
                drive.serial(),
                "Interface:".dimmed(),
                drive.interface_type(),
                "Media:".dimmed(),
                drive.media_type(),
            ));
        }
    }

    output
}
