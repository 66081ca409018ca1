//! Drive type codes and vendor inference

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Win32 drive type as reported by `Win32_LogicalDisk.DriveType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveType {
    Unknown,
    NoRootDirectory,
    Removable,
    Local,
    Network,
    Optical,
    RamDisk,
}

impl DriveType {
    /// Map a raw drive type code; anything outside 0..=6 is `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::NoRootDirectory,
            2 => Self::Removable,
            3 => Self::Local,
            4 => Self::Network,
            5 => Self::Optical,
            6 => Self::RamDisk,
            _ => Self::Unknown,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::NoRootDirectory => 1,
            Self::Removable => 2,
            Self::Local => 3,
            Self::Network => 4,
            Self::Optical => 5,
            Self::RamDisk => 6,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::NoRootDirectory => "No Root Directory",
            Self::Removable => "Removable Disk",
            Self::Local => "Local Disk",
            Self::Network => "Network Drive",
            Self::Optical => "Optical Drive",
            Self::RamDisk => "RAM Disk",
        }
    }
}

/// Label for a raw drive type code. Total: unknown codes get "Unknown".
pub fn classify_drive_type(code: i64) -> &'static str {
    DriveType::from_code(code).label()
}

/// Lowercase alias → canonical vendor name.
///
/// Includes model prefixes and retired brand names seen in disk captions.
/// Entries with a trailing space or hyphen only match as a separate word
/// prefix (`"st "` would otherwise hit every caption containing "st").
const VENDOR_ALIASES: &[(&str, &str)] = &[
    ("western digital", "Western Digital"),
    ("wdc", "Western Digital"),
    ("wd ", "Western Digital"),
    ("wd-", "Western Digital"),
    ("seagate", "Seagate"),
    ("st ", "Seagate"),
    ("samsung", "Samsung"),
    ("intel", "Intel"),
    ("kingston", "Kingston"),
    ("crucial", "Crucial"),
    ("sandisk", "SanDisk"),
    ("toshiba", "Toshiba"),
    ("hitachi", "Hitachi"),
    ("hgst", "HGST"),
    ("micron", "Micron"),
    ("sk hynix", "SK hynix"),
    ("hynix", "SK hynix"),
    ("adata", "ADATA"),
    ("apacer", "Apacer"),
    ("plextor", "Plextor"),
    ("patriot", "Patriot"),
    ("pny", "PNY"),
    ("teamgroup", "TEAMGROUP"),
    ("team", "TEAMGROUP"),
    ("transcend", "Transcend"),
    ("gigabyte", "Gigabyte"),
    ("msi", "MSI"),
    ("lenovo", "Lenovo"),
    ("asus", "ASUS"),
    ("apple", "Apple"),
    ("hikvision", "Hikvision"),
    ("netac", "Netac"),
    ("biwin", "Biwin"),
    ("kingbank", "Kingbank"),
];

/// Alias table in matching order: longest alias first, ties in table order.
///
/// When one alias is a substring of another ("hynix" / "sk hynix",
/// "team" / "teamgroup") the more specific one is always tried first.
fn aliases_by_specificity() -> &'static [(&'static str, &'static str)] {
    static ORDERED: OnceLock<Vec<(&'static str, &'static str)>> = OnceLock::new();
    ORDERED.get_or_init(|| {
        let mut ordered = VENDOR_ALIASES.to_vec();
        // stable sort keeps table order among equal lengths
        ordered.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.len()));
        ordered
    })
}

/// Infer the vendor from a physical disk caption.
///
/// Matches the alias table case-insensitively, then falls back to the first
/// whitespace/hyphen-delimited token of the caption as written.
pub fn extract_vendor(caption: &str) -> String {
    let caption = caption.trim();
    if caption.is_empty() {
        return "Unknown".to_string();
    }

    let lowered = caption.to_lowercase();
    if let Some((_, vendor)) = aliases_by_specificity()
        .iter()
        .find(|(alias, _)| lowered.contains(alias))
    {
        return (*vendor).to_string();
    }

    caption
        .split(|c: char| c.is_whitespace() || c == '-')
        .find(|token| !token.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}
