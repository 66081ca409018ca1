//! Identifier extraction from WMI object references
//!
//! Association queries return object paths such as
//! `\\HOST\ROOT\CIMV2:Win32_DiskPartition.DeviceID="Disk #0, Partition #1"`.
//! The quoting follows `wmic` conventions, so all knowledge of that format
//! lives here and nowhere else.

use regex::Regex;
use std::sync::OnceLock;

/// Kind of identifier embedded in an object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTag {
    /// `...PHYSICALDRIVE<n>...` → `n`
    PhysicalDrive,
    /// `...Win32_DiskPartition.DeviceID="<key>"` → `key`
    Partition,
    /// `...Win32_LogicalDisk.DeviceID="<X:>"` → `X:`
    LogicalDisk,
}

impl ReferenceTag {
    fn pattern(self) -> &'static str {
        match self {
            Self::PhysicalDrive => r"(?i)PHYSICALDRIVE(\d+)",
            Self::Partition => r#"(?i)Win32_DiskPartition\.DeviceID="([^"]+)""#,
            Self::LogicalDisk => r#"(?i)Win32_LogicalDisk\.DeviceID="([A-Z]:)""#,
        }
    }

    fn regex(self) -> Option<&'static Regex> {
        static PHYSICAL: OnceLock<Option<Regex>> = OnceLock::new();
        static PARTITION: OnceLock<Option<Regex>> = OnceLock::new();
        static LOGICAL: OnceLock<Option<Regex>> = OnceLock::new();

        let cell = match self {
            Self::PhysicalDrive => &PHYSICAL,
            Self::Partition => &PARTITION,
            Self::LogicalDisk => &LOGICAL,
        };
        cell.get_or_init(|| Regex::new(self.pattern()).ok()).as_ref()
    }

    /// First identifier of this kind in `reference`, if any.
    pub fn extract(self, reference: &str) -> Option<&str> {
        self.regex()?
            .captures(reference)?
            .get(1)
            .map(|m| m.as_str())
    }
}

/// Physical disk index from a `PHYSICALDRIVE<n>` reference or device id.
pub fn physical_drive_index(reference: &str) -> Option<u32> {
    ReferenceTag::PhysicalDrive.extract(reference)?.parse().ok()
}

/// Partition key (the quoted `DeviceID`) from a `Win32_DiskPartition` reference.
pub fn partition_key(reference: &str) -> Option<&str> {
    ReferenceTag::Partition.extract(reference)
}

/// Uppercase drive letter with colon from a `Win32_LogicalDisk` reference.
pub fn logical_letter(reference: &str) -> Option<String> {
    ReferenceTag::LogicalDisk
        .extract(reference)
        .map(str::to_ascii_uppercase)
}
