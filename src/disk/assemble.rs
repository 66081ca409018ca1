//! Drive entry assembly

use serde::Serialize;

use super::resolver::{LetterToPhysicalMap, LogicalDisk, PhysicalDisk};
use super::types::{extract_vendor, DriveType};

const UNKNOWN: &str = "Unknown";

/// One reported drive: a mounted volume plus the identity of its physical disk.
///
/// Built once per poll and never modified afterwards. Physical fields read
/// `"Unknown"` when no physical disk could be attributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveEntry {
    drive: String,
    file_system: String,
    total_bytes: u64,
    free_bytes: u64,
    used_bytes: u64,
    drive_type: DriveType,
    type_label: &'static str,
    is_removable: bool,
    is_system: bool,
    vendor: String,
    model: String,
    serial: String,
    device: String,
    interface_type: String,
    media_type: String,
}

impl DriveEntry {
    /// Entry for the Unix root filesystem; no hardware identity is available there.
    #[cfg_attr(target_os = "windows", allow(dead_code))]
    pub(crate) fn root_filesystem(file_system: &str, total_bytes: u64, free_bytes: u64) -> Self {
        Self {
            drive: "/".to_string(),
            file_system: or_unknown(Some(file_system)),
            total_bytes,
            free_bytes,
            used_bytes: total_bytes.saturating_sub(free_bytes),
            drive_type: DriveType::Local,
            type_label: DriveType::Local.label(),
            is_removable: false,
            is_system: true,
            vendor: UNKNOWN.to_string(),
            model: UNKNOWN.to_string(),
            serial: UNKNOWN.to_string(),
            device: "/".to_string(),
            interface_type: UNKNOWN.to_string(),
            media_type: UNKNOWN.to_string(),
        }
    }

    pub fn drive(&self) -> &str {
        &self.drive
    }

    pub fn file_system(&self) -> &str {
        &self.file_system
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    /// Always `total - free`, never negative.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Used space as a percentage of capacity; 0 for zero-sized volumes.
    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.used_bytes as f64 / self.total_bytes as f64 * 100.0
        }
    }

    pub fn drive_type(&self) -> DriveType {
        self.drive_type
    }

    pub fn type_label(&self) -> &'static str {
        self.type_label
    }

    pub fn is_removable(&self) -> bool {
        self.is_removable
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Caption of the physical disk (or the mount point on Unix).
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn interface_type(&self) -> &str {
        &self.interface_type
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Combine a logical disk with the physical disk chosen for it.
///
/// Removable/system flags come from the drive type code alone and do not
/// depend on whether a physical disk was found.
pub fn assemble_drive(logical: &LogicalDisk, physical: Option<&PhysicalDisk>) -> DriveEntry {
    let drive_type = DriveType::from_code(logical.drive_type_code);

    DriveEntry {
        drive: logical.drive_letter.clone(),
        file_system: logical.file_system.clone(),
        total_bytes: logical.size_bytes,
        free_bytes: logical.free_bytes,
        used_bytes: logical.used_bytes(),
        drive_type,
        type_label: drive_type.label(),
        is_removable: drive_type == DriveType::Removable,
        is_system: drive_type == DriveType::Local,
        vendor: physical
            .map(|disk| extract_vendor(&disk.caption))
            .unwrap_or_else(|| UNKNOWN.to_string()),
        model: or_unknown(physical.map(|disk| disk.model.as_str())),
        serial: or_unknown(physical.map(|disk| disk.serial_number.as_str())),
        device: or_unknown(physical.map(|disk| disk.caption.as_str())),
        interface_type: or_unknown(physical.map(|disk| disk.interface_type.as_str())),
        media_type: or_unknown(physical.map(|disk| disk.media_type.as_str())),
    }
}

/// Assemble every logical disk, in query order.
///
/// A letter missing from `letters` is attributed to the first physical disk
/// in query order. That is right on single-disk machines and can name the
/// wrong disk on multi-disk machines whose association queries failed; the
/// trade-off is accepted so the common case never shows a blank identity.
pub fn assemble_drives(
    logical: &[LogicalDisk],
    physical: &[PhysicalDisk],
    letters: &LetterToPhysicalMap,
) -> Vec<DriveEntry> {
    let fallback = physical.first();

    logical
        .iter()
        .map(|disk| {
            let resolved = letters.get(&disk.drive_letter);
            if resolved.is_none() && fallback.is_some() {
                tracing::debug!(
                    drive = %disk.drive_letter,
                    "no association for drive, using first physical disk"
                );
            }
            assemble_drive(disk, resolved.or(fallback))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::resolver::{build_letter_map, AssociationLink};

    fn logical(letter: &str, size: u64, free: u64, code: i64) -> LogicalDisk {
        LogicalDisk {
            drive_letter: letter.to_string(),
            file_system: "NTFS".to_string(),
            size_bytes: size,
            free_bytes: free,
            drive_type_code: code,
        }
    }

    fn physical(index: u32, caption: &str, serial: &str) -> PhysicalDisk {
        PhysicalDisk {
            device_id: format!(r"\\.\PHYSICALDRIVE{index}"),
            caption: caption.to_string(),
            model: caption.to_string(),
            size_bytes: 1_000_000,
            interface_type: "SCSI".to_string(),
            serial_number: serial.to_string(),
            media_type: "Fixed hard disk media".to_string(),
        }
    }

    #[test]
    fn assembles_physical_identity() {
        let disk = physical(0, "WDC WD10EZEX-00BN5A0", "WD-123");
        let entry = assemble_drive(&logical("C:", 1000, 250, 3), Some(&disk));

        assert_eq!(entry.drive(), "C:");
        assert_eq!(entry.used_bytes(), 750);
        assert_eq!(entry.vendor(), "Western Digital");
        assert_eq!(entry.serial(), "WD-123");
        assert_eq!(entry.device(), "WDC WD10EZEX-00BN5A0");
        assert_eq!(entry.type_label(), "Local Disk");
        assert!(entry.is_system());
        assert!(!entry.is_removable());
    }

    #[test]
    fn missing_physical_disk_reads_unknown() {
        let entry = assemble_drive(&logical("E:", 64, 32, 2), None);

        assert_eq!(entry.vendor(), "Unknown");
        assert_eq!(entry.model(), "Unknown");
        assert_eq!(entry.serial(), "Unknown");
        assert_eq!(entry.device(), "Unknown");
        assert_eq!(entry.interface_type(), "Unknown");
        assert_eq!(entry.media_type(), "Unknown");
        assert!(entry.is_removable());
        assert!(!entry.is_system());
    }

    #[test]
    fn blank_physical_fields_read_unknown() {
        let disk = PhysicalDisk {
            caption: "Samsung SSD 860".to_string(),
            ..PhysicalDisk::default()
        };
        let entry = assemble_drive(&logical("C:", 10, 5, 3), Some(&disk));

        assert_eq!(entry.vendor(), "Samsung");
        assert_eq!(entry.serial(), "Unknown");
        assert_eq!(entry.media_type(), "Unknown");
    }

    #[test]
    fn used_never_negative() {
        let entry = assemble_drive(&logical("Z:", 100, 500, 4), None);
        assert_eq!(entry.used_bytes(), 0);
        assert_eq!(entry.usage_percent(), 0.0);

        let empty = assemble_drive(&logical("A:", 0, 0, 1), None);
        assert_eq!(empty.used_bytes(), 0);
        assert_eq!(empty.usage_percent(), 0.0);
    }

    #[test]
    fn used_equals_total_minus_free() {
        let disks = [
            logical("C:", 512_110_190_592, 101_318_656_000, 3),
            logical("D:", 1_000_202_273_280, 1_000_202_273_280, 3),
            logical("E:", 31_000_000_000, 0, 2),
        ];
        for disk in &disks {
            let entry = assemble_drive(disk, None);
            assert_eq!(entry.used_bytes(), entry.total_bytes() - entry.free_bytes());
        }
    }

    #[test]
    fn falls_back_to_first_physical_disk() {
        let disks = vec![physical(0, "Samsung SSD 970", "S1"), physical(1, "WDC WD20", "W2")];
        let entries = assemble_drives(
            &[logical("C:", 10, 1, 3), logical("D:", 10, 1, 3)],
            &disks,
            &LetterToPhysicalMap::default(),
        );

        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.serial(), "S1");
            assert_eq!(entry.model(), "Samsung SSD 970");
        }
    }

    #[test]
    fn resolved_disk_beats_fallback() {
        let disks = vec![physical(0, "Samsung SSD 970", "S1"), physical(1, "WDC WD20", "W2")];
        let map = build_letter_map(
            &disks,
            &[AssociationLink::new(
                r"\\.\PHYSICALDRIVE1",
                r#"Win32_DiskPartition.DeviceID="Disk #1, Partition #0""#,
            )],
            &[AssociationLink::new(
                r#"Win32_DiskPartition.DeviceID="Disk #1, Partition #0""#,
                r#"Win32_LogicalDisk.DeviceID="D:""#,
            )],
        );

        let entries = assemble_drives(
            &[logical("C:", 10, 1, 3), logical("D:", 10, 1, 3)],
            &disks,
            &map,
        );

        assert_eq!(entries[0].serial(), "S1");
        assert_eq!(entries[1].serial(), "W2");
        assert_eq!(entries[1].vendor(), "Western Digital");
    }

    #[test]
    fn no_physical_disks_at_all() {
        let entries = assemble_drives(
            &[logical("C:", 10, 1, 3)],
            &[],
            &LetterToPhysicalMap::default(),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].model(), "Unknown");
    }

    #[test]
    fn root_filesystem_entry() {
        let entry = DriveEntry::root_filesystem("", 1000, 400);

        assert_eq!(entry.drive(), "/");
        assert_eq!(entry.device(), "/");
        assert_eq!(entry.used_bytes(), 600);
        assert_eq!(entry.drive_type(), DriveType::Local);
        assert!(entry.is_system());
        assert_eq!(entry.vendor(), "Unknown");
        assert_eq!(entry.file_system(), "Unknown");

        let ext4 = DriveEntry::root_filesystem("ext4", 10, 10);
        assert_eq!(ext4.file_system(), "ext4");
        assert_eq!(ext4.used_bytes(), 0);
    }
}
