//! Logical drive letter → physical disk association
//!
//! Windows never reports which physical disk hosts `C:`. The relation has to
//! be rebuilt through the partition layer from two association queries:
//!
//! ```text
//! C: ──Win32_LogicalDiskToPartition──▶ "Disk #0, Partition #1"
//!    ──Win32_DiskDriveToDiskPartition──▶ PHYSICALDRIVE0 ──▶ PhysicalDisk
//! ```
//!
//! Either hop can be incomplete (dynamic disks, virtual volumes, storage
//! spaces). Missing links simply leave the letter unmapped.

use serde::Serialize;
use std::collections::HashMap;

use super::parser::RawRecord;
use super::references::{logical_letter, partition_key, physical_drive_index};

/// A physical disk as reported by `Win32_DiskDrive`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhysicalDisk {
    pub device_id: String,
    pub caption: String,
    pub model: String,
    pub size_bytes: u64,
    pub interface_type: String,
    pub serial_number: String,
    pub media_type: String,
}

impl PhysicalDisk {
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            device_id: record.text("DeviceID").to_string(),
            caption: record.text("Caption").to_string(),
            model: record.text("Model").to_string(),
            size_bytes: parse_bytes(record.text("Size")),
            interface_type: record.text("InterfaceType").to_string(),
            serial_number: record.text("SerialNumber").to_string(),
            media_type: record.text("MediaType").to_string(),
        }
    }

    /// Disk number from the device id (`\\.\PHYSICALDRIVE<n>`), else from the caption.
    pub fn index(&self) -> Option<u32> {
        physical_drive_index(&self.device_id).or_else(|| physical_drive_index(&self.caption))
    }
}

/// A mounted volume as reported by `Win32_LogicalDisk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogicalDisk {
    pub drive_letter: String,
    pub file_system: String,
    pub size_bytes: u64,
    pub free_bytes: u64,
    pub drive_type_code: i64,
}

impl LogicalDisk {
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            drive_letter: record.text("DeviceID").to_string(),
            file_system: record.text("FileSystem").to_string(),
            size_bytes: parse_bytes(record.text("Size")),
            free_bytes: parse_bytes(record.text("FreeSpace")),
            drive_type_code: record.text("DriveType").trim().parse().unwrap_or(0),
        }
    }

    /// `size - free`, clamped at zero for inconsistent input.
    pub fn used_bytes(&self) -> u64 {
        self.size_bytes.saturating_sub(self.free_bytes)
    }
}

/// One row of an association query: `Antecedent` relates to `Dependent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationLink {
    pub antecedent: String,
    pub dependent: String,
}

impl AssociationLink {
    pub fn new(antecedent: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            antecedent: antecedent.into(),
            dependent: dependent.into(),
        }
    }

    pub fn from_record(record: &RawRecord) -> Self {
        Self::new(record.text("Antecedent"), record.text("Dependent"))
    }
}

/// Uppercase drive letter (`"C:"`) → hosting physical disk.
#[derive(Debug, Clone, Default)]
pub struct LetterToPhysicalMap {
    by_letter: HashMap<String, PhysicalDisk>,
}

impl LetterToPhysicalMap {
    /// Physical disk for `letter`; case-insensitive.
    pub fn get(&self, letter: &str) -> Option<&PhysicalDisk> {
        self.by_letter.get(&letter.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.by_letter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_letter.is_empty()
    }

    pub fn letters(&self) -> impl Iterator<Item = &str> {
        self.by_letter.keys().map(String::as_str)
    }
}

/// Numeric size field; anything unparseable (empty, negative, text) is 0.
pub(crate) fn parse_bytes(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

/// Rebuild the letter → physical disk relation.
///
/// Links whose references do not match the expected shapes are dropped;
/// a letter is only present when every hop resolves.
pub fn build_letter_map(
    physical: &[PhysicalDisk],
    drive_to_partition: &[AssociationLink],
    logical_to_partition: &[AssociationLink],
) -> LetterToPhysicalMap {
    let mut partition_to_index: HashMap<&str, u32> = HashMap::new();
    for link in drive_to_partition {
        match (
            physical_drive_index(&link.antecedent),
            partition_key(&link.dependent),
        ) {
            (Some(index), Some(key)) => {
                partition_to_index.insert(key, index);
            }
            _ => tracing::trace!(?link, "dropping unresolvable disk→partition link"),
        }
    }

    let mut letter_to_index: HashMap<String, u32> = HashMap::new();
    for link in logical_to_partition {
        let Some(key) = partition_key(&link.antecedent) else {
            tracing::trace!(?link, "dropping partition→logical link without partition key");
            continue;
        };
        let Some(letter) = logical_letter(&link.dependent) else {
            tracing::trace!(?link, "dropping partition→logical link without drive letter");
            continue;
        };
        if let Some(&index) = partition_to_index.get(key) {
            letter_to_index.insert(letter, index);
        }
    }

    let by_index: HashMap<u32, &PhysicalDisk> = physical
        .iter()
        .filter_map(|disk| disk.index().map(|index| (index, disk)))
        .collect();

    let by_letter = letter_to_index
        .into_iter()
        .filter_map(|(letter, index)| {
            by_index
                .get(&index)
                .map(|disk| (letter, (*disk).clone()))
        })
        .collect();

    LetterToPhysicalMap { by_letter }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk_link(drive: u32, partition: &str) -> AssociationLink {
        AssociationLink::new(
            format!(r#"\\PC\ROOT\CIMV2:Win32_DiskDrive.DeviceID="\\\\.\\PHYSICALDRIVE{drive}""#),
            format!(r#"\\PC\ROOT\CIMV2:Win32_DiskPartition.DeviceID="{partition}""#),
        )
    }

    fn volume_link(partition: &str, letter: &str) -> AssociationLink {
        AssociationLink::new(
            format!(r#"\\PC\ROOT\CIMV2:Win32_DiskPartition.DeviceID="{partition}""#),
            format!(r#"\\PC\ROOT\CIMV2:Win32_LogicalDisk.DeviceID="{letter}""#),
        )
    }

    fn physical(index: u32, caption: &str) -> PhysicalDisk {
        PhysicalDisk {
            device_id: format!(r"\\.\PHYSICALDRIVE{index}"),
            caption: caption.to_string(),
            model: caption.to_string(),
            ..PhysicalDisk::default()
        }
    }

    #[test]
    fn resolves_single_chain() {
        let disks = vec![physical(0, "WDC WD10EZEX")];
        let map = build_letter_map(
            &disks,
            &[disk_link(0, "Disk #0, Partition #1")],
            &[volume_link("Disk #0, Partition #1", "C:")],
        );

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("C:"), Some(&disks[0]));
        assert_eq!(map.get("c:"), Some(&disks[0]));
    }

    #[test]
    fn resolves_letters_across_disks() {
        let disks = vec![physical(1, "Samsung SSD"), physical(0, "WDC WD10EZEX")];
        let map = build_letter_map(
            &disks,
            &[
                disk_link(0, "Disk #0, Partition #0"),
                disk_link(1, "Disk #1, Partition #0"),
                disk_link(1, "Disk #1, Partition #1"),
            ],
            &[
                volume_link("Disk #0, Partition #0", "D:"),
                volume_link("Disk #1, Partition #0", "c:"),
                volume_link("Disk #1, Partition #1", "E:"),
            ],
        );

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("C:").map(|d| d.caption.as_str()), Some("Samsung SSD"));
        assert_eq!(map.get("E:").map(|d| d.caption.as_str()), Some("Samsung SSD"));
        assert_eq!(map.get("D:").map(|d| d.caption.as_str()), Some("WDC WD10EZEX"));
        let mut letters: Vec<&str> = map.letters().collect();
        letters.sort_unstable();
        assert_eq!(letters, vec!["C:", "D:", "E:"]);
    }

    #[test]
    fn incomplete_chains_leave_letters_unmapped() {
        let disks = vec![physical(0, "WDC WD10EZEX")];
        let map = build_letter_map(
            &disks,
            &[
                disk_link(0, "Disk #0, Partition #0"),
                // disk 5 is not in the physical set
                disk_link(5, "Disk #5, Partition #0"),
            ],
            &[
                volume_link("Disk #0, Partition #0", "C:"),
                volume_link("Disk #5, Partition #0", "F:"),
                // no disk→partition link for this partition
                volume_link("Disk #2, Partition #0", "G:"),
            ],
        );

        assert!(map.get("C:").is_some());
        assert!(map.get("F:").is_none());
        assert!(map.get("G:").is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn malformed_links_are_dropped() {
        let disks = vec![physical(0, "WDC WD10EZEX")];
        let map = build_letter_map(
            &disks,
            &[
                AssociationLink::new("garbage", r#"Win32_DiskPartition.DeviceID="P1""#),
                AssociationLink::new(r"\\.\PHYSICALDRIVE0", "garbage"),
                AssociationLink::new(r"\\.\PHYSICALDRIVE0", r#"Win32_DiskPartition.DeviceID="P2""#),
            ],
            &[
                AssociationLink::new(r#"Win32_DiskPartition.DeviceID="P1""#, r#"Win32_LogicalDisk.DeviceID="C:""#),
                AssociationLink::new(r#"Win32_DiskPartition.DeviceID="P2""#, "not a reference"),
                AssociationLink::new("", ""),
            ],
        );

        assert!(map.is_empty());
    }

    #[test]
    fn empty_inputs_give_empty_map() {
        assert!(build_letter_map(&[], &[], &[]).is_empty());
        let disks = vec![physical(0, "WDC")];
        assert!(build_letter_map(&disks, &[disk_link(0, "P")], &[]).is_empty());
    }

    #[test]
    fn physical_index_falls_back_to_caption() {
        let disk = PhysicalDisk {
            caption: r"\\.\PHYSICALDRIVE4".to_string(),
            ..PhysicalDisk::default()
        };
        assert_eq!(disk.index(), Some(4));
        assert_eq!(PhysicalDisk::default().index(), None);
    }

    #[test]
    fn records_coerce_numbers_to_zero_on_failure() {
        let record: RawRecord = [
            ("DeviceID", "C:"),
            ("FileSystem", "NTFS"),
            ("Size", "not-a-number"),
            ("FreeSpace", "100"),
            ("DriveType", ""),
        ]
        .into_iter()
        .collect();

        let logical = LogicalDisk::from_record(&record);
        assert_eq!(logical.size_bytes, 0);
        assert_eq!(logical.free_bytes, 100);
        assert_eq!(logical.drive_type_code, 0);
        assert_eq!(logical.used_bytes(), 0);
    }

    #[test]
    fn physical_disk_from_record() {
        let record: RawRecord = [
            ("Node", "PC"),
            ("Caption", "WDC WD10EZEX-00BN5A0"),
            ("DeviceID", r"\\.\PHYSICALDRIVE0"),
            ("InterfaceType", "IDE"),
            ("MediaType", "Fixed hard disk media"),
            ("Model", "WDC WD10EZEX-00BN5A0"),
            ("SerialNumber", "WD-WCC6Y1234567"),
            ("Size", "1000202273280"),
        ]
        .into_iter()
        .collect();

        let disk = PhysicalDisk::from_record(&record);
        assert_eq!(disk.index(), Some(0));
        assert_eq!(disk.size_bytes, 1_000_202_273_280);
        assert_eq!(disk.serial_number, "WD-WCC6Y1234567");
        assert_eq!(disk.media_type, "Fixed hard disk media");
    }
}
