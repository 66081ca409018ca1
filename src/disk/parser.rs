//! Record parsing for `wmic` text output
//!
//! Two shapes come back from the query tool:
//! - `/format:csv`: a header row of comma-separated field names followed by
//!   value rows of the same arity
//! - `/format:list`: `key=value` lines, records separated by blank lines
//!
//! Neither parser knows anything about disks. Values stay strings here;
//! numeric coercion happens when records are turned into typed entities.

use std::collections::HashMap;

/// One parsed record: field name to field value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Value of `key`, if the field was present at all.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of `key`, or `""` when the field is missing.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// Parse delimited-table output (`/format:csv`).
///
/// The first non-blank line is the header. Rows shorter than the header get
/// `""` for the missing columns; surplus values are ignored. Input with fewer
/// than two non-blank lines yields no records.
pub fn parse_table(output: &str) -> Vec<RawRecord> {
    let mut lines = output.lines().map(str::trim).filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    lines
        .map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| (*header, values.get(idx).copied().unwrap_or("")))
                .collect::<RawRecord>()
        })
        .collect()
}

/// Parse keyed-block output (`/format:list`).
///
/// A record ends at a blank line or at the end of input. Lines without a
/// `key=` prefix are ignored; only the first `=` separates key from value.
pub fn parse_keyed_blocks(output: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut current = RawRecord::new();

    for line in output.lines() {
        let line = line.trim();

        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if !key.is_empty() {
                current.insert(key, value.trim());
            }
        }
    }

    // Last record may not be followed by a blank line
    if !current.is_empty() {
        records.push(current);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_maps_headers_to_values() {
        let output = "\r\r\nNode,Caption,DeviceID,Size\r\r\nDESKTOP,WDC WD10EZEX-00BN5A0,\\\\.\\PHYSICALDRIVE0,1000202273280\r\r\nDESKTOP,Samsung SSD 970 EVO,\\\\.\\PHYSICALDRIVE1,500105249280\r\r\n";

        let records = parse_table(output);

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.len(), 4);
        }
        assert_eq!(records[0].get("Caption"), Some("WDC WD10EZEX-00BN5A0"));
        assert_eq!(records[0].get("DeviceID"), Some("\\\\.\\PHYSICALDRIVE0"));
        assert_eq!(records[1].get("Size"), Some("500105249280"));
    }

    #[test]
    fn table_trims_headers_and_values() {
        let records = parse_table("  DeviceID , FileSystem \n C: ,  NTFS  \n");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("DeviceID"), Some("C:"));
        assert_eq!(records[0].get("FileSystem"), Some("NTFS"));
    }

    #[test]
    fn short_rows_default_to_empty_values() {
        let records = parse_table("DeviceID,FileSystem,Size,FreeSpace\nD:,,\n");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 4);
        assert_eq!(records[0].get("DeviceID"), Some("D:"));
        assert_eq!(records[0].get("Size"), Some(""));
        assert_eq!(records[0].get("FreeSpace"), Some(""));
    }

    #[test]
    fn table_needs_header_and_one_row() {
        assert!(parse_table("").is_empty());
        assert!(parse_table("\r\n\r\n").is_empty());
        assert!(parse_table("Node,DeviceID\r\n").is_empty());
    }

    #[test]
    fn keyed_blocks_split_on_blank_lines() {
        let output = "\r\n\r\nAntecedent=\\\\HOST\\ROOT\\CIMV2:Win32_DiskDrive.DeviceID=\"\\\\\\\\.\\\\PHYSICALDRIVE0\"\r\nDependent=\\\\HOST\\ROOT\\CIMV2:Win32_DiskPartition.DeviceID=\"Disk #0, Partition #0\"\r\n\r\n\r\nAntecedent=A2\r\nDependent=D2\r\n\r\n\r\n";

        let records = parse_keyed_blocks(output);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("Dependent"),
            Some("\\\\HOST\\ROOT\\CIMV2:Win32_DiskPartition.DeviceID=\"Disk #0, Partition #0\"")
        );
        assert_eq!(records[1].get("Antecedent"), Some("A2"));
    }

    #[test]
    fn trailing_block_without_blank_line_is_kept() {
        let records = parse_keyed_blocks("A=1\nB=2\n\nA=3\nB=4");

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("A"), Some("3"));
        assert_eq!(records[1].get("B"), Some("4"));
    }

    #[test]
    fn keyed_lines_without_key_are_skipped() {
        let records = parse_keyed_blocks("garbage line\n=orphan\nKey = value=with=equals \n");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0].get("Key"), Some("value=with=equals"));
    }

    #[test]
    fn keyed_blocks_on_empty_input() {
        assert!(parse_keyed_blocks("").is_empty());
        assert!(parse_keyed_blocks("\n\n  \n").is_empty());
    }
}
