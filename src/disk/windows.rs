//! Windows pipeline: wmic queries → records → letter map → drive entries

use std::fs;
use std::path::Path;

use super::assemble::{assemble_drives, DriveEntry};
use super::parser::{parse_keyed_blocks, parse_table};
use super::query::{run_query, QueryOptions};
use super::resolver::{build_letter_map, AssociationLink, LetterToPhysicalMap, LogicalDisk, PhysicalDisk};

/// The system queries behind one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmicQuery {
    PhysicalDisks,
    LogicalDisks,
    DriveToPartition,
    LogicalToPartition,
}

impl WmicQuery {
    pub const ALL: [WmicQuery; 4] = [
        WmicQuery::PhysicalDisks,
        WmicQuery::LogicalDisks,
        WmicQuery::DriveToPartition,
        WmicQuery::LogicalToPartition,
    ];

    pub fn args(self) -> &'static [&'static str] {
        match self {
            Self::PhysicalDisks => &[
                "diskdrive",
                "get",
                "DeviceID,Caption,Size,Model,InterfaceType,SerialNumber,MediaType",
                "/format:csv",
            ],
            Self::LogicalDisks => &[
                "logicaldisk",
                "get",
                "DeviceID,FileSystem,Size,FreeSpace,DriveType",
                "/format:csv",
            ],
            Self::DriveToPartition => &[
                "path",
                "Win32_DiskDriveToDiskPartition",
                "get",
                "Antecedent,Dependent",
                "/format:list",
            ],
            Self::LogicalToPartition => &[
                "path",
                "Win32_LogicalDiskToPartition",
                "get",
                "Antecedent,Dependent",
                "/format:list",
            ],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PhysicalDisks => "physical disk query",
            Self::LogicalDisks => "logical disk query",
            Self::DriveToPartition => "disk-to-partition query",
            Self::LogicalToPartition => "logical-to-partition query",
        }
    }

    /// File name used when raw output is captured for replay.
    pub fn capture_file_name(self) -> &'static str {
        match self {
            Self::PhysicalDisks => "diskdrive.csv",
            Self::LogicalDisks => "logicaldisk.csv",
            Self::DriveToPartition => "drive_to_partition.txt",
            Self::LogicalToPartition => "logical_to_partition.txt",
        }
    }
}

/// Raw output of each query; `None` marks a query that failed or timed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutputs {
    pub physical: Option<String>,
    pub logical: Option<String>,
    pub drive_to_partition: Option<String>,
    pub logical_to_partition: Option<String>,
}

impl QueryOutputs {
    pub fn get(&self, query: WmicQuery) -> Option<&str> {
        match query {
            WmicQuery::PhysicalDisks => self.physical.as_deref(),
            WmicQuery::LogicalDisks => self.logical.as_deref(),
            WmicQuery::DriveToPartition => self.drive_to_partition.as_deref(),
            WmicQuery::LogicalToPartition => self.logical_to_partition.as_deref(),
        }
    }

    /// Load previously captured outputs from `dir`. A missing or unreadable
    /// file counts as a failed query.
    pub fn load_captured(dir: &Path) -> Self {
        let read = |query: WmicQuery| {
            let path = dir.join(query.capture_file_name());
            match fs::read(&path) {
                Ok(bytes) => Some(super::query::decode_output(&bytes)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "capture not readable");
                    None
                }
            }
        };

        Self {
            physical: read(WmicQuery::PhysicalDisks),
            logical: read(WmicQuery::LogicalDisks),
            drive_to_partition: read(WmicQuery::DriveToPartition),
            logical_to_partition: read(WmicQuery::LogicalToPartition),
        }
    }
}

async fn run_one(query: WmicQuery, options: &QueryOptions) -> Option<String> {
    match run_query(&options.program, query.args(), query.label(), options.timeout).await {
        Ok(output) => Some(output),
        Err(err) => {
            tracing::warn!(error = %err, "{} unavailable, continuing without it", query.label());
            None
        }
    }
}

/// Run all queries concurrently and wait for every one to finish or fail.
pub async fn collect_outputs(options: &QueryOptions) -> QueryOutputs {
    let (physical, logical, drive_to_partition, logical_to_partition) = tokio::join!(
        run_one(WmicQuery::PhysicalDisks, options),
        run_one(WmicQuery::LogicalDisks, options),
        run_one(WmicQuery::DriveToPartition, options),
        run_one(WmicQuery::LogicalToPartition, options),
    );

    QueryOutputs {
        physical,
        logical,
        drive_to_partition,
        logical_to_partition,
    }
}

/// Typed view of one poll's query results.
#[derive(Debug, Clone, Default)]
pub struct DiskSnapshot {
    pub physical: Vec<PhysicalDisk>,
    pub logical: Vec<LogicalDisk>,
    pub drive_to_partition: Vec<AssociationLink>,
    pub logical_to_partition: Vec<AssociationLink>,
}

impl DiskSnapshot {
    /// Parse raw outputs; failed queries contribute empty record sets.
    pub fn from_outputs(outputs: &QueryOutputs) -> Self {
        let table = |text: Option<&str>| parse_table(text.unwrap_or_default());
        let links = |text: Option<&str>| -> Vec<AssociationLink> {
            parse_keyed_blocks(text.unwrap_or_default())
                .iter()
                .map(AssociationLink::from_record)
                .collect()
        };

        Self {
            physical: table(outputs.physical.as_deref())
                .iter()
                .map(PhysicalDisk::from_record)
                .collect(),
            logical: table(outputs.logical.as_deref())
                .iter()
                .map(LogicalDisk::from_record)
                .filter(|disk| !disk.drive_letter.is_empty())
                .collect(),
            drive_to_partition: links(outputs.drive_to_partition.as_deref()),
            logical_to_partition: links(outputs.logical_to_partition.as_deref()),
        }
    }

    pub fn letter_map(&self) -> LetterToPhysicalMap {
        build_letter_map(
            &self.physical,
            &self.drive_to_partition,
            &self.logical_to_partition,
        )
    }

    pub fn drives(&self) -> Vec<DriveEntry> {
        let letters = self.letter_map();
        tracing::debug!(
            physical = self.physical.len(),
            logical = self.logical.len(),
            resolved = letters.len(),
            "assembling drives"
        );
        assemble_drives(&self.logical, &self.physical, &letters)
    }
}

/// Parse, resolve and assemble a set of raw query outputs.
pub fn drives_from_outputs(outputs: &QueryOutputs) -> Vec<DriveEntry> {
    DiskSnapshot::from_outputs(outputs).drives()
}

/// Full Windows poll.
pub async fn get_windows_drives(options: &QueryOptions) -> Vec<DriveEntry> {
    let outputs = collect_outputs(options).await;
    drives_from_outputs(&outputs)
}
