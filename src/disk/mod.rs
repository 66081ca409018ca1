//! Disk inventory
//!
//! Reports one [`DriveEntry`] per mounted volume. On Windows the entries
//! carry the identity of the physical disk behind each drive letter, rebuilt
//! from `wmic` association queries; elsewhere a single root filesystem entry
//! is reported.
//!
//! Nothing in here returns an error: failed queries, malformed output and
//! unparseable numbers all degrade to empty, absent, zero or "Unknown".

pub mod assemble;
pub mod parser;
pub mod query;
pub mod references;
pub mod resolver;
pub mod types;
pub mod windows;

#[cfg(not(target_os = "windows"))]
mod unix;

pub use assemble::{assemble_drive, assemble_drives, DriveEntry};
pub use parser::{parse_keyed_blocks, parse_table, RawRecord};
pub use query::{QueryError, QueryOptions};
pub use resolver::{build_letter_map, AssociationLink, LetterToPhysicalMap, LogicalDisk, PhysicalDisk};
pub use types::{classify_drive_type, extract_vendor, DriveType};
pub use windows::{drives_from_outputs, QueryOutputs, WmicQuery};

#[cfg(not(target_os = "windows"))]
use unix::platform_drives_impl;

#[cfg(target_os = "windows")]
async fn platform_drives_impl(options: &QueryOptions) -> Vec<DriveEntry> {
    windows::get_windows_drives(options).await
}

/// Poll the current drives.
///
/// An empty result means "no data this cycle", never a hard failure.
pub async fn get_drives(options: &QueryOptions) -> Vec<DriveEntry> {
    #[cfg(target_os = "windows")]
    let drives = platform_drives_impl(options).await;

    #[cfg(not(target_os = "windows"))]
    let drives = {
        let _ = options;
        platform_drives_impl().await
    };

    tracing::debug!(count = drives.len(), "drive poll complete");
    drives
}
