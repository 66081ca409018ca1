//! Root filesystem fallback for non-Windows hosts
//!
//! There is no drive-letter/partition association to rebuild here, so the
//! report is a single entry for `/` with no hardware identity.

use std::path::Path;
use sysinfo::Disks;

use super::assemble::DriveEntry;

/// Capacity of a filesystem in bytes, from raw `statvfs` block counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RootUsage {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl RootUsage {
    /// `free` counts every free block, reserved ones included, so `used`
    /// matches what `df` reports.
    pub fn from_blocks(blocks: u64, blocks_free: u64, fragment_size: u64) -> Self {
        Self {
            total_bytes: blocks.saturating_mul(fragment_size),
            free_bytes: blocks_free.min(blocks).saturating_mul(fragment_size),
        }
    }
}

#[cfg(unix)]
fn root_usage() -> Option<RootUsage> {
    let stats = match nix::sys::statvfs::statvfs("/") {
        Ok(stats) => stats,
        Err(err) => {
            tracing::warn!(error = %err, "statvfs failed for /");
            return None;
        }
    };

    // f_frsize is the unit of the block counts; some platforms leave it zero
    let fragment_size = match stats.fragment_size() as u64 {
        0 => stats.block_size() as u64,
        size => size,
    };

    Some(RootUsage::from_blocks(
        stats.blocks() as u64,
        stats.blocks_free() as u64,
        fragment_size,
    ))
}

#[cfg(not(unix))]
fn root_usage() -> Option<RootUsage> {
    None
}

/// Filesystem type of `/`; sysinfo omits some root types (overlay) from its list.
fn root_file_system() -> String {
    Disks::new_with_refreshed_list()
        .list()
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"))
        .map(|disk| disk.file_system().to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Statistics for the filesystem mounted at `/`, if the platform reports them.
pub(super) fn root_filesystem_entry() -> Option<DriveEntry> {
    let usage = root_usage()?;

    Some(DriveEntry::root_filesystem(
        &root_file_system(),
        usage.total_bytes,
        usage.free_bytes,
    ))
}

pub(super) async fn platform_drives_impl() -> Vec<DriveEntry> {
    match tokio::task::spawn_blocking(root_filesystem_entry).await {
        Ok(Some(entry)) => vec![entry],
        Ok(None) => {
            tracing::warn!("no filesystem statistics for /");
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(error = %err, "filesystem statistics task failed");
            Vec::new()
        }
    }
}
