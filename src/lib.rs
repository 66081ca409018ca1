//! diskmap - disk inventory with physical disk attribution
//!
//! Lists mounted volumes with capacity and usage, and on Windows links each
//! drive letter to the physical disk behind it (vendor, model, serial,
//! interface, media type). The association is rebuilt from `wmic` output
//! because Windows does not report it directly.

pub mod config;
pub mod disk;
pub mod display;

pub use disk::{get_drives, DriveEntry, QueryOptions};
