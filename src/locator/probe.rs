//! Filesystem existence probing.

use std::io;
use std::path::Path;

/// Tests whether a candidate texture file exists.
///
/// An `Err` means the answer is unknown (permission denied, transient I/O);
/// the locator treats it as absent and moves on to the next pack.
pub trait Probe: Send + Sync {
    fn exists(&self, path: &Path) -> io::Result<bool>;
}

/// Probes the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl Probe for FsProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Counts of probes performed during one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Candidate paths tested.
    pub probes: u64,
    /// Probes that failed with an I/O error.
    pub failures: u64,
}
