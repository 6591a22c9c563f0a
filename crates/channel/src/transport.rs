//! Settings transport carriers.
//!
//! The channel's contract with the outside world is minimal: "give me the
//! most recently published payload, if any". The original design carried
//! payloads over a named clipboard; any latest-value carrier is equivalent,
//! so the trait is the seam and two portable carriers ship here.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;

/// A latest-value payload carrier.
///
/// `read_latest` returns the most recently published payload, or `None`
/// when the carrier is empty. Reads are non-destructive: the poller calls
/// this every tick and deduplicates by settings value, not by read count.
pub trait SettingsTransport: Send {
    fn read_latest(&self) -> Result<Option<String>, TransportError>;
}

/// File-carried payloads: the latest payload is the file's contents.
///
/// A missing file is an empty carrier, not an error; the settings author
/// may simply not have published yet.
#[derive(Clone, Debug)]
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SettingsTransport for FileTransport {
    fn read_latest(&self) -> Result<Option<String>, TransportError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory latest-value slot, shared between publisher and poller.
///
/// Clones share the same slot, so a test (or a same-process settings GUI)
/// holds one clone and hands the other to the pipeline.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a payload, replacing any previous one.
    pub fn publish(&self, payload: impl Into<String>) {
        *self.slot.lock() = Some(payload.into());
    }

    /// Empty the carrier.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

impl SettingsTransport for MemoryTransport {
    fn read_latest(&self) -> Result<Option<String>, TransportError> {
        Ok(self.slot.lock().clone())
    }
}
