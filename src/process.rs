use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::error::AppError;
use crate::status::OsStatus;

/// Opaque identifier of a running application instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    hi: u32,
    lo: u32,
}

impl ProcessHandle {
    /// Starting point of an enumeration; never names a real process.
    pub const NONE: ProcessHandle = ProcessHandle { hi: 0, lo: 0 };

    pub fn new(hi: u32, lo: u32) -> Self {
        Self { hi, lo }
    }

    pub fn hi(self) -> u32 {
        self.hi
    }

    pub fn lo(self) -> u32 {
        self.lo
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hi, self.lo)
    }
}

/// Four-byte type or creator code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OsType(pub [u8; 4]);

impl OsType {
    pub fn from_str_bytes(code: &str) -> Option<Self> {
        <[u8; 4]>::try_from(code.as_bytes()).ok().map(OsType)
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            let c = if (0x20..0x80).contains(&byte) {
                byte as char
            } else {
                ' '
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Snapshot of one running application taken during enumeration.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub handle: ProcessHandle,
    pub pid: i32,
    pub file_type: OsType,
    pub creator: OsType,
    pub name: String,
    pub path: PathBuf,
    bundle_id: OnceCell<Option<String>>,
}

impl ProcessRecord {
    pub fn new(
        handle: ProcessHandle,
        pid: i32,
        file_type: OsType,
        creator: OsType,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            handle,
            pid,
            file_type,
            creator,
            name: name.into(),
            path: path.into(),
            bundle_id: OnceCell::new(),
        }
    }

    /// Bundle identifier of the application at `path`, resolved on first use.
    ///
    /// `Ok(None)` means the bundle exists but carries no identifier; an error
    /// means the bundle location itself could not be read.
    pub fn bundle_identifier(&self, manager: &dyn ProcessManager) -> Result<Option<&str>> {
        if self.bundle_id.get().is_none() {
            let resolved = manager.bundle_identifier(&self.path)?;
            debug!(handle = %self.handle, bundle_id = ?resolved, "resolved bundle identifier");
            let _ = self.bundle_id.set(resolved);
        }
        Ok(self.bundle_id.get().and_then(|id| id.as_deref()))
    }
}

/// Process-manager requests the switcher needs from the operating system.
///
/// Every request is blocking and reports failure with the platform status
/// code; nothing is retried.
pub trait ProcessManager {
    /// Handle of the process after `after`, or the first one for
    /// [`ProcessHandle::NONE`]. The end of the list is reported as
    /// [`OsStatus::PROC_NOT_FOUND`].
    fn next_process(&self, after: ProcessHandle) -> Result<ProcessHandle, OsStatus>;

    fn process_info(&self, handle: ProcessHandle) -> Result<ProcessRecord, OsStatus>;

    fn front_process(&self) -> Result<ProcessHandle, OsStatus>;

    /// Bring the process to the front and give it focus.
    fn set_front(&self, handle: ProcessHandle) -> Result<(), OsStatus>;

    /// Show the process's windows without changing focus.
    fn show(&self, handle: ProcessHandle) -> Result<(), OsStatus>;

    fn hide(&self, handle: ProcessHandle) -> Result<(), OsStatus>;

    fn show_all(&self, handle: ProcessHandle) -> Result<(), OsStatus>;

    /// Hide every application except `handle`.
    fn hide_others(&self, handle: ProcessHandle) -> Result<(), OsStatus>;

    /// Terminate the process; `hard` skips graceful shutdown.
    fn kill(&self, handle: ProcessHandle, hard: bool) -> Result<(), OsStatus>;

    /// Post a quit request without waiting for a reply.
    fn send_quit(&self, handle: ProcessHandle) -> Result<(), OsStatus>;

    fn bundle_identifier(&self, path: &Path) -> Result<Option<String>>;

    /// Wait for window-server state to converge.
    fn settle(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Walks the process list front to back, fetching each record.
pub struct Processes<'a> {
    manager: &'a dyn ProcessManager,
    cursor: ProcessHandle,
    done: bool,
}

impl<'a> Processes<'a> {
    pub fn new(manager: &'a dyn ProcessManager) -> Self {
        Self {
            manager,
            cursor: ProcessHandle::NONE,
            done: false,
        }
    }
}

impl Iterator for Processes<'_> {
    type Item = Result<ProcessRecord, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let handle = match self.manager.next_process(self.cursor) {
            Ok(handle) => handle,
            Err(OsStatus::PROC_NOT_FOUND) => {
                self.done = true;
                return None;
            }
            Err(status) => {
                self.done = true;
                return Some(Err(AppError::os("can't get next process", status)));
            }
        };
        self.cursor = handle;

        match self.manager.process_info(handle) {
            Ok(record) => {
                debug!(handle = %handle, pid = record.pid, name = %record.name, path = %record.path.display(), "enumerated process");
                Some(Ok(record))
            }
            Err(status) => {
                self.done = true;
                Some(Err(AppError::os(
                    format!("can't get information for process PSN {handle}"),
                    status,
                )))
            }
        }
    }
}
