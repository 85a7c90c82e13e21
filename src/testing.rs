//! In-memory process manager used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::process::{OsType, ProcessHandle, ProcessManager, ProcessRecord};
use crate::status::OsStatus;

const KNOWN_BUNDLES: &[(&str, &str)] = &[
    ("/System/Library/CoreServices/Finder.app", "com.apple.finder"),
    ("/Applications/Safari.app", "com.apple.Safari"),
];

pub fn finder() -> ProcessRecord {
    ProcessRecord::new(
        ProcessHandle::new(524_289, 0),
        100,
        OsType(*b"APPL"),
        OsType(*b"MACS"),
        "Finder",
        "/System/Library/CoreServices/Finder.app",
    )
}

pub fn safari() -> ProcessRecord {
    ProcessRecord::new(
        ProcessHandle::new(524_290, 0),
        200,
        OsType(*b"APPL"),
        OsType(*b"sfri"),
        "Safari",
        "/Applications/Safari.app",
    )
}

pub struct FakeProcessManager {
    records: Vec<ProcessRecord>,
    bundles: HashMap<PathBuf, Option<String>>,
    front: Cell<ProcessHandle>,
    hidden: RefCell<HashSet<ProcessHandle>>,
    calls: RefCell<Vec<String>>,
    failures: HashMap<&'static str, OsStatus>,
    info_failure: Option<(ProcessHandle, OsStatus)>,
    lookups: Cell<usize>,
}

impl FakeProcessManager {
    /// The first record starts out frontmost.
    pub fn new(records: Vec<ProcessRecord>) -> Self {
        let front = records
            .first()
            .map(|record| record.handle)
            .unwrap_or(ProcessHandle::NONE);
        let bundles = KNOWN_BUNDLES
            .iter()
            .map(|(path, id)| (PathBuf::from(path), Some(id.to_string())))
            .collect();
        Self {
            records,
            bundles,
            front: Cell::new(front),
            hidden: RefCell::new(HashSet::new()),
            calls: RefCell::new(Vec::new()),
            failures: HashMap::new(),
            info_failure: None,
            lookups: Cell::new(0),
        }
    }

    pub fn with_front(self, handle: ProcessHandle) -> Self {
        self.front.set(handle);
        self
    }

    /// Register a bundle location; `None` means the bundle has no identifier.
    pub fn with_bundle(mut self, path: &str, id: Option<&str>) -> Self {
        self.bundles
            .insert(PathBuf::from(path), id.map(str::to_string));
        self
    }

    /// Make the bundle location of `path` unreadable.
    pub fn without_bundle(mut self, path: &str) -> Self {
        self.bundles.remove(Path::new(path));
        self
    }

    pub fn fail(mut self, operation: &'static str, status: OsStatus) -> Self {
        self.failures.insert(operation, status);
        self
    }

    pub fn fail_info_for(mut self, handle: ProcessHandle, status: OsStatus) -> Self {
        self.info_failure = Some((handle, status));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn front(&self) -> ProcessHandle {
        self.front.get()
    }

    pub fn is_hidden(&self, handle: ProcessHandle) -> bool {
        self.hidden.borrow().contains(&handle)
    }

    pub fn bundle_lookups(&self) -> usize {
        self.lookups.get()
    }

    fn request(&self, operation: &'static str, handle: ProcessHandle) -> Result<(), OsStatus> {
        self.calls.borrow_mut().push(format!("{operation} {handle}"));
        self.check(operation)
    }

    fn check(&self, operation: &'static str) -> Result<(), OsStatus> {
        match self.failures.get(operation) {
            Some(status) => Err(*status),
            None => Ok(()),
        }
    }

    fn refocus_if_hidden(&self) {
        if !self.is_hidden(self.front.get()) {
            return;
        }
        if let Some(visible) = self.records.iter().find(|r| !self.is_hidden(r.handle)) {
            self.front.set(visible.handle);
        }
    }
}

impl ProcessManager for FakeProcessManager {
    fn next_process(&self, after: ProcessHandle) -> Result<ProcessHandle, OsStatus> {
        self.check("next_process")?;
        let next = if after == ProcessHandle::NONE {
            self.records.first()
        } else {
            self.records
                .iter()
                .position(|r| r.handle == after)
                .and_then(|index| self.records.get(index + 1))
        };
        next.map(|r| r.handle).ok_or(OsStatus::PROC_NOT_FOUND)
    }

    fn process_info(&self, handle: ProcessHandle) -> Result<ProcessRecord, OsStatus> {
        if let Some((failing, status)) = self.info_failure {
            if failing == handle {
                return Err(status);
            }
        }
        self.records
            .iter()
            .find(|r| r.handle == handle)
            .cloned()
            .ok_or(OsStatus::PROC_NOT_FOUND)
    }

    fn front_process(&self) -> Result<ProcessHandle, OsStatus> {
        self.calls.borrow_mut().push("front".to_string());
        self.check("front_process")?;
        Ok(self.front.get())
    }

    fn set_front(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        self.request("set_front", handle)?;
        self.hidden.borrow_mut().remove(&handle);
        self.front.set(handle);
        Ok(())
    }

    fn show(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        self.request("show", handle)?;
        self.hidden.borrow_mut().remove(&handle);
        Ok(())
    }

    fn hide(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        self.request("hide", handle)?;
        self.hidden.borrow_mut().insert(handle);
        self.refocus_if_hidden();
        Ok(())
    }

    fn show_all(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        self.request("show_all", handle)?;
        self.hidden.borrow_mut().clear();
        Ok(())
    }

    fn hide_others(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        self.request("hide_others", handle)?;
        {
            let mut hidden = self.hidden.borrow_mut();
            hidden.extend(self.records.iter().map(|r| r.handle).filter(|h| *h != handle));
            hidden.remove(&handle);
        }
        self.refocus_if_hidden();
        Ok(())
    }

    fn kill(&self, handle: ProcessHandle, hard: bool) -> Result<(), OsStatus> {
        let operation = if hard { "kill_hard" } else { "kill" };
        self.calls.borrow_mut().push(format!("{operation} {handle}"));
        self.check("kill")
    }

    fn send_quit(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        self.request("send_quit", handle)
    }

    fn bundle_identifier(&self, path: &Path) -> Result<Option<String>> {
        self.lookups.set(self.lookups.get() + 1);
        self.bundles
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no bundle at {}", path.display()))
    }

    fn settle(&self, delay: Duration) {
        self.calls
            .borrow_mut()
            .push(format!("settle {}ms", delay.as_millis()));
    }
}
