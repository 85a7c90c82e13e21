//! Process control through `NSWorkspace` and `NSRunningApplication`.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use objc2::rc::Retained;
use objc2_app_kit::{
    NSApplicationActivationOptions, NSApplicationActivationPolicy, NSRunningApplication,
    NSWorkspace,
};
use sysinfo::{Pid, Signal, System};
use tracing::debug;

use crate::bundle;
use crate::process::{ProcessHandle, ProcessManager, ProcessRecord};
use crate::status::OsStatus;

/// Applications are identified by pid; the handle carries it in its high part.
#[derive(Default)]
pub struct WorkspaceManager {
    /// Pids of the enumeration in progress, fixed when it starts.
    snapshot: RefCell<Vec<i32>>,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        Self::default()
    }
}

fn handle_for(pid: i32) -> ProcessHandle {
    ProcessHandle::new(pid as u32, 0)
}

fn pid_of(handle: ProcessHandle) -> i32 {
    handle.hi() as i32
}

fn running_app(handle: ProcessHandle) -> Result<Retained<NSRunningApplication>, OsStatus> {
    unsafe { NSRunningApplication::runningApplicationWithProcessIdentifier(pid_of(handle)) }
        .ok_or(OsStatus::PROC_NOT_FOUND)
}

fn running_apps() -> Vec<Retained<NSRunningApplication>> {
    unsafe {
        NSWorkspace::sharedWorkspace()
            .runningApplications()
            .iter()
            .filter(|app| app.processIdentifier() > 0)
            .collect()
    }
}

/// The application after `after` in an enumeration snapshot.
fn next_in(pids: &[i32], after: ProcessHandle) -> Result<ProcessHandle, OsStatus> {
    let next = if after == ProcessHandle::NONE {
        pids.first()
    } else {
        let index = pids
            .iter()
            .position(|pid| *pid == pid_of(after))
            .ok_or(OsStatus::PARAM_ERR)?;
        pids.get(index + 1)
    };
    next.copied().map(handle_for).ok_or(OsStatus::PROC_NOT_FOUND)
}

/// Sends `request` to each application in turn and hands back the first
/// one that turns it down.
fn until_refused<T>(
    apps: impl IntoIterator<Item = T>,
    mut request: impl FnMut(&T) -> bool,
) -> Result<(), T> {
    for app in apps {
        if !request(&app) {
            return Err(app);
        }
    }
    Ok(())
}

/// Status for a request the application turned down.
fn refused(app: &NSRunningApplication) -> OsStatus {
    if unsafe { app.activationPolicy() } == NSApplicationActivationPolicy::Prohibited {
        OsStatus::APP_IS_DAEMON
    } else {
        OsStatus::PARAM_ERR
    }
}

fn app_path(app: &NSRunningApplication) -> PathBuf {
    unsafe {
        app.bundleURL()
            .or_else(|| app.executableURL())
            .and_then(|url| url.path())
            .map(|path| PathBuf::from(path.to_string()))
            .unwrap_or_default()
    }
}

impl ProcessManager for WorkspaceManager {
    fn next_process(&self, after: ProcessHandle) -> Result<ProcessHandle, OsStatus> {
        if after == ProcessHandle::NONE {
            let pids = running_apps()
                .iter()
                .map(|app| unsafe { app.processIdentifier() })
                .collect();
            *self.snapshot.borrow_mut() = pids;
        }
        next_in(&self.snapshot.borrow(), after)
    }

    fn process_info(&self, handle: ProcessHandle) -> Result<ProcessRecord, OsStatus> {
        let app = running_app(handle)?;
        let name = unsafe { app.localizedName() }
            .map(|name| name.to_string())
            .unwrap_or_default();
        let path = app_path(&app);
        let (file_type, creator) = bundle::type_and_creator(&path);
        let pid = unsafe { app.processIdentifier() };
        Ok(ProcessRecord::new(handle, pid, file_type, creator, name, path))
    }

    fn front_process(&self) -> Result<ProcessHandle, OsStatus> {
        unsafe { NSWorkspace::sharedWorkspace().frontmostApplication() }
            .map(|app| handle_for(unsafe { app.processIdentifier() }))
            .ok_or(OsStatus::PROC_NOT_FOUND)
    }

    fn set_front(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        let app = running_app(handle)?;
        let options = NSApplicationActivationOptions::ActivateAllWindows
            | NSApplicationActivationOptions::ActivateIgnoringOtherApps;
        if unsafe { app.activateWithOptions(options) } {
            Ok(())
        } else {
            Err(refused(&app))
        }
    }

    fn show(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        let app = running_app(handle)?;
        if !unsafe { app.isHidden() } || unsafe { app.unhide() } {
            Ok(())
        } else {
            Err(refused(&app))
        }
    }

    fn hide(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        let app = running_app(handle)?;
        if unsafe { app.isHidden() } || unsafe { app.hide() } {
            Ok(())
        } else {
            Err(refused(&app))
        }
    }

    fn show_all(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        running_app(handle)?;
        debug!(handle = %handle, "showing all applications");
        let hidden = running_apps()
            .into_iter()
            .filter(|app| unsafe { app.isHidden() });
        until_refused(hidden, |app| unsafe { app.unhide() }).map_err(|app| refused(&app))
    }

    fn hide_others(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        let keep = unsafe { running_app(handle)?.processIdentifier() };
        let others = running_apps().into_iter().filter(|app| unsafe {
            app.processIdentifier() != keep
                && !app.isHidden()
                && app.activationPolicy() == NSApplicationActivationPolicy::Regular
        });
        until_refused(others, |app| unsafe { app.hide() }).map_err(|app| refused(&app))
    }

    fn kill(&self, handle: ProcessHandle, hard: bool) -> Result<(), OsStatus> {
        let pid = Pid::from_u32(pid_of(handle) as u32);
        let mut system = System::new();
        if !system.refresh_process(pid) {
            return Err(OsStatus::PROC_NOT_FOUND);
        }
        let process = system.process(pid).ok_or(OsStatus::PROC_NOT_FOUND)?;
        let signal = if hard { Signal::Kill } else { Signal::Interrupt };
        match process.kill_with(signal) {
            Some(true) => Ok(()),
            _ => Err(OsStatus::PARAM_ERR),
        }
    }

    fn send_quit(&self, handle: ProcessHandle) -> Result<(), OsStatus> {
        let app = running_app(handle)?;
        // terminate() posts the quit event and returns without waiting.
        if unsafe { app.terminate() } {
            Ok(())
        } else {
            Err(refused(&app))
        }
    }

    fn bundle_identifier(&self, path: &Path) -> anyhow::Result<Option<String>> {
        bundle::bundle_identifier(path)
    }
}
