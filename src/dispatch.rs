use std::io::Write;

use tracing::{debug, info};

use crate::error::AppError;
use crate::matcher::{self, Selection};
use crate::process::ProcessManager;
use crate::request::{Action, FinalAction, GlobalAction, Request, Settings};

/// Run `request` to completion: select the target, then apply the primary,
/// global and final actions in that order. The first failure stops
/// everything after it.
pub fn execute(
    request: &Request,
    manager: &dyn ProcessManager,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let selection = matcher::select_process(request, manager, settings.terminal_width, out)?;
    apply_action(request.action, &selection, manager, out)?;
    apply_global(request.global, &selection, manager)?;
    apply_final(request, manager, settings)
}

fn apply_action(
    action: Action,
    selection: &Selection,
    manager: &dyn ProcessManager,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let handle = selection.handle;
    debug!(handle = %handle, ?action, "applying action");

    match action {
        Action::None | Action::List { .. } => Ok(()),
        Action::Switch => manager
            .set_front(handle)
            .map_err(AppError::with_context("can't set front process")),
        Action::Show => manager
            .show(handle)
            .map_err(AppError::with_context("can't show process")),
        Action::Hide => manager
            .hide(handle)
            .map_err(AppError::with_context("can't hide process")),
        Action::Quit => manager
            .send_quit(handle)
            .map_err(AppError::with_context("can't quit process")),
        Action::Kill => manager
            .kill(handle, false)
            .map_err(AppError::with_context("can't kill process")),
        Action::KillHard => manager
            .kill(handle, true)
            .map_err(AppError::with_context("can't kill process")),
        Action::PrintPid => {
            let pid = match &selection.record {
                Some(record) => record.pid,
                None => {
                    manager
                        .process_info(handle)
                        .map_err(|status| {
                            AppError::os(
                                format!("can't get information for process PSN {handle}"),
                                status,
                            )
                        })?
                        .pid
                }
            };
            if pid <= 0 {
                return Err(AppError::NoProcessId);
            }
            writeln!(out, "{pid}")?;
            Ok(())
        }
    }
}

fn apply_global(
    global: GlobalAction,
    selection: &Selection,
    manager: &dyn ProcessManager,
) -> Result<(), AppError> {
    let handle = selection.handle;
    match global {
        GlobalAction::None => Ok(()),
        GlobalAction::ShowAll => manager
            .show_all(handle)
            .map_err(AppError::with_context("can't show all processes")),
        GlobalAction::HideOthers => manager
            .hide_others(handle)
            .map_err(AppError::with_context("can't hide other processes")),
    }
}

fn apply_final(
    request: &Request,
    manager: &dyn ProcessManager,
    settings: &Settings,
) -> Result<(), AppError> {
    match request.final_action {
        FinalAction::None => Ok(()),
        FinalAction::BringFrontToFront => {
            let front = matcher::frontmost(manager)?;
            if request.global != GlobalAction::None {
                // The window server needs a moment after a global show/hide
                // before the front application is stable.
                manager.settle(settings.settle_delay);
            }
            info!(handle = %front, "bringing front application's windows forward");
            manager
                .show(front)
                .and_then(|()| manager.set_front(front))
                .map_err(AppError::with_context(
                    "can't bring current application's windows to the front",
                ))
        }
    }
}
