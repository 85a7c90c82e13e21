use std::io::Write;

use tracing::debug;

use crate::error::AppError;
use crate::listing::Listing;
use crate::process::{ProcessHandle, ProcessManager, ProcessRecord, Processes};
use crate::request::{Action, MatchCriterion, Request};

/// The process an action will be applied to.
#[derive(Debug)]
pub struct Selection {
    pub handle: ProcessHandle,
    /// Present when the process was found by enumeration.
    pub record: Option<ProcessRecord>,
}

pub fn frontmost(manager: &dyn ProcessManager) -> Result<ProcessHandle, AppError> {
    let handle = manager
        .front_process()
        .map_err(AppError::with_context("can't get frontmost process"))?;
    debug!(handle = %handle, "front application");
    Ok(handle)
}

/// Whether `record` satisfies `criterion`.
///
/// A bundle that can't be read simply doesn't match.
pub fn matches(
    criterion: &MatchCriterion,
    record: &ProcessRecord,
    manager: &dyn ProcessManager,
) -> Result<bool, AppError> {
    let matched = match criterion {
        MatchCriterion::All => true,
        MatchCriterion::Creator(creator) => record.creator == *creator,
        MatchCriterion::Name(name) => record.name == *name,
        MatchCriterion::Pid(pid) => record.pid == *pid,
        MatchCriterion::Path(path) => record.path.as_os_str() == path.as_os_str(),
        MatchCriterion::BundleId(wanted) => match record.bundle_identifier(manager) {
            Ok(Some(id)) => id.to_lowercase() == wanted.to_lowercase(),
            Ok(None) => false,
            Err(err) => {
                debug!(handle = %record.handle, "no bundle for process: {err:#}");
                false
            }
        },
        MatchCriterion::Front => return Err(AppError::Internal("invalid match type")),
    };
    Ok(matched)
}

/// Find the process `request` targets, printing the listing along the way
/// when the action is a list.
///
/// The first match in enumeration order wins. A listing visits every
/// process and then selects the frontmost one.
pub fn select_process(
    request: &Request,
    manager: &dyn ProcessManager,
    terminal_width: Option<usize>,
    out: &mut dyn Write,
) -> Result<Selection, AppError> {
    if request.criterion == MatchCriterion::Front {
        return Ok(Selection {
            handle: frontmost(manager)?,
            record: None,
        });
    }

    let mut listing = match request.action {
        Action::List { long } => {
            let listing = Listing::new(long, request.output, terminal_width);
            listing.header(out)?;
            Some(listing)
        }
        _ => None,
    };

    for record in Processes::new(manager) {
        let record = record?;
        if !matches(&request.criterion, &record, manager)? {
            continue;
        }
        match listing.as_mut() {
            Some(listing) => listing.row(&record, manager, out)?,
            None => {
                debug!(handle = %record.handle, name = %record.name, "matched process");
                return Ok(Selection {
                    handle: record.handle,
                    record: Some(record),
                });
            }
        }
    }

    match listing {
        Some(listing) => {
            listing.finish(out)?;
            Ok(Selection {
                handle: frontmost(manager)?,
                record: None,
            })
        }
        None => Err(AppError::NoMatch),
    }
}
