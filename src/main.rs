use std::io::{self, Write};
use std::process::ExitCode;

use tracing::debug;

mod args;
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
mod bundle;
mod dispatch;
mod error;
mod listing;
mod logging;
mod matcher;
mod process;
mod request;
mod status;
#[cfg(test)]
mod testing;
#[cfg(target_os = "macos")]
mod workspace;

use error::AppError;
use process::ProcessManager;

const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(target_os = "macos")]
fn connect() -> Result<Box<dyn ProcessManager>, AppError> {
    Ok(Box::new(workspace::WorkspaceManager::new()))
}

#[cfg(not(target_os = "macos"))]
fn connect() -> Result<Box<dyn ProcessManager>, AppError> {
    Err(AppError::Unsupported(format!(
        "application control is not available on {}",
        std::env::consts::OS
    )))
}

fn main() -> ExitCode {
    let (request, mut settings) = match args::parse_request(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => return err.report(),
    };
    logging::init_logging();

    settings.terminal_width = listing::terminal_width();
    debug!(?request, ?settings, "parsed request");

    let result = connect().and_then(|manager| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        dispatch::execute(&request, manager.as_ref(), &settings, &mut out)?;
        out.flush()?;
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{APP_NAME}: {err}");
            ExitCode::FAILURE
        }
    }
}
