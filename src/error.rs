use crate::process::ProcessHandle;
use crate::status::OsStatus;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{context}: {status}")]
    Os { context: String, status: OsStatus },

    #[error("no matching process found")]
    NoMatch,

    #[error("can't get bundle location for process '{name}' (PSN {handle}, pid {pid})")]
    BundleLocation {
        name: String,
        handle: ProcessHandle,
        pid: i32,
    },

    #[error("can't get process ID")]
    NoProcessId,

    #[error("internal error: {0}")]
    Internal(&'static str),

    #[error("{0}")]
    Unsupported(String),

    #[error("can't write output: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn os(context: impl Into<String>, status: OsStatus) -> Self {
        AppError::Os {
            context: context.into(),
            status,
        }
    }

    /// Adapter for `map_err` on process-manager calls.
    pub fn with_context(context: &'static str) -> impl FnOnce(OsStatus) -> Self {
        move |status| AppError::os(context, status)
    }
}
