use std::fmt;

/// Status code returned by a process-manager request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsStatus(pub i32);

impl OsStatus {
    pub const FILE_NOT_FOUND: OsStatus = OsStatus(-43);
    pub const PARAM_ERR: OsStatus = OsStatus(-50);
    /// Also the terminal status of process enumeration.
    pub const PROC_NOT_FOUND: OsStatus = OsStatus(-600);
    pub const APP_IS_DAEMON: OsStatus = OsStatus(-606);
    pub const CG_ILLEGAL_ARGUMENT: OsStatus = OsStatus(1001);

    /// Human-readable description, e.g. `file not found (-43)`.
    pub fn describe(self) -> String {
        let text = match self {
            Self::APP_IS_DAEMON => "application is background-only",
            Self::PROC_NOT_FOUND => "unable to connect to system service.\nAre you logged in?",
            Self::CG_ILLEGAL_ARGUMENT => "window server error.\nAre you logged in?",
            Self::FILE_NOT_FOUND => "file not found",
            _ => "unknown error",
        };
        format!("{} ({})", text, self.0)
    }
}

impl fmt::Display for OsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
