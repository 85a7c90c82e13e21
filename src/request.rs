use std::path::PathBuf;
use std::time::Duration;

use crate::process::OsType;

/// Which running application a request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCriterion {
    /// The frontmost application; no enumeration needed.
    Front,
    Creator(OsType),
    BundleId(String),
    Name(String),
    Pid(i32),
    Path(PathBuf),
    /// Every application; only used for listing.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Switch,
    Show,
    Hide,
    Quit,
    Kill,
    KillHard,
    List { long: bool },
    PrintPid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    None,
    ShowAll,
    HideOthers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalAction {
    None,
    BringFrontToFront,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// A fully validated invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub criterion: MatchCriterion,
    pub action: Action,
    pub global: GlobalAction,
    pub final_action: FinalAction,
    pub output: OutputFormat,
}

/// Runtime knobs that are not part of what the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Pause between a global action and the final front-bringing action.
    pub settle_delay: Duration,
    /// Detected terminal width in columns.
    pub terminal_width: Option<usize>,
}

pub const DEFAULT_SETTLE_MS: u64 = 750;

impl Default for Settings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            terminal_width: None,
        }
    }
}
