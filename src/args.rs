use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};

use crate::process::OsType;
use crate::request::{
    Action, DEFAULT_SETTLE_MS, FinalAction, GlobalAction, MatchCriterion, OutputFormat, Request,
    Settings,
};

#[derive(Parser, Debug)]
#[command(name = "appswitch")]
#[command(about = "A command-line application switcher")]
#[command(version)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Show application, bring windows to front (do not switch)
    #[arg(short = 's')]
    show: bool,

    /// Show all applications
    #[arg(short = 'S')]
    show_all: bool,

    /// Hide application
    #[arg(short = 'h')]
    hide: bool,

    /// Hide other applications
    #[arg(short = 'H')]
    hide_others: bool,

    /// Quit application
    #[arg(short = 'q')]
    quit: bool,

    /// Kill application (SIGINT)
    #[arg(short = 'k')]
    kill: bool,

    /// Kill application hard (SIGKILL)
    #[arg(short = 'K')]
    kill_hard: bool,

    /// List applications
    #[arg(short = 'l')]
    list: bool,

    /// List applications including full paths and bundle identifiers
    #[arg(short = 'L')]
    list_long: bool,

    /// Print application process ID
    #[arg(short = 'P')]
    print_pid: bool,

    /// Bring current application's windows to front
    #[arg(short = 'F')]
    front: bool,

    /// Match application by four-character creator code ('ToyS')
    #[arg(short = 'c', value_name = "creator")]
    creator: Option<String>,

    /// Match application by bundle identifier (com.apple.scripteditor)
    #[arg(short = 'i', value_name = "bundleID")]
    bundle_id: Option<String>,

    /// Match application by process identifier [slower]
    #[arg(short = 'p', value_name = "pid", allow_hyphen_values = true)]
    pid: Option<String>,

    /// Match application by name
    #[arg(short = 'a', value_name = "name")]
    name: Option<String>,

    /// Print the application list as JSON (with -l or -L)
    #[arg(long)]
    json: bool,

    /// Milliseconds to wait after -S/-H before -F brings the front application forward
    #[arg(long, value_name = "ms", env = "APPSWITCH_SETTLE_MS", default_value_t = DEFAULT_SETTLE_MS)]
    settle_ms: u64,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Match application by path
    #[arg(value_name = "path")]
    paths: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error(transparent)]
    Clap(#[from] clap::Error),

    #[error("no arguments given")]
    NoArguments,

    #[error("{0}")]
    Invalid(&'static str),
}

impl UsageError {
    /// Print the error together with a usage synopsis and pick the exit code.
    pub fn report(&self) -> ExitCode {
        match self {
            UsageError::Clap(err) => {
                let _ = err.print();
                if err.use_stderr() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            UsageError::NoArguments => {
                eprintln!("{}", Cli::command().render_help());
                ExitCode::FAILURE
            }
            UsageError::Invalid(message) => {
                let _ = Cli::command()
                    .error(ErrorKind::ArgumentConflict, message)
                    .print();
                ExitCode::FAILURE
            }
        }
    }
}

/// Parse the full argument list, program name included.
pub fn parse_request<I, T>(args: I) -> Result<(Request, Settings), UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        return Err(UsageError::NoArguments);
    }

    let cli = Cli::try_parse_from(args)?;
    let request = cli.to_request()?;
    let settings = Settings {
        settle_delay: Duration::from_millis(cli.settle_ms),
        ..Settings::default()
    };
    Ok((request, settings))
}

impl Cli {
    fn to_request(&self) -> Result<Request, UsageError> {
        let explicit = self.criterion_flag()?;
        let action = self.action()?;
        let global = self.global_action()?;
        let final_action = if self.front {
            FinalAction::BringFrontToFront
        } else {
            FinalAction::None
        };

        let criterion = match (explicit, self.paths.as_slice()) {
            (Some(criterion), []) => criterion,
            (Some(_), _) => {
                return Err(UsageError::Invalid(
                    "a path can't be combined with -c, -i, -p or -a",
                ));
            }
            (None, []) => {
                if matches!(action, Action::List { .. }) {
                    MatchCriterion::All
                } else if global != GlobalAction::None || final_action != FinalAction::None {
                    MatchCriterion::Front
                } else {
                    return Err(UsageError::Invalid(
                        "nothing to match: give a path or one of -c, -i, -p, -a",
                    ));
                }
            }
            (None, [path]) => MatchCriterion::Path(path.clone()),
            (None, _) => return Err(UsageError::Invalid("only one path may be given")),
        };

        let action = if criterion != MatchCriterion::Front && action == Action::None {
            Action::Switch
        } else {
            action
        };

        let output = if self.json {
            if !matches!(action, Action::List { .. }) {
                return Err(UsageError::Invalid("--json requires -l or -L"));
            }
            OutputFormat::Json
        } else {
            OutputFormat::Table
        };

        Ok(Request {
            criterion,
            action,
            global,
            final_action,
            output,
        })
    }

    fn criterion_flag(&self) -> Result<Option<MatchCriterion>, UsageError> {
        let given = [
            self.creator.is_some(),
            self.bundle_id.is_some(),
            self.pid.is_some(),
            self.name.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        if given > 1 {
            return Err(UsageError::Invalid(
                "choose only one of -c, -i, -p, -a options",
            ));
        }

        if let Some(code) = &self.creator {
            let creator = OsType::from_str_bytes(code).ok_or(UsageError::Invalid(
                "creator (argument of -c) must be four characters long",
            ))?;
            return Ok(Some(MatchCriterion::Creator(creator)));
        }
        if let Some(bundle_id) = &self.bundle_id {
            return Ok(Some(MatchCriterion::BundleId(bundle_id.clone())));
        }
        if let Some(pid) = &self.pid {
            return match pid.parse::<i32>() {
                Ok(pid) if pid >= 0 => Ok(Some(MatchCriterion::Pid(pid))),
                _ => Err(UsageError::Invalid(
                    "invalid process identifier (argument of -p)",
                )),
            };
        }
        if let Some(name) = &self.name {
            return Ok(Some(MatchCriterion::Name(name.clone())));
        }
        Ok(None)
    }

    fn action(&self) -> Result<Action, UsageError> {
        let chosen: Vec<Action> = [
            (self.show, Action::Show),
            (self.hide, Action::Hide),
            (self.quit, Action::Quit),
            (self.kill, Action::Kill),
            (self.kill_hard, Action::KillHard),
            (self.list, Action::List { long: false }),
            (self.list_long, Action::List { long: true }),
            (self.print_pid, Action::PrintPid),
        ]
        .into_iter()
        .filter_map(|(set, action)| set.then_some(action))
        .collect();

        match chosen.as_slice() {
            [] => Ok(Action::None),
            [action] => Ok(*action),
            _ => Err(UsageError::Invalid(
                "choose only one of -s, -h, -q, -k, -K, -l, -L, -P options",
            )),
        }
    }

    fn global_action(&self) -> Result<GlobalAction, UsageError> {
        match (self.show_all, self.hide_others) {
            (true, true) => Err(UsageError::Invalid("choose -S, -H or neither option")),
            (true, false) => Ok(GlobalAction::ShowAll),
            (false, true) => Ok(GlobalAction::HideOthers),
            (false, false) => Ok(GlobalAction::None),
        }
    }
}
