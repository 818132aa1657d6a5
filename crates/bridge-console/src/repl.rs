//! The interactive shell.
//!
//! Reads one command per line, applies it to the [`AppShell`], and redraws
//! the current view.  Status polls and realtime events keep running between
//! commands; an empty line just redraws.
//!
//! | Command          | Effect                                        |
//! |------------------|-----------------------------------------------|
//! | `go <path>`      | navigate (guards and redirects apply)         |
//! | `request-code`   | show a pairing code on the bridge screen      |
//! | `code <code>`    | type into the pairing field                   |
//! | `submit`         | submit the pairing code                       |
//! | `input <text>`   | type into the printer field                   |
//! | `print`          | print the printer field                       |
//! | `scan`           | request a scan                                |
//! | `logout`         | forget the session                            |
//! | `refresh`        | re-mount the current page                     |
//! | `help`, `quit`   |                                               |

use std::io::Write;

use bridge_client::application::shell::{AppShell, View};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::views;

pub const PROMPT: &str = "bridge> ";

pub const HELP: &str = "\
Commands:
  go <path>       open a page (/, /dashboard, /pairing, /scan, /printer, ...)
  request-code    show a pairing code on the bridge screen
  code <code>     type the pairing code
  submit          submit the pairing code
  input <text>    type the text to print
  print           print the typed text
  scan            request a scan
  logout          forget the session and pair again
  refresh         reload the current page
  help            show this help
  quit            leave the console";

const NOT_ON_PAIRING: &str = "Open the pairing page first (`go /pairing`).";
const NOT_ON_DASHBOARD: &str = "Open the dashboard first (`go /dashboard`).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Empty line.
    Redraw,
    Go(String),
    RequestCode,
    Code(String),
    Submit,
    Input(String),
    Print,
    Scan,
    Logout,
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("unknown command `{0}`; type `help` for a list")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument; type `help` for usage")]
    MissingArgument(&'static str),
}

impl ShellCommand {
    /// Parses one input line.  The argument of `input` keeps its inner
    /// spacing.
    pub fn parse(line: &str) -> Result<Self, UsageError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let argument = |name: &'static str| {
            if rest.is_empty() {
                Err(UsageError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        Ok(match word {
            "" => ShellCommand::Redraw,
            "go" => ShellCommand::Go(argument("go")?),
            "request-code" => ShellCommand::RequestCode,
            "code" => ShellCommand::Code(argument("code")?),
            "submit" => ShellCommand::Submit,
            "input" => ShellCommand::Input(argument("input")?),
            "print" => ShellCommand::Print,
            "scan" => ShellCommand::Scan,
            "logout" => ShellCommand::Logout,
            "refresh" => ShellCommand::Refresh,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(UsageError::UnknownCommand(other.to_string())),
        })
    }
}

/// What the loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Redraw, showing `notice` above the view if present.
    Continue { notice: Option<String> },
    Quit,
}

impl Outcome {
    fn redraw() -> Self {
        Outcome::Continue { notice: None }
    }

    fn notice(text: impl Into<String>) -> Self {
        Outcome::Continue {
            notice: Some(text.into()),
        }
    }
}

/// Applies one command to the shell.
pub async fn execute(shell: &mut AppShell, command: ShellCommand) -> anyhow::Result<Outcome> {
    debug!(?command, "shell command");
    let outcome = match command {
        ShellCommand::Redraw => Outcome::redraw(),
        ShellCommand::Help => Outcome::notice(HELP),
        ShellCommand::Quit => return Ok(Outcome::Quit),
        ShellCommand::Go(path) => {
            shell.navigate(&path)?;
            settle(shell).await;
            Outcome::redraw()
        }
        ShellCommand::Refresh => {
            shell.refresh()?;
            settle(shell).await;
            Outcome::redraw()
        }
        ShellCommand::RequestCode => {
            shell.request_pairing_code().await;
            match shell.auth().error_message() {
                Some(_) => Outcome::redraw(),
                None => Outcome::notice("A pairing code is now shown on the bridge screen."),
            }
        }
        ShellCommand::Code(code) => {
            if shell.set_pairing_code(&code) {
                Outcome::redraw()
            } else {
                Outcome::notice(NOT_ON_PAIRING)
            }
        }
        ShellCommand::Submit => {
            if !matches!(shell.view(), Some(View::Pairing(_))) {
                Outcome::notice(NOT_ON_PAIRING)
            } else if shell.submit_pairing_code().await? {
                settle(shell).await;
                Outcome::notice("Paired with the bridge.")
            } else {
                Outcome::redraw()
            }
        }
        ShellCommand::Input(text) => match shell.dashboard_mut() {
            Some(dashboard) => {
                dashboard.printer_mut().set_input(text);
                Outcome::redraw()
            }
            None => Outcome::notice(NOT_ON_DASHBOARD),
        },
        ShellCommand::Print => match shell.dashboard_mut() {
            Some(dashboard) => {
                dashboard.printer_mut().print().await;
                Outcome::redraw()
            }
            None => Outcome::notice(NOT_ON_DASHBOARD),
        },
        ShellCommand::Scan => match shell.dashboard() {
            Some(dashboard) => {
                dashboard.scanner().scan().await;
                Outcome::redraw()
            }
            None => Outcome::notice(NOT_ON_DASHBOARD),
        },
        ShellCommand::Logout => {
            shell.logout()?;
            Outcome::redraw()
        }
    };
    Ok(outcome)
}

/// Waits for a freshly mounted dashboard's first status answers, so the
/// first draw shows real badges.
async fn settle(shell: &AppShell) {
    if let Some(dashboard) = shell.dashboard() {
        dashboard.wait_for_status().await;
    }
}

/// Runs the shell until `quit` or end of input.
///
/// # Errors
///
/// Fails only when reading `input` or writing `out` fails.  Command errors
/// are shown and the loop continues.
pub async fn run<R, W>(shell: &mut AppShell, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    settle(shell).await;
    write!(out, "{}", views::render_shell(shell))?;

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        match execute(shell, command).await {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Continue { notice }) => {
                if let Some(notice) = notice {
                    writeln!(out, "{notice}\n")?;
                }
                write!(out, "{}", views::render_shell(shell))?;
            }
            Err(e) => {
                warn!("command failed: {e:#}");
                writeln!(out, "Error: {e}")?;
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
