//! One-shot subcommands: `pair`, `logout`, `print`, `scan`, `status`.
//!
//! Each one drives the same [`AppShell`] the interactive shell uses, writes
//! its outcome to `out`, and returns an error when the action failed, so
//! that scripts see a non-zero exit code.

use std::io::Write;

use anyhow::{anyhow, bail, Context};
use bridge_client::application::dashboard::Dashboard;
use bridge_client::application::shell::AppShell;
use bridge_core::{AuthPhase, Route};
use tracing::debug;

use crate::cli::{Command, PairCommand};
use crate::views;

pub const NOT_PAIRED: &str = "Not paired with the bridge. Run `bridge-console pair request`, \
     then `bridge-console pair submit <CODE>`.";
pub const ALREADY_PAIRED: &str = "Already paired. Run `bridge-console logout` first to pair again.";

/// Runs one non-interactive command.
///
/// # Errors
///
/// Returns the message shown to the user when the action did not succeed.
pub async fn run_once<W: Write>(
    shell: &mut AppShell,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()> {
    debug!(?command, "running one-shot command");
    match command {
        Command::Shell => bail!("the interactive shell is not a one-shot command"),
        Command::Pair {
            action: PairCommand::Request,
        } => request_code(shell, out).await,
        Command::Pair {
            action: PairCommand::Submit { code },
        } => submit_code(shell, &code, out).await,
        Command::Logout => logout(shell, out),
        Command::Print { text } => print(shell, text, out).await,
        Command::Scan => scan(shell, out).await,
        Command::Status => status(shell, out).await,
    }
}

async fn request_code<W: Write>(shell: &mut AppShell, out: &mut W) -> anyhow::Result<()> {
    shell.request_pairing_code().await;
    if let Some(error) = shell.auth().error_message() {
        bail!("{error}");
    }
    writeln!(out, "A pairing code is now shown on the bridge screen.")?;
    Ok(())
}

async fn submit_code<W: Write>(
    shell: &mut AppShell,
    code: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    if shell.phase() == AuthPhase::Authenticated {
        bail!(ALREADY_PAIRED);
    }
    shell.navigate(Route::Pairing.path())?;
    shell.set_pairing_code(code);
    if shell.submit_pairing_code().await? {
        writeln!(out, "Paired with the bridge.")?;
        return Ok(());
    }
    let error = shell
        .auth()
        .error_message()
        .unwrap_or("Pairing failed.")
        .to_string();
    Err(anyhow!(error))
}

fn logout<W: Write>(shell: &mut AppShell, out: &mut W) -> anyhow::Result<()> {
    shell.logout()?;
    if let Some(error) = shell.auth().error_message() {
        bail!("{error}");
    }
    writeln!(out, "Logged out.")?;
    Ok(())
}

/// Shows the dashboard and waits for both devices' first status answer.
async fn open_dashboard(shell: &mut AppShell) -> anyhow::Result<&mut Dashboard> {
    shell.navigate(Route::Dashboard.path())?;
    let dashboard = shell.dashboard_mut().ok_or_else(|| anyhow!(NOT_PAIRED))?;
    dashboard.wait_for_status().await;
    Ok(dashboard)
}

async fn print<W: Write>(shell: &mut AppShell, text: String, out: &mut W) -> anyhow::Result<()> {
    let printer = open_dashboard(shell).await?.printer_mut();
    printer.set_input(text);
    printer.print().await;

    let status = printer.status().unwrap_or_default().to_string();
    // The input is only cleared once the bridge accepted the job.
    if !printer.input().is_empty() {
        bail!(status);
    }
    writeln!(out, "{status}")?;
    Ok(())
}

async fn scan<W: Write>(shell: &mut AppShell, out: &mut W) -> anyhow::Result<()> {
    let scanner = open_dashboard(shell).await?.scanner();
    if !scanner.readiness().is_ready() {
        bail!(bridge_client::application::scanner::SCANNER_NOT_READY);
    }
    let accepted = scanner.scan().await;
    let status = scanner
        .status()
        .context("the scanner panel reported no status")?;
    if !accepted {
        bail!(status);
    }
    writeln!(out, "{status}")?;
    Ok(())
}

async fn status<W: Write>(shell: &mut AppShell, out: &mut W) -> anyhow::Result<()> {
    let snapshot = open_dashboard(shell).await?.snapshot();
    write!(out, "{}", views::dashboard::render(&snapshot))?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
