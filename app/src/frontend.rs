// This file is part of gnome-firmware, an application to manage device firmware through the fwupd daemon.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// gnome-firmware is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// gnome-firmware is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! The user-facing surface of the application.
//!
//! The main window drives a [`Frontend`]: it shows lists, details and messages, asks yes/no
//! questions, and yields the user's next [`Command`]. [`TerminalFrontend`] implements it as a
//! line-oriented console.

use crate::session::Actions;
use crate::view::Field;
use clap::{Parser, Subcommand};
use fwupd_api::{Device, Release};
use log::warn;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// A yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub body: Option<String>,
    /// Name of the accepting choice.
    pub accept: String,
}

impl Prompt {
    pub fn yes_no(title: &str, body: &str) -> Self {
        Prompt {
            title: title.to_string(),
            body: Some(body.to_string()),
            accept: "Yes".to_string(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(multicall = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

/// Something the user asked for.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List updatable devices
    Devices,
    /// Select the device at a 1-based position of the list
    Select { index: usize },
    /// Show the selected device or release again
    Show,
    /// List firmware releases for the selected device
    Releases,
    /// Show the release at a 1-based position of the release list
    Release { index: usize },
    /// Go back from a release to its device
    Back,
    /// Install the shown release
    Install,
    /// Verify the device firmware checksums
    Verify,
    /// Record the current device checksums as verified
    VerifyUpdate,
    /// Unlock the device
    Unlock,
    /// Download fresh metadata for every enabled remote
    Refresh,
    /// Enable the Linux Vendor Firmware Service
    EnableLvfs,
    /// Show information about this application
    About,
    /// Leave the application
    #[command(alias = "exit")]
    Quit,
}

/// Parse one input line. Blank lines yield no command.
pub fn parse_command(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    CommandLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

#[allow(async_fn_in_trait)]
pub trait Frontend {
    fn show_error(&mut self, title: &str, message: Option<&str>);
    fn show_info(&mut self, title: &str, message: Option<&str>);
    /// Ask a question, true when the user accepted.
    async fn confirm(&mut self, prompt: &Prompt) -> bool;
    fn set_loading(&mut self, loading: bool);
    fn set_loading_label(&mut self, text: &str);
    fn set_status_label(&mut self, text: &str);
    fn show_devices(&mut self, devices: &[Device], selected: Option<&str>);
    fn show_releases(&mut self, releases: &[Release]);
    fn show_details(&mut self, title: &str, fields: &[Field]);
    fn show_actions(&mut self, actions: &Actions);
    fn set_lvfs_banner(&mut self, visible: bool);
    /// The next command, or `None` once the user is gone.
    ///
    /// Must be cancel-safe: it is raced against daemon events.
    async fn next_command(&mut self) -> Option<Command>;
}

pub struct TerminalFrontend<R, W> {
    lines: Lines<R>,
    out: W,
    prompted: bool,
}

impl TerminalFrontend<BufReader<Stdin>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin, W: Write> TerminalFrontend<R, W> {
    pub fn new(input: R, out: W) -> Self {
        TerminalFrontend {
            lines: input.lines(),
            out,
            prompted: false,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let result = writeln!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write to the terminal: {e}");
        }
    }

    fn emit_prompt(&mut self, text: &str) {
        let result = write!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write to the terminal: {e}");
        }
    }

    async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read from the terminal: {e}");
                None
            }
        }
    }
}

fn indent(value: &str, width: usize) -> String {
    value
        .lines()
        .collect::<Vec<_>>()
        .join(&format!("\n{}", " ".repeat(width)))
}

impl<R: AsyncBufRead + Unpin, W: Write> Frontend for TerminalFrontend<R, W> {
    fn show_error(&mut self, title: &str, message: Option<&str>) {
        self.emit(&format!("Error: {title}"));
        if let Some(message) = message {
            self.emit(&format!("  {message}"));
        }
    }

    fn show_info(&mut self, title: &str, message: Option<&str>) {
        self.emit(title);
        if let Some(message) = message {
            self.emit(&format!("  {}", indent(message, 2)));
        }
    }

    async fn confirm(&mut self, prompt: &Prompt) -> bool {
        self.emit(&prompt.title);
        if let Some(body) = &prompt.body {
            self.emit(&format!("  {body}"));
        }
        self.emit_prompt(&format!("{}? [y/N] ", prompt.accept));
        let Some(answer) = self.read_line().await else {
            return false;
        };
        let answer = answer.trim().to_lowercase();
        answer == "y" || answer == "yes" || answer == prompt.accept.to_lowercase()
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            self.emit("Loading…");
        }
    }

    fn set_loading_label(&mut self, text: &str) {
        self.emit(&format!("  {text}"));
    }

    fn set_status_label(&mut self, text: &str) {
        self.emit(&format!("  {}", indent(text.trim_end(), 2)));
    }

    fn show_devices(&mut self, devices: &[Device], selected: Option<&str>) {
        if devices.is_empty() {
            self.emit("No updatable devices");
            return;
        }
        for (idx, device) in devices.iter().enumerate() {
            let marker = if selected == Some(device.id.as_str()) { '*' } else { ' ' };
            let version = device.version.as_deref().unwrap_or_default();
            self.emit(&format!("{marker}{:>3}. {} {version}", idx + 1, device.name));
        }
    }

    fn show_releases(&mut self, releases: &[Release]) {
        if releases.is_empty() {
            self.emit("No releases available");
            return;
        }
        for (idx, release) in releases.iter().enumerate() {
            let summary = release.summary.as_deref().unwrap_or_default();
            self.emit(&format!("{:>4}. {} {summary}", idx + 1, release.version));
        }
    }

    fn show_details(&mut self, title: &str, fields: &[Field]) {
        self.emit(title);
        let width = fields.iter().map(|f| f.title.len()).max().unwrap_or(0);
        for field in fields {
            let value = indent(&field.value, width + 4);
            self.emit(&format!("  {:>width$}: {value}", field.title));
        }
    }

    fn show_actions(&mut self, actions: &Actions) {
        let mut names: Vec<String> = Vec::new();
        if let Some(label) = actions.install {
            names.push(format!("install ({label})"));
        }
        for (offered, name) in [
            (actions.releases, "releases"),
            (actions.back, "back"),
            (actions.unlock, "unlock"),
            (actions.verify, "verify"),
            (actions.verify_update, "verify-update"),
            (actions.refresh, "refresh"),
        ] {
            if offered {
                names.push(name.to_string());
            }
        }
        self.emit(&format!("Actions: {}", names.join(", ")));
    }

    fn set_lvfs_banner(&mut self, visible: bool) {
        if visible {
            self.emit(
                "The Linux Vendor Firmware Service is not enabled. \
                 Run 'enable-lvfs' to receive firmware updates.",
            );
        }
    }

    async fn next_command(&mut self) -> Option<Command> {
        loop {
            if !self.prompted {
                self.emit_prompt("> ");
                self.prompted = true;
            }
            let line = self.read_line().await?;
            self.prompted = false;
            match parse_command(&line) {
                Ok(Some(command)) => return Some(command),
                Ok(None) => continue,
                Err(e) => self.emit(e.render().to_string().trim_end()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    #[rstest]
    #[case::devices("devices", Command::Devices)]
    #[case::select("select 2", Command::Select { index: 2 })]
    #[case::release(" release   1 ", Command::Release { index: 1 })]
    #[case::kebab("verify-update", Command::VerifyUpdate)]
    #[case::lvfs("enable-lvfs", Command::EnableLvfs)]
    #[case::exit_alias("exit", Command::Quit)]
    fn parses_commands(#[case] line: &str, #[case] expected: Command) {
        let parsed = parse_command(line);
        assert_that!(parsed.is_ok(), eq(true));
        expect_that!(parsed.unwrap(), some(eq(&expected)));
    }

    #[gtest]
    #[rstest]
    #[case::unknown("flash")]
    #[case::missing_index("select")]
    #[case::bad_index("select two")]
    fn rejects_bad_commands(#[case] line: &str) {
        expect_that!(parse_command(line).is_err(), eq(true));
    }

    #[gtest]
    fn blank_line_is_no_command() {
        expect_that!(parse_command("   ").unwrap(), none());
    }

    #[gtest]
    #[tokio::test]
    async fn reads_commands_skipping_errors() {
        let input: &[u8] = b"bogus\n\nselect 3\n";
        let mut frontend = TerminalFrontend::new(input, Vec::new());
        expect_that!(frontend.next_command().await, some(eq(&Command::Select { index: 3 })));
        expect_that!(frontend.next_command().await, none());
    }

    #[gtest]
    #[tokio::test]
    #[rstest]
    #[case::yes("y\n", true)]
    #[case::accept_label("Upgrade\n", true)]
    #[case::no("n\n", false)]
    #[case::eof("", false)]
    async fn confirm_answers(#[case] input: &str, #[case] expected: bool) {
        let mut frontend = TerminalFrontend::new(input.as_bytes(), Vec::new());
        let prompt = Prompt {
            title: "Upgrade Dock firmware version 2".to_string(),
            body: None,
            accept: "Upgrade".to_string(),
        };
        expect_that!(frontend.confirm(&prompt).await, eq(expected));
    }

    #[gtest]
    fn details_are_aligned() {
        let mut frontend = TerminalFrontend::new(&b""[..], Vec::new());
        frontend.show_details(
            "Dock",
            &[
                Field {
                    title: "Version".to_string(),
                    value: "1.0".to_string(),
                },
                Field {
                    title: "GUIDs".to_string(),
                    value: "a\nb".to_string(),
                },
            ],
        );
        let out = String::from_utf8(frontend.into_output()).unwrap();
        expect_that!(out, eq("Dock\n  Version: 1.0\n    GUIDs: a\n           b\n"));
    }
}
