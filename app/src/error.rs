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

//! The single error type of the application.
//!
//! Every helper returns `Result<_, FirmwareError>`; the workflow that called it decides how
//! the failure is shown to the user. Daemon errors keep the daemon's own message.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FirmwareError {
    #[error("FirmwareError::Bus: Failed to talk to the fwupd daemon: {0}")]
    Bus(zbus::Error),
    /// A method call the daemon answered with an error. Displayed verbatim.
    #[error("{message}")]
    Daemon { name: String, message: String },
    #[error("FirmwareError::Http: Failed to download {uri}: {reason}")]
    Http { uri: String, reason: String },
    #[error("Failed to download due to server limit{}", .0.as_deref().map(|body| format!(": {body}")).unwrap_or_default())]
    RateLimited(Option<String>),
    #[error("FirmwareError::Network: {0}")]
    Network(#[from] reqwest::Error),
    #[error("FirmwareError::Checksum: Checksum invalid, expected {expected} got {actual}")]
    Checksum { expected: String, actual: String },
    #[error("FirmwareError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("FirmwareError::IOWrite: An IO error occurred when writing to {file:?}: {e}")]
    IOWrite { file: PathBuf, e: std::io::Error },
    #[error("FirmwareError::IOCreate: An IO error occurred when creating {file:?}: {e}")]
    IOCreate { file: PathBuf, e: std::io::Error },
    #[error("FirmwareError::InvalidUri: {0}")]
    InvalidUri(String),
    #[error("FirmwareError::NotFound: {0}")]
    NotFound(String),
    #[error("FirmwareError::Markup: Failed to parse release description: {0}")]
    Markup(String),
    #[error("FirmwareError::Unsupported: {0}")]
    Unsupported(String),
}

impl From<zbus::Error> for FirmwareError {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, message, _) => FirmwareError::Daemon {
                message: message.unwrap_or_else(|| name.to_string()),
                name: name.to_string(),
            },
            other => FirmwareError::Bus(other),
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
    #[case::plain_body(None, "Failed to download due to server limit")]
    #[case::with_body(
        Some("retry in 10 minutes".to_string()),
        "Failed to download due to server limit: retry in 10 minutes"
    )]
    fn rate_limited_message(#[case] body: Option<String>, #[case] expected: &str) {
        expect_that!(FirmwareError::RateLimited(body).to_string(), eq(expected));
    }

    #[gtest]
    fn daemon_error_is_shown_verbatim() {
        let err = FirmwareError::Daemon {
            name: "org.freedesktop.fwupd.NothingToDo".to_string(),
            message: "Device is already at version 1.2.3".to_string(),
        };
        expect_that!(err.to_string(), eq("Device is already at version 1.2.3"));
    }

    #[gtest]
    fn io_errors_name_the_file() {
        let err = FirmwareError::IOCreate {
            file: PathBuf::from("/tmp/cache/gnome-firmware"),
            e: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        expect_that!(err.to_string(), contains_substring("/tmp/cache/gnome-firmware"));
    }
}
