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

//! State of the current selection and of the operation in progress.
//!
//! A `Session` is owned by the main window and passed by reference to every workflow, so
//! nothing about the current device or release lives in globals.

use crate::frontend::Prompt;
use crate::progress::ProgressEstimator;
use crate::rows::ReleaseList;
use fwupd_api::{Device, DeviceFlags, InstallOption, InstallOptions, Release, ReleaseFlags};

/// Which page of the window is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Loading,
    Device,
    Release,
}

/// What an install does relative to the installed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    Upgrade,
    Downgrade,
    Reinstall,
}

impl InstallKind {
    pub fn for_release(release: &Release) -> Self {
        if release.has_flag(ReleaseFlags::IS_UPGRADE) {
            InstallKind::Upgrade
        } else if release.has_flag(ReleaseFlags::IS_DOWNGRADE) {
            InstallKind::Downgrade
        } else {
            InstallKind::Reinstall
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InstallKind::Upgrade => "Upgrade",
            InstallKind::Downgrade => "Downgrade",
            InstallKind::Reinstall => "Reinstall",
        }
    }
}

/// The long-running operation shown in the loading page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Update,
    Downgrade,
    Install,
}

impl From<InstallKind> for Operation {
    fn from(kind: InstallKind) -> Self {
        match kind {
            InstallKind::Upgrade => Operation::Update,
            InstallKind::Downgrade => Operation::Downgrade,
            InstallKind::Reinstall => Operation::Install,
        }
    }
}

/// Options for installing `release` on `device`, computed fresh for every install.
pub fn install_options(device: &Device, release: &Release) -> InstallOptions {
    let mut options = InstallOptions::new();
    match InstallKind::for_release(release) {
        InstallKind::Reinstall => options.insert(InstallOption::AllowReinstall),
        InstallKind::Downgrade => options.insert(InstallOption::AllowOlder),
        InstallKind::Upgrade => {}
    }
    if device.has_flag(DeviceFlags::ONLY_OFFLINE) {
        options.insert(InstallOption::Offline);
    }
    options
}

/// The confirmation asked before writing firmware.
pub fn install_prompt(device: &Device, release: &Release) -> Prompt {
    let action = InstallKind::for_release(release).label();
    let body = if device.has_flag(DeviceFlags::USABLE_DURING_UPDATE) {
        "The device will remain usable for the duration of the update"
    } else {
        "The device will be unusable while the update is installing"
    };
    Prompt {
        title: format!("{action} {} firmware version {}", device.name, release.version),
        body: Some(body.to_string()),
        accept: action.to_string(),
    }
}

/// Actions currently offered for the selected device and release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions {
    pub unlock: bool,
    pub verify: bool,
    pub verify_update: bool,
    pub releases: bool,
    pub back: bool,
    pub refresh: bool,
    /// Label of the install action when a release is shown.
    pub install: Option<&'static str>,
}

#[derive(Debug, Default)]
pub struct Session {
    pub mode: Mode,
    pub device: Option<Device>,
    pub releases: ReleaseList,
    pub release: Option<Release>,
    pub operation: Option<Operation>,
    /// Outcome of the automatic verification of the current device.
    pub verification: Option<Result<(), String>>,
    pub progress: ProgressEstimator,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `device` current, forgetting everything learned about the previous one.
    pub fn set_device(&mut self, device: Option<Device>) {
        self.device = device;
        self.release = None;
        self.releases.clear();
        self.verification = None;
        self.mode = Mode::Device;
    }

    /// Show the release at `index` of the release list.
    pub fn select_release(&mut self, index: usize) -> Option<&Release> {
        let release = self.releases.select_index(index)?.clone();
        self.release = Some(release);
        self.mode = Mode::Release;
        self.release.as_ref()
    }

    pub fn back(&mut self) {
        self.release = None;
        self.mode = Mode::Device;
    }

    pub fn begin(&mut self, operation: Operation) {
        self.operation = Some(operation);
        self.progress.reset();
    }

    pub fn finish(&mut self) {
        self.operation = None;
    }

    pub fn verification_matched(&self) -> bool {
        matches!(self.verification, Some(Ok(())))
    }

    pub fn actions(&self) -> Actions {
        let Some(device) = self.device.as_ref() else {
            return Actions {
                refresh: self.mode != Mode::Release,
                ..Default::default()
            };
        };
        let matched = self.verification_matched();
        Actions {
            unlock: device.has_flag(DeviceFlags::LOCKED),
            verify: !matched && device.has_flag(DeviceFlags::CAN_VERIFY_IMAGE),
            verify_update: !matched && device.has_flag(DeviceFlags::CAN_VERIFY),
            releases: !self.releases.is_empty(),
            back: self.mode == Mode::Release,
            refresh: self.mode != Mode::Release,
            install: match (self.mode, self.release.as_ref()) {
                (Mode::Release, Some(release)) => Some(InstallKind::for_release(release).label()),
                _ => None,
            },
        }
    }
}
