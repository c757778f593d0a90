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

//! The application's event loop.
//!
//! [`MainWindow`] owns the daemon client, the front-end, the device list and the session. It
//! waits on three sources at once: cancellation, daemon signals and user commands. Commands
//! run to completion before the next source is polled, except that an install keeps
//! showing progress from `DeviceChanged` signals while the daemon writes the firmware.

use crate::client::{DaemonEvent, FirmwareDaemon};
use crate::config::{APP_VERSION, AppConfig};
use crate::download::Downloader;
use crate::error::FirmwareError;
use crate::format::{operation_label, status_to_string};
use crate::frontend::{Command, Frontend};
use crate::rows::DeviceList;
use crate::session::{Mode, Session};
use crate::system_control::PowerControl;
use crate::view::{device_details, release_details};
use fwupd_api::{Device, DeviceFlags, Status};
use log::{debug, info};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct MainWindow<D, F, P> {
    pub(crate) daemon: D,
    pub(crate) frontend: F,
    pub(crate) power: P,
    pub(crate) downloader: Downloader,
    pub(crate) config: AppConfig,
    pub(crate) devices: DeviceList,
    pub(crate) session: Session,
    pub(crate) events: mpsc::UnboundedReceiver<DaemonEvent>,
    /// Signals that arrived while a command was running, handled once it finished.
    pub(crate) pending: VecDeque<DaemonEvent>,
    cancel: CancellationToken,
}

impl<D: FirmwareDaemon, F: Frontend, P: PowerControl> MainWindow<D, F, P> {
    pub fn new(
        daemon: D,
        frontend: F,
        power: P,
        config: AppConfig,
        events: mpsc::UnboundedReceiver<DaemonEvent>,
        cancel: CancellationToken,
    ) -> Self {
        MainWindow {
            daemon,
            frontend,
            power,
            downloader: Downloader::new(config.proxy.clone()),
            config,
            devices: DeviceList::new(),
            session: Session::new(),
            events,
            pending: VecDeque::new(),
            cancel,
        }
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Load the initial state, then serve events and commands until the user quits or
    /// `cancel` fires.
    pub async fn run(&mut self) -> Result<(), FirmwareError> {
        let cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            _ = self.load() => {}
        }

        loop {
            while let Some(event) = self.pending.pop_front() {
                self.handle_event(event).await;
            }
            let command = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(event) = self.events.recv() => {
                    self.handle_event(event).await;
                    continue;
                }
                command = self.frontend.next_command() => command,
            };
            let Some(command) = command.filter(|c| *c != Command::Quit) else {
                info!("Quit requested");
                break;
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.handle_command(command) => {}
            }
        }
        self.cancel.cancel();
        Ok(())
    }

    /// Fetch devices and remotes. Both calls are in flight together and each answer is
    /// handled on its own.
    pub async fn load(&mut self) {
        self.session.mode = Mode::Loading;
        self.frontend.set_loading(true);
        let (devices, remotes) =
            tokio::join!(self.daemon.get_devices(), self.daemon.get_remotes());
        self.frontend.set_loading(false);
        self.session.mode = Mode::Device;
        self.devices_loaded(devices).await;
        self.remotes_loaded(remotes);
    }

    async fn devices_loaded(&mut self, devices: Result<Vec<Device>, FirmwareError>) {
        match devices {
            Ok(devices) => {
                self.devices.sync(devices);
                self.show_devices();
                self.device_selected().await;
            }
            Err(e) => self
                .frontend
                .show_error("Failed to load device list", Some(&e.to_string())),
        }
    }

    pub(crate) fn show_devices(&mut self) {
        let selected = self.devices.selected().map(|device| device.id.clone());
        self.frontend
            .show_devices(self.devices.rows(), selected.as_deref());
    }

    /// Make the selected row the current device.
    ///
    /// Releases are fetched for updatable devices, a missing release list is not an error.
    /// Devices that can verify without an image are verified right away.
    pub(crate) async fn device_selected(&mut self) {
        let device = self.devices.selected().cloned();
        self.session.set_device(device.clone());
        let Some(device) = device else {
            self.refresh_ui();
            return;
        };

        if device.has_flag(DeviceFlags::UPDATABLE) {
            match self.daemon.get_releases(&device.id).await {
                Ok(releases) => self.session.releases.replace(releases),
                Err(e) => debug!("ignoring: {e}"),
            }
        }

        if device.has_flag(DeviceFlags::CAN_VERIFY) && !device.has_flag(DeviceFlags::CAN_VERIFY_IMAGE)
        {
            let result = self.daemon.verify(&device.id).await;
            self.session.verification = Some(result.map_err(|e| e.to_string()));
        }
        self.refresh_ui();
    }

    /// Show the page for the current mode and the actions it offers.
    pub(crate) fn refresh_ui(&mut self) {
        match self.session.mode {
            Mode::Loading => {}
            Mode::Device => match &self.session.device {
                Some(device) => {
                    let fields = device_details(device, self.session.verification.as_ref());
                    self.frontend.show_details(&device.name, &fields);
                }
                None => self.frontend.show_details("No device selected", &[]),
            },
            Mode::Release => {
                if let Some(release) = &self.session.release {
                    let title = match &release.name {
                        Some(name) => format!("{name} {}", release.version),
                        None => release.version.clone(),
                    };
                    self.frontend.show_details(&title, &release_details(release));
                }
            }
        }
        self.frontend.show_actions(&self.session.actions());
    }

    fn selected_id(&self) -> Option<String> {
        self.devices.selected().map(|device| device.id.clone())
    }

    pub async fn handle_event(&mut self, event: DaemonEvent) {
        match event {
            DaemonEvent::DeviceAdded(device) => {
                let before = self.selected_id();
                if self.devices.add(device) {
                    self.show_devices();
                    if self.selected_id() != before {
                        self.device_selected().await;
                    }
                }
            }
            DaemonEvent::DeviceRemoved(device) => {
                let before = self.selected_id();
                if self.devices.remove(&device.id) {
                    self.show_devices();
                    if self.selected_id() != before {
                        self.device_selected().await;
                    }
                }
            }
            DaemonEvent::DeviceChanged {
                device,
                status,
                percentage,
            } => show_device_changed(
                &mut self.session,
                &mut self.devices,
                &mut self.frontend,
                device,
                status,
                percentage,
            ),
        }
    }

    pub async fn handle_command(&mut self, command: Command) {
        debug!("command {command:?}");
        match command {
            Command::Devices => self.show_devices(),
            Command::Select { index } => {
                let found = index
                    .checked_sub(1)
                    .and_then(|idx| self.devices.select_index(idx))
                    .is_some();
                if found {
                    self.device_selected().await;
                } else {
                    self.frontend
                        .show_error("No such device", Some(&format!("There is no device {index}")));
                }
            }
            Command::Show => self.refresh_ui(),
            Command::Releases => self.frontend.show_releases(self.session.releases.rows()),
            Command::Release { index } => {
                let found = index
                    .checked_sub(1)
                    .and_then(|idx| self.session.select_release(idx))
                    .is_some();
                if found {
                    self.refresh_ui();
                } else {
                    self.frontend
                        .show_error("No such release", Some(&format!("There is no release {index}")));
                }
            }
            Command::Back => {
                self.session.back();
                self.refresh_ui();
            }
            Command::Install => self.install_release().await,
            Command::Verify => self.verify_device().await,
            Command::VerifyUpdate => self.verify_update_device().await,
            Command::Unlock => self.unlock_device().await,
            Command::Refresh => self.refresh_metadata().await,
            Command::EnableLvfs => self.enable_lvfs().await,
            Command::About => self.frontend.show_info(
                "About Firmware Update",
                Some(&format!(
                    "Firmware Update {APP_VERSION}\nManage firmware on devices\nLicensed under the GNU General Public License version 3"
                )),
            ),
            Command::Quit => self.cancel.cancel(),
        }
    }
}

/// Show progress from a `DeviceChanged` signal.
///
/// Only fields are borrowed, so this can run while the daemon call of an install is still
/// borrowing the client.
pub(crate) fn show_device_changed<F: Frontend>(
    session: &mut Session,
    devices: &mut DeviceList,
    frontend: &mut F,
    device: Device,
    status: Status,
    percentage: u32,
) {
    if let Some(operation) = session.operation {
        let mut text = format!("{}: {percentage}%\n", status_to_string(status));
        if session.progress.update(percentage) {
            if let Some(remaining) = session.progress.to_display_string() {
                text.push_str(&format!("{remaining}…"));
            }
        }
        frontend.set_status_label(&text);

        // same as last time
        if session.device.as_ref() == Some(&device) {
            return;
        }
        frontend.set_loading_label(&operation_label(operation, &device.name));
    }
    devices.update(device);
}
