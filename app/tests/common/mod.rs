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

#![allow(dead_code)]

use fwupd_api::{Device, DeviceFlags, InstallOptions, Release, Remote, RemoteKind};
use gnome_firmware::client::{DaemonEvent, FirmwareDaemon};
use gnome_firmware::config::AppConfig;
use gnome_firmware::error::FirmwareError;
use gnome_firmware::frontend::{Command, Frontend, Prompt};
use gnome_firmware::main_window::MainWindow;
use gnome_firmware::session::Actions;
use gnome_firmware::system_control::PowerControl;
use gnome_firmware::view::Field;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub fn device(id: &str, name: &str, flags: DeviceFlags) -> Device {
    Device {
        id: id.to_string(),
        name: name.to_string(),
        version: Some("1.2.3".to_string()),
        flags,
        ..Default::default()
    }
}

pub fn release(version: &str, remote_id: &str, uri: &str) -> Release {
    Release {
        version: version.to_string(),
        remote_id: Some(remote_id.to_string()),
        uri: uri.to_string(),
        flags: fwupd_api::ReleaseFlags::IS_UPGRADE,
        ..Default::default()
    }
}

/// A local remote whose firmware lives next to its cache file in `dir`.
pub fn local_remote(id: &str, dir: &Path) -> Remote {
    Remote {
        id: id.to_string(),
        kind: RemoteKind::Local,
        enabled: true,
        filename_cache: Some(dir.join("firmware.xml.gz").to_string_lossy().into_owned()),
        ..Default::default()
    }
}

pub fn daemon_error(message: &str) -> FirmwareError {
    FirmwareError::Daemon {
        name: "org.freedesktop.fwupd.Internal".to_string(),
        message: message.to_string(),
    }
}

/// What the in-process daemon knows and what it was asked.
#[derive(Default)]
pub struct DaemonState {
    pub devices: RefCell<Vec<Device>>,
    /// Devices reported once an install has finished.
    pub devices_after_install: RefCell<Option<Vec<Device>>>,
    pub releases: RefCell<HashMap<String, Vec<Release>>>,
    pub remotes: RefCell<Vec<Remote>>,
    /// Methods that fail with a daemon error.
    pub failing: RefCell<HashSet<&'static str>>,
    /// Signals sent while an install is running.
    pub install_progress: RefCell<Vec<DaemonEvent>>,
    pub events: RefCell<Option<mpsc::UnboundedSender<DaemonEvent>>>,
    pub calls: RefCell<Vec<String>>,
    /// Content of every file handed to the daemon.
    pub received_files: RefCell<Vec<String>>,
}

impl DaemonState {
    pub fn fail(&self, method: &'static str) {
        self.failing.borrow_mut().insert(method);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn call(&self, method: &'static str, args: String) -> Result<(), FirmwareError> {
        self.calls.borrow_mut().push(format!("{method}({args})"));
        if self.failing.borrow().contains(method) {
            return Err(daemon_error(&format!("{method} failed")));
        }
        Ok(())
    }

    fn receive(&self, mut file: File) {
        let mut content = String::new();
        if file.read_to_string(&mut content).is_ok() {
            self.received_files.borrow_mut().push(content);
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeDaemon(pub Rc<DaemonState>);

impl FirmwareDaemon for FakeDaemon {
    async fn get_devices(&self) -> Result<Vec<Device>, FirmwareError> {
        self.0.call("GetDevices", String::new())?;
        Ok(self.0.devices.borrow().clone())
    }

    async fn get_releases(&self, device_id: &str) -> Result<Vec<Release>, FirmwareError> {
        self.0.call("GetReleases", device_id.to_string())?;
        self.0
            .releases
            .borrow()
            .get(device_id)
            .cloned()
            .ok_or_else(|| daemon_error("No releases found"))
    }

    async fn get_remotes(&self) -> Result<Vec<Remote>, FirmwareError> {
        self.0.call("GetRemotes", String::new())?;
        Ok(self.0.remotes.borrow().clone())
    }

    async fn install(
        &self,
        device_id: &str,
        file: File,
        options: &InstallOptions,
    ) -> Result<(), FirmwareError> {
        let keys: Vec<&str> = options.iter().map(|option| option.key()).collect();
        self.0
            .call("Install", format!("{device_id}, [{}]", keys.join(",")))?;
        self.0.receive(file);
        if let Some(tx) = self.0.events.borrow().as_ref() {
            for event in self.0.install_progress.borrow_mut().drain(..) {
                let _ = tx.send(event);
            }
        }
        // leave room for the window to show progress
        tokio::time::sleep(Duration::from_millis(50)).await;
        if let Some(devices) = self.0.devices_after_install.borrow_mut().take() {
            *self.0.devices.borrow_mut() = devices;
        }
        Ok(())
    }

    async fn unlock(&self, device_id: &str) -> Result<(), FirmwareError> {
        self.0.call("Unlock", device_id.to_string())
    }

    async fn verify(&self, device_id: &str) -> Result<(), FirmwareError> {
        self.0.call("Verify", device_id.to_string())
    }

    async fn verify_update(&self, device_id: &str) -> Result<(), FirmwareError> {
        self.0.call("VerifyUpdate", device_id.to_string())
    }

    async fn update_metadata(
        &self,
        remote_id: &str,
        data: File,
        signature: File,
    ) -> Result<(), FirmwareError> {
        self.0.call("UpdateMetadata", remote_id.to_string())?;
        self.0.receive(data);
        self.0.receive(signature);
        Ok(())
    }

    async fn modify_remote(
        &self,
        remote_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), FirmwareError> {
        self.0
            .call("ModifyRemote", format!("{remote_id}, {key}, {value}"))?;
        if let Some(remote) = self
            .0
            .remotes
            .borrow_mut()
            .iter_mut()
            .find(|remote| remote.id == remote_id)
        {
            remote.enabled = value == "true";
        }
        Ok(())
    }
}

/// A front-end that answers from a script and records everything it is told.
#[derive(Default)]
pub struct ScriptedFrontend {
    commands: VecDeque<Command>,
    answers: VecDeque<bool>,
    pub errors: Vec<(String, Option<String>)>,
    pub infos: Vec<(String, Option<String>)>,
    pub prompts: Vec<Prompt>,
    pub loading_labels: Vec<String>,
    pub status_labels: Vec<String>,
    pub device_lists: Vec<Vec<String>>,
    pub details: Vec<(String, Vec<Field>)>,
    pub actions: Vec<Actions>,
    pub banner: Option<bool>,
}

impl ScriptedFrontend {
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        ScriptedFrontend {
            commands: commands.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn answering(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers = answers.into_iter().collect();
        self
    }

    pub fn error_titles(&self) -> Vec<String> {
        self.errors.iter().map(|(title, _)| title.clone()).collect()
    }

    pub fn last_devices(&self) -> Vec<String> {
        self.device_lists.last().cloned().unwrap_or_default()
    }
}

impl Frontend for ScriptedFrontend {
    fn show_error(&mut self, title: &str, message: Option<&str>) {
        self.errors
            .push((title.to_string(), message.map(str::to_string)));
    }

    fn show_info(&mut self, title: &str, message: Option<&str>) {
        self.infos
            .push((title.to_string(), message.map(str::to_string)));
    }

    async fn confirm(&mut self, prompt: &Prompt) -> bool {
        self.prompts.push(prompt.clone());
        self.answers.pop_front().unwrap_or(false)
    }

    fn set_loading(&mut self, _loading: bool) {}

    fn set_loading_label(&mut self, text: &str) {
        self.loading_labels.push(text.to_string());
    }

    fn set_status_label(&mut self, text: &str) {
        self.status_labels.push(text.to_string());
    }

    fn show_devices(&mut self, devices: &[Device], _selected: Option<&str>) {
        self.device_lists
            .push(devices.iter().map(|device| device.id.clone()).collect());
    }

    fn show_releases(&mut self, _releases: &[Release]) {}

    fn show_details(&mut self, title: &str, fields: &[Field]) {
        self.details.push((title.to_string(), fields.to_vec()));
    }

    fn show_actions(&mut self, actions: &Actions) {
        self.actions.push(actions.clone());
    }

    fn set_lvfs_banner(&mut self, visible: bool) {
        self.banner = Some(visible);
    }

    async fn next_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }
}

#[derive(Default)]
pub struct PowerState {
    pub requests: RefCell<Vec<&'static str>>,
    pub fail: RefCell<bool>,
}

#[derive(Clone, Default)]
pub struct FakePower(pub Rc<PowerState>);

impl FakePower {
    fn request(&self, what: &'static str) -> Result<(), FirmwareError> {
        self.0.requests.borrow_mut().push(what);
        if *self.0.fail.borrow() {
            return Err(FirmwareError::Unsupported("not allowed".to_string()));
        }
        Ok(())
    }
}

impl PowerControl for FakePower {
    async fn reboot(&self) -> Result<(), FirmwareError> {
        self.request("reboot")
    }

    async fn shutdown(&self) -> Result<(), FirmwareError> {
        self.request("shutdown")
    }
}

pub type TestWindow = MainWindow<FakeDaemon, ScriptedFrontend, FakePower>;

/// A window over `daemon` with its cache in `cache_dir`, plus the sender of its signals.
pub fn window(
    daemon: &FakeDaemon,
    frontend: ScriptedFrontend,
    power: &FakePower,
    cache_dir: &Path,
) -> (TestWindow, mpsc::UnboundedSender<DaemonEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    *daemon.0.events.borrow_mut() = Some(tx.clone());
    let config = AppConfig {
        cache_dir: cache_dir.to_path_buf(),
        proxy: None,
    };
    let window = MainWindow::new(
        daemon.clone(),
        frontend,
        power.clone(),
        config,
        rx,
        CancellationToken::new(),
    );
    (window, tx)
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind a local port");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server stopped");
    });
    format!("http://{addr}")
}
