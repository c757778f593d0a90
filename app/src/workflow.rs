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

//! Multi-step operations started by the user.
//!
//! Each workflow reports its own failure to the front-end with a title naming the action, so
//! callers never see an error. Nothing is retried.

use crate::checksum::best_checksum;
use crate::client::{DaemonEvent, FirmwareDaemon};
use crate::config::{LVFS_REMOTE_ID, basename, dirname};
use crate::download::DownloadStatus;
use crate::error::FirmwareError;
use crate::format::operation_label;
use crate::frontend::{Frontend, Prompt};
use crate::main_window::{MainWindow, show_device_changed};
use crate::session::{InstallKind, Operation, install_options, install_prompt};
use crate::system_control::PowerControl;
use crate::system_io::{fs_mkdir_parent, fs_open};
use fwupd_api::{Device, DeviceFlags, InstallOptions, Release, Remote, RemoteKind};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Steps of an install, in order. A failure in any step ends the install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Installing,
    Refreshing,
    PromptingReboot,
    Done,
}

impl InstallStage {
    /// Title of the error shown when this stage fails.
    pub fn failure_title(self) -> &'static str {
        match self {
            InstallStage::Refreshing => "Failed to load device list",
            _ => "Failed to install firmware release",
        }
    }
}

/// Where the firmware for a release comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareSource {
    /// Already on disk, installed from this path.
    Local(PathBuf),
    /// Fetched into the cache from this URI.
    Download(String),
}

/// Absolute firmware URI for a release `url` published by `remote`.
///
/// A remote with a firmware base URI serves every file from there. Otherwise absolute URLs
/// are kept and relative ones resolve against the directory of the metadata.
pub fn build_firmware_uri(remote: &Remote, url: &str) -> Result<String, FirmwareError> {
    if let Some(base) = remote.firmware_base_uri.as_deref() {
        return Ok(format!("{}/{}", base.trim_end_matches('/'), basename(url)));
    }
    if url.contains("://") {
        return Ok(url.to_string());
    }
    match remote.metadata_uri.as_deref() {
        Some(metadata_uri) => Ok(format!("{}/{url}", dirname(metadata_uri))),
        None => Err(FirmwareError::InvalidUri(format!(
            "no metadata URI available for {}",
            remote.id
        ))),
    }
}

pub fn resolve_firmware_source(remote: &Remote, url: &str) -> Result<FirmwareSource, FirmwareError> {
    match remote.kind {
        RemoteKind::Local => {
            let cache = remote.filename_cache.as_deref().ok_or_else(|| {
                FirmwareError::NotFound(format!("no cache file for remote {}", remote.id))
            })?;
            Ok(FirmwareSource::Local(Path::new(dirname(cache)).join(url)))
        }
        RemoteKind::Directory => Ok(FirmwareSource::Local(PathBuf::from(
            url.strip_prefix("file://").unwrap_or(url),
        ))),
        _ => build_firmware_uri(remote, url).map(FirmwareSource::Download),
    }
}

/// True when no remote will provide firmware and the LVFS could be turned on.
pub fn lvfs_banner_needed(remotes: &[Remote]) -> bool {
    let mut disabled_lvfs = false;
    let mut enabled_download = false;
    for remote in remotes {
        debug!(
            "{} is {}",
            remote.id,
            if remote.enabled { "enabled" } else { "disabled" }
        );
        if remote.enabled {
            enabled_download |= remote.kind == RemoteKind::Download;
        } else if remote.id == LVFS_REMOTE_ID {
            disabled_lvfs = true;
        }
    }
    disabled_lvfs && !enabled_download
}

impl<D: FirmwareDaemon, F: Frontend, P: PowerControl> MainWindow<D, F, P> {
    pub(crate) fn remotes_loaded(&mut self, remotes: Result<Vec<Remote>, FirmwareError>) {
        match remotes {
            Ok(remotes) => self.frontend.set_lvfs_banner(lvfs_banner_needed(&remotes)),
            Err(e) => self
                .frontend
                .show_error("Failed to load list of remotes", Some(&e.to_string())),
        }
    }

    fn current_device(&mut self) -> Option<Device> {
        let device = self.session.device.clone();
        if device.is_none() {
            self.frontend.show_error("No device selected", None);
        }
        device
    }

    async fn download(
        &mut self,
        uri: &str,
        dest: &Path,
        expected: Option<&str>,
    ) -> Result<(), FirmwareError> {
        let frontend = &mut self.frontend;
        self.downloader
            .download(uri, dest, expected, |status| {
                frontend.set_loading_label(&status.label())
            })
            .await
    }

    /// Ask for confirmation, then install the shown release on the current device.
    pub(crate) async fn install_release(&mut self) {
        let (Some(device), Some(release)) =
            (self.session.device.clone(), self.session.release.clone())
        else {
            self.frontend.show_error("No release selected", None);
            return;
        };
        if !self.frontend.confirm(&install_prompt(&device, &release)).await {
            return;
        }

        self.session
            .begin(Operation::from(InstallKind::for_release(&release)));
        self.frontend.set_loading(true);
        let mut stage = InstallStage::Installing;
        let result = self.install_stages(&device, &release, &mut stage).await;
        self.frontend.set_loading(false);
        self.session.finish();
        match result {
            Ok(()) => debug!("Installation complete."),
            Err(e) => self
                .frontend
                .show_error(stage.failure_title(), Some(&e.to_string())),
        }
    }

    async fn install_stages(
        &mut self,
        device: &Device,
        release: &Release,
        stage: &mut InstallStage,
    ) -> Result<(), FirmwareError> {
        *stage = InstallStage::Installing;
        let path = self.fetch_firmware(device, release).await?;
        let options = install_options(device, release);
        if let Some(operation) = self.session.operation {
            self.frontend
                .set_loading_label(&operation_label(operation, &device.name));
        }
        self.session.progress.reset();
        self.install_with_progress(&device.id, &path, &options)
            .await?;

        *stage = InstallStage::Refreshing;
        let devices = self.daemon.get_devices().await?;
        self.devices.sync_selecting(devices, &device.id);
        self.show_devices();
        let installed = self
            .devices
            .get(&device.id)
            .cloned()
            .unwrap_or_else(|| device.clone());
        self.session.set_device(Some(installed.clone()));
        match self.daemon.get_releases(&installed.id).await {
            Ok(releases) => self.session.releases.replace(releases),
            Err(e) => debug!("ignoring: {e}"),
        }

        *stage = InstallStage::PromptingReboot;
        if installed.has_flag(DeviceFlags::NEEDS_SHUTDOWN)
            || installed.has_flag(DeviceFlags::NEEDS_REBOOT)
        {
            self.reboot_shutdown_prompt(&installed).await;
        } else {
            self.frontend.show_info(
                "Installation successful",
                Some(&format!(
                    "Installed firmware version {} on {}",
                    release.version, installed.name
                )),
            );
        }

        *stage = InstallStage::Done;
        self.refresh_ui();
        Ok(())
    }

    /// Path of the firmware archive for `release`, downloading it when needed.
    async fn fetch_firmware(
        &mut self,
        device: &Device,
        release: &Release,
    ) -> Result<PathBuf, FirmwareError> {
        let source = match release.remote_id.as_deref() {
            Some(remote_id) => {
                let remote = self.daemon.get_remote_by_id(remote_id).await?;
                resolve_firmware_source(&remote, &release.uri)?
            }
            None => FirmwareSource::Download(release.uri.clone()),
        };
        let uri = match source {
            FirmwareSource::Local(path) => return Ok(path),
            FirmwareSource::Download(uri) => uri,
        };

        debug!("Downloading {} for {}...", release.version, device.name);
        self.frontend
            .set_loading_label(&DownloadStatus::Preparing.label());
        let dest = self.config.user_cache_path(&uri);
        self.frontend
            .set_loading_label(&DownloadStatus::CreatingCachePath.label());
        fs_mkdir_parent(&dest)?;
        self.download(&uri, &dest, best_checksum(&release.checksums))
            .await?;
        Ok(dest)
    }

    /// Run `Install` while showing `DeviceChanged` progress. Other signals wait in `pending`.
    async fn install_with_progress(
        &mut self,
        device_id: &str,
        path: &Path,
        options: &InstallOptions,
    ) -> Result<(), FirmwareError> {
        let file = fs_open(path)?;
        let session = &mut self.session;
        let devices = &mut self.devices;
        let frontend = &mut self.frontend;
        let events = &mut self.events;
        let pending = &mut self.pending;
        let install = self.daemon.install(device_id, file, options);
        tokio::pin!(install);
        loop {
            tokio::select! {
                result = &mut install => return result,
                Some(event) = events.recv() => match event {
                    DaemonEvent::DeviceChanged { device, status, percentage } => {
                        show_device_changed(session, devices, frontend, device, status, percentage)
                    }
                    other => pending.push_back(other),
                },
            }
        }
    }

    /// Offer to shut down or reboot when `device` needs it to finish an update.
    pub(crate) async fn reboot_shutdown_prompt(&mut self, device: &Device) {
        if device.has_flag(DeviceFlags::NEEDS_SHUTDOWN) {
            let prompt = Prompt::yes_no(
                "An update requires the system to shutdown to complete.",
                "Shutdown now?",
            );
            if self.frontend.confirm(&prompt).await {
                if let Err(e) = self.power.shutdown().await {
                    debug!("Failed to shutdown device: {e}");
                    // the device stays out of the list until the machine restarts
                    self.devices.remove(&device.id);
                    self.show_devices();
                    self.frontend
                        .show_error("Failed to shutdown device", Some("A manual shutdown is required."));
                }
            }
        }
        if device.has_flag(DeviceFlags::NEEDS_REBOOT) {
            let prompt = Prompt::yes_no("An update requires a reboot to complete.", "Restart now?");
            if self.frontend.confirm(&prompt).await {
                if let Err(e) = self.power.reboot().await {
                    debug!("Failed to reboot device: {e}");
                    self.devices.remove(&device.id);
                    self.show_devices();
                    self.frontend
                        .show_error("Failed to reboot device", Some("A manual reboot is required."));
                }
            }
        }
    }

    pub(crate) async fn verify_device(&mut self) {
        let Some(device) = self.current_device() else {
            return;
        };
        let prompt = Prompt::yes_no(
            "Verify firmware checksums?",
            "The device may be unusable during this action",
        );
        if !self.frontend.confirm(&prompt).await {
            return;
        }
        match self.daemon.verify(&device.id).await {
            Ok(()) => self.frontend.show_info(
                "Verification succeeded",
                Some(&format!("{} firmware checksums matched", device.name)),
            ),
            Err(e) => self
                .frontend
                .show_error("Failed to verify firmware", Some(&e.to_string())),
        }
    }

    pub(crate) async fn verify_update_device(&mut self) {
        let Some(device) = self.current_device() else {
            return;
        };
        let prompt = Prompt::yes_no(
            "Update cryptographic hash",
            "Record current device cryptographic hashes as verified?",
        );
        if !self.frontend.confirm(&prompt).await {
            return;
        }
        if let Err(e) = self.daemon.verify_update(&device.id).await {
            self.frontend
                .show_error("Failed to update checksums", Some(&e.to_string()));
        }
        self.refresh_ui();
    }

    pub(crate) async fn unlock_device(&mut self) {
        let Some(device) = self.current_device() else {
            return;
        };
        match self.daemon.unlock(&device.id).await {
            Ok(()) => self.reboot_shutdown_prompt(&device).await,
            Err(e) => self
                .frontend
                .show_error("Failed to unlock device", Some(&e.to_string())),
        }
    }

    /// Download fresh metadata for every enabled download remote.
    pub(crate) async fn refresh_metadata(&mut self) {
        self.frontend.set_loading(true);
        let result = self.download_metadata().await;
        self.frontend.set_loading(false);
        if let Err(e) = result {
            self.frontend
                .show_error("Failed to download metadata", Some(&e.to_string()));
        }
    }

    async fn download_metadata(&mut self) -> Result<(), FirmwareError> {
        let remotes = self.daemon.get_remotes().await?;
        for remote in remotes
            .iter()
            .filter(|remote| remote.enabled && remote.kind == RemoteKind::Download)
        {
            self.download_metadata_for_remote(remote).await?;
        }
        Ok(())
    }

    /// Fetch the metadata and signature of `remote` into the cache and hand both to the
    /// daemon. Cache files are named `<remote-id>-<basename>`.
    async fn download_metadata_for_remote(&mut self, remote: &Remote) -> Result<(), FirmwareError> {
        let missing = |what: &str| {
            FirmwareError::InvalidUri(format!("remote {} has no {what}", remote.id))
        };
        let cache = remote.filename_cache.as_deref().ok_or_else(|| missing("cache file"))?;
        let cache_sig = remote
            .filename_cache_sig
            .as_deref()
            .ok_or_else(|| missing("signature cache file"))?;
        let uri = remote.metadata_uri.as_deref().ok_or_else(|| missing("metadata URI"))?;
        let uri_sig = remote
            .metadata_uri_sig
            .as_deref()
            .ok_or_else(|| missing("signature URI"))?;

        info!("Refreshing metadata for {}", remote.id);
        let filename = self
            .config
            .user_cache_path(&format!("{}-{}", remote.id, basename(cache)));
        self.frontend
            .set_loading_label(&DownloadStatus::CreatingCachePath.label());
        fs_mkdir_parent(&filename)?;
        self.frontend
            .set_loading_label(&DownloadStatus::Preparing.label());
        self.download(uri, &filename, None).await?;

        let filename_sig = self
            .config
            .user_cache_path(&format!("{}-{}", remote.id, basename(cache_sig)));
        self.frontend
            .set_loading_label(&DownloadStatus::Preparing.label());
        self.download(uri_sig, &filename_sig, None).await?;

        self.daemon
            .update_metadata(&remote.id, fs_open(&filename)?, fs_open(&filename_sig)?)
            .await
    }

    /// Turn on the LVFS remote and fetch its metadata.
    pub(crate) async fn enable_lvfs(&mut self) {
        self.frontend.set_lvfs_banner(false);
        self.frontend.set_loading(true);
        if let Err((title, e)) = self.enable_lvfs_steps().await {
            self.frontend.show_error(title, Some(&e.to_string()));
        }
        self.frontend.set_loading(false);
    }

    async fn enable_lvfs_steps(&mut self) -> Result<(), (&'static str, FirmwareError)> {
        self.daemon
            .modify_remote(LVFS_REMOTE_ID, "Enabled", "true")
            .await
            .map_err(|e| ("Failed to enable LVFS", e))?;
        let remote = self
            .daemon
            .get_remote_by_id(LVFS_REMOTE_ID)
            .await
            .map_err(|e| ("Failed to find LVFS", e))?;
        self.download_metadata_for_remote(&remote)
            .await
            .map_err(|e| ("Failed to download metadata for LVFS", e))
    }
}
