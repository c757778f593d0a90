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

//! Connection to the fwupd daemon.
//!
//! [`FirmwareDaemon`] is everything the workflows need from the daemon. [`FwupdClient`]
//! implements it over one long-lived system bus connection, and also forwards the daemon's
//! device signals into a channel consumed by the main loop.

use crate::error::FirmwareError;
use fwupd_api::proxies::daemon_proxy::DaemonProxy;
use fwupd_api::types::from_dicts;
use fwupd_api::{Device, InstallOptions, Release, Remote, Status};
use futures_util::StreamExt;
use log::{debug, trace, warn};
use std::fs::File;
use std::os::fd::AsFd;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use zbus::Connection;
use zbus::zvariant::Fd;

/// A device signal from the daemon.
#[derive(Debug, Clone, PartialEq)]
pub enum DaemonEvent {
    DeviceAdded(Device),
    DeviceRemoved(Device),
    /// A device changed, with the daemon status and progress read when the signal arrived.
    DeviceChanged {
        device: Device,
        status: Status,
        percentage: u32,
    },
}

#[allow(async_fn_in_trait)]
pub trait FirmwareDaemon {
    async fn get_devices(&self) -> Result<Vec<Device>, FirmwareError>;
    async fn get_releases(&self, device_id: &str) -> Result<Vec<Release>, FirmwareError>;
    async fn get_remotes(&self) -> Result<Vec<Remote>, FirmwareError>;

    /// The daemon has no lookup by identifier, so this filters `GetRemotes`.
    async fn get_remote_by_id(&self, remote_id: &str) -> Result<Remote, FirmwareError> {
        self.get_remotes()
            .await?
            .into_iter()
            .find(|remote| remote.id == remote_id)
            .ok_or_else(|| FirmwareError::NotFound(format!("no remote found with ID {remote_id}")))
    }

    async fn install(
        &self,
        device_id: &str,
        file: File,
        options: &InstallOptions,
    ) -> Result<(), FirmwareError>;
    async fn unlock(&self, device_id: &str) -> Result<(), FirmwareError>;
    async fn verify(&self, device_id: &str) -> Result<(), FirmwareError>;
    async fn verify_update(&self, device_id: &str) -> Result<(), FirmwareError>;
    async fn update_metadata(
        &self,
        remote_id: &str,
        data: File,
        signature: File,
    ) -> Result<(), FirmwareError>;
    async fn modify_remote(&self, remote_id: &str, key: &str, value: &str)
    -> Result<(), FirmwareError>;
}

pub struct FwupdClient {
    connection: Connection,
    proxy: DaemonProxy<'static>,
}

impl FwupdClient {
    pub async fn connect() -> Result<Self, FirmwareError> {
        let connection = Connection::system().await?;
        let proxy = DaemonProxy::new(&connection).await?;
        Ok(FwupdClient { connection, proxy })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub async fn daemon_version(&self) -> Result<String, FirmwareError> {
        Ok(self.proxy.daemon_version().await?)
    }

    /// Forward the daemon's device signals until `cancel` fires.
    ///
    /// Each signal stream is drained by its own task on the current runtime.
    pub async fn subscribe(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::UnboundedReceiver<DaemonEvent>, FirmwareError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut added = Box::pin(self.proxy.receive_device_added().await?);
        let (added_tx, added_cancel) = (tx.clone(), cancel.clone());
        tokio::spawn(async move {
            while let Some(signal) = next_or_cancel(&mut added, &added_cancel).await {
                match signal.args() {
                    Ok(args) => {
                        let device = Device::from(args.device());
                        debug!("Emitting ::device-added({})", device.id);
                        if added_tx.send(DaemonEvent::DeviceAdded(device)).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("malformed DeviceAdded signal: {e}"),
                }
            }
        });

        let mut removed = Box::pin(self.proxy.receive_device_removed().await?);
        let (removed_tx, removed_cancel) = (tx.clone(), cancel.clone());
        tokio::spawn(async move {
            while let Some(signal) = next_or_cancel(&mut removed, &removed_cancel).await {
                match signal.args() {
                    Ok(args) => {
                        let device = Device::from(args.device());
                        debug!("Emitting ::device-removed({})", device.id);
                        if removed_tx.send(DaemonEvent::DeviceRemoved(device)).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("malformed DeviceRemoved signal: {e}"),
                }
            }
        });

        let mut changed = Box::pin(self.proxy.receive_device_changed().await?);
        let proxy = self.proxy.clone();
        tokio::spawn(async move {
            while let Some(signal) = next_or_cancel(&mut changed, &cancel).await {
                let device = match signal.args() {
                    Ok(args) => Device::from(args.device()),
                    Err(e) => {
                        warn!("malformed DeviceChanged signal: {e}");
                        continue;
                    }
                };
                let status = Status::from(proxy.status().await.unwrap_or_default());
                let percentage = proxy.percentage().await.unwrap_or_default();
                trace!("Emitting ::device-changed({}) {status:?} {percentage}%", device.id);
                let event = DaemonEvent::DeviceChanged {
                    device,
                    status,
                    percentage,
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

async fn next_or_cancel<S>(stream: &mut S, cancel: &CancellationToken) -> Option<S::Item>
where
    S: futures_util::Stream + Unpin,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        item = stream.next() => item,
    }
}

impl FirmwareDaemon for FwupdClient {
    async fn get_devices(&self) -> Result<Vec<Device>, FirmwareError> {
        Ok(from_dicts(&self.proxy.get_devices().await?))
    }

    async fn get_releases(&self, device_id: &str) -> Result<Vec<Release>, FirmwareError> {
        Ok(from_dicts(&self.proxy.get_releases(device_id).await?))
    }

    async fn get_remotes(&self) -> Result<Vec<Remote>, FirmwareError> {
        Ok(from_dicts(&self.proxy.get_remotes().await?))
    }

    async fn install(
        &self,
        device_id: &str,
        file: File,
        options: &InstallOptions,
    ) -> Result<(), FirmwareError> {
        debug!("Install({device_id}, {:?})", options);
        self.proxy
            .install(device_id, Fd::from(file.as_fd()), options.to_dict())
            .await?;
        Ok(())
    }

    async fn unlock(&self, device_id: &str) -> Result<(), FirmwareError> {
        Ok(self.proxy.unlock(device_id).await?)
    }

    async fn verify(&self, device_id: &str) -> Result<(), FirmwareError> {
        Ok(self.proxy.verify(device_id).await?)
    }

    async fn verify_update(&self, device_id: &str) -> Result<(), FirmwareError> {
        Ok(self.proxy.verify_update(device_id).await?)
    }

    async fn update_metadata(
        &self,
        remote_id: &str,
        data: File,
        signature: File,
    ) -> Result<(), FirmwareError> {
        debug!("UpdateMetadata({remote_id})");
        self.proxy
            .update_metadata(remote_id, Fd::from(data.as_fd()), Fd::from(signature.as_fd()))
            .await?;
        Ok(())
    }

    async fn modify_remote(
        &self,
        remote_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), FirmwareError> {
        debug!("ModifyRemote({remote_id}, {key}, {value})");
        Ok(self.proxy.modify_remote(remote_id, key, value).await?)
    }
}
