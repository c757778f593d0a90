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

use crate::types::Dict;
use std::collections::HashMap;
use zbus::zvariant::{Fd, Value};
use zbus::{Result, proxy};

#[proxy(
    default_service = "org.freedesktop.fwupd",
    interface = "org.freedesktop.fwupd",
    default_path = "/"
)]
pub trait Daemon {
    async fn get_devices(&self) -> Result<Vec<Dict>>;
    async fn get_releases(&self, device_id: &str) -> Result<Vec<Dict>>;
    async fn get_remotes(&self) -> Result<Vec<Dict>>;

    /// Install the cabinet archive behind `handle` on the device.
    async fn install(
        &self,
        device_id: &str,
        handle: Fd<'_>,
        options: HashMap<&str, Value<'_>>,
    ) -> Result<()>;

    async fn unlock(&self, device_id: &str) -> Result<()>;
    async fn verify(&self, device_id: &str) -> Result<()>;
    async fn verify_update(&self, device_id: &str) -> Result<()>;

    /// Replace the metadata of a remote with a downloaded file and its signature.
    async fn update_metadata(
        &self,
        remote_id: &str,
        data: Fd<'_>,
        signature: Fd<'_>,
    ) -> Result<()>;

    async fn modify_remote(&self, remote_id: &str, key: &str, value: &str) -> Result<()>;

    #[zbus(signal)]
    fn device_added(&self, device: Dict) -> Result<()>;
    #[zbus(signal)]
    fn device_removed(&self, device: Dict) -> Result<()>;
    #[zbus(signal)]
    fn device_changed(&self, device: Dict) -> Result<()>;

    #[zbus(property)]
    fn daemon_version(&self) -> Result<String>;
    #[zbus(property)]
    fn status(&self) -> Result<u32>;
    #[zbus(property)]
    fn percentage(&self) -> Result<u32>;
}
