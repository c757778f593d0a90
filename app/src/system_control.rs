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

//! Reboot and shutdown through the session manager.
//!
//! logind is used when the `logind` feature is enabled, ConsoleKit otherwise when
//! `consolekit` is. Without either every request fails with `FirmwareError::Unsupported`.

use crate::error::FirmwareError;
use log::info;
use zbus::Connection;

#[allow(async_fn_in_trait)]
pub trait PowerControl {
    async fn reboot(&self) -> Result<(), FirmwareError>;
    async fn shutdown(&self) -> Result<(), FirmwareError>;
}

/// The real machine, reached over the system bus.
pub struct SystemPower {
    #[cfg_attr(not(any(feature = "logind", feature = "consolekit")), allow(dead_code))]
    connection: Connection,
}

impl SystemPower {
    pub fn new(connection: Connection) -> Self {
        SystemPower { connection }
    }
}

#[cfg(feature = "logind")]
impl PowerControl for SystemPower {
    async fn reboot(&self) -> Result<(), FirmwareError> {
        use crate::proxies::login1_proxy::Login1ManagerProxy;
        info!("Requesting reboot from logind");
        let proxy = Login1ManagerProxy::new(&self.connection).await?;
        Ok(proxy.reboot(true).await?)
    }

    async fn shutdown(&self) -> Result<(), FirmwareError> {
        use crate::proxies::login1_proxy::Login1ManagerProxy;
        info!("Requesting power off from logind");
        let proxy = Login1ManagerProxy::new(&self.connection).await?;
        Ok(proxy.power_off(true).await?)
    }
}

#[cfg(all(feature = "consolekit", not(feature = "logind")))]
impl PowerControl for SystemPower {
    async fn reboot(&self) -> Result<(), FirmwareError> {
        use crate::proxies::consolekit_proxy::ConsoleKitManagerProxy;
        info!("Requesting restart from ConsoleKit");
        let proxy = ConsoleKitManagerProxy::new(&self.connection).await?;
        Ok(proxy.restart().await?)
    }

    async fn shutdown(&self) -> Result<(), FirmwareError> {
        use crate::proxies::consolekit_proxy::ConsoleKitManagerProxy;
        info!("Requesting stop from ConsoleKit");
        let proxy = ConsoleKitManagerProxy::new(&self.connection).await?;
        Ok(proxy.stop().await?)
    }
}

#[cfg(not(any(feature = "logind", feature = "consolekit")))]
impl PowerControl for SystemPower {
    async fn reboot(&self) -> Result<(), FirmwareError> {
        info!("No session manager backend to reboot with");
        Err(FirmwareError::Unsupported(
            "No supported backend compiled in to perform the operation.".to_string(),
        ))
    }

    async fn shutdown(&self) -> Result<(), FirmwareError> {
        info!("No session manager backend to shut down with");
        Err(FirmwareError::Unsupported(
            "No supported backend compiled in to perform the operation.".to_string(),
        ))
    }
}
