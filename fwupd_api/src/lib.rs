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

//! Typed access to the fwupd daemon.
//!
//! fwupd publishes devices, releases and remotes as `a{sv}` dictionaries on the system DBus.
//! This crate provides the [`proxies::daemon_proxy`] used to call the daemon and the
//! read-only snapshot types in [`types`] that those dictionaries decode into.
//!
//! # DBus Service Information
//!
//! - **Service Name**: `org.freedesktop.fwupd`
//! - **Interface**: `org.freedesktop.fwupd` at `/`
//!
//! # Modules
//!
//! - [`flags`] - Device, release and install option bit sets
//! - [`proxies`] - The zbus proxy for the daemon interface
//! - [`types`] - `Device`, `Release`, `Remote` and `Status`

pub mod flags;
pub mod proxies;
pub mod types;

pub use flags::{DeviceFlags, InstallOption, InstallOptions, ReleaseFlags};
pub use types::{Device, Release, Remote, RemoteKind, Status};
