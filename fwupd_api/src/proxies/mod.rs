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

//! DBus proxy interfaces for the fwupd daemon.
//!
//! The proxy trait is expanded by the `zbus` `#[proxy]` macro into `DaemonProxy`, which gives
//! typed, asynchronous access to the daemon's methods, signals and properties.
//!
//! # Modules
//!
//! - [`daemon_proxy`] - Device queries, install, verify, unlock, metadata and remotes

pub mod daemon_proxy;
