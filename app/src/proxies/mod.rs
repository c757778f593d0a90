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

//! DBus proxies for the session managers that can reboot or power off the machine.
//!
//! Only the backend selected by cargo feature is built.
//!
//! - [`login1_proxy`] - systemd-logind, `org.freedesktop.login1`
//! - [`consolekit_proxy`] - ConsoleKit, `org.freedesktop.ConsoleKit`

#[cfg(feature = "consolekit")]
pub mod consolekit_proxy;
#[cfg(feature = "logind")]
pub mod login1_proxy;
