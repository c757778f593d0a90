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

//! gnome-firmware - install, verify and unlock device firmware through fwupd.
//!
//! The library holds everything but the process entry point so that the window logic can be
//! driven by a scripted front-end and an in-process daemon in tests.
//!
//! # Layers
//!
//! - [`client`] - Typed calls and signals of the fwupd daemon behind [`client::FirmwareDaemon`]
//! - [`main_window`] and [`workflow`] - The event loop and the user operations it runs
//! - [`frontend`] - The [`frontend::Frontend`] trait and its line-based terminal implementation
//! - [`download`] - Fetching firmware and metadata over HTTP into the user cache
//! - [`system_control`] - Rebooting and shutting down through the session manager
//!
//! The remaining modules are plain data and formatting helpers with no I/O of their own,
//! except [`system_io`].

pub mod checksum;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod frontend;
pub mod main_window;
pub mod progress;
pub mod proxies;
pub mod rows;
pub mod session;
pub mod system_control;
pub mod system_io;
pub mod view;
pub mod workflow;
