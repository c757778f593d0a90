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

//! The ordered device and release lists shown to the user, with their selection.
//!
//! Rows are keyed by device identifier. Signals deliver freshly decoded snapshots, so rows
//! are always found by identifier and never by position.

use fwupd_api::{Device, DeviceFlags, Release};
use log::debug;

#[derive(Debug, Default)]
pub struct DeviceList {
    rows: Vec<Device>,
    selected: Option<String>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Device] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, device_id: &str) -> Option<&Device> {
        self.rows.iter().find(|row| row.id == device_id)
    }

    pub fn selected(&self) -> Option<&Device> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    /// Select a row by identifier, returns false when there is no such row.
    pub fn select(&mut self, device_id: &str) -> bool {
        if self.get(device_id).is_none() {
            return false;
        }
        self.selected = Some(device_id.to_string());
        true
    }

    /// Select the row at a zero-based position.
    pub fn select_index(&mut self, index: usize) -> Option<&Device> {
        let id = self.rows.get(index)?.id.clone();
        self.selected = Some(id);
        self.selected()
    }

    fn select_first(&mut self) {
        self.selected = self.rows.first().map(|row| row.id.clone());
    }

    /// Rebuild the list from a full `GetDevices` answer.
    ///
    /// Only updatable or locked devices get a row. The selection survives when its device is
    /// still present, otherwise the first row is selected.
    pub fn sync(&mut self, devices: Vec<Device>) {
        self.rows = devices
            .into_iter()
            .filter(|device| {
                device.has_flag(DeviceFlags::UPDATABLE) || device.has_flag(DeviceFlags::LOCKED)
            })
            .collect();
        let still_there = self
            .selected
            .as_deref()
            .is_some_and(|id| self.rows.iter().any(|row| row.id == id));
        if !still_there {
            self.select_first();
        }
        debug!("{} device rows after sync", self.rows.len());
    }

    /// Rebuild the list and select `device_id` if it is present.
    pub fn sync_selecting(&mut self, devices: Vec<Device>, device_id: &str) {
        self.sync(devices);
        self.select(device_id);
    }

    /// Add a row for a new device. Returns false when the device is not updatable.
    pub fn add(&mut self, device: Device) -> bool {
        if !device.has_flag(DeviceFlags::UPDATABLE) {
            debug!("ignoring non-updatable device {}", device.id);
            return false;
        }
        match self.rows.iter_mut().find(|row| row.id == device.id) {
            Some(row) => *row = device,
            None => self.rows.push(device),
        }
        if self.selected.is_none() {
            self.select_first();
        }
        true
    }

    /// Remove the row of a device. A missing row is a no-op and returns false.
    pub fn remove(&mut self, device_id: &str) -> bool {
        let Some(pos) = self.rows.iter().position(|row| row.id == device_id) else {
            return false;
        };
        self.rows.remove(pos);
        if self.selected.as_deref() == Some(device_id) {
            self.select_first();
        }
        true
    }

    /// Replace the snapshot of a known device.
    ///
    /// Returns false when there is no row for it or nothing changed.
    pub fn update(&mut self, device: Device) -> bool {
        match self.rows.iter_mut().find(|row| row.id == device.id) {
            Some(row) if *row == device => false,
            Some(row) => {
                *row = device;
                true
            }
            None => false,
        }
    }
}

/// Releases of the selected device, replaced wholesale on each fetch.
#[derive(Debug, Default)]
pub struct ReleaseList {
    rows: Vec<Release>,
    selected: Option<usize>,
}

impl ReleaseList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Release] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn replace(&mut self, releases: Vec<Release>) {
        self.rows = releases;
        self.selected = None;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn select_index(&mut self, index: usize) -> Option<&Release> {
        if index >= self.rows.len() {
            return None;
        }
        self.selected = Some(index);
        self.rows.get(index)
    }

    pub fn selected(&self) -> Option<&Release> {
        self.selected.and_then(|idx| self.rows.get(idx))
    }
}
