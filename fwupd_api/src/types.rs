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

//! Read-only snapshots of daemon objects.
//!
//! Every object the daemon sends is an `a{sv}` dictionary. Decoding is lenient: unknown keys
//! are ignored and missing or mistyped keys leave the field empty, because the set of keys
//! grows with every daemon release.

use crate::flags::{DeviceFlags, ReleaseFlags};
use log::trace;
use std::collections::HashMap;
use zbus::zvariant::{OwnedValue, Value};

/// The wire form of every daemon object.
pub type Dict = HashMap<String, OwnedValue>;

fn dict_str(dict: &Dict, key: &str) -> Option<String> {
    match dict.get(key).map(|v| &**v) {
        Some(Value::Str(s)) => Some(s.to_string()),
        Some(other) => {
            trace!("ignoring {key} with unexpected value {other:?}");
            None
        }
        None => None,
    }
}

fn dict_u64(dict: &Dict, key: &str) -> u64 {
    match dict.get(key).map(|v| &**v) {
        Some(Value::U64(n)) => *n,
        Some(Value::U32(n)) => u64::from(*n),
        _ => 0,
    }
}

fn dict_u32(dict: &Dict, key: &str) -> u32 {
    match dict.get(key).map(|v| &**v) {
        Some(Value::U32(n)) => *n,
        Some(Value::U64(n)) => u32::try_from(*n).unwrap_or(u32::MAX),
        _ => 0,
    }
}

fn dict_bool(dict: &Dict, key: &str) -> bool {
    matches!(dict.get(key).map(|v| &**v), Some(Value::Bool(true)))
}

/// A list of strings, sent either as `as` or as one comma-separated `s`.
fn dict_strv(dict: &Dict, key: &str) -> Vec<String> {
    match dict.get(key).map(|v| &**v) {
        Some(Value::Array(array)) => array
            .iter()
            .filter_map(|item| match item {
                Value::Str(s) => Some(s.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::Str(s)) => s
            .split(',')
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// The daemon's overall state, read from its `Status` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unknown,
    Idle,
    Loading,
    Decompressing,
    DeviceRestart,
    DeviceWrite,
    DeviceVerify,
    Scheduling,
    Downloading,
    DeviceRead,
    DeviceErase,
    WaitingForAuth,
    DeviceBusy,
}

impl From<u32> for Status {
    fn from(value: u32) -> Self {
        match value {
            1 => Status::Idle,
            2 => Status::Loading,
            3 => Status::Decompressing,
            4 => Status::DeviceRestart,
            5 => Status::DeviceWrite,
            6 => Status::DeviceVerify,
            7 => Status::Scheduling,
            8 => Status::Downloading,
            9 => Status::DeviceRead,
            10 => Status::DeviceErase,
            11 => Status::WaitingForAuth,
            12 => Status::DeviceBusy,
            _ => Status::Unknown,
        }
    }
}

/// A device known to the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub summary: Option<String>,
    pub vendor: Option<String>,
    pub vendor_id: Option<String>,
    pub version: Option<String>,
    pub version_lowest: Option<String>,
    pub version_bootloader: Option<String>,
    pub serial: Option<String>,
    pub update_error: Option<String>,
    pub flags: DeviceFlags,
    pub guids: Vec<String>,
    pub icons: Vec<String>,
    pub flashes_left: u32,
    /// Expected install time in seconds, 0 when unknown.
    pub install_duration: u32,
}

impl Device {
    pub fn has_flag(&self, flag: DeviceFlags) -> bool {
        self.flags.contains(flag)
    }
}

impl From<&Dict> for Device {
    fn from(dict: &Dict) -> Self {
        Device {
            id: dict_str(dict, "DeviceId").unwrap_or_default(),
            name: dict_str(dict, "Name").unwrap_or_default(),
            summary: dict_str(dict, "Summary"),
            vendor: dict_str(dict, "Vendor"),
            vendor_id: dict_str(dict, "VendorId"),
            version: dict_str(dict, "Version"),
            version_lowest: dict_str(dict, "VersionLowest"),
            version_bootloader: dict_str(dict, "VersionBootloader"),
            serial: dict_str(dict, "Serial"),
            update_error: dict_str(dict, "UpdateError"),
            flags: DeviceFlags::from_bits(dict_u64(dict, "Flags")),
            guids: dict_strv(dict, "Guid"),
            icons: dict_strv(dict, "Icon"),
            flashes_left: dict_u32(dict, "FlashesLeft"),
            install_duration: dict_u32(dict, "InstallDuration"),
        }
    }
}

/// A firmware release available for a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub name: Option<String>,
    pub summary: Option<String>,
    /// AppStream description markup.
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub license: Option<String>,
    pub filename: Option<String>,
    pub protocol: Option<String>,
    pub appstream_id: Option<String>,
    pub remote_id: Option<String>,
    pub uri: String,
    pub checksums: Vec<String>,
    pub categories: Vec<String>,
    pub issues: Vec<String>,
    pub size: u64,
    pub flags: ReleaseFlags,
    pub install_duration: u32,
    pub update_message: Option<String>,
}

impl Release {
    pub fn has_flag(&self, flag: ReleaseFlags) -> bool {
        self.flags.contains(flag)
    }
}

impl From<&Dict> for Release {
    fn from(dict: &Dict) -> Self {
        Release {
            version: dict_str(dict, "Version").unwrap_or_default(),
            name: dict_str(dict, "Name"),
            summary: dict_str(dict, "Summary"),
            description: dict_str(dict, "Description"),
            vendor: dict_str(dict, "Vendor"),
            license: dict_str(dict, "License"),
            filename: dict_str(dict, "Filename"),
            protocol: dict_str(dict, "Protocol"),
            appstream_id: dict_str(dict, "AppstreamId"),
            remote_id: dict_str(dict, "RemoteId").filter(|id| !id.is_empty()),
            uri: dict_str(dict, "Uri").unwrap_or_default(),
            checksums: dict_strv(dict, "Checksum"),
            categories: dict_strv(dict, "Categories"),
            issues: dict_strv(dict, "Issues"),
            size: dict_u64(dict, "Size"),
            flags: ReleaseFlags::from_bits(dict_u64(dict, "Flags")),
            install_duration: dict_u32(dict, "InstallDuration"),
            update_message: dict_str(dict, "UpdateMessage"),
        }
    }
}

/// Where a remote gets its metadata from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteKind {
    #[default]
    Unknown,
    /// Metadata and firmware are fetched over HTTP by the client.
    Download,
    /// Metadata and firmware already live next to the cache file.
    Local,
    /// Firmware lives in a local directory, addressed by `file://` URIs.
    Directory,
}

impl From<u32> for RemoteKind {
    fn from(value: u32) -> Self {
        match value {
            1 => RemoteKind::Download,
            2 => RemoteKind::Local,
            3 => RemoteKind::Directory,
            _ => RemoteKind::Unknown,
        }
    }
}

/// Keyring kind value the daemon uses for PKCS#7 signed metadata.
const KEYRING_KIND_PKCS7: u32 = 3;

/// A metadata source configured in the daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remote {
    pub id: String,
    pub kind: RemoteKind,
    pub enabled: bool,
    pub title: Option<String>,
    pub metadata_uri: Option<String>,
    pub metadata_uri_sig: Option<String>,
    pub filename_cache: Option<String>,
    pub filename_cache_sig: Option<String>,
    pub firmware_base_uri: Option<String>,
}

impl From<&Dict> for Remote {
    fn from(dict: &Dict) -> Self {
        // The daemon only sends the data locations, the signature locations are derived
        // from them with the suffix of the remote's keyring.
        let sig_suffix = if dict_u32(dict, "Keyring") == KEYRING_KIND_PKCS7 {
            ".p7b"
        } else {
            ".asc"
        };
        let metadata_uri = dict_str(dict, "Uri");
        let filename_cache = dict_str(dict, "FilenameCache");
        Remote {
            id: dict_str(dict, "RemoteId").unwrap_or_default(),
            kind: RemoteKind::from(dict_u32(dict, "Type")),
            enabled: dict_bool(dict, "Enabled"),
            title: dict_str(dict, "Title"),
            metadata_uri_sig: metadata_uri.as_ref().map(|uri| format!("{uri}{sig_suffix}")),
            metadata_uri,
            filename_cache_sig: filename_cache
                .as_ref()
                .map(|path| format!("{path}{sig_suffix}")),
            filename_cache,
            firmware_base_uri: dict_str(dict, "FirmwareBaseUri"),
        }
    }
}

/// Decode a list of dictionaries, as returned by the `Get*` methods.
pub fn from_dicts<'a, T>(dicts: &'a [Dict]) -> Vec<T>
where
    T: From<&'a Dict>,
{
    dicts.iter().map(T::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    fn owned(value: Value<'_>) -> OwnedValue {
        value.try_to_owned().expect("value without file descriptors")
    }

    fn dict(entries: Vec<(&str, Value<'_>)>) -> Dict {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), owned(value)))
            .collect()
    }

    #[gtest]
    fn device_decodes_known_keys() {
        let device = Device::from(&dict(vec![
            ("DeviceId", Value::from("2082b5e0")),
            ("Name", Value::from("ThinkPad Dock")),
            ("Vendor", Value::from("Lenovo")),
            ("Version", Value::from("1.2.3")),
            ("Flags", Value::from(2u64 | 256u64)),
            ("Guid", Value::from(vec!["a-guid", "b-guid"])),
            ("FlashesLeft", Value::from(5u32)),
            ("SomethingNew", Value::from(true)),
        ]));
        expect_that!(device.id, eq("2082b5e0"));
        expect_that!(device.name, eq("ThinkPad Dock"));
        expect_that!(device.has_flag(DeviceFlags::UPDATABLE), eq(true));
        expect_that!(device.has_flag(DeviceFlags::NEEDS_REBOOT), eq(true));
        expect_that!(device.has_flag(DeviceFlags::LOCKED), eq(false));
        expect_that!(device.guids, elements_are![eq("a-guid"), eq("b-guid")]);
        expect_that!(device.flashes_left, eq(5));
        expect_that!(device.serial.as_deref(), none());
    }

    #[gtest]
    fn release_checksums_split_on_commas() {
        let release = Release::from(&dict(vec![
            ("Version", Value::from("2.0")),
            ("Checksum", Value::from("abc,def")),
            ("RemoteId", Value::from("")),
        ]));
        expect_that!(release.checksums, elements_are![eq("abc"), eq("def")]);
        expect_that!(release.remote_id.as_deref(), none());
    }

    #[gtest]
    #[rstest]
    #[case::gpg(2u32, ".asc")]
    #[case::pkcs7(3u32, ".p7b")]
    fn remote_derives_signature_locations(#[case] keyring: u32, #[case] suffix: &str) {
        let remote = Remote::from(&dict(vec![
            ("RemoteId", Value::from("lvfs")),
            ("Type", Value::from(1u32)),
            ("Enabled", Value::from(true)),
            ("Keyring", Value::from(keyring)),
            ("Uri", Value::from("https://cdn/firmware.xml.gz")),
            ("FilenameCache", Value::from("/var/lib/fwupd/remotes.d/lvfs/firmware.xml.gz")),
        ]));
        expect_that!(remote.kind, eq(RemoteKind::Download));
        expect_that!(remote.enabled, eq(true));
        expect_that!(
            remote.metadata_uri_sig.as_deref(),
            some(eq(format!("https://cdn/firmware.xml.gz{suffix}").as_str()))
        );
        expect_that!(
            remote.filename_cache_sig.as_deref(),
            some(eq(format!("/var/lib/fwupd/remotes.d/lvfs/firmware.xml.gz{suffix}").as_str()))
        );
    }

    #[gtest]
    fn status_out_of_range_is_unknown() {
        expect_that!(Status::from(5), eq(Status::DeviceWrite));
        expect_that!(Status::from(99), eq(Status::Unknown));
    }
}
