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

//! Title and value pairs for the device and release detail pages.
//!
//! Fields without a value are left out rather than shown empty.

use crate::format::{
    checksum_to_string, device_flag_labels, release_flags_to_string, seconds_to_string,
    size_to_string, xml_to_text,
};
use fwupd_api::{Device, DeviceFlags, Release};
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
}

fn push(fields: &mut Vec<Field>, title: &str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        fields.push(Field {
            title: title.to_string(),
            value,
        });
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

pub fn device_details(device: &Device, verification: Option<&Result<(), String>>) -> Vec<Field> {
    let mut fields = Vec::new();
    push(&mut fields, "Version", device.version.clone());
    push(&mut fields, "Lowest version", device.version_lowest.clone());
    push(&mut fields, "Bootloader version", device.version_bootloader.clone());
    push(&mut fields, "Update error", device.update_error.clone());
    push(&mut fields, "Serial number", device.serial.clone());

    let vendor = match (&device.vendor, &device.vendor_id) {
        (Some(vendor), Some(id)) => Some(format!("{vendor} ({id})")),
        (Some(vendor), None) => Some(vendor.clone()),
        (None, Some(id)) => Some(id.clone()),
        (None, None) => None,
    };
    push(&mut fields, "Vendor", vendor);
    push(
        &mut fields,
        "Flashes left",
        (device.flashes_left != 0).then(|| device.flashes_left.to_string()),
    );
    push(
        &mut fields,
        "Install duration",
        seconds_to_string(u64::from(device.install_duration)),
    );
    push(&mut fields, "Flags", Some(device_flag_labels(device.flags).join("\n")));
    push(
        &mut fields,
        plural(device.guids.len(), "GUID", "GUIDs"),
        Some(device.guids.join("\n")),
    );

    if let Some(result) = verification {
        let title = if device.has_flag(DeviceFlags::CAN_VERIFY_IMAGE) {
            "Firmware checksum"
        } else {
            "Device checksum"
        };
        let value = match result {
            Ok(()) => "Cryptographic hashes match".to_string(),
            Err(message) => message.clone(),
        };
        push(&mut fields, title, Some(value));
    }
    fields
}

pub fn release_details(release: &Release) -> Vec<Field> {
    let mut fields = Vec::new();
    push(&mut fields, "Version", Some(release.version.clone()));
    push(
        &mut fields,
        plural(release.categories.len(), "Category", "Categories"),
        Some(release.categories.join("\n")),
    );
    push(
        &mut fields,
        plural(release.checksums.len(), "Checksum", "Checksums"),
        Some(
            release
                .checksums
                .iter()
                .map(|checksum| checksum_to_string(checksum))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    );
    push(
        &mut fields,
        plural(release.issues.len(), "Fixed Issue", "Fixed Issues"),
        Some(release.issues.join("\n")),
    );
    push(&mut fields, "Filename", release.filename.clone());
    push(&mut fields, "Protocol", release.protocol.clone());
    push(&mut fields, "AppStream ID", release.appstream_id.clone());
    push(&mut fields, "Remote ID", release.remote_id.clone());
    push(&mut fields, "Vendor", release.vendor.clone());
    push(&mut fields, "Summary", release.summary.clone());

    let description = release.description.as_deref().and_then(|markup| {
        xml_to_text(markup)
            .inspect_err(|e| {
                debug!(
                    "failed to get release description for version {}: {e}",
                    release.version
                )
            })
            .ok()
    });
    push(&mut fields, "Description", description);
    push(
        &mut fields,
        "Size",
        (release.size != 0).then(|| size_to_string(release.size)),
    );
    push(&mut fields, "License", release.license.clone());
    push(&mut fields, "Flags", Some(release_flags_to_string(release.flags)));
    push(
        &mut fields,
        "Install duration",
        seconds_to_string(u64::from(release.install_duration)),
    );
    push(&mut fields, "Update message", release.update_message.clone());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwupd_api::ReleaseFlags;
    use googletest::prelude::*;

    fn value_of<'a>(fields: &'a [Field], title: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|field| field.title == title)
            .map(|field| field.value.as_str())
    }

    #[gtest]
    fn device_fields_skip_empty_values() {
        let device = Device {
            id: "dev".to_string(),
            name: "Dock".to_string(),
            vendor: Some("Lenovo".to_string()),
            vendor_id: Some("USB:0x17EF".to_string()),
            version: Some("1.0".to_string()),
            guids: vec!["guid-1".to_string()],
            flags: DeviceFlags::UPDATABLE | DeviceFlags::REGISTERED,
            ..Default::default()
        };
        let fields = device_details(&device, None);
        expect_that!(value_of(&fields, "Vendor"), some(eq("Lenovo (USB:0x17EF)")));
        expect_that!(value_of(&fields, "GUID"), some(eq("guid-1")));
        expect_that!(value_of(&fields, "Flags"), some(eq("Updatable")));
        expect_that!(value_of(&fields, "Serial number"), none());
        expect_that!(value_of(&fields, "Flashes left"), none());
        expect_that!(value_of(&fields, "Device checksum"), none());
    }

    #[gtest]
    fn device_checksum_shows_verification() {
        let device = Device {
            flags: DeviceFlags::CAN_VERIFY,
            ..Default::default()
        };
        let fields = device_details(&device, Some(&Ok(())));
        expect_that!(
            value_of(&fields, "Device checksum"),
            some(eq("Cryptographic hashes match"))
        );
        let fields = device_details(&device, Some(&Err("hash mismatch".to_string())));
        expect_that!(value_of(&fields, "Device checksum"), some(eq("hash mismatch")));
    }

    #[gtest]
    fn release_fields() {
        let release = Release {
            version: "1.2.4".to_string(),
            checksums: vec!["a".repeat(40), "b".repeat(64)],
            description: Some("<p>Fixes</p><ul><li>boot</li></ul>".to_string()),
            size: 1500,
            flags: ReleaseFlags::IS_UPGRADE,
            ..Default::default()
        };
        let fields = release_details(&release);
        let expected_checksums = format!("SHA1({})\nSHA256({})", "a".repeat(40), "b".repeat(64));
        expect_that!(
            value_of(&fields, "Checksums"),
            some(eq(expected_checksums.as_str()))
        );
        expect_that!(value_of(&fields, "Description"), some(eq("Fixes\n\n • boot")));
        expect_that!(value_of(&fields, "Size"), some(eq("1.5 kB")));
        expect_that!(value_of(&fields, "Flags"), some(eq("is-upgrade")));
    }

    #[gtest]
    fn broken_description_is_left_out() {
        let release = Release {
            version: "1".to_string(),
            description: Some("<p>unterminated".to_string()),
            ..Default::default()
        };
        expect_that!(value_of(&release_details(&release), "Description"), none());
    }
}
