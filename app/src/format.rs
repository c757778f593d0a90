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

//! Pure conversions from daemon values to display text.
//!
//! Every function here is total: any input yields either text or a defined empty value.
//! The only fallible one is [`xml_to_text`], which reports malformed markup.

use crate::checksum::ChecksumKind;
use crate::error::FirmwareError;
use crate::session::Operation;
use fwupd_api::{DeviceFlags, ReleaseFlags, Status};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// One entry of a flag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagInfo<F> {
    pub flag: F,
    /// The daemon's name for the flag.
    pub name: &'static str,
    /// Text for the device details, flags without one are not listed there.
    pub label: Option<&'static str>,
}

const fn info<F>(flag: F, name: &'static str, label: Option<&'static str>) -> FlagInfo<F> {
    FlagInfo { flag, name, label }
}

pub static DEVICE_FLAG_TABLE: &[FlagInfo<DeviceFlags>] = &[
    info(DeviceFlags::INTERNAL, "internal", Some("Internal device")),
    info(DeviceFlags::UPDATABLE, "updatable", Some("Updatable")),
    info(DeviceFlags::ONLY_OFFLINE, "only-offline", Some("Update requires a reboot")),
    info(DeviceFlags::REQUIRE_AC, "require-ac", Some("Requires AC power")),
    info(DeviceFlags::LOCKED, "locked", Some("Device is locked")),
    info(DeviceFlags::SUPPORTED, "supported", Some("Supported on LVFS")),
    info(DeviceFlags::NEEDS_BOOTLOADER, "needs-bootloader", Some("Requires a bootloader")),
    info(DeviceFlags::REGISTERED, "registered", None),
    info(DeviceFlags::NEEDS_REBOOT, "needs-reboot", Some("Needs a reboot after installation")),
    info(DeviceFlags::REPORTED, "reported", Some("Reported to LVFS")),
    info(DeviceFlags::NOTIFIED, "notified", Some("User has been notified")),
    info(DeviceFlags::USE_RUNTIME_VERSION, "use-runtime-version", None),
    info(DeviceFlags::INSTALL_PARENT_FIRST, "install-parent-first", Some("Install to parent device first")),
    info(DeviceFlags::IS_BOOTLOADER, "is-bootloader", Some("Is in bootloader mode")),
    info(DeviceFlags::WAIT_FOR_REPLUG, "wait-for-replug", Some("Hardware is waiting to be replugged")),
    info(DeviceFlags::IGNORE_VALIDATION, "ignore-validation", Some("Ignore validation safety checks")),
    info(DeviceFlags::TRUSTED, "trusted", None),
    info(DeviceFlags::NEEDS_SHUTDOWN, "needs-shutdown", Some("Needs shutdown after installation")),
    info(DeviceFlags::ANOTHER_WRITE_REQUIRED, "another-write-required", None),
    info(DeviceFlags::NO_AUTO_INSTANCE_IDS, "no-auto-instance-ids", None),
    info(DeviceFlags::NEEDS_ACTIVATION, "needs-activation", Some("Device update needs activation")),
    info(DeviceFlags::ENSURE_SEMVER, "ensure-semver", None),
    info(DeviceFlags::HISTORICAL, "historical", None),
    info(DeviceFlags::ONLY_SUPPORTED, "only-supported", None),
    info(DeviceFlags::WILL_DISAPPEAR, "will-disappear", Some("Device will not re-appear after update completes")),
    info(DeviceFlags::CAN_VERIFY, "can-verify", Some("Cryptographic hash verification is available")),
    info(DeviceFlags::CAN_VERIFY_IMAGE, "can-verify-image", None),
    info(DeviceFlags::DUAL_IMAGE, "dual-image", Some("Device stages updates")),
    info(DeviceFlags::SELF_RECOVERY, "self-recovery", Some("Device can recover flash failures")),
    info(DeviceFlags::USABLE_DURING_UPDATE, "usable-during-update", Some("Device is usable for the duration of the update")),
];

pub static RELEASE_FLAG_TABLE: &[FlagInfo<ReleaseFlags>] = &[
    info(ReleaseFlags::TRUSTED_PAYLOAD, "trusted-payload", Some("Payload is trusted")),
    info(ReleaseFlags::TRUSTED_METADATA, "trusted-metadata", Some("Metadata is trusted")),
    info(ReleaseFlags::IS_UPGRADE, "is-upgrade", Some("Is upgrade")),
    info(ReleaseFlags::IS_DOWNGRADE, "is-downgrade", Some("Is downgrade")),
    info(ReleaseFlags::BLOCKED_VERSION, "blocked-version", Some("Blocked by version")),
    info(ReleaseFlags::BLOCKED_APPROVAL, "blocked-approval", Some("Not approved")),
];

/// Shown by the flag lists when no bit is set.
pub static NO_FLAGS: &str = "none";

/// Name for bits missing from a table.
static UNKNOWN_FLAG: &str = "unknown";

fn lookup<F: PartialEq + Copy>(table: &'static [FlagInfo<F>], flag: F) -> Option<&'static FlagInfo<F>> {
    table.iter().find(|entry| entry.flag == flag)
}

pub fn device_flag_info(flag: DeviceFlags) -> Option<&'static FlagInfo<DeviceFlags>> {
    lookup(DEVICE_FLAG_TABLE, flag)
}

pub fn release_flag_info(flag: ReleaseFlags) -> Option<&'static FlagInfo<ReleaseFlags>> {
    lookup(RELEASE_FLAG_TABLE, flag)
}

fn join_or_none(names: Vec<&str>) -> String {
    if names.is_empty() {
        NO_FLAGS.to_string()
    } else {
        names.join("\n")
    }
}

/// One flag name per set bit, lowest bit first, separated by newlines.
pub fn device_flags_to_string(flags: DeviceFlags) -> String {
    join_or_none(
        flags
            .iter()
            .map(|flag| device_flag_info(flag).map_or(UNKNOWN_FLAG, |entry| entry.name))
            .collect(),
    )
}

pub fn release_flags_to_string(flags: ReleaseFlags) -> String {
    join_or_none(
        flags
            .iter()
            .map(|flag| release_flag_info(flag).map_or(UNKNOWN_FLAG, |entry| entry.name))
            .collect(),
    )
}

/// Labels of the set device flags that have one, in bit order.
pub fn device_flag_labels(flags: DeviceFlags) -> Vec<&'static str> {
    flags
        .iter()
        .filter_map(|flag| device_flag_info(flag).and_then(|entry| entry.label))
        .collect()
}

/// Wrap a checksum in the name of the algorithm implied by its length, e.g. `SHA1(abcd...)`.
pub fn checksum_to_string(checksum: &str) -> String {
    format!("{}({checksum})", ChecksumKind::guess(checksum).name())
}

/// Render a duration using its coarsest units, or nothing for zero.
pub fn seconds_to_string(seconds: u64) -> Option<String> {
    if seconds == 0 {
        return None;
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    Some(if hours > 0 {
        format!("{hours} hr, {minutes} min, {secs} sec")
    } else if minutes > 0 {
        format!("{minutes} min, {secs} sec")
    } else {
        format!("{secs} sec")
    })
}

/// Human size using SI units, as in "1.2 MB".
pub fn size_to_string(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["kB", "MB", "GB", "TB", "PB"];
    match bytes {
        1 => "1 byte".to_string(),
        0..1000 => format!("{bytes} bytes"),
        _ => {
            let mut value = bytes as f64 / 1000.0;
            let mut unit = 0;
            while value >= 1000.0 && unit < UNITS.len() - 1 {
                value /= 1000.0;
                unit += 1;
            }
            format!("{value:.1} {}", UNITS[unit])
        }
    }
}

pub fn status_to_string(status: Status) -> &'static str {
    match status {
        Status::Idle => "Idle…",
        Status::Decompressing => "Decompressing…",
        Status::Loading => "Loading…",
        Status::DeviceRestart => "Restarting device…",
        Status::DeviceRead => "Reading…",
        Status::DeviceWrite => "Writing…",
        Status::DeviceErase => "Erasing…",
        Status::DeviceVerify => "Verifying…",
        Status::Scheduling => "Scheduling…",
        Status::Downloading => "Downloading…",
        Status::WaitingForAuth => "Authenticating…",
        Status::DeviceBusy => "Waiting…",
        Status::Unknown => "Unknown",
    }
}

/// Loading text shown while an operation runs on a device.
pub fn operation_label(operation: Operation, device_name: &str) -> String {
    match operation {
        Operation::Update => format!("Updating {device_name}…"),
        Operation::Downgrade => format!("Downgrading {device_name}…"),
        Operation::Install => format!("Installing on {device_name}…"),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Bullet,
    Numbered,
}

/// Convert an AppStream description fragment into plain text.
///
/// Paragraphs are followed by a blank line, list items are indented and prefixed with a bullet
/// or their position. Inline elements inside a paragraph or item keep their text, and runs of
/// whitespace collapse to one space. An empty paragraph still leaves its blank line. Other
/// elements are dropped. Trailing newlines are removed.
pub fn xml_to_text(markup: &str) -> Result<String, FirmwareError> {
    let mut reader = Reader::from_str(markup);

    let mut out = String::new();
    let mut stack: Vec<String> = Vec::new();
    // Text of the `p` or `li` being read, including any inline children.
    let mut text: Option<String> = None;
    let mut list: Option<(ListKind, usize)> = None;
    let mut seen_element = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| FirmwareError::Markup(e.to_string()))?;
        match event {
            Event::Start(e) => {
                seen_element = true;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match (stack.len(), name.as_str()) {
                    (0, "p") => text = Some(String::new()),
                    (0, "ul") => list = Some((ListKind::Bullet, 0)),
                    (0, "ol") => list = Some((ListKind::Numbered, 0)),
                    (1, child) => {
                        if let Some((_, idx)) = list.as_mut() {
                            *idx += 1;
                            if child == "li" {
                                text = Some(String::new());
                            }
                        }
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                seen_element = true;
                if stack.is_empty() && e.local_name().as_ref() == b"p" {
                    out.push_str("\n\n");
                } else if stack.len() == 1 {
                    if let Some((_, idx)) = list.as_mut() {
                        *idx += 1;
                    }
                }
            }
            Event::Text(e) => {
                let unescaped = e
                    .unescape()
                    .map_err(|e| FirmwareError::Markup(e.to_string()))?;
                if let Some(buf) = text.as_mut() {
                    buf.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some(buf) = text.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if stack.pop().as_deref() != Some(name.as_str()) {
                    return Err(FirmwareError::Markup(format!("unexpected </{name}>")));
                }
                match (stack.len(), name.as_str()) {
                    (0, "p") => {
                        out.push_str(&collapse_whitespace(&text.take().unwrap_or_default()));
                        out.push_str("\n\n");
                    }
                    (0, "ul" | "ol") => {
                        if list.take().is_some() {
                            out.push('\n');
                        }
                    }
                    (1, "li") => {
                        let item = collapse_whitespace(&text.take().unwrap_or_default());
                        match list {
                            Some((ListKind::Bullet, _)) => out.push_str(&format!(" • {item}\n")),
                            Some((ListKind::Numbered, idx)) => {
                                out.push_str(&format!(" {idx}. {item}\n"))
                            }
                            None => {}
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FirmwareError::Markup(format!("unclosed <{open}>")));
    }
    if !seen_element {
        return Err(FirmwareError::Markup("no markup".to_string()));
    }
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    Ok(out)
}
