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

use gnome_firmware::error::FirmwareError;
use gnome_firmware::system_io::{
    fs_create_dir, fs_mkdir_parent, fs_open, fs_read_bytes, fs_write_bytes,
};
use googletest::prelude::*;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;

#[gtest]
fn write_then_read_and_open() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("firmware.xml.gz");
    fs_write_bytes(&path, b"first").expect("write failed");
    fs_write_bytes(&path, b"2nd").expect("overwrite failed");

    expect_that!(fs_read_bytes(&path), ok(eq(&b"2nd".to_vec())));
    let mut content = String::new();
    fs_open(&path)
        .expect("open failed")
        .read_to_string(&mut content)
        .expect("read failed");
    expect_that!(content, eq("2nd"));
}

#[gtest]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("absent.cab");
    let result = fs_read_bytes(&path);
    assert_that!(
        matches!(&result, Err(FirmwareError::IORead { file, .. }) if *file == path),
        eq(true)
    );
    expect_that!(fs_open(&path).is_err(), eq(true));
}

#[gtest]
fn cache_directories_are_created_with_mode() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let nested = dir.path().join("gnome-firmware").join("nested");
    fs_create_dir(&nested).expect("create failed");
    let mode = std::fs::metadata(&nested)
        .expect("no metadata")
        .permissions()
        .mode();
    expect_that!(mode & 0o777, eq(0o755 & !umask()));

    let file = dir.path().join("cache").join("lvfs-firmware.xml.gz");
    fs_mkdir_parent(&file).expect("mkdir parent failed");
    expect_that!(file.parent().map(|p| p.is_dir()), some(eq(true)));
    // existing directories are fine
    expect_that!(fs_mkdir_parent(&file), ok(eq(&())));
}

/// The process umask, read back from a directory created with the default mode.
fn umask() -> u32 {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let probe = dir.path().join("probe");
    std::fs::DirBuilder::new().create(&probe).expect("probe failed");
    let mode = std::fs::metadata(&probe)
        .expect("no metadata")
        .permissions()
        .mode();
    0o777 & !mode
}
