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

//! Error Wrapping File System I/O Helpers
//!
//! Thin wrappers around the standard file system operations used by the download cache and
//! the install workflow. Every function logs at trace level and converts failures into the
//! matching `FirmwareError::IO*` variant carrying the path involved.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use gnome_firmware::system_io::{fs_mkdir_parent, fs_write_bytes};
//! # use std::path::Path;
//!
//! # fn example() -> Result<(), gnome_firmware::error::FirmwareError> {
//! let dest = Path::new("/home/user/.cache/gnome-firmware/firmware.cab");
//! fs_mkdir_parent(dest)?;
//! fs_write_bytes(dest, &[0xCA, 0xFE])?;
//! # Ok(())
//! # }
//! ```

use crate::config::CACHE_DIR_MODE;
use crate::error::FirmwareError;
use log::trace;
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

/// Read a whole file into memory.
///
/// # Returns: `Result<Vec<u8>, FirmwareError>`
/// * `Ok(Vec<u8>)` - The complete contents of the file
/// * `Err(FirmwareError::IORead)` - If the file cannot be opened or read
pub fn fs_read_bytes(file_path: &Path) -> Result<Vec<u8>, FirmwareError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf = Vec::new();
    let result = File::open(file_path).and_then(|mut f| f.read_to_end(&mut buf));
    match result {
        Ok(len) => {
            trace!("Read {len} bytes");
            Ok(buf)
        }
        Err(e) => Err(FirmwareError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Write binary data to a file, creating it or replacing any previous content.
///
/// # Returns: `Result<(), FirmwareError>`
/// * `Ok(())` - Write succeeded
/// * `Err(FirmwareError::IOWrite)` - If the file cannot be created or written
pub fn fs_write_bytes(file_path: &Path, data: &[u8]) -> Result<(), FirmwareError> {
    trace!("Attempting to write {} bytes to {file_path:?}", data.len());
    let result = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(file_path)
        .and_then(|mut f| f.write_all(data));
    match result {
        Ok(_) => {
            trace!("Write done.");
            Ok(())
        }
        Err(e) => Err(FirmwareError::IOWrite {
            file: file_path.into(),
            e,
        }),
    }
}

/// Recursively create directories up to `path` with mode 0755.
///
/// Succeeds when the directory already exists.
pub fn fs_create_dir(path: &Path) -> Result<(), FirmwareError> {
    trace!("Attempting to create '{path:?}'");
    let result = DirBuilder::new()
        .recursive(true)
        .mode(CACHE_DIR_MODE)
        .create(path);
    match result {
        Ok(_) => {
            trace!("Directory created at {path:?}.");
            Ok(())
        }
        Err(e) => Err(FirmwareError::IOCreate {
            file: path.into(),
            e,
        }),
    }
}

/// Create the directory that will hold `file_path`.
pub fn fs_mkdir_parent(file_path: &Path) -> Result<(), FirmwareError> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs_create_dir(parent),
        _ => Ok(()),
    }
}

/// Open a file for reading, so its descriptor can be handed to the daemon.
pub fn fs_open(file_path: &Path) -> Result<File, FirmwareError> {
    trace!("Opening {file_path:?}");
    File::open(file_path).map_err(|e| FirmwareError::IORead {
        file: file_path.into(),
        e,
    })
}
