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

//! HTTP download of metadata, signatures and firmware into the user cache.
//!
//! A file is only written once its checksum matched, so the cache never holds a corrupt
//! payload. A cached file is trusted only when the caller knows its expected checksum.

use crate::checksum;
use crate::config::{HTTP_TIMEOUT, user_agent};
use crate::error::FirmwareError;
use crate::system_io::{fs_read_bytes, fs_write_bytes};
use log::{debug, trace};
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;

/// Body the server sends with a bare rate-limit response.
static RATE_LIMIT_BODY: &str = "Too Many Requests";

/// What kind of file a URI points to, judged by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Signature,
    Metadata,
    Firmware,
    File,
}

impl FileKind {
    pub fn from_uri(uri: &str) -> Self {
        if uri.ends_with(".asc") || uri.ends_with(".p7b") || uri.ends_with(".p7c") {
            FileKind::Signature
        } else if uri.ends_with(".gz") {
            FileKind::Metadata
        } else if uri.ends_with(".cab") {
            FileKind::Firmware
        } else {
            FileKind::File
        }
    }
}

/// Progress of a download, reported to the caller as it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    CreatingCachePath,
    Preparing,
    AlreadyDownloaded,
    Downloading,
    Fetching(FileKind),
    Progress(u32),
}

impl DownloadStatus {
    pub fn label(self) -> String {
        match self {
            DownloadStatus::CreatingCachePath => "Creating cache path...".to_string(),
            DownloadStatus::Preparing => "Preparing to download file...".to_string(),
            DownloadStatus::AlreadyDownloaded => "File already downloaded...".to_string(),
            DownloadStatus::Downloading => "Downloading file...".to_string(),
            DownloadStatus::Fetching(FileKind::Signature) => "Fetching signature...".to_string(),
            DownloadStatus::Fetching(FileKind::Metadata) => "Fetching metadata...".to_string(),
            DownloadStatus::Fetching(FileKind::Firmware) => "Fetching firmware...".to_string(),
            DownloadStatus::Fetching(FileKind::File) => "Fetching file...".to_string(),
            DownloadStatus::Progress(pct) => format!("Downloading ({pct}%)"),
        }
    }
}

/// Build the HTTP client: no transparent decompression, no system proxy lookup beyond the
/// explicit `proxy`, the application user agent, and `idle_timeout` applied to connecting
/// and to every read. There is no deadline on the whole transfer.
pub fn build_client(
    proxy: Option<&str>,
    idle_timeout: Duration,
) -> Result<reqwest::Client, FirmwareError> {
    let mut builder = reqwest::Client::builder()
        .no_gzip()
        .no_proxy()
        .connect_timeout(idle_timeout)
        .read_timeout(idle_timeout)
        .user_agent(user_agent());
    if let Some(proxy) = proxy {
        debug!("using proxy {proxy}");
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| FirmwareError::InvalidUri(format!("invalid proxy URI {proxy}: {e}")))?;
        builder = builder.proxy(proxy);
    }
    Ok(builder.build()?)
}

/// True when `dest` exists and its contents match `expected`.
fn cached_file_matches(dest: &Path, expected: &str) -> bool {
    if !dest.exists() {
        return false;
    }
    match fs_read_bytes(dest) {
        Ok(data) => checksum::verify(expected, &data).is_ok(),
        Err(e) => {
            debug!("ignoring unreadable cache file: {e}");
            false
        }
    }
}

/// Percentage of `received` bytes, only when the server announced an honest length.
pub fn percentage(received: u64, content_length: Option<u64>) -> Option<u32> {
    match content_length {
        Some(total) if total > 0 && total >= received => {
            u32::try_from(received * 100 / total).ok()
        }
        _ => None,
    }
}

/// Downloads files, creating the HTTP client on first use.
#[derive(Debug)]
pub struct Downloader {
    proxy: Option<String>,
    idle_timeout: Duration,
    client: Option<reqwest::Client>,
}

impl Downloader {
    pub fn new(proxy: Option<String>) -> Self {
        Self::with_idle_timeout(proxy, HTTP_TIMEOUT)
    }

    /// Like [`Downloader::new`], giving up once the server sends nothing for `idle_timeout`.
    pub fn with_idle_timeout(proxy: Option<String>, idle_timeout: Duration) -> Self {
        Downloader {
            proxy,
            idle_timeout,
            client: None,
        }
    }

    fn client(&mut self) -> Result<reqwest::Client, FirmwareError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = build_client(self.proxy.as_deref(), self.idle_timeout)?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Make sure `dest` holds the file behind `uri`.
    ///
    /// The parent directory of `dest` must already exist. When `expected` is given, a cached
    /// copy with that checksum is used as is, and a download with another checksum fails
    /// without touching `dest`.
    pub async fn download(
        &mut self,
        uri: &str,
        dest: &Path,
        expected: Option<&str>,
        mut status: impl FnMut(DownloadStatus),
    ) -> Result<(), FirmwareError> {
        if let Some(expected) = expected {
            if cached_file_matches(dest, expected) {
                debug!("skipping download as {dest:?} already exists");
                status(DownloadStatus::AlreadyDownloaded);
                return Ok(());
            }
        }

        let client = self.client()?;
        debug!("downloading {uri} to {dest:?}");
        status(DownloadStatus::Downloading);
        let kind = FileKind::from_uri(uri);
        status(DownloadStatus::Fetching(kind));

        let mut response = client.get(uri).send().await?;
        let code = response.status();
        if code == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(FirmwareError::RateLimited(
                (body != RATE_LIMIT_BODY).then_some(body),
            ));
        }
        if code != StatusCode::OK {
            return Err(FirmwareError::Http {
                uri: uri.to_string(),
                reason: code
                    .canonical_reason()
                    .unwrap_or(code.as_str())
                    .to_string(),
            });
        }

        let content_length = response.content_length();
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if let Some(pct) = percentage(body.len() as u64, content_length) {
                trace!("progress: {pct}%");
                status(DownloadStatus::Progress(pct));
            }
        }

        if let Some(expected) = expected {
            checksum::verify(expected, &body).map_err(|actual| FirmwareError::Checksum {
                expected: expected.to_string(),
                actual,
            })?;
        }
        fs_write_bytes(dest, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    #[rstest]
    #[case::asc("https://cdn/firmware.xml.gz.asc", FileKind::Signature)]
    #[case::p7b("https://cdn/firmware.xml.gz.p7b", FileKind::Signature)]
    #[case::p7c("https://cdn/firmware.p7c", FileKind::Signature)]
    #[case::metadata("https://cdn/firmware.xml.gz", FileKind::Metadata)]
    #[case::firmware("https://cdn/abc-fw.cab", FileKind::Firmware)]
    #[case::other("https://cdn/readme.txt", FileKind::File)]
    fn kind_from_suffix(#[case] uri: &str, #[case] expected: FileKind) {
        expect_that!(FileKind::from_uri(uri), eq(expected));
    }

    #[gtest]
    #[rstest]
    #[case::unknown_length(10, None, None)]
    #[case::half(50, Some(100), Some(50))]
    #[case::complete(100, Some(100), Some(100))]
    #[case::dishonest_length(150, Some(100), None)]
    #[case::zero_length(0, Some(0), None)]
    fn percentage_needs_honest_length(
        #[case] received: u64,
        #[case] length: Option<u64>,
        #[case] expected: Option<u32>,
    ) {
        expect_that!(percentage(received, length), eq(expected));
    }

    #[gtest]
    fn labels() {
        expect_that!(DownloadStatus::Progress(42).label(), eq("Downloading (42%)"));
        expect_that!(
            DownloadStatus::Fetching(FileKind::Firmware).label(),
            eq("Fetching firmware...")
        );
    }

    #[gtest]
    fn bad_proxy_is_rejected() {
        expect_that!(build_client(Some("http://[::1"), HTTP_TIMEOUT).is_err(), eq(true));
        expect_that!(build_client(None, HTTP_TIMEOUT).is_ok(), eq(true));
    }
}
