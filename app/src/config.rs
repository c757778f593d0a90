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

//! Constants and environment-derived settings.

use crate::error::FirmwareError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name used for the cache namespace and the user agent.
pub static APP_NAME: &str = "gnome-firmware";

/// Version reported in the user agent and the about text.
pub static APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identifier of the Linux Vendor Firmware Service remote.
pub static LVFS_REMOTE_ID: &str = "lvfs";

/// Time an HTTP transfer may go without any data from the server before it is abandoned.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Proxy variables in the order they are consulted.
pub static PROXY_ENV_VARS: [&str; 4] = ["https_proxy", "HTTPS_PROXY", "http_proxy", "HTTP_PROXY"];

/// Mode of directories created under the cache root.
pub const CACHE_DIR_MODE: u32 = 0o755;

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Per-user cache directory for this application, `$XDG_CACHE_HOME/gnome-firmware`.
    pub cache_dir: PathBuf,
    /// Explicit HTTP proxy, if the environment names one.
    pub proxy: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, FirmwareError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FirmwareError> {
        let cache_root = lookup("XDG_CACHE_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                lookup("HOME")
                    .filter(|home| !home.is_empty())
                    .map(|home| Path::new(&home).join(".cache"))
            })
            .ok_or_else(|| {
                FirmwareError::NotFound("neither XDG_CACHE_HOME nor HOME is set".to_string())
            })?;
        Ok(AppConfig {
            cache_dir: cache_root.join(APP_NAME),
            proxy: proxy_from_lookup(lookup),
        })
    }

    /// Location in the cache for a file named after the last component of `name`.
    pub fn user_cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(basename(name))
    }
}

/// The first non-empty proxy variable, in priority order.
pub fn proxy_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    PROXY_ENV_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}

pub fn user_agent() -> String {
    format!("{APP_NAME}/{APP_VERSION}")
}

/// Last path component of a URI or path, or the whole string when it has none.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Everything before the last `/`, or `.` when there is none.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[gtest]
    #[rstest]
    #[case::lowercase_https_first(&[("HTTP_PROXY", "http://c:3"), ("https_proxy", "http://a:1")], Some("http://a:1"))]
    #[case::uppercase_https(&[("HTTPS_PROXY", "http://b:2"), ("http_proxy", "http://c:3")], Some("http://b:2"))]
    #[case::empty_is_skipped(&[("https_proxy", ""), ("HTTP_PROXY", "http://d:4")], Some("http://d:4"))]
    #[case::none(&[], None)]
    fn proxy_priority(#[case] vars: &[(&str, &str)], #[case] expected: Option<&str>) {
        let vars = env(vars);
        let proxy = proxy_from_lookup(|key| vars.get(key).cloned());
        expect_that!(proxy.as_deref(), eq(expected));
    }

    #[gtest]
    fn cache_dir_prefers_xdg() {
        let vars = env(&[("XDG_CACHE_HOME", "/xdg"), ("HOME", "/home/user")]);
        let config = AppConfig::from_lookup(|key| vars.get(key).cloned());
        assert_that!(config, ok(anything()));
        let config = config.unwrap();
        expect_that!(config.cache_dir, eq(Path::new("/xdg/gnome-firmware")));
        expect_that!(
            config.user_cache_path("https://cdn.fwupd.org/downloads/abc-fw.cab"),
            eq(Path::new("/xdg/gnome-firmware/abc-fw.cab"))
        );
    }

    #[gtest]
    fn cache_dir_falls_back_to_home() {
        let vars = env(&[("HOME", "/home/user")]);
        let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        expect_that!(config.cache_dir, eq(Path::new("/home/user/.cache/gnome-firmware")));
    }

    #[gtest]
    #[rstest]
    #[case::nested("/var/lib/fwupd/remotes.d/lvfs/firmware.xml.gz", "/var/lib/fwupd/remotes.d/lvfs", "firmware.xml.gz")]
    #[case::root_file("/firmware.cab", "/", "firmware.cab")]
    #[case::bare("firmware.cab", ".", "firmware.cab")]
    fn path_components(#[case] path: &str, #[case] dir: &str, #[case] base: &str) {
        expect_that!(dirname(path), eq(dir));
        expect_that!(basename(path), eq(base));
    }

    #[gtest]
    fn user_agent_names_app_and_version() {
        expect_that!(user_agent(), starts_with("gnome-firmware/"));
    }
}
