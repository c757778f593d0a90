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

//! Bit sets published by the daemon and the options sent back to it.
//!
//! The bit values mirror the daemon's `Flags` keys exactly, so they must never be renumbered.

use std::collections::{BTreeSet, HashMap};
use zbus::zvariant::Value;

macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* const $flag:ident = $bit:expr; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u64);

        impl $name {
            pub const NONE: Self = Self(0);
            $( $(#[$fmeta])* pub const $flag: Self = Self($bit); )*

            pub const fn from_bits(bits: u64) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> u64 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// True when every bit of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                (self.0 & other.0) == other.0
            }

            /// Each set bit as its own single-bit value, lowest bit first.
            pub fn iter(self) -> impl Iterator<Item = Self> {
                let bits = self.0;
                (0..u64::BITS)
                    .map(|shift| 1u64 << shift)
                    .filter(move |bit| bits & bit != 0)
                    .map(Self)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

flag_set! {
    /// Capability and state flags of a device.
    pub struct DeviceFlags {
        const INTERNAL = 1 << 0;
        const UPDATABLE = 1 << 1;
        const ONLY_OFFLINE = 1 << 2;
        const REQUIRE_AC = 1 << 3;
        const LOCKED = 1 << 4;
        const SUPPORTED = 1 << 5;
        const NEEDS_BOOTLOADER = 1 << 6;
        const REGISTERED = 1 << 7;
        const NEEDS_REBOOT = 1 << 8;
        const REPORTED = 1 << 9;
        const NOTIFIED = 1 << 10;
        const USE_RUNTIME_VERSION = 1 << 11;
        const INSTALL_PARENT_FIRST = 1 << 12;
        const IS_BOOTLOADER = 1 << 13;
        const WAIT_FOR_REPLUG = 1 << 14;
        const IGNORE_VALIDATION = 1 << 15;
        const TRUSTED = 1 << 16;
        const NEEDS_SHUTDOWN = 1 << 17;
        const ANOTHER_WRITE_REQUIRED = 1 << 18;
        const NO_AUTO_INSTANCE_IDS = 1 << 19;
        const NEEDS_ACTIVATION = 1 << 20;
        const ENSURE_SEMVER = 1 << 21;
        const HISTORICAL = 1 << 22;
        const ONLY_SUPPORTED = 1 << 23;
        const WILL_DISAPPEAR = 1 << 24;
        const CAN_VERIFY = 1 << 25;
        const CAN_VERIFY_IMAGE = 1 << 26;
        const DUAL_IMAGE = 1 << 27;
        const SELF_RECOVERY = 1 << 28;
        const USABLE_DURING_UPDATE = 1 << 29;
    }
}

flag_set! {
    /// Flags of a release relative to the installed version.
    pub struct ReleaseFlags {
        const TRUSTED_PAYLOAD = 1 << 0;
        const TRUSTED_METADATA = 1 << 1;
        const IS_UPGRADE = 1 << 2;
        const IS_DOWNGRADE = 1 << 3;
        const BLOCKED_VERSION = 1 << 4;
        const BLOCKED_APPROVAL = 1 << 5;
    }
}

/// A single named option of an `Install` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstallOption {
    /// Schedule the update for the next boot.
    Offline,
    AllowReinstall,
    AllowOlder,
}

impl InstallOption {
    /// The key the daemon expects in the `Install` options dictionary.
    pub fn key(self) -> &'static str {
        match self {
            InstallOption::Offline => "offline",
            InstallOption::AllowReinstall => "allow-reinstall",
            InstallOption::AllowOlder => "allow-older",
        }
    }
}

/// The explicit set of options for one install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions(BTreeSet<InstallOption>);

impl InstallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, option: InstallOption) {
        self.0.insert(option);
    }

    pub fn contains(&self, option: InstallOption) -> bool {
        self.0.contains(&option)
    }

    pub fn iter(&self) -> impl Iterator<Item = InstallOption> + '_ {
        self.0.iter().copied()
    }

    /// Encode as the `a{sv}` dictionary taken by `Install`.
    pub fn to_dict(&self) -> HashMap<&'static str, Value<'static>> {
        self.0
            .iter()
            .map(|option| (option.key(), Value::Bool(true)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    fn iter_yields_bits_in_ascending_order() {
        let flags = DeviceFlags::NEEDS_REBOOT | DeviceFlags::INTERNAL | DeviceFlags::UPDATABLE;
        let bits: Vec<u64> = flags.iter().map(DeviceFlags::bits).collect();
        assert_that!(bits, elements_are![eq(&1), eq(&2), eq(&256)]);
    }

    #[gtest]
    fn empty_set_has_no_bits() {
        expect_that!(DeviceFlags::NONE.iter().count(), eq(0));
        expect_that!(DeviceFlags::default().is_empty(), eq(true));
    }

    #[gtest]
    fn contains_needs_every_bit() {
        let flags = ReleaseFlags::IS_UPGRADE | ReleaseFlags::TRUSTED_PAYLOAD;
        expect_that!(flags.contains(ReleaseFlags::IS_UPGRADE), eq(true));
        expect_that!(flags.contains(ReleaseFlags::IS_DOWNGRADE), eq(false));
        expect_that!(
            flags.contains(ReleaseFlags::IS_DOWNGRADE | ReleaseFlags::IS_UPGRADE),
            eq(false)
        );
    }

    #[gtest]
    fn install_options_encode_as_booleans() {
        let mut options = InstallOptions::new();
        options.insert(InstallOption::AllowOlder);
        options.insert(InstallOption::Offline);
        let dict = options.to_dict();
        expect_that!(dict.len(), eq(2));
        expect_that!(dict.get("allow-older"), some(eq(&Value::Bool(true))));
        expect_that!(dict.get("offline"), some(eq(&Value::Bool(true))));
        expect_that!(dict.get("allow-reinstall"), none());
    }
}
