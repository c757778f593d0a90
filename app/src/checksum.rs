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

//! Checksums as published in firmware metadata.
//!
//! Metadata carries bare hex digests, so the algorithm can only be told apart by the digest
//! length. Lengths that match no algorithm are treated as SHA1, as the daemon does.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChecksumKind {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumKind {
    /// Infer the algorithm from the length of a hex digest.
    pub fn guess(checksum: &str) -> Self {
        match checksum.len() {
            32 => ChecksumKind::Md5,
            40 => ChecksumKind::Sha1,
            64 => ChecksumKind::Sha256,
            128 => ChecksumKind::Sha512,
            _ => ChecksumKind::Sha1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChecksumKind::Md5 => "MD5",
            ChecksumKind::Sha1 => "SHA1",
            ChecksumKind::Sha256 => "SHA256",
            ChecksumKind::Sha512 => "SHA512",
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn compute(self, data: &[u8]) -> String {
        match self {
            ChecksumKind::Md5 => format!("{:x}", Md5::digest(data)),
            ChecksumKind::Sha1 => format!("{:x}", Sha1::digest(data)),
            ChecksumKind::Sha256 => format!("{:x}", Sha256::digest(data)),
            ChecksumKind::Sha512 => format!("{:x}", Sha512::digest(data)),
        }
    }
}

/// Compare `data` against `expected`, using the algorithm implied by its length.
///
/// Returns the computed digest when it does not match.
pub fn verify(expected: &str, data: &[u8]) -> Result<(), String> {
    let actual = ChecksumKind::guess(expected).compute(data);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(actual)
    }
}

/// The strongest checksum in the list, SHA512 first and MD5 last.
pub fn best_checksum(checksums: &[String]) -> Option<&str> {
    checksums
        .iter()
        .max_by_key(|checksum| ChecksumKind::guess(checksum))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    #[rstest]
    #[case::md5(32, ChecksumKind::Md5)]
    #[case::sha1(40, ChecksumKind::Sha1)]
    #[case::sha256(64, ChecksumKind::Sha256)]
    #[case::sha512(128, ChecksumKind::Sha512)]
    #[case::empty(0, ChecksumKind::Sha1)]
    #[case::odd_length(33, ChecksumKind::Sha1)]
    fn kind_from_length(#[case] len: usize, #[case] expected: ChecksumKind) {
        expect_that!(ChecksumKind::guess(&"a".repeat(len)), eq(expected));
    }

    #[gtest]
    fn computes_known_digests() {
        expect_that!(
            ChecksumKind::Md5.compute(b"abc"),
            eq("900150983cd24fb0d6963f7d28e17f72")
        );
        expect_that!(
            ChecksumKind::Sha1.compute(b"abc"),
            eq("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
        expect_that!(
            ChecksumKind::Sha256.compute(b"abc"),
            eq("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[gtest]
    fn verify_ignores_case_and_reports_actual() {
        expect_that!(
            verify("A9993E364706816ABA3E25717850C26C9CD0D89D", b"abc"),
            ok(anything())
        );
        let mismatch = verify("a9993e364706816aba3e25717850c26c9cd0d89d", b"abd");
        expect_that!(mismatch.is_err(), eq(true));
    }

    #[gtest]
    fn best_checksum_prefers_strongest() {
        let checksums = vec!["1".repeat(40), "2".repeat(64), "3".repeat(32)];
        let sha256 = "2".repeat(64);
        expect_that!(best_checksum(&checksums), some(eq(sha256.as_str())));
        expect_that!(best_checksum(&[]), none());
    }
}
