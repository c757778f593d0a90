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

//! Time remaining for a running install, derived from the daemon's percentage.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    started: Instant,
    last_estimate: f64,
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEstimator {
    pub fn new() -> Self {
        ProgressEstimator {
            started: Instant::now(),
            last_estimate: 0.0,
        }
    }

    /// Restart the timer for a new operation.
    pub fn reset(&mut self) {
        self.started = Instant::now();
        self.last_estimate = 0.0;
    }

    /// Feed a new percentage using the time elapsed since [`reset`](Self::reset).
    pub fn update(&mut self, percentage: u32) -> bool {
        self.update_with_elapsed(self.started.elapsed(), percentage)
    }

    /// Feed a new percentage, returning true when the estimate is worth showing.
    ///
    /// The estimate is only shown after it went down since the previous call, so the first
    /// overestimate of a transfer never reaches the user.
    pub fn update_with_elapsed(&mut self, elapsed: Duration, percentage: u32) -> bool {
        if percentage == 0 || percentage >= 100 {
            return false;
        }
        let pct = f64::from(percentage);
        let estimate = elapsed.as_secs_f64() / pct * (100.0 - pct);
        let ready = self.last_estimate > estimate;
        self.last_estimate = estimate;
        ready
    }

    pub fn to_display_string(&self) -> Option<String> {
        remaining_to_string(self.last_estimate)
    }
}

/// Phrase for a remaining time, nothing under five seconds.
pub fn remaining_to_string(seconds: f64) -> Option<String> {
    if seconds < 5.0 {
        return None;
    }
    if seconds < 60.0 {
        return Some("Less than one minute remaining".to_string());
    }
    let minutes = (seconds / 60.0).round();
    Some(if minutes == 1.0 {
        "1 minute remaining".to_string()
    } else {
        format!("{minutes:.0} minutes remaining")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    fn ready_only_after_a_decrease() {
        let mut estimator = ProgressEstimator::new();
        let elapsed = Duration::from_secs(30);
        let ready: Vec<bool> = [10, 15, 12, 20, 30]
            .into_iter()
            .map(|pct| estimator.update_with_elapsed(elapsed, pct))
            .collect();
        expect_that!(
            ready,
            elements_are![eq(&false), eq(&true), eq(&false), eq(&true), eq(&true)]
        );
    }

    #[gtest]
    #[rstest]
    #[case::zero(0)]
    #[case::complete(100)]
    fn boundaries_never_ready(#[case] pct: u32) {
        let mut estimator = ProgressEstimator::new();
        estimator.update_with_elapsed(Duration::from_secs(100), 50);
        expect_that!(
            estimator.update_with_elapsed(Duration::from_secs(1), pct),
            eq(false)
        );
        expect_that!(
            estimator.to_display_string().as_deref(),
            some(eq("2 minutes remaining"))
        );
    }

    #[gtest]
    fn reset_forgets_previous_estimate() {
        let mut estimator = ProgressEstimator::new();
        estimator.update_with_elapsed(Duration::from_secs(100), 10);
        estimator.reset();
        expect_that!(
            estimator.update_with_elapsed(Duration::from_secs(1), 50),
            eq(false)
        );
    }

    #[gtest]
    #[rstest]
    #[case::tiny(4.9, None)]
    #[case::seconds(30.0, Some("Less than one minute remaining"))]
    #[case::one_minute(80.0, Some("1 minute remaining"))]
    #[case::rounded_up(150.0, Some("3 minutes remaining"))]
    #[case::rounded_down(610.0, Some("10 minutes remaining"))]
    fn display(#[case] seconds: f64, #[case] expected: Option<&str>) {
        expect_that!(remaining_to_string(seconds).as_deref(), eq(expected));
    }
}
