/*
This file is part of the GIS Address Server
Copyright (C) 2023 Novel-T

The GIS Address Server is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use std::time::{Duration, Instant};

use log::info;

pub fn format_duration(d: Duration) -> String {
    let mut secs = d.as_secs();
    let hours = secs / 3600;
    secs = secs % 3600;
    let minutes = secs / 60;
    secs = secs % 60;

    let ms = d.as_millis() % 1000;

    format!("{}h {}m {}s {}ms", hours, minutes, secs, ms)
}

pub fn print_remaining_time(now: &Instant, num_processed: u32, num_total: u32) {
    let d = Instant::now().duration_since(*now);
    let time_per_result = if num_processed == 0 {
        d / 1
    } else {
        d / num_processed
    };
    let est_remaining_time = time_per_result * (num_total - num_processed);
    info!(
        "Through {} of {}. Elapsed: {} Est. Remaining: {}",
        num_processed,
        num_total,
        format_duration(d),
        format_duration(est_remaining_time)
    );
}

/// Logs the elapsed time of a pipeline stage when dropped
pub struct Timer {
    reason: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(reason: &'static str) -> Self {
        Timer {
            reason,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "Finished: {} in {}",
            self.reason,
            format_duration(self.start.elapsed())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "0h 0m 1s 500ms");
        assert_eq!(
            format_duration(Duration::from_secs(3600 * 2 + 61)),
            "2h 1m 1s 0ms"
        );
    }
}
