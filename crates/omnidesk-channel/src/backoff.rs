// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capped exponential backoff for reconnect attempts.
//!
//! Attempts are unbounded in count; only the delay between them grows,
//! doubling from the base until it hits the cap.

use std::time::Duration;

/// Capped exponential delay sequence.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            current: base,
        }
    }

    /// The delay to sleep before the next attempt. Doubles after each call,
    /// saturating at the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.cap);
        delay
    }

    /// Resets the sequence after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.base;
    }
}
