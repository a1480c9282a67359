//! Fixed-rate pacing of the scan loop.

use fugit::MicrosDurationU32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cadence {
    period: MicrosDurationU32,
}

impl Cadence {
    pub const fn new(period: MicrosDurationU32) -> Self {
        Self { period }
    }

    pub fn period(&self) -> MicrosDurationU32 {
        self.period
    }

    /// Time left in the current period after `elapsed` of work. An overrun
    /// yields zero: the next cycle starts right away and nothing is skipped.
    pub fn remaining(&self, elapsed: MicrosDurationU32) -> MicrosDurationU32 {
        MicrosDurationU32::from_ticks(self.period.ticks().saturating_sub(elapsed.ticks()))
    }
}

/// Counts cycles for the status LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Heartbeat {
    period: u16,
    count: u16,
}

impl Heartbeat {
    pub const fn new(period: u16) -> Self {
        Self { period, count: 0 }
    }

    /// Returns `true` once the counter has gone past `period`, then starts over.
    pub fn beat(&mut self) -> bool {
        self.count += 1;
        if self.count > self.period {
            self.count = 0;
            true
        } else {
            false
        }
    }
}
