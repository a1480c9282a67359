//! Wrapping cycle counter.
//!
//! The counter advances once per scan cycle and wraps to zero at
//! [`TICK_MAX`]. Elapsed time is always measured forward from a mark, so a
//! mark taken just before the wrap still yields a small distance after it.

/// A point on the wrapping tick counter, in `0..TICK_MAX`.
pub type Tick = u16;

/// Wrap bound of the tick counter.
pub const TICK_MAX: Tick = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickTimer {
    counter: Tick,
}

impl TickTimer {
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn current(&self) -> Tick {
        self.counter
    }

    /// Step the counter by one cycle and return the new value.
    pub fn advance(&mut self) -> Tick {
        self.counter += 1;
        if self.counter >= TICK_MAX {
            self.counter = 0;
        }
        self.counter
    }

    /// Forward distance from `mark` to the current tick, in `0..TICK_MAX`.
    pub fn elapsed_since(&self, mark: Tick) -> Tick {
        let mark = mark % TICK_MAX;
        if self.counter >= mark {
            self.counter - mark
        } else {
            self.counter + TICK_MAX - mark
        }
    }
}
