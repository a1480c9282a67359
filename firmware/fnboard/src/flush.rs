//! Per-cycle output: the pending press/release sets and the flush into the
//! HID sink, with the recovery sequence for a failed flush.

use embedded_hal::blocking::delay::DelayMs;
use heapless::Vec;
use keyberon::key_code::KeyCode;

use crate::hid::{HidSink, Keyboard, Pointer, SinkError};
use crate::keymap::CELLS;

/// Keycodes to assert and to release on the next flush.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingEvents {
    /// Everything that should be down, rebuilt every cycle.
    pub to_press: Vec<KeyCode, CELLS>,
    /// Release edges not yet flushed.
    pub to_release: Vec<KeyCode, CELLS>,
}

impl PendingEvents {
    pub const fn new() -> Self {
        Self {
            to_press: Vec::new(),
            to_release: Vec::new(),
        }
    }

    pub fn queue_release(&mut self, key: KeyCode) {
        if self.to_release.push(key).is_err() {
            warn!("release buffer full, dropping keycode {}", key as u8);
        }
    }

    /// Replace `to_press` with `keys`.
    pub fn hold<It: IntoIterator<Item = KeyCode>>(&mut self, keys: It) {
        self.to_press.clear();
        for key in keys {
            // one entry per cell at most
            let _ = self.to_press.push(key);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushOutcome {
    Sent,
    /// The flush failed and the sink was reset.
    Recovered(SinkError),
}

/// Assert `to_press`, then release `to_release`. The release set is
/// cleared once it was sent.
pub fn flush<S: HidSink>(pending: &mut PendingEvents, sink: &mut S) -> Result<(), SinkError> {
    sink.press(&pending.to_press)?;
    sink.release(&pending.to_release)?;
    pending.to_release.clear();
    Ok(())
}

/// Bring the sink back to a known state after a failed flush.
///
/// Order matters: pending releases are dropped, the host is told every key
/// and button is up, and only after `pause_ms` are the endpoints
/// reacquired. Failures here are logged and otherwise ignored.
pub fn recover<S, D>(pending: &mut PendingEvents, sink: &mut S, delay: &mut D, pause_ms: u32)
where
    S: HidSink,
    D: DelayMs<u32>,
{
    pending.to_release.clear();

    if let Err(e) = Pointer::release_all(sink).and_then(|_| Keyboard::release_all(sink)) {
        warn!("release_all failed: {}", e);
    }

    delay.delay_ms(pause_ms);
    if let Err(e) = sink.reacquire() {
        warn!("reacquiring mouse and keyboard failed: {}", e);
    }
}

/// Flush, falling back to [`recover`] when the sink rejects it.
pub fn flush_or_recover<S, D>(
    pending: &mut PendingEvents,
    sink: &mut S,
    delay: &mut D,
    pause_ms: u32,
) -> FlushOutcome
where
    S: HidSink,
    D: DelayMs<u32>,
{
    match flush(pending, sink) {
        Ok(()) => FlushOutcome::Sent,
        Err(e) => {
            error!("flush failed: {}", e);
            recover(pending, sink, delay, pause_ms);
            FlushOutcome::Recovered(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, Delay, Sink};
    use keyberon::key_code::KeyCode::*;

    fn pending(press: &[KeyCode], release: &[KeyCode]) -> PendingEvents {
        let mut p = PendingEvents::new();
        p.hold(press.iter().copied());
        for key in release {
            p.queue_release(*key);
        }
        p
    }

    #[test]
    fn flush_presses_then_releases() {
        let mut p = pending(&[A, LShift], &[B]);
        let mut sink = Sink::new();
        flush(&mut p, &mut sink).unwrap();
        assert_eq!(sink.calls, [Call::Press(vec![A, LShift]), Call::Release(vec![B])]);
        assert!(p.to_release.is_empty());
        assert_eq!(&p.to_press[..], &[A, LShift]);
    }

    #[test]
    fn failed_release_keeps_nothing_after_recovery() {
        let mut p = pending(&[A], &[B]);
        let mut sink = Sink::failing(|c| matches!(c, Call::Release(_)));
        let mut delay = Delay::default();
        let outcome = flush_or_recover(&mut p, &mut sink, &mut delay, 1000);
        assert_eq!(outcome, FlushOutcome::Recovered(SinkError::Transport));
        assert!(p.to_release.is_empty());
        assert_eq!(
            sink.calls,
            [
                Call::Press(vec![A]),
                Call::Release(vec![B]),
                Call::PointerReleaseAll,
                Call::KeyboardReleaseAll,
                Call::Reacquire,
            ]
        );
        assert_eq!(delay.waited, [1000]);
    }

    #[test]
    fn recovery_survives_its_own_failures() {
        let mut p = pending(&[A], &[]);
        let mut sink = Sink::failing(|_| true);
        let mut delay = Delay::default();
        let outcome = flush_or_recover(&mut p, &mut sink, &mut delay, 250);
        assert_eq!(outcome, FlushOutcome::Recovered(SinkError::Transport));
        // pointer release failed, so the keyboard release was skipped
        assert_eq!(sink.calls, [Call::Press(vec![A]), Call::PointerReleaseAll, Call::Reacquire]);
        assert_eq!(delay.waited, [250]);
    }

    #[test]
    fn release_buffer_is_bounded() {
        let mut p = PendingEvents::new();
        for _ in 0..CELLS + 5 {
            p.queue_release(A);
        }
        assert_eq!(p.to_release.len(), CELLS);
    }
}
