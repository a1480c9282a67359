//! FN layer interception.
//!
//! While FN is held, pressing one of the cells in [`FN_ACTIONS`] performs a
//! device-local action instead of sending the cell's keycode: volume,
//! backlight, pointer movement and clicks, wheel steps, and text macros
//! typed into a media player's command line.

use keyberon::key_code::KeyCode::{self, *};

use crate::backlight::{Brightness, PwmBacklight};
use crate::hid::{ConsumerCode, ConsumerControl, HidSink, Keyboard, MouseButton, Pointer, SinkError};
use crate::keymap::{Cell, CELLS, COLS, ROWS};
use crate::settings::Settings;

use embedded_hal::PwmPin;
use heapless::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Increase,
    Decrease,
}

/// Groups of keys typed as one press followed by one release each.
pub type Macro = &'static [&'static [KeyCode]];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnAction {
    Volume(Step),
    Brightness(Step),
    Move(Direction),
    Click(MouseButton),
    Scroll(Step),
    Type(Macro),
}

pub const PAUSE: Macro = &[&[P, A, U, S, E, Enter]];
pub const STOP: Macro = &[&[S, T, O, P, Enter]];
pub const PREV: Macro = &[&[P, R, E, V, Enter]];
pub const NEXT: Macro = &[&[N, E, X, T, Enter]];
// a report carries each key once, so repeated letters start a new group
pub const VOLUME_DOWN: Macro = &[&[V, O, L, D], &[O, W, N, Space, Kb2, Enter]];
pub const VOLUME_UP: Macro = &[&[V, O, L, U, P], &[Space, Kb2, Enter]];
pub const SEEK_BACK_20: Macro = &[&[S, E], &[E, K, Space], &[Minus, Kb2, Kb0, Enter]];
pub const SEEK_FORWARD_20: Macro = &[&[S, E], &[E, K, Space], &[RShift, Equal], &[Kb2, Kb0, Enter]];
pub const SEEK_BACK_5: Macro = &[&[S, E], &[E, K, Space], &[Minus, Kb5, Enter]];
pub const SEEK_FORWARD_5: Macro = &[&[S, E], &[E, K, Space], &[RShift, Equal], &[Kb5, Enter]];

const __: Option<FnAction> = None;
const VOL_UP: Option<FnAction> = Some(FnAction::Volume(Step::Increase));
const VOL_DN: Option<FnAction> = Some(FnAction::Volume(Step::Decrease));
const LIGHT_UP: Option<FnAction> = Some(FnAction::Brightness(Step::Increase));
const LIGHT_DN: Option<FnAction> = Some(FnAction::Brightness(Step::Decrease));
const MS_UP: Option<FnAction> = Some(FnAction::Move(Direction::Up));
const MS_DN: Option<FnAction> = Some(FnAction::Move(Direction::Down));
const MS_LT: Option<FnAction> = Some(FnAction::Move(Direction::Left));
const MS_RT: Option<FnAction> = Some(FnAction::Move(Direction::Right));
const BTN_L: Option<FnAction> = Some(FnAction::Click(MouseButton::Left));
const BTN_R: Option<FnAction> = Some(FnAction::Click(MouseButton::Right));
const WH_UP: Option<FnAction> = Some(FnAction::Scroll(Step::Increase));
const WH_DN: Option<FnAction> = Some(FnAction::Scroll(Step::Decrease));

const fn t(m: Macro) -> Option<FnAction> {
    Some(FnAction::Type(m))
}

/// Actions performed instead of the keycode while FN is held.
#[rustfmt::skip]
pub static FN_ACTIONS: [[Option<FnAction>; COLS]; ROWS] = [
    [LIGHT_UP,  LIGHT_DN, __,       __, __,          __,           WH_UP,             BTN_L,                  MS_UP,              BTN_R],
    [__,        __,       __,       __, __,          __,           WH_DN,             MS_LT,                  MS_DN,              MS_RT],
    [t(STOP),   t(PREV),  t(NEXT),  __, t(VOLUME_DOWN), t(VOLUME_UP), t(SEEK_BACK_20), t(SEEK_FORWARD_20), t(SEEK_BACK_5), t(SEEK_FORWARD_5)],
    [__,        __,       __,       __, t(PAUSE),    __,           __,                __,                     __,                 __],
    [__,        __,       __,       __, __,          __,           __,                __,                     __,                 __],
    [__,        __,       __,       __, __,          __,           VOL_UP,            VOL_DN,                 __,                 __],
];

/// Action bound to `cell` on the FN layer.
pub fn fn_action(cell: Cell) -> Option<FnAction> {
    FN_ACTIONS[cell.row][cell.col]
}

/// Performs FN actions against the HID sink and the backlight.
pub struct Dispatcher<'a, S, P> {
    pub sink: &'a mut S,
    pub backlight: &'a mut PwmBacklight<P>,
    pub brightness: &'a mut Brightness,
    pub settings: &'a Settings,
    /// Keys the matrix is holding down right now.
    pub held: &'a [KeyCode],
}

impl<'a, S, P> Dispatcher<'a, S, P>
where
    S: HidSink,
    P: PwmPin<Duty = u16>,
{
    pub fn run(&mut self, action: FnAction) -> Result<(), SinkError> {
        let step = self.settings.pointer_step;
        let wheel = self.settings.wheel_step;
        match action {
            FnAction::Volume(Step::Increase) => self.sink.send(ConsumerCode::VolumeIncrement),
            FnAction::Volume(Step::Decrease) => self.sink.send(ConsumerCode::VolumeDecrement),
            FnAction::Brightness(dir) => {
                let level = match dir {
                    Step::Increase => self.brightness.raise(self.settings.brightness_step),
                    Step::Decrease => self.brightness.lower(self.settings.brightness_step),
                };
                info!("brightness {}", level);
                self.backlight.set_percent(level);
                Ok(())
            }
            FnAction::Move(Direction::Up) => self.sink.move_by(0, -step, 0),
            FnAction::Move(Direction::Down) => self.sink.move_by(0, step, 0),
            FnAction::Move(Direction::Left) => self.sink.move_by(-step, 0, 0),
            FnAction::Move(Direction::Right) => self.sink.move_by(step, 0, 0),
            FnAction::Click(button) => self.sink.click(button),
            FnAction::Scroll(Step::Increase) => self.sink.move_by(0, 0, wheel),
            FnAction::Scroll(Step::Decrease) => self.sink.move_by(0, 0, -wheel),
            FnAction::Type(groups) => self.type_macro(groups),
        }
    }

    /// Each group is fully pressed and released before the next starts.
    /// Keys the matrix still holds stay down.
    fn type_macro(&mut self, groups: Macro) -> Result<(), SinkError> {
        for group in groups {
            let release: Vec<KeyCode, CELLS> = group
                .iter()
                .copied()
                .filter(|key| !self.held.contains(key))
                .collect();
            self.sink.press(group)?;
            self.sink.release(&release)?;
        }
        Ok(())
    }
}
