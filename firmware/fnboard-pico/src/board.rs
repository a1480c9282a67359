use rp_pico::hal;

use hal::gpio::bank0;

use fnboard::keymap::{COLS, ROWS};

use crate::common::{AnyPin, InputPin, OutputPin};

/// Row lines, top to bottom.
pub fn rows(
    gp14: AnyPin<bank0::Gpio14>,
    gp15: AnyPin<bank0::Gpio15>,
    gp16: AnyPin<bank0::Gpio16>,
    gp17: AnyPin<bank0::Gpio17>,
    gp18: AnyPin<bank0::Gpio18>,
    gp19: AnyPin<bank0::Gpio19>,
) -> [InputPin; ROWS] {
    [
        gp14.into_pull_up_input().into_dyn_pin(),
        gp15.into_pull_up_input().into_dyn_pin(),
        gp16.into_pull_up_input().into_dyn_pin(),
        gp17.into_pull_up_input().into_dyn_pin(),
        gp18.into_pull_up_input().into_dyn_pin(),
        gp19.into_pull_up_input().into_dyn_pin(),
    ]
}

/// Column lines, left to right.
#[allow(clippy::too_many_arguments)]
pub fn cols(
    gp4: AnyPin<bank0::Gpio4>,
    gp5: AnyPin<bank0::Gpio5>,
    gp6: AnyPin<bank0::Gpio6>,
    gp7: AnyPin<bank0::Gpio7>,
    gp8: AnyPin<bank0::Gpio8>,
    gp9: AnyPin<bank0::Gpio9>,
    gp10: AnyPin<bank0::Gpio10>,
    gp11: AnyPin<bank0::Gpio11>,
    gp12: AnyPin<bank0::Gpio12>,
    gp13: AnyPin<bank0::Gpio13>,
) -> [OutputPin; COLS] {
    [
        gp4.into_push_pull_output().into_dyn_pin(),
        gp5.into_push_pull_output().into_dyn_pin(),
        gp6.into_push_pull_output().into_dyn_pin(),
        gp7.into_push_pull_output().into_dyn_pin(),
        gp8.into_push_pull_output().into_dyn_pin(),
        gp9.into_push_pull_output().into_dyn_pin(),
        gp10.into_push_pull_output().into_dyn_pin(),
        gp11.into_push_pull_output().into_dyn_pin(),
        gp12.into_push_pull_output().into_dyn_pin(),
        gp13.into_push_pull_output().into_dyn_pin(),
    ]
}
