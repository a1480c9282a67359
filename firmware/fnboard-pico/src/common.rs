use rp_pico::hal;

use hal::gpio::{
    bank0, DynPinId, FunctionNull, FunctionSioInput, FunctionSioOutput, Pin, PullDown, PullUp,
};
use hal::pwm::{Channel, FreeRunning, Pwm2, Slice, A};
use hal::usb::UsbBus;

use keyberon::{hid::HidClass, keyboard::Keyboard};
use usbd_hid::hid_class::HIDClass;

pub type KeyboardClass = HidClass<'static, UsbBus, Keyboard<()>>;
pub type MouseClass = HIDClass<'static, UsbBus>;
pub type ConsumerClass = HIDClass<'static, UsbBus>;
pub type UsbDevice = usb_device::device::UsbDevice<'static, UsbBus>;

// generic USB keyboard
// https://github.com/obdev/v-usb/blob/master/usbdrv/USB-IDs-for-free.txt
pub const VID: u16 = 0x16c0;
pub const PID: u16 = 0x27db;
pub const PRODUCT: &str = "fnboard";
pub const MANUFACTURER: &str = "fnboard";

pub type AnyPin<I> = Pin<I, FunctionNull, PullDown>;
pub type InputPin = Pin<DynPinId, FunctionSioInput, PullUp>;
pub type OutputPin = Pin<DynPinId, FunctionSioOutput, PullDown>;
pub type StatusLed = Pin<bank0::Gpio25, FunctionSioOutput, PullDown>;

/// GP20 is PWM slice 2, channel A.
pub type Backlight = Channel<Slice<Pwm2, FreeRunning>, A>;
