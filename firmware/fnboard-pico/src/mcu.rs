use rp_pico::hal;

use hal::gpio::bank0;
use hal::{pac, timer::Alarm};

use fugit::MicrosDurationU32;

use usb_device::device::UsbDeviceBuilder;
use usb_device::{bus::UsbBusAllocator, device::UsbVidPid};
use usbd_hid::descriptor::{MediaKeyboardReport, MouseReport, SerializedDescriptor};
use usbd_hid::hid_class::HIDClass;

use crate::common::{AnyPin, Backlight, ConsumerClass, KeyboardClass, MouseClass, UsbDevice};

/// Interval the host polls the mouse and consumer endpoints at.
const HID_POLL_MS: u8 = 10;
/// 125 MHz system clock / (top + 1) = 2 kHz.
const BACKLIGHT_TOP: u16 = 62_499;

pub fn init_clocks(
    watchdog: pac::WATCHDOG,
    xosc_freq: u32,
    xosc: pac::XOSC,
    clocks: pac::CLOCKS,
    pll_sys: pac::PLL_SYS,
    pll_usb: pac::PLL_USB,
    resets: &mut pac::RESETS,
) -> (hal::Watchdog, hal::clocks::ClocksManager) {
    let mut watchdog = hal::watchdog::Watchdog::new(watchdog);
    watchdog.pause_on_debug(false);

    let clocks = hal::clocks::init_clocks_and_plls(
        xosc_freq,
        xosc,
        clocks,
        pll_sys,
        pll_usb,
        resets,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    (watchdog, clocks)
}

/// Timer plus alarm 0, armed to fire `first` from now.
pub fn init_timer(
    timer: pac::TIMER,
    resets: &mut pac::RESETS,
    clocks: &hal::clocks::ClocksManager,
    first: MicrosDurationU32,
) -> (hal::timer::Timer, hal::timer::Alarm0) {
    let mut timer = hal::timer::Timer::new(timer, resets, clocks);
    let mut alarm = timer.alarm_0().unwrap();

    let _ = alarm.schedule(first);
    alarm.enable_interrupt();
    (timer, alarm)
}

/// Keyboard, mouse and consumer control interfaces on one device. The
/// classes allocate their endpoints before the device is built.
pub fn init_usb(
    usb_bus: &'static UsbBusAllocator<hal::usb::UsbBus>,
    vid: u16,
    pid: u16,
    manufacturer: &'static str,
    product: &'static str,
) -> (UsbDevice, KeyboardClass, MouseClass, ConsumerClass) {
    let keyboard = KeyboardClass::new(keyberon::keyboard::Keyboard::new(()), usb_bus);
    let mouse = HIDClass::new(usb_bus, MouseReport::desc(), HID_POLL_MS);
    let consumer = HIDClass::new(usb_bus, MediaKeyboardReport::desc(), HID_POLL_MS);

    let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(vid, pid))
        .manufacturer(manufacturer)
        .product(product)
        .serial_number(env!("CARGO_PKG_VERSION"))
        .build();

    (usb_dev, keyboard, mouse, consumer)
}

pub fn init_backlight(
    pwm: pac::PWM,
    pin: AnyPin<bank0::Gpio20>,
    resets: &mut pac::RESETS,
) -> Backlight {
    let slices = hal::pwm::Slices::new(pwm, resets);
    let mut slice = slices.pwm2;
    slice.set_div_int(1);
    slice.set_top(BACKLIGHT_TOP);
    slice.enable();

    let mut channel = slice.channel_a;
    channel.output_to(pin);
    channel
}
