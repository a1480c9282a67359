#![no_std]
#![no_main]

use defmt::*;
use defmt_rtt as _;
use panic_probe as _;

use rtic::app;

use rp_pico as bsp;

use bsp::hal;

mod board;
mod common;
mod mcu;
mod usb;

#[app(device = hal::pac)]
mod app {
    use super::*;

    use embedded_hal::digital::v2::ToggleableOutputPin;
    use fugit::{ExtU32, MicrosDurationU32};
    use hal::timer::Alarm;
    use hal::Clock;
    use usb_device::bus::UsbBusAllocator;
    use usb_device::class::UsbClass;

    use fnboard::{
        Cadence, Controller, CycleOutcome, FlushOutcome, Heartbeat, Matrix, PwmBacklight,
        Settings,
    };

    use crate::common::{
        Backlight, ConsumerClass, InputPin, KeyboardClass, MouseClass, OutputPin, StatusLed,
        UsbDevice,
    };
    use crate::usb::{HidState, UsbSink};

    #[shared]
    struct Shared {
        usb_dev: UsbDevice,
        keyboard: KeyboardClass,
        mouse: MouseClass,
        consumer: ConsumerClass,
    }

    #[local]
    struct Local {
        controller: Controller<InputPin, OutputPin, Backlight>,
        hid: HidState,
        cadence: Cadence,
        heartbeat: Heartbeat,
        led: StatusLed,
        delay: cortex_m::delay::Delay,
        watchdog: hal::watchdog::Watchdog,
        timer: hal::timer::Timer,
        alarm: hal::timer::Alarm0,
    }

    #[init(local = [bus: Option<UsbBusAllocator<hal::usb::UsbBus>> = None])]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        info!("mcu setup");
        let mut resets = ctx.device.RESETS;
        let (mut watchdog, clocks) = mcu::init_clocks(
            ctx.device.WATCHDOG,
            bsp::XOSC_CRYSTAL_FREQ,
            ctx.device.XOSC,
            ctx.device.CLOCKS,
            ctx.device.PLL_SYS,
            ctx.device.PLL_USB,
            &mut resets,
        );
        let (timer, alarm) =
            mcu::init_timer(ctx.device.TIMER, &mut resets, &clocks, 1_000.micros());
        let delay = cortex_m::delay::Delay::new(ctx.core.SYST, clocks.system_clock.freq().to_Hz());

        info!("usb setup");
        *ctx.local.bus = Some(UsbBusAllocator::new(hal::usb::UsbBus::new(
            ctx.device.USBCTRL_REGS,
            ctx.device.USBCTRL_DPRAM,
            clocks.usb_clock,
            true,
            &mut resets,
        )));
        let usb_bus = ctx.local.bus.as_ref().unwrap();
        let (usb_dev, keyboard, mouse, consumer) = mcu::init_usb(
            usb_bus,
            common::VID,
            common::PID,
            common::MANUFACTURER,
            common::PRODUCT,
        );

        let sio = hal::sio::Sio::new(ctx.device.SIO);
        let pins = bsp::Pins::new(
            ctx.device.IO_BANK0,
            ctx.device.PADS_BANK0,
            sio.gpio_bank0,
            &mut resets,
        );

        info!("keyboard setup");
        let matrix = Matrix::new(
            board::rows(
                pins.gpio14,
                pins.gpio15,
                pins.gpio16,
                pins.gpio17,
                pins.gpio18,
                pins.gpio19,
            ),
            board::cols(
                pins.gpio4,
                pins.gpio5,
                pins.gpio6,
                pins.gpio7,
                pins.gpio8,
                pins.gpio9,
                pins.gpio10,
                pins.gpio11,
                pins.gpio12,
                pins.gpio13,
            ),
        )
        .unwrap();
        let backlight = mcu::init_backlight(ctx.device.PWM, pins.gpio20, &mut resets);
        let led = pins.led.into_push_pull_output();

        let settings = Settings::DEFAULT;
        let cadence = Cadence::new(settings.cycle_period);
        let heartbeat = Heartbeat::new(settings.heartbeat_period);
        let controller = Controller::new(matrix, PwmBacklight::new(backlight), settings);

        // must outlast the recovery pause
        watchdog.start(2_000_000.micros());

        (
            Shared {
                usb_dev,
                keyboard,
                mouse,
                consumer,
            },
            Local {
                controller,
                hid: HidState::new(),
                cadence,
                heartbeat,
                led,
                delay,
                watchdog,
                timer,
                alarm,
            },
            init::Monotonics(),
        )
    }

    #[task(
        binds = TIMER_IRQ_0,
        priority = 1,
        shared = [usb_dev, keyboard, mouse, consumer],
        local = [controller, hid, cadence, heartbeat, led, delay, watchdog, timer, alarm]
    )]
    fn tick(ctx: tick::Context) {
        let timer = *ctx.local.timer;
        let started = timer.get_counter();
        ctx.local.alarm.clear_interrupt();
        ctx.local.watchdog.feed();

        let mut sink = UsbSink::new(
            timer,
            ctx.shared.usb_dev,
            ctx.shared.keyboard,
            ctx.shared.mouse,
            ctx.shared.consumer,
            ctx.local.hid,
        );
        match ctx.local.controller.cycle(&mut sink, ctx.local.delay) {
            Ok(CycleOutcome::Scanned(report)) => {
                if let FlushOutcome::Recovered(e) = report.flush {
                    warn!("flush failed ({}), hid endpoints reacquired", e);
                }
            }
            Ok(CycleOutcome::Skipped) => {}
            Err(e) => error!("cycle failed: {}", e),
        }

        if ctx.local.heartbeat.beat() {
            let _ = ctx.local.led.toggle();
        }

        let elapsed = (timer.get_counter() - started).to_micros();
        let remaining = ctx
            .local
            .cadence
            .remaining(MicrosDurationU32::micros(elapsed.min(u32::MAX as u64) as u32));
        if remaining.ticks() == 0 || ctx.local.alarm.schedule(remaining).is_err() {
            trace!("cycle overran by {} us", elapsed);
            rtic::pend(hal::pac::Interrupt::TIMER_IRQ_0);
        }
    }

    #[task(binds = USBCTRL_IRQ, priority = 3, shared = [usb_dev, keyboard, mouse, consumer])]
    fn usb_rx(ctx: usb_rx::Context) {
        (
            ctx.shared.usb_dev,
            ctx.shared.keyboard,
            ctx.shared.mouse,
            ctx.shared.consumer,
        )
            .lock(|usb_dev, keyboard, mouse, consumer| {
                let classes: &mut [&mut dyn UsbClass<hal::usb::UsbBus>] =
                    &mut [keyboard, mouse, consumer];
                usb_dev.poll(classes);
            })
    }
}
