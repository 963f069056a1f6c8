#![no_std]
#![no_main]

mod config;
mod infrastructure;

extern crate alloc;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use esp_println::println;

use lumen_strip::ColorCommand;

use crate::config::{onboard_backend, onboard_led_gpio};
use crate::infrastructure::tasks::onboard_led::{OnboardLed, start_onboard_led};

esp_bootloader_esp_idf::esp_app_desc!();

// Demo producer: a slow hue sweep on the status pixel.
const DEMO_SATURATION: u8 = 240;
const DEMO_VALUE: u8 = 50;
const DEMO_SEND_TIMEOUT: Duration = Duration::from_millis(10);
const DEMO_STEP_INTERVAL: Duration = Duration::from_millis(100);

/// Give up on the LED after this many render failures.
const MAX_RENDER_FAILURES: u32 = 5;

/// Stop producing after this many consecutive dropped sends; once the
/// service is shut down the queue fills up and never drains again.
const MAX_STALLED_SENDS: u32 = 10;

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let onboard = match start_onboard_led(
        spawner,
        onboard_backend!(peripherals),
        onboard_led_gpio!(peripherals),
        false,
    ) {
        Ok(onboard) => onboard,
        Err(err) => {
            println!("main: onboard led unavailable: {err}");
            loop {
                Timer::after(Duration::from_secs(5)).await;
            }
        }
    };

    spawner.spawn(render_failure_watch(onboard)).ok();

    // Sweep the hue; a momentarily full queue just skips the step.
    let mut color = ColorCommand::new(0, DEMO_SATURATION, DEMO_VALUE);
    let mut stalled_sends: u32 = 0;
    loop {
        if onboard.send(color, DEMO_SEND_TIMEOUT).await {
            stalled_sends = 0;
        } else {
            stalled_sends += 1;
            println!("main: color queue full, dropping hue {}", color.hue);
            if stalled_sends >= MAX_STALLED_SENDS {
                println!("main: led service stopped draining the queue, demo over");
                break;
            }
        }
        color.hue = color.hue.wrapping_add(1);
        Timer::after(DEMO_STEP_INTERVAL).await;
    }

    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}

/// Reports render failures and stops the service when the strip looks dead.
#[embassy_executor::task]
async fn render_failure_watch(onboard: OnboardLed) {
    let events = onboard.events();
    let mut failures: u32 = 0;
    loop {
        let err = events.receive().await;
        failures += 1;
        println!("main: render failure: {err}");
        if failures >= MAX_RENDER_FAILURES {
            println!("main: {failures} render failures, stopping the led service");
            onboard.shutdown();
            return;
        }
    }
}
