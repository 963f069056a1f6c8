//! Onboard status LED service: startup orchestration and the render task.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_executor::{SpawnError, Spawner};
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_println::println;
use static_cell::StaticCell;

use lumen_strip::{
    ColorCommand, CommandChannel, CommandSender, RenderEventChannel, RenderEventReceiver,
    Renderer, ShutdownSignal, StripConfig, send_with_timeout,
};

use crate::config;
use crate::infrastructure::drivers::{
    BackendResources, ConfigureError, StripError, StripHandle, configure_strip,
};

// Lifecycle of the service. `Stopped` is terminal: the command queue is
// claimed once and stays with the stopped task.
const UNINITIALIZED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

static LIFECYCLE: AtomicU8 = AtomicU8::new(UNINITIALIZED);
static COMMAND_QUEUE: StaticCell<CommandChannel> = StaticCell::new();
static RENDER_EVENTS: RenderEventChannel<StripError> = Channel::new();
static SHUTDOWN: ShutdownSignal = Signal::new();

/// Startup failures of the onboard LED service.
#[derive(Debug)]
pub(crate) enum StartupError {
    /// Strip or backend configuration was rejected.
    Configuration(ConfigureError),
    /// The command queue could not be claimed.
    QueueUnavailable,
    /// The render task could not be spawned.
    TaskCreation(SpawnError),
    /// The service was started before.
    AlreadyStarted,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "configuration failed: {err}"),
            Self::QueueUnavailable => write!(f, "command queue unavailable"),
            Self::TaskCreation(err) => write!(f, "render task not created: {err:?}"),
            Self::AlreadyStarted => write!(f, "service already started"),
        }
    }
}

/// Handle to the running onboard LED service.
///
/// `Copy`: hand a copy to every task that produces colors or watches
/// failures.
#[derive(Clone, Copy)]
pub(crate) struct OnboardLed {
    commands: CommandSender,
}

impl OnboardLed {
    /// Queue a color for the status pixel, giving up after `timeout`.
    pub(crate) async fn send(&self, color: ColorCommand, timeout: Duration) -> bool {
        send_with_timeout(self.commands, color, timeout).await
    }

    /// Render failures published by the running task.
    pub(crate) fn events(&self) -> RenderEventReceiver<StripError> {
        RENDER_EVENTS.receiver()
    }

    /// Stop the render task. Commands already queued are still applied;
    /// the task then ends and releases the strip.
    pub(crate) fn shutdown(&self) {
        LIFECYCLE.store(STOPPED, Ordering::Release);
        SHUTDOWN.signal(());
    }
}

#[embassy_executor::task]
async fn onboard_led_task(mut renderer: Renderer<StripHandle>) {
    println!("onboard_led: render task running");
    renderer.run().await;
    // Dropping the renderer here releases the backend peripheral.
    println!("onboard_led: render task stopped");
}

/// Configure the onboard strip, claim the command queue and spawn the
/// render task.
///
/// Chip, backend and data pin come from the compile-time board config;
/// only the DMA preference is a runtime choice.
pub(crate) fn start_onboard_led<O>(
    spawner: Spawner,
    resources: BackendResources,
    pin: O,
    use_dma: bool,
) -> Result<OnboardLed, StartupError>
where
    O: PeripheralOutput<'static>,
{
    if LIFECYCLE
        .compare_exchange(UNINITIALIZED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Err(StartupError::AlreadyStarted);
    }

    let strip = match StripConfig::new(
        config::ONBOARD_CHIP,
        config::ONBOARD_PIXEL_COUNT,
        config::ONBOARD_INVERT,
    ) {
        Ok(strip) => strip,
        Err(err) => {
            LIFECYCLE.store(UNINITIALIZED, Ordering::Release);
            return Err(StartupError::Configuration(ConfigureError::Invalid(err)));
        }
    };

    let handle = match configure_strip(strip, config::ONBOARD_BACKEND, use_dma, pin, resources) {
        Ok(handle) => handle,
        Err(err) => {
            // A failed configuration leaves the service startable again.
            LIFECYCLE.store(UNINITIALIZED, Ordering::Release);
            return Err(StartupError::Configuration(err));
        }
    };
    println!(
        "onboard_led: strip configured ({} pixel)",
        handle.pixel_count()
    );

    let Some(queue) = COMMAND_QUEUE.try_init(Channel::new()) else {
        LIFECYCLE.store(STOPPED, Ordering::Release);
        return Err(StartupError::QueueUnavailable);
    };
    let queue: &'static CommandChannel = queue;

    let renderer = Renderer::new(handle, queue.receiver())
        .with_events(RENDER_EVENTS.sender())
        .with_shutdown(&SHUTDOWN);

    if let Err(err) = spawner.spawn(onboard_led_task(renderer)) {
        LIFECYCLE.store(STOPPED, Ordering::Release);
        return Err(StartupError::TaskCreation(err));
    }

    Ok(OnboardLed {
        commands: queue.sender(),
    })
}
