//! Bounded command queue between producers and the render task.

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Timer};

use crate::color::ColorCommand;

/// Capacity of the color command queue.
pub const COMMAND_QUEUE_DEPTH: usize = 8;

/// Type alias for the command channel
pub type CommandChannel = Channel<CriticalSectionRawMutex, ColorCommand, COMMAND_QUEUE_DEPTH>;

/// Type alias for command sender
pub type CommandSender =
    Sender<'static, CriticalSectionRawMutex, ColorCommand, COMMAND_QUEUE_DEPTH>;

/// Type alias for command receiver
pub type CommandReceiver =
    Receiver<'static, CriticalSectionRawMutex, ColorCommand, COMMAND_QUEUE_DEPTH>;

/// Enqueue `command`, giving up after `timeout`.
///
/// Returns `true` once the command is queued. On timeout the command is
/// dropped and the queue is left as it was.
pub async fn send_with_timeout(
    sender: CommandSender,
    command: ColorCommand,
    timeout: Duration,
) -> bool {
    match select(sender.send(command), Timer::after(timeout)).await {
        Either::First(()) => true,
        Either::Second(()) => false,
    }
}
