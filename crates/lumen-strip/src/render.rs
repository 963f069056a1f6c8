//! Render engine: applies queued color commands to the status pixel.
//!
//! The engine never terminates on a render failure. Failures are logged,
//! published on a bounded event channel when one is attached, and the loop
//! moves on to the next command. Only the shutdown signal ends the loop.

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;

use crate::color::ColorCommand;
use crate::command::CommandReceiver;
use crate::driver::StripDriver;
use crate::error::RenderError;

/// The pixel the status service drives.
pub const ONBOARD_PIXEL: usize = 0;

/// Capacity of the render failure event queue.
pub const EVENT_QUEUE_DEPTH: usize = 4;

/// Type alias for the render failure event channel
pub type RenderEventChannel<E> =
    Channel<CriticalSectionRawMutex, RenderError<E>, EVENT_QUEUE_DEPTH>;

/// Type alias for the event sender
pub type RenderEventSender<E> =
    Sender<'static, CriticalSectionRawMutex, RenderError<E>, EVENT_QUEUE_DEPTH>;

/// Type alias for the event receiver
pub type RenderEventReceiver<E> =
    Receiver<'static, CriticalSectionRawMutex, RenderError<E>, EVENT_QUEUE_DEPTH>;

/// Shutdown request for a running renderer.
pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

/// Applies queued color commands to the first pixel of a strip.
pub struct Renderer<D: StripDriver<Error: 'static>> {
    driver: D,
    commands: CommandReceiver,
    events: Option<RenderEventSender<D::Error>>,
    shutdown: Option<&'static ShutdownSignal>,
}

impl<D: StripDriver<Error: 'static>> Renderer<D> {
    pub fn new(driver: D, commands: CommandReceiver) -> Self {
        Self {
            driver,
            commands,
            events: None,
            shutdown: None,
        }
    }

    /// Attach an event channel for render failures.
    #[must_use]
    pub fn with_events(mut self, events: RenderEventSender<D::Error>) -> Self {
        self.events = Some(events);
        self
    }

    /// Attach a shutdown signal; without one the loop runs forever.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: &'static ShutdownSignal) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Stage the color on the status pixel and push the frame.
    ///
    /// The refresh is attempted even when staging failed, so a transient
    /// write error does not leave a previously staged frame unsent.
    pub fn apply(&mut self, command: ColorCommand) -> Result<(), RenderError<D::Error>> {
        let staged = self.driver.set_pixel_hsv(ONBOARD_PIXEL, command);
        let pushed = self.driver.refresh();
        match (staged, pushed) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(err), _) => Err(RenderError::Write(err)),
            (Ok(()), Err(err)) => Err(RenderError::Refresh(err)),
        }
    }

    fn dispatch(&mut self, command: ColorCommand) {
        if let Err(err) = self.apply(command) {
            log::warn!("renderer: {err}");
            if let Some(events) = &self.events {
                // Dropped when nobody drains the channel; rendering goes on.
                let _ = events.try_send(err);
            }
        }
    }

    /// Receive and apply commands until the shutdown signal fires.
    ///
    /// Commands already queued when the signal arrives are still applied;
    /// the rest are dropped with the channel.
    pub async fn run(&mut self) {
        loop {
            let command = match self.shutdown {
                Some(shutdown) => match select(self.commands.receive(), shutdown.wait()).await {
                    Either::First(command) => command,
                    Either::Second(()) => break,
                },
                None => self.commands.receive().await,
            };
            self.dispatch(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use embassy_futures::block_on;

    use super::*;
    use crate::command::CommandChannel;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Set(usize, ColorCommand),
        Refresh,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Fault;

    #[derive(Default)]
    struct MockStrip {
        calls: Rc<RefCell<Vec<Call>>>,
        fail_writes: bool,
        fail_refreshes: bool,
    }

    impl StripDriver for MockStrip {
        type Error = Fault;

        fn set_pixel_hsv(&mut self, index: usize, color: ColorCommand) -> Result<(), Fault> {
            self.calls.borrow_mut().push(Call::Set(index, color));
            if self.fail_writes { Err(Fault) } else { Ok(()) }
        }

        fn refresh(&mut self) -> Result<(), Fault> {
            self.calls.borrow_mut().push(Call::Refresh);
            if self.fail_refreshes { Err(Fault) } else { Ok(()) }
        }
    }

    #[test]
    fn apply_writes_pixel_zero_then_refreshes() {
        static QUEUE: CommandChannel = Channel::new();
        let strip = MockStrip::default();
        let calls = strip.calls.clone();
        let mut renderer = Renderer::new(strip, QUEUE.receiver());

        let command = ColorCommand::new(10, 240, 50);
        renderer.apply(command).unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![Call::Set(ONBOARD_PIXEL, command), Call::Refresh]
        );
    }

    #[test]
    fn refresh_is_attempted_after_a_failed_write() {
        static QUEUE: CommandChannel = Channel::new();
        let strip = MockStrip {
            fail_writes: true,
            ..MockStrip::default()
        };
        let calls = strip.calls.clone();
        let mut renderer = Renderer::new(strip, QUEUE.receiver());

        let result = renderer.apply(ColorCommand::default());

        assert_eq!(result, Err(RenderError::Write(Fault)));
        assert_eq!(calls.borrow().last(), Some(&Call::Refresh));
    }

    #[test]
    fn refresh_failures_are_reported() {
        static QUEUE: CommandChannel = Channel::new();
        let strip = MockStrip {
            fail_refreshes: true,
            ..MockStrip::default()
        };
        let mut renderer = Renderer::new(strip, QUEUE.receiver());

        assert_eq!(
            renderer.apply(ColorCommand::default()),
            Err(RenderError::Refresh(Fault))
        );
    }

    #[test]
    fn failures_surface_as_events() {
        static QUEUE: CommandChannel = Channel::new();
        static EVENTS: RenderEventChannel<Fault> = Channel::new();
        let strip = MockStrip {
            fail_refreshes: true,
            ..MockStrip::default()
        };
        let mut renderer = Renderer::new(strip, QUEUE.receiver()).with_events(EVENTS.sender());

        renderer.dispatch(ColorCommand::default());

        assert_eq!(EVENTS.try_receive(), Ok(RenderError::Refresh(Fault)));
    }

    #[test]
    fn event_overflow_never_stalls_rendering() {
        static QUEUE: CommandChannel = Channel::new();
        static EVENTS: RenderEventChannel<Fault> = Channel::new();
        let strip = MockStrip {
            fail_writes: true,
            ..MockStrip::default()
        };
        let calls = strip.calls.clone();
        let mut renderer = Renderer::new(strip, QUEUE.receiver()).with_events(EVENTS.sender());

        for _ in 0..EVENT_QUEUE_DEPTH + 2 {
            renderer.dispatch(ColorCommand::default());
        }

        // Every command was still applied; the overflowing events were dropped.
        assert_eq!(calls.borrow().len(), (EVENT_QUEUE_DEPTH + 2) * 2);
        assert_eq!(EVENTS.len(), EVENT_QUEUE_DEPTH);
    }

    #[test]
    fn run_drains_pending_commands_then_stops() {
        static QUEUE: CommandChannel = Channel::new();
        static SHUTDOWN: ShutdownSignal = Signal::new();
        let strip = MockStrip::default();
        let calls = strip.calls.clone();
        let mut renderer = Renderer::new(strip, QUEUE.receiver()).with_shutdown(&SHUTDOWN);

        let first = ColorCommand::new(1, 0, 0);
        let second = ColorCommand::new(2, 0, 0);
        QUEUE.try_send(first).unwrap();
        QUEUE.try_send(second).unwrap();
        SHUTDOWN.signal(());

        block_on(renderer.run());

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Set(ONBOARD_PIXEL, first),
                Call::Refresh,
                Call::Set(ONBOARD_PIXEL, second),
                Call::Refresh,
            ]
        );
    }

    #[test]
    fn render_failures_do_not_end_the_loop() {
        static QUEUE: CommandChannel = Channel::new();
        static SHUTDOWN: ShutdownSignal = Signal::new();
        let strip = MockStrip {
            fail_writes: true,
            ..MockStrip::default()
        };
        let calls = strip.calls.clone();
        let mut renderer = Renderer::new(strip, QUEUE.receiver()).with_shutdown(&SHUTDOWN);

        QUEUE.try_send(ColorCommand::default()).unwrap();
        QUEUE.try_send(ColorCommand::default()).unwrap();
        SHUTDOWN.signal(());

        block_on(renderer.run());

        // Both commands were attempted despite the first one failing.
        assert_eq!(calls.borrow().len(), 4);
    }
}
