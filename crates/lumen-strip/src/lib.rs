//! Hardware-agnostic core of the Lumen LED service.
//!
//! This crate holds everything that does not need a chip-specific HAL:
//! the color model, the bounded command queue, strip and backend
//! configuration records, the [`StripDriver`] seam and the render engine
//! that applies queued colors to a strip. The firmware crates plug real
//! RMT/SPI transports in behind [`StripDriver`].

#![cfg_attr(not(test), no_std)]

pub mod color;
pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod render;

pub use color::{ColorCommand, Rgbw};
pub use command::{
    COMMAND_QUEUE_DEPTH, CommandChannel, CommandReceiver, CommandSender, send_with_timeout,
};
pub use config::{
    BackendKind, BackendPlan, BitTiming, ChipModel, PixelFormat, PulseConfig, SerialConfig,
    StripConfig,
};
pub use driver::StripDriver;
pub use error::{ConfigError, RenderError};
pub use render::{
    EVENT_QUEUE_DEPTH, ONBOARD_PIXEL, RenderEventChannel, RenderEventReceiver, RenderEventSender,
    Renderer, ShutdownSignal,
};
