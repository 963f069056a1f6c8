//! Compile-time board configuration.
//!
//! Chip family and transmission backend are fixed at build time through
//! cargo features, the way the data line and its peripherals are wired on
//! the board. Defaults: WS2812 over the pulse-train backend.

use lumen_strip::{BackendKind, ChipModel};

/// Chip family of the onboard status LED.
#[cfg(feature = "chip-sk6812")]
pub(crate) const ONBOARD_CHIP: ChipModel = ChipModel::Sk6812;
#[cfg(not(feature = "chip-sk6812"))]
pub(crate) const ONBOARD_CHIP: ChipModel = ChipModel::Ws2812;

/// Transmission backend for the onboard strip.
#[cfg(feature = "backend-serial")]
pub(crate) const ONBOARD_BACKEND: BackendKind = BackendKind::SerialBus;
#[cfg(not(feature = "backend-serial"))]
pub(crate) const ONBOARD_BACKEND: BackendKind = BackendKind::TimingPulse;

/// The onboard strip is a single status pixel.
pub(crate) const ONBOARD_PIXEL_COUNT: usize = 1;

/// The onboard data line is driven directly, no inverting level shifter.
pub(crate) const ONBOARD_INVERT: bool = false;

/// GPIO wired to the onboard LED data line.
macro_rules! onboard_led_gpio {
    ($peripherals:expr) => {
        $peripherals.GPIO25
    };
}

/// Peripherals claimed by the selected backend.
#[cfg(not(feature = "backend-serial"))]
macro_rules! onboard_backend {
    ($peripherals:expr) => {
        $crate::infrastructure::drivers::BackendResources::Pulse {
            rmt: $peripherals.RMT,
        }
    };
}

/// Peripherals claimed by the selected backend.
#[cfg(feature = "backend-serial")]
macro_rules! onboard_backend {
    ($peripherals:expr) => {
        $crate::infrastructure::drivers::BackendResources::Serial {
            spi: $peripherals.SPI3,
            dma: $peripherals.DMA_SPI3,
        }
    };
}

pub(crate) use {onboard_backend, onboard_led_gpio};
