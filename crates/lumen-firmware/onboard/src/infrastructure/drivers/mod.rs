//! Strip transports over the ESP32 peripherals.

mod pulse;
mod serial;
mod strip;

use core::fmt;

use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::peripherals::{DMA_SPI3, RMT, SPI3};

use lumen_strip::{BackendKind, BackendPlan, ConfigError, StripConfig};

use self::pulse::PulseStrip;
use self::serial::SerialStrip;
use self::strip::StripPort;
pub(crate) use self::strip::StripHandle;

/// Peripherals claimed by one strip backend.
pub(crate) enum BackendResources {
    Pulse {
        rmt: RMT<'static>,
    },
    Serial {
        spi: SPI3<'static>,
        dma: DMA_SPI3<'static>,
    },
}

/// Failure while creating a strip device.
#[derive(Debug)]
pub(crate) enum ConfigureError {
    /// Rejected during planning, before any peripheral was touched.
    Invalid(ConfigError),
    PulseDevice(esp_hal::rmt::Error),
    SerialDevice(esp_hal::spi::master::ConfigError),
    DmaBuffer(esp_hal::dma::DmaBufError),
    /// The planned backend does not match the provided peripherals.
    ResourceMismatch,
    /// More pixels than the static DMA transfer buffer can carry.
    TooManyPixels,
    /// The pulse resolution cannot be derived from the peripheral clock.
    UnsupportedResolution,
}

impl fmt::Display for ConfigureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::PulseDevice(err) => write!(f, "pulse device creation failed: {err:?}"),
            Self::SerialDevice(err) => write!(f, "serial device creation failed: {err:?}"),
            Self::DmaBuffer(err) => write!(f, "DMA buffer setup failed: {err:?}"),
            Self::ResourceMismatch => write!(f, "backend does not match provided peripherals"),
            Self::TooManyPixels => write!(f, "strip exceeds the DMA transfer buffer"),
            Self::UnsupportedResolution => {
                write!(f, "pulse resolution does not divide the peripheral clock")
            }
        }
    }
}

/// Failure on an already configured strip.
#[derive(Debug)]
pub(crate) enum StripError {
    PixelOutOfRange,
    Pulse(esp_hal::rmt::Error),
    Serial(esp_hal::spi::Error),
    /// The pulse channel was lost by an earlier failed transmission and
    /// cannot be rebuilt without reconfiguring the strip. Pixel writes
    /// still succeed; every refresh keeps reporting this error.
    ChannelUnavailable,
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PixelOutOfRange => write!(f, "pixel index out of range"),
            Self::Pulse(err) => write!(f, "pulse transmission failed: {err:?}"),
            Self::Serial(err) => write!(f, "serial transmission failed: {err:?}"),
            Self::ChannelUnavailable => write!(f, "pulse channel unavailable"),
        }
    }
}

/// Create a ready-to-use strip over the selected backend.
///
/// `BackendKind::Unknown` is rejected by planning before any peripheral is
/// touched. The returned handle owns the peripheral; dropping it releases
/// the hardware.
pub(crate) fn configure_strip<O>(
    strip: StripConfig,
    backend: BackendKind,
    use_dma: bool,
    pin: O,
    resources: BackendResources,
) -> Result<StripHandle, ConfigureError>
where
    O: PeripheralOutput<'static>,
{
    let plan = BackendPlan::for_kind(backend, use_dma).map_err(ConfigureError::Invalid)?;
    let port = match (plan, resources) {
        (BackendPlan::Pulse(pulse), BackendResources::Pulse { rmt }) => {
            StripPort::Pulse(PulseStrip::new(rmt, pin, &pulse, &strip)?)
        }
        (BackendPlan::Serial(serial), BackendResources::Serial { spi, dma }) => {
            StripPort::Serial(SerialStrip::new(spi, dma, pin, &serial, &strip)?)
        }
        _ => return Err(ConfigureError::ResourceMismatch),
    };
    Ok(StripHandle::new(strip, port))
}
