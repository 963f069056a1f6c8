use alloc::vec;
use alloc::vec::Vec;

use smart_leds::hsv::hsv2rgb;

use lumen_strip::{ColorCommand, Rgbw, StripConfig, StripDriver};

use super::StripError;
use super::pulse::PulseStrip;
use super::serial::SerialStrip;

pub(crate) enum StripPort {
    Pulse(PulseStrip),
    Serial(SerialStrip),
}

/// One configured strip: a staged frame plus the transport behind it.
///
/// Dropping the handle releases the backend peripheral.
pub(crate) struct StripHandle {
    config: StripConfig,
    frame: Vec<Rgbw>,
    port: StripPort,
}

impl StripHandle {
    pub(crate) fn new(config: StripConfig, port: StripPort) -> Self {
        Self {
            frame: vec![Rgbw::default(); config.pixel_count],
            config,
            port,
        }
    }

    pub(crate) fn pixel_count(&self) -> usize {
        self.config.pixel_count
    }

    /// Stage an HSV color; the white channel stays dark.
    pub(crate) fn set_pixel_hsv(
        &mut self,
        index: usize,
        color: ColorCommand,
    ) -> Result<(), StripError> {
        let rgb = hsv2rgb(color.into());
        self.set_pixel(index, Rgbw::from_rgb(rgb))
    }

    /// Stage a raw four-channel color.
    pub(crate) fn set_pixel(&mut self, index: usize, pixel: Rgbw) -> Result<(), StripError> {
        let slot = self
            .frame
            .get_mut(index)
            .ok_or(StripError::PixelOutOfRange)?;
        *slot = pixel;
        Ok(())
    }

    /// Transmit the staged frame.
    pub(crate) fn refresh(&mut self) -> Result<(), StripError> {
        match &mut self.port {
            StripPort::Pulse(pulse) => pulse.transmit(&self.frame, self.config.format),
            StripPort::Serial(serial) => serial.transmit(&self.frame, self.config.format),
        }
    }
}

impl StripDriver for StripHandle {
    type Error = StripError;

    fn set_pixel_hsv(&mut self, index: usize, color: ColorCommand) -> Result<(), StripError> {
        StripHandle::set_pixel_hsv(self, index, color)
    }

    fn refresh(&mut self) -> Result<(), StripError> {
        StripHandle::refresh(self)
    }
}
