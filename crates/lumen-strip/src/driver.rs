//! Hardware seam between the render engine and a concrete transport.

use crate::color::ColorCommand;

/// One configured LED strip, viewed from the render engine.
///
/// Implementations own the peripheral behind the strip; dropping them
/// releases it.
pub trait StripDriver {
    type Error: core::fmt::Debug;

    /// Stage an HSV color for the pixel at `index`.
    fn set_pixel_hsv(&mut self, index: usize, color: ColorCommand) -> Result<(), Self::Error>;

    /// Push the staged frame out to the strip.
    fn refresh(&mut self) -> Result<(), Self::Error>;
}
