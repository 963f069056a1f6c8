//! Color values exchanged between command producers and the render engine.

pub use smart_leds::RGB8 as Rgb;
pub use smart_leds::hsv::Hsv;

/// One color request for the status LED.
///
/// All `u8` values are valid; nothing is normalized or clamped here. The
/// triple is carried opaquely through the queue and converted to RGB at the
/// driver boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorCommand {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl ColorCommand {
    pub const fn new(hue: u8, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

impl From<ColorCommand> for Hsv {
    fn from(command: ColorCommand) -> Self {
        Hsv {
            hue: command.hue,
            sat: command.saturation,
            val: command.value,
        }
    }
}

/// Frame-buffer pixel, wide enough for four-channel chips.
///
/// Three-channel strips simply never transmit the white component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Rgbw {
    pub const fn new(r: u8, g: u8, b: u8, w: u8) -> Self {
        Self { r, g, b, w }
    }

    pub const fn from_rgb(rgb: Rgb) -> Self {
        Self {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            w: 0,
        }
    }
}

/// Named hues on the `u8` color wheel, 30-degree steps.
pub mod hues {
    pub const RED: u8 = 0;
    pub const ORANGE: u8 = 21;
    pub const YELLOW: u8 = 43;
    pub const CHARTREUSE: u8 = 64;
    pub const GREEN: u8 = 85;
    pub const SPRING_GREEN: u8 = 107;
    pub const CYAN: u8 = 128;
    pub const AZURE: u8 = 149;
    pub const BLUE: u8 = 171;
    pub const VIOLET: u8 = 192;
    pub const MAGENTA: u8 = 213;
    pub const ROSE: u8 = 235;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_maps_onto_hsv_fields() {
        let hsv: Hsv = ColorCommand::new(12, 240, 50).into();
        assert_eq!(hsv.hue, 12);
        assert_eq!(hsv.sat, 240);
        assert_eq!(hsv.val, 50);
    }

    #[test]
    fn rgb_promotion_leaves_white_dark() {
        let pixel = Rgbw::from_rgb(Rgb::new(10, 20, 30));
        assert_eq!(pixel, Rgbw::new(10, 20, 30, 0));
    }

    #[test]
    fn named_hues_sit_on_the_wheel() {
        assert_eq!(hues::RED, 0);
        assert_eq!(hues::GREEN, 85);
        assert_eq!(hues::BLUE, 171);
    }
}
