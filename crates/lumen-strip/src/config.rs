//! Strip and backend configuration records.
//!
//! Everything here is a plain value: planning a backend never touches
//! hardware, so misconfiguration is caught before any peripheral is
//! claimed.

use crate::error::ConfigError;

/// Default pulse-train tick rate (100 ns per tick).
pub const DEFAULT_PULSE_RESOLUTION_HZ: u32 = 10_000_000;

/// Default serial-bus clock: 4 bus bits encode one data bit at 800 kHz.
pub const DEFAULT_SERIAL_FREQUENCY_HZ: u32 = 3_200_000;

/// Supported LED chip families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipModel {
    /// Three-channel GRB chips (WS2812/WS2812B and clones).
    Ws2812,
    /// Four-channel GRBW chips with a dedicated white die.
    Sk6812,
}

/// On-wire channel layout of a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Grb,
    Grbw,
}

impl PixelFormat {
    /// Number of color bytes each pixel occupies on the wire.
    pub const fn channels(self) -> usize {
        match self {
            Self::Grb => 3,
            Self::Grbw => 4,
        }
    }
}

/// Nanosecond bit timings for one chip family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    pub t0h_ns: u32,
    pub t0l_ns: u32,
    pub t1h_ns: u32,
    pub t1l_ns: u32,
    /// Low hold after a frame that latches the shifted colors.
    pub reset_ns: u32,
}

impl ChipModel {
    pub const fn pixel_format(self) -> PixelFormat {
        match self {
            Self::Ws2812 => PixelFormat::Grb,
            Self::Sk6812 => PixelFormat::Grbw,
        }
    }

    pub const fn bit_timing(self) -> BitTiming {
        match self {
            Self::Ws2812 => BitTiming {
                t0h_ns: 400,
                t0l_ns: 850,
                t1h_ns: 800,
                t1l_ns: 450,
                reset_ns: 80_000,
            },
            Self::Sk6812 => BitTiming {
                t0h_ns: 300,
                t0l_ns: 900,
                t1h_ns: 600,
                t1l_ns: 600,
                reset_ns: 80_000,
            },
        }
    }
}

/// Transmission backend for a strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Not selected yet. Rejected during planning.
    #[default]
    Unknown,
    /// Dedicated pulse-train peripheral (RMT).
    TimingPulse,
    /// SPI peripheral generating the pulse train on its data line.
    SerialBus,
}

/// Static description of one strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripConfig {
    pub chip: ChipModel,
    pub format: PixelFormat,
    pub pixel_count: usize,
    /// Invert the data line (strips wired behind an inverting level shifter).
    pub invert: bool,
}

impl StripConfig {
    pub fn new(chip: ChipModel, pixel_count: usize, invert: bool) -> Result<Self, ConfigError> {
        if pixel_count == 0 {
            return Err(ConfigError::InvalidPixelCount);
        }
        Ok(Self {
            chip,
            format: chip.pixel_format(),
            pixel_count,
            invert,
        })
    }
}

/// Tuning for the pulse-train backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseConfig {
    /// Tick rate of the pulse generator. Bit widths are quantized to it.
    pub resolution_hz: u32,
    pub with_dma: bool,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            resolution_hz: DEFAULT_PULSE_RESOLUTION_HZ,
            with_dma: false,
        }
    }
}

impl PulseConfig {
    /// Tick count for a duration in nanoseconds at this resolution.
    ///
    /// Clamped to the 15-bit range of a pulse entry and never zero, so a
    /// coarse resolution still produces a visible pulse.
    pub fn ticks(&self, nanoseconds: u32) -> u16 {
        let ticks = u64::from(nanoseconds) * u64::from(self.resolution_hz) / 1_000_000_000;
        ticks.clamp(1, 0x7FFF) as u16
    }

    /// Channel clock divider that makes a `source_hz` peripheral clock tick
    /// at this resolution.
    ///
    /// `None` when the resolution does not divide the source clock evenly
    /// or the divider does not fit the eight-bit divider register.
    pub fn clock_divider(&self, source_hz: u32) -> Option<u8> {
        if self.resolution_hz == 0 || source_hz % self.resolution_hz != 0 {
            return None;
        }
        u8::try_from(source_hz / self.resolution_hz).ok()
    }
}

/// Tuning for the serial-bus backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub frequency_hz: u32,
    pub with_dma: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_SERIAL_FREQUENCY_HZ,
            with_dma: false,
        }
    }
}

/// A backend selection resolved into concrete tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendPlan {
    Pulse(PulseConfig),
    Serial(SerialConfig),
}

impl BackendPlan {
    /// Resolve a backend selection, rejecting `Unknown` before any device
    /// could be created.
    pub fn for_kind(kind: BackendKind, use_dma: bool) -> Result<Self, ConfigError> {
        match kind {
            BackendKind::TimingPulse => Ok(Self::Pulse(PulseConfig {
                with_dma: use_dma,
                ..PulseConfig::default()
            })),
            BackendKind::SerialBus => Ok(Self::Serial(SerialConfig {
                with_dma: use_dma,
                ..SerialConfig::default()
            })),
            BackendKind::Unknown => Err(ConfigError::InvalidBackend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_selects_wire_format() {
        assert_eq!(ChipModel::Ws2812.pixel_format(), PixelFormat::Grb);
        assert_eq!(ChipModel::Sk6812.pixel_format(), PixelFormat::Grbw);
        assert_eq!(PixelFormat::Grb.channels(), 3);
        assert_eq!(PixelFormat::Grbw.channels(), 4);
    }

    #[test]
    fn strips_need_at_least_one_pixel() {
        assert_eq!(
            StripConfig::new(ChipModel::Ws2812, 0, false),
            Err(ConfigError::InvalidPixelCount)
        );
        let config = StripConfig::new(ChipModel::Sk6812, 1, true).unwrap();
        assert_eq!(config.pixel_count, 1);
        assert_eq!(config.format, PixelFormat::Grbw);
        assert!(config.invert);
    }

    #[test]
    fn unknown_backend_is_rejected_at_planning() {
        assert_eq!(
            BackendPlan::for_kind(BackendKind::Unknown, false),
            Err(ConfigError::InvalidBackend)
        );
        assert_eq!(
            BackendPlan::for_kind(BackendKind::Unknown, true),
            Err(ConfigError::InvalidBackend)
        );
    }

    #[test]
    fn plans_carry_the_dma_flag() {
        match BackendPlan::for_kind(BackendKind::TimingPulse, true).unwrap() {
            BackendPlan::Pulse(pulse) => {
                assert!(pulse.with_dma);
                assert_eq!(pulse.resolution_hz, DEFAULT_PULSE_RESOLUTION_HZ);
            }
            BackendPlan::Serial(_) => panic!("expected a pulse plan"),
        }
        match BackendPlan::for_kind(BackendKind::SerialBus, false).unwrap() {
            BackendPlan::Serial(serial) => {
                assert!(!serial.with_dma);
                assert_eq!(serial.frequency_hz, DEFAULT_SERIAL_FREQUENCY_HZ);
            }
            BackendPlan::Pulse(_) => panic!("expected a serial plan"),
        }
    }

    #[test]
    fn tick_math_follows_the_resolution() {
        let fine = PulseConfig::default();
        assert_eq!(fine.ticks(400), 4);
        assert_eq!(fine.ticks(850), 8);
        assert_eq!(fine.ticks(80_000), 800);

        let coarse = PulseConfig {
            resolution_hz: 1_000_000,
            ..PulseConfig::default()
        };
        // Sub-tick widths still emit one tick.
        assert_eq!(coarse.ticks(400), 1);
        assert_eq!(coarse.ticks(80_000), 80);
    }

    #[test]
    fn divider_derives_from_the_source_clock() {
        // 80 MHz peripheral clock, 10 MHz ticks.
        assert_eq!(PulseConfig::default().clock_divider(80_000_000), Some(8));

        let coarse = PulseConfig {
            resolution_hz: 1_000_000,
            ..PulseConfig::default()
        };
        assert_eq!(coarse.clock_divider(80_000_000), Some(80));

        let full_rate = PulseConfig {
            resolution_hz: 80_000_000,
            ..PulseConfig::default()
        };
        assert_eq!(full_rate.clock_divider(80_000_000), Some(1));
    }

    #[test]
    fn unreachable_resolutions_yield_no_divider() {
        let uneven = PulseConfig {
            resolution_hz: 3_000_000,
            ..PulseConfig::default()
        };
        assert_eq!(uneven.clock_divider(80_000_000), None);

        // Divider would be 800, past the eight-bit register.
        let too_slow = PulseConfig {
            resolution_hz: 100_000,
            ..PulseConfig::default()
        };
        assert_eq!(too_slow.clock_divider(80_000_000), None);

        let zero = PulseConfig {
            resolution_hz: 0,
            ..PulseConfig::default()
        };
        assert_eq!(zero.clock_divider(80_000_000), None);
    }
}
