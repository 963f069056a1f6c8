//! Pulse-train backend over the RMT peripheral.
//!
//! Each data bit becomes one high/low pulse pair whose widths come from the
//! chip's bit timing, quantized to the configured tick rate. Color bytes go
//! out in wire order (GRB or GRBW), most significant bit first, followed by
//! the reset latch.

use alloc::vec::Vec;

use esp_hal::Blocking;
use esp_hal::gpio::Level;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::peripherals::RMT;
use esp_hal::rmt::{Channel, PulseCode, Rmt, Tx, TxChannelConfig, TxChannelCreator};
use esp_hal::time::Rate;
use esp_println::println;

use lumen_strip::{BitTiming, PixelFormat, PulseConfig, Rgbw, StripConfig};

use super::{ConfigureError, StripError};

/// RMT peripheral clock on this chip (fixed APB rate).
const RMT_CLOCK_HZ: u32 = 80_000_000;

/// Pulse pairs for a zero bit, a one bit and the reset latch.
struct PulseTable {
    zero: PulseCode,
    one: PulseCode,
    reset: PulseCode,
}

impl PulseTable {
    fn new(timing: BitTiming, pulse: &PulseConfig, invert: bool) -> Self {
        let (mark, space) = if invert {
            (Level::Low, Level::High)
        } else {
            (Level::High, Level::Low)
        };
        Self {
            zero: PulseCode::new(
                mark,
                pulse.ticks(timing.t0h_ns),
                space,
                pulse.ticks(timing.t0l_ns),
            ),
            one: PulseCode::new(
                mark,
                pulse.ticks(timing.t1h_ns),
                space,
                pulse.ticks(timing.t1l_ns),
            ),
            reset: PulseCode::new(space, pulse.ticks(timing.reset_ns), space, 0),
        }
    }
}

pub(crate) struct PulseStrip {
    /// Taken for the duration of a transmission; `wait()` hands it back.
    channel: Option<Channel<'static, Blocking, Tx>>,
    table: PulseTable,
    buf: Vec<PulseCode>,
}

impl PulseStrip {
    pub(crate) fn new<O>(
        rmt: RMT<'static>,
        pin: O,
        pulse: &PulseConfig,
        strip: &StripConfig,
    ) -> Result<Self, ConfigureError>
    where
        O: PeripheralOutput<'static>,
    {
        if pulse.with_dma {
            println!("pulse_strip: peripheral has no DMA path, flag ignored");
        }

        // The peripheral runs at the fixed APB rate; the per-channel divider
        // brings the tick clock down to the configured resolution.
        let divider = pulse
            .clock_divider(RMT_CLOCK_HZ)
            .ok_or(ConfigureError::UnsupportedResolution)?;
        let rmt =
            Rmt::new(rmt, Rate::from_hz(RMT_CLOCK_HZ)).map_err(ConfigureError::PulseDevice)?;
        let channel = rmt
            .channel0
            .configure_tx(pin, TxChannelConfig::default().with_clk_divider(divider))
            .map_err(ConfigureError::PulseDevice)?;

        let table = PulseTable::new(strip.chip.bit_timing(), pulse, strip.invert);
        // 8 pulse pairs per color byte, plus the reset latch and end marker.
        let capacity = strip.pixel_count * strip.format.channels() * 8 + 2;

        Ok(Self {
            channel: Some(channel),
            table,
            buf: Vec::with_capacity(capacity),
        })
    }

    pub(crate) fn transmit(
        &mut self,
        frame: &[Rgbw],
        format: PixelFormat,
    ) -> Result<(), StripError> {
        self.encode(frame, format);

        let channel = self.channel.take().ok_or(StripError::ChannelUnavailable)?;
        match channel.transmit(&self.buf) {
            Ok(transaction) => match transaction.wait() {
                Ok(channel) => {
                    self.channel = Some(channel);
                    Ok(())
                }
                Err((err, channel)) => {
                    self.channel = Some(channel);
                    Err(StripError::Pulse(err))
                }
            },
            // A failed `transmit` consumes the channel; later refreshes on
            // this strip report `ChannelUnavailable`.
            Err(err) => Err(StripError::Pulse(err)),
        }
    }

    fn encode(&mut self, frame: &[Rgbw], format: PixelFormat) {
        self.buf.clear();
        for pixel in frame {
            let bytes = [pixel.g, pixel.r, pixel.b, pixel.w];
            for &byte in &bytes[..format.channels()] {
                for bit in (0..8).rev() {
                    self.buf.push(if byte & (1 << bit) != 0 {
                        self.table.one
                    } else {
                        self.table.zero
                    });
                }
            }
        }
        self.buf.push(self.table.reset);
        self.buf.push(PulseCode::end_marker());
    }
}
