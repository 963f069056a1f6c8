//! Serial-bus backend: an SPI peripheral generating the pulse train.
//!
//! At 3.2 MHz every data bit expands to four bus bits (`1000` for zero,
//! `1100` for one), so one color byte becomes four bus bytes and the MOSI
//! line carries valid chip timing. Runs on the last SPI bus (SPI3) with an
//! optional DMA transfer path.

use alloc::vec::Vec;

use embedded_hal::spi::SpiBus;
use esp_hal::Blocking;
use esp_hal::dma::{DmaRxBuf, DmaTxBuf};
use esp_hal::dma_buffers;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::peripherals::{DMA_SPI3, SPI3};
use esp_hal::spi::Mode;
use esp_hal::spi::master::{Config as SpiConfig, Spi, SpiDmaBus};
use esp_hal::time::Rate;

use lumen_strip::{PixelFormat, Rgbw, SerialConfig, StripConfig};

use super::{ConfigureError, StripError};

/// Upper bound for DMA-backed strips, sized by the static transfer buffer.
const MAX_DMA_PIXELS: usize = 128;

/// Bus bytes per color byte (two data bits per bus byte).
const BUS_BYTES_PER_DATA_BYTE: usize = 4;

/// Idle bytes holding the line low for the reset latch (>= 80 us at 3.2 MHz).
const RESET_BYTES: usize = 40;

const DMA_BUF_LEN: usize = 1 + MAX_DMA_PIXELS * 4 * BUS_BYTES_PER_DATA_BYTE + RESET_BYTES;

/// Bus byte for each pair of data bits, most significant pair first.
const BIT_PATTERNS: [u8; 4] = [0b1000_1000, 0b1000_1100, 0b1100_1000, 0b1100_1100];

enum SerialPort {
    Direct(Spi<'static, Blocking>),
    Dma(SpiDmaBus<'static, Blocking>),
}

pub(crate) struct SerialStrip {
    port: SerialPort,
    buf: Vec<u8>,
    invert: bool,
}

impl SerialStrip {
    pub(crate) fn new<O>(
        spi: SPI3<'static>,
        dma: DMA_SPI3<'static>,
        pin: O,
        serial: &SerialConfig,
        strip: &StripConfig,
    ) -> Result<Self, ConfigureError>
    where
        O: PeripheralOutput<'static>,
    {
        if serial.with_dma && strip.pixel_count > MAX_DMA_PIXELS {
            return Err(ConfigureError::TooManyPixels);
        }

        let spi_config = SpiConfig::default()
            .with_frequency(Rate::from_hz(serial.frequency_hz))
            .with_mode(Mode::_0);
        let spi = Spi::new(spi, spi_config)
            .map_err(ConfigureError::SerialDevice)?
            .with_mosi(pin);

        let port = if serial.with_dma {
            let (rx_buf, rx_desc, tx_buf, tx_desc) = dma_buffers!(DMA_BUF_LEN);
            let dma_rx = DmaRxBuf::new(rx_desc, rx_buf).map_err(ConfigureError::DmaBuffer)?;
            let dma_tx = DmaTxBuf::new(tx_desc, tx_buf).map_err(ConfigureError::DmaBuffer)?;
            SerialPort::Dma(spi.with_dma(dma).with_buffers(dma_rx, dma_tx))
        } else {
            SerialPort::Direct(spi)
        };

        let capacity =
            1 + strip.pixel_count * strip.format.channels() * BUS_BYTES_PER_DATA_BYTE + RESET_BYTES;

        Ok(Self {
            port,
            buf: Vec::with_capacity(capacity),
            invert: strip.invert,
        })
    }

    pub(crate) fn transmit(
        &mut self,
        frame: &[Rgbw],
        format: PixelFormat,
    ) -> Result<(), StripError> {
        self.encode(frame, format);
        match &mut self.port {
            SerialPort::Direct(spi) => write_out(spi, &self.buf),
            SerialPort::Dma(spi) => write_out(spi, &self.buf),
        }
        .map_err(StripError::Serial)
    }

    fn encode(&mut self, frame: &[Rgbw], format: PixelFormat) {
        let idle = if self.invert { 0xFF } else { 0x00 };
        self.buf.clear();
        // One idle byte ahead of the frame settles the line.
        self.buf.push(idle);
        for pixel in frame {
            let bytes = [pixel.g, pixel.r, pixel.b, pixel.w];
            for &byte in &bytes[..format.channels()] {
                self.push_byte(byte);
            }
        }
        for _ in 0..RESET_BYTES {
            self.buf.push(idle);
        }
    }

    fn push_byte(&mut self, value: u8) {
        for shift in [6, 4, 2, 0] {
            let pattern = BIT_PATTERNS[usize::from((value >> shift) & 0b11)];
            self.buf.push(if self.invert { !pattern } else { pattern });
        }
    }
}

fn write_out<B: SpiBus>(bus: &mut B, buf: &[u8]) -> Result<(), B::Error> {
    bus.write(buf)?;
    bus.flush()
}
