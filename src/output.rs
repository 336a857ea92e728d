//! Adapter from composed frames to `smart-leds` strip writers.

#[cfg(feature = "esp32-log")]
use esp_println::println;
use smart_leds::SmartLedsWrite;

use crate::OutputDriver;
use crate::color::{Pixel, Rgb};

/// Sends frames to any [`SmartLedsWrite`] strip, converting HSV to RGB.
///
/// The writer consumes the whole frame before `write` returns, so the
/// compositor is free to start on the next frame afterwards.
pub struct SmartLedsOutput<W> {
    writer: W,
    failed_writes: u32,
}

impl<W> SmartLedsOutput<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            failed_writes: 0,
        }
    }

    /// Frames the writer reported an error for
    pub const fn failed_writes(&self) -> u32 {
        self.failed_writes
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> OutputDriver for SmartLedsOutput<W>
where
    W: SmartLedsWrite,
    W::Color: From<Rgb>,
{
    fn write(&mut self, frame: &[Pixel]) {
        let colors = frame.iter().map(|pixel| pixel.to_rgb());
        if self.writer.write(colors).is_err() {
            // A lost frame is replaced by the next one
            self.failed_writes = self.failed_writes.wrapping_add(1);
            #[cfg(feature = "esp32-log")]
            println!("[SmartLedsOutput] strip write failed ({} total)", self.failed_writes);
        }
    }
}
