//! HSV pixel state and conversion to strip colors.

use smart_leds::{RGB8, hsv::Hsv as HSV, hsv::hsv2rgb};

pub type Rgb = RGB8;
pub type Hsv = HSV;

/// Per-frame value multiplier applied by [`Pixel::fade`].
pub const FADE_FACTOR: f32 = 0.98;

/// Below this value a faded pixel loses its hue and saturation.
pub const FADE_FLOOR: f32 = 0.0001;

/// A single logical pixel with hue, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Pixel {
    /// Unlit pixel
    pub const OFF: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Returns the same color at a scaled value
    #[must_use]
    pub const fn with_value(self, value: f32) -> Self {
        Self::new(self.hue, self.saturation, value)
    }

    /// Blend another color into this one.
    ///
    /// Hue and saturation are averaged, value keeps the brighter of the two.
    pub fn add(&mut self, other: Self) {
        self.hue = (self.hue + other.hue) / 2.0;
        self.saturation = (self.saturation + other.saturation) / 2.0;
        self.value = self.value.max(other.value);
    }

    /// Decay the value by `factor`.
    ///
    /// Once the value drops under [`FADE_FLOOR`] the color is cleared so an
    /// invisible pixel does not tint the next `add` into it.
    pub fn fade(&mut self, factor: f32) {
        self.value *= factor;
        if self.value < FADE_FLOOR {
            self.hue = 0.0;
            self.saturation = 0.0;
        }
    }

    /// Convert to the 8-bit HSV representation used by `smart-leds`
    pub fn to_hsv8(self) -> Hsv {
        let hue = self.hue - libm::floorf(self.hue);
        Hsv {
            hue: unit_to_u8(hue * 256.0 / 255.0),
            sat: unit_to_u8(self.saturation),
            val: unit_to_u8(self.value),
        }
    }

    /// Convert to RGB for transmission
    pub fn to_rgb(self) -> Rgb {
        hsv2rgb(self.to_hsv8())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_u8(value: f32) -> u8 {
    let scaled = value.clamp(0.0, 1.0) * 255.0;
    libm::floorf(scaled + 0.5).min(255.0) as u8
}
