//! Falling, bouncing light particles drawn on top of the grid.
//!
//! A spark lives in one column. Its position runs from 0.0 (bottom of the
//! column) to 1.0 (top). Every frame it is pulled down by gravity, bounces
//! off either end losing some speed, and ages by one frame until it is
//! swept from the field.

use heapless::Vec;

use crate::color::Pixel;
use crate::grid::Grid;

/// Default downward acceleration, in column heights per frame squared
pub const DEFAULT_GRAVITY: f32 = 0.000_05;

/// Default fraction of speed kept after a bounce
pub const DEFAULT_BOUNCE: f32 = 0.9;

/// Motion constants shared by all sparks of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkPhysics {
    pub gravity: f32,
    pub bounce: f32,
}

impl Default for SparkPhysics {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            bounce: DEFAULT_BOUNCE,
        }
    }
}

/// A single particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    column: usize,
    position: f32,
    velocity: f32,
    spread: f32,
    color: Pixel,
    /// Remaining lifetime in frames
    age: f32,
    finished: bool,
}

impl Spark {
    /// Create a spark at the top of `column` with no motion and no feather
    pub const fn new(column: usize, color: Pixel) -> Self {
        Self {
            column,
            position: 1.0,
            velocity: 0.0,
            spread: 0.0,
            color,
            age: 0.0,
            finished: false,
        }
    }

    #[must_use]
    pub const fn with_position(mut self, position: f32) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub const fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Feather radius as a fraction of the column height
    #[must_use]
    pub const fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    /// Lifetime given in seconds at `frame_rate` frames per second
    #[must_use]
    pub fn with_lifetime(mut self, seconds: f32, frame_rate: u32) -> Self {
        self.age = seconds * frame_rate as f32;
        self
    }

    pub const fn column(&self) -> usize {
        self.column
    }

    pub const fn position(&self) -> f32 {
        self.position
    }

    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    pub const fn age(&self) -> f32 {
        self.age
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance one frame
    pub fn update(&mut self, physics: &SparkPhysics) {
        self.position += self.velocity;
        self.velocity -= physics.gravity;
        if self.position > 1.0 {
            self.position = 1.0;
            self.velocity = -self.velocity * physics.bounce;
        }
        if self.position < 0.0 {
            self.position = 0.0;
            self.velocity = -self.velocity * physics.bounce;
        }

        if self.age <= 0.0 {
            self.finished = true;
        } else {
            self.age -= 1.0;
        }
    }

    /// Blend the spark into its column.
    ///
    /// The head is drawn at full value, rows within the spread at half value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn show<const COLUMNS: usize, const CELLS: usize>(&self, grid: &mut Grid<COLUMNS, CELLS>) {
        let Some(height) = grid.height_of(self.column) else {
            return;
        };
        let scaled = height as f32;
        let head = (libm::floorf(self.position * scaled).max(0.0) as usize).min(height - 1);
        let spread = libm::floorf(self.spread * scaled).max(0.0) as usize;

        // Height above the column bottom to grid row
        let bottom_row = grid.rows() - 1;
        let row_of = |y: usize| bottom_row - y;

        grid.add(self.column, row_of(head), self.color);
        let feather = self.color.with_value(self.color.value * 0.5);
        for distance in 1..=spread {
            if let Some(below) = head.checked_sub(distance) {
                grid.add(self.column, row_of(below), feather);
            }
            let above = head + distance;
            if above < height {
                grid.add(self.column, row_of(above), feather);
            }
        }
    }
}

/// Fixed-capacity set of live sparks.
///
/// Sparks spawned during a frame are held back until [`SparkField::commit`]
/// so a frame never draws a spark before its first update.
#[derive(Debug, Clone)]
pub struct SparkField<const N: usize> {
    physics: SparkPhysics,
    active: Vec<Spark, N>,
    pending: Vec<Spark, N>,
}

impl<const N: usize> SparkField<N> {
    pub const fn new(physics: SparkPhysics) -> Self {
        Self {
            physics,
            active: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub const fn physics(&self) -> &SparkPhysics {
        &self.physics
    }

    /// Queue a spark for the next commit. Returns it back if the queue is full.
    pub fn spawn(&mut self, spark: Spark) -> Result<(), Spark> {
        self.pending.push(spark)
    }

    /// Draw every live spark, then advance it one frame
    pub fn show_and_update<const COLUMNS: usize, const CELLS: usize>(
        &mut self,
        grid: &mut Grid<COLUMNS, CELLS>,
    ) {
        for spark in &mut self.active {
            spark.show(grid);
            spark.update(&self.physics);
        }
    }

    /// Drop finished sparks and bring in the ones spawned since the last
    /// commit. Spawned sparks that do not fit are discarded.
    pub fn commit(&mut self) {
        self.active.retain(|spark| !spark.is_finished());
        for spark in self.pending.iter().copied() {
            if self.active.push(spark).is_err() {
                break;
            }
        }
        self.pending.clear();
    }

    /// Remove every spark, live or pending
    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
    }

    /// Number of live sparks
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spark> {
        self.active.iter()
    }
}

/// Xorshift32 generator for spark parameters
#[derive(Debug, Clone)]
pub struct SparkRng(u32);

impl SparkRng {
    pub const fn new(seed: u32) -> Self {
        // Xorshift never leaves zero
        if seed == 0 { Self(0x9E37_79B9) } else { Self(seed) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    /// Uniform value in `[0, 1)`
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// A spark with random color and motion, dropped from the top of `column`
    pub fn random_spark(&mut self, column: usize, frame_rate: u32) -> Spark {
        let color = Pixel::new(
            self.next_unit(),
            self.next_unit(),
            self.next_unit() * 0.5 + 0.5,
        );
        Spark::new(column, color)
            .with_velocity(self.next_unit() * 0.03)
            .with_spread(self.next_unit() * 0.05 + 0.02)
            .with_lifetime(10.0, frame_rate)
    }
}
