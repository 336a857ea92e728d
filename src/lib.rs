#![no_std]

pub mod channel;
pub mod color;
pub mod frame_scheduler;
pub mod game;
pub mod grid;
pub mod output;
pub mod renderer;
pub mod sensor;
pub mod spark;

pub use channel::{Consumer, EventQueue, Producer, TrySendError};
pub use frame_scheduler::{FrameConfig, FrameResult, FrameScheduler};
pub use game::{
    BeamAssignment, BeamRole, Crossing, GameController, TickReport, Track, TrackLayout,
    TrackTimer,
};
pub use grid::{Grid, GridError, Write};
pub use output::SmartLedsOutput;
pub use renderer::Renderer;
pub use sensor::{
    BeamStatus, BreakBeamSensor, DebounceConfig, EdgeMask, EventListener, OcclusionEvent,
    Outcome, RegistryError, SensorId, SensorRegistry,
};
pub use spark::{Spark, SparkField, SparkPhysics, SparkRng};

pub use color::{Hsv, Pixel, Rgb};
pub use embassy_time::{Duration, Instant};

/// Abstract LED strip sink
///
/// Implement this trait to support different hardware platforms.
/// `frame[i]` is the color of LED `i` along the strip. The slice is only
/// borrowed for the call: copy it out before returning if transmission
/// continues in the background.
pub trait OutputDriver {
    /// Write a finished frame to the LED strip
    fn write(&mut self, frame: &[Pixel]);
}
