//! Two-track race timing driven by break-beam events.
//!
//! Each track has a start beam and an end beam. Which pin is which, and the
//! flash color of each beam, come from a [`TrackLayout`] table.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::channel::Consumer;
use crate::color::Pixel;
use crate::grid::Grid;
use crate::sensor::{OcclusionEvent, SensorId};
use crate::spark::{SparkField, SparkRng};

/// Number of tracks
pub const TRACKS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    One,
    Two,
}

impl Track {
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamRole {
    Start,
    End,
}

/// Binds a beam pin to a track position and a flash hue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamAssignment {
    pub pin: SensorId,
    pub track: Track,
    pub role: BeamRole,
    pub hue: f32,
}

/// Beam wiring and feedback colors
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLayout {
    pub beams: [BeamAssignment; 4],
    pub flash_saturation: f32,
    pub flash_value: f32,
    /// Spawn sparks on every column when a track run completes
    pub celebrate: bool,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            beams: [
                BeamAssignment {
                    pin: 10,
                    track: Track::One,
                    role: BeamRole::Start,
                    hue: 0.3,
                },
                BeamAssignment {
                    pin: 12,
                    track: Track::One,
                    role: BeamRole::End,
                    hue: 0.0,
                },
                BeamAssignment {
                    pin: 11,
                    track: Track::Two,
                    role: BeamRole::Start,
                    hue: 0.6,
                },
                BeamAssignment {
                    pin: 13,
                    track: Track::Two,
                    role: BeamRole::End,
                    hue: 0.8,
                },
            ],
            flash_saturation: 1.0,
            flash_value: 0.5,
            celebrate: true,
        }
    }
}

impl TrackLayout {
    /// Assignment of the beam on `pin`
    pub fn beam(&self, pin: SensorId) -> Option<&BeamAssignment> {
        self.beams.iter().find(|beam| beam.pin == pin)
    }

    /// Every configured pin, in table order
    pub fn pins(&self) -> [SensorId; 4] {
        self.beams.map(|beam| beam.pin)
    }

    /// Flash color for a beam
    pub const fn flash(&self, beam: &BeamAssignment) -> Pixel {
        Pixel::new(beam.hue, self.flash_saturation, self.flash_value)
    }
}

/// A completed run from start beam to end beam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub track: Track,
    pub started: u32,
    pub finished: u32,
}

impl Crossing {
    pub const fn elapsed_us(&self) -> u32 {
        self.finished.wrapping_sub(self.started)
    }
}

/// What happened during one controller tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Events taken from the queue
    pub events: usize,
    /// Events from pins not in the layout
    pub ignored: usize,
    /// Runs completed
    pub crossings: usize,
}

/// Per-track timing state, independent of where events come from
#[derive(Debug, Clone)]
pub struct TrackTimer {
    layout: TrackLayout,
    frame_rate: u32,
    starts: [Option<u32>; TRACKS],
    last_crossing: [Option<Crossing>; TRACKS],
    rng: SparkRng,
}

impl TrackTimer {
    pub fn new(layout: TrackLayout, frame_rate: u32, seed: u32) -> Self {
        Self {
            layout,
            frame_rate,
            starts: [None; TRACKS],
            last_crossing: [None; TRACKS],
            rng: SparkRng::new(seed),
        }
    }

    pub const fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    /// Time the current run on `track` started, if one is in progress
    pub const fn start_time(&self, track: Track) -> Option<u32> {
        self.starts[track.index()]
    }

    pub const fn last_crossing(&self, track: Track) -> Option<Crossing> {
        self.last_crossing[track.index()]
    }

    /// Apply one event: update timing, flash the grid, maybe celebrate
    pub fn handle<const COLUMNS: usize, const CELLS: usize, const SPARKS: usize>(
        &mut self,
        event: OcclusionEvent,
        grid: &mut Grid<COLUMNS, CELLS>,
        sparks: &mut SparkField<SPARKS>,
        report: &mut TickReport,
    ) {
        report.events += 1;
        let Some(&beam) = self.layout.beam(event.sensor) else {
            #[cfg(feature = "esp32-log")]
            println!("[Game] event from unknown beam {}", event.sensor);
            report.ignored += 1;
            return;
        };
        #[cfg(feature = "esp32-log")]
        println!(
            "[Game] beam {} ({:?} {:?}) broken at {} for {}us",
            beam.pin,
            beam.track,
            beam.role,
            event.start,
            event.duration()
        );

        let track = beam.track.index();
        match beam.role {
            BeamRole::Start => {
                self.starts[track] = Some(event.start);
            }
            BeamRole::End => {
                if let Some(started) = self.starts[track].take() {
                    let crossing = Crossing {
                        track: beam.track,
                        started,
                        finished: event.start,
                    };
                    #[cfg(feature = "esp32-log")]
                    println!(
                        "[Game] track {:?} crossed in {}us",
                        crossing.track,
                        crossing.elapsed_us()
                    );
                    self.last_crossing[track] = Some(crossing);
                    report.crossings += 1;
                    if self.layout.celebrate {
                        self.celebrate(grid.columns(), sparks);
                    }
                }
            }
        }

        grid.fill(self.layout.flash(&beam));
    }

    fn celebrate<const SPARKS: usize>(&mut self, columns: usize, sparks: &mut SparkField<SPARKS>) {
        for column in 0..columns {
            let spark = self.rng.random_spark(column, self.frame_rate);
            if sparks.spawn(spark).is_err() {
                break;
            }
        }
    }
}

/// Drains the event queue once per frame into a [`TrackTimer`].
///
/// Owns the queue's only [`Consumer`], so a queue feeds at most one
/// controller and every event reaches the same timer.
pub struct GameController<'a, const QUEUE: usize> {
    events: Consumer<'a, OcclusionEvent, QUEUE>,
    timer: TrackTimer,
}

impl<'a, const QUEUE: usize> GameController<'a, QUEUE> {
    pub const fn new(events: Consumer<'a, OcclusionEvent, QUEUE>, timer: TrackTimer) -> Self {
        Self { events, timer }
    }

    pub const fn timer(&self) -> &TrackTimer {
        &self.timer
    }

    /// Handle every event queued before this call, oldest first.
    ///
    /// Events arriving while this runs are left for the next tick.
    pub fn tick<const COLUMNS: usize, const CELLS: usize, const SPARKS: usize>(
        &mut self,
        grid: &mut Grid<COLUMNS, CELLS>,
        sparks: &mut SparkField<SPARKS>,
    ) -> TickReport {
        let mut report = TickReport::default();
        let timer = &mut self.timer;
        self.events
            .drain(|event| timer.handle(event, grid, sparks, &mut report));
        report
    }

    /// Events lost because the queue was full
    pub fn dropped(&self) -> u32 {
        self.events.dropped()
    }
}
