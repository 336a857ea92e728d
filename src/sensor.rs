//! Break-beam sensor debouncing.
//!
//! Each beam reports raw falling (beam broken) and rising (beam restored)
//! edges with a microsecond timestamp. A sensor collapses the edge stream
//! into one [`OcclusionEvent`] per object passing through the beam:
//!
//! - a break shorter than the blip time is only trusted if another break
//!   follows within the blip time, in which case both are merged;
//! - a break starting within the settle time of the previous event start
//!   is swallowed as a trailing edge of the same object.
//!
//! Timestamps come from a free-running 32-bit microsecond counter, so all
//! durations use wrapping arithmetic.

use core::fmt;

use heapless::Vec;

/// Default minimum duration of a single trusted break, in microseconds
pub const DEFAULT_BLIP_US: u32 = 1_000;

/// Default minimum gap between event starts, in microseconds
pub const DEFAULT_SETTLE_US: u32 = 60_000;

/// GPIO pin identifying a beam
pub type SensorId = u8;

/// Debounce timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    pub blip_us: u32,
    pub settle_us: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            blip_us: DEFAULT_BLIP_US,
            settle_us: DEFAULT_SETTLE_US,
        }
    }
}

/// One debounced pass through a beam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcclusionEvent {
    pub sensor: SensorId,
    pub start: u32,
    pub end: u32,
}

impl OcclusionEvent {
    /// How long the beam was broken
    pub const fn duration(&self) -> u32 {
        self.end.wrapping_sub(self.start)
    }
}

/// Receives debounced events.
///
/// Called from whatever context delivers the edges, usually an interrupt
/// handler, so implementations must not block.
pub trait EventListener {
    fn on_event(&self, event: OcclusionEvent);
}

/// Debounce state of a single beam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamStatus {
    /// No event in progress
    NoEvent,
    /// Beam broken, event not yet reported
    InEvent,
    /// Beam broken, but this object was already reported
    InReportedEvent,
    /// A short break just ended; it counts only if another break follows soon
    MaybeEvent,
}

/// What an edge did to the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Unexpected edge for the current state; status unchanged
    Ignored,
    /// Status is now the given one
    Transitioned(BeamStatus),
    /// An event completed and the sensor is back to [`BeamStatus::NoEvent`]
    Emitted(OcclusionEvent),
}

/// Debounce state machine for one beam
#[derive(Debug, Clone)]
pub struct BreakBeamSensor {
    id: SensorId,
    config: DebounceConfig,
    last_fall: u32,
    last_rise: u32,
    /// Start of the current or most recent event, `None` before the first
    last_event_start: Option<u32>,
    status: BeamStatus,
}

impl BreakBeamSensor {
    pub const fn new(id: SensorId, config: DebounceConfig) -> Self {
        Self {
            id,
            config,
            last_fall: 0,
            last_rise: 0,
            last_event_start: None,
            status: BeamStatus::NoEvent,
        }
    }

    pub const fn id(&self) -> SensorId {
        self.id
    }

    pub const fn status(&self) -> BeamStatus {
        self.status
    }

    pub const fn last_fall(&self) -> u32 {
        self.last_fall
    }

    pub const fn last_rise(&self) -> u32 {
        self.last_rise
    }

    /// Beam broken at `time`
    pub fn fall(&mut self, time: u32) -> Outcome {
        let since_last_rise = time.wrapping_sub(self.last_rise);
        self.last_fall = time;

        match self.status {
            BeamStatus::NoEvent => {
                let settling = self
                    .last_event_start
                    .is_some_and(|start| time.wrapping_sub(start) < self.config.settle_us);
                if settling {
                    // Trailing edge of the object we already reported
                    self.status = BeamStatus::InReportedEvent;
                } else {
                    self.last_event_start = Some(time);
                    self.status = BeamStatus::InEvent;
                }
            }
            BeamStatus::InEvent | BeamStatus::InReportedEvent => return Outcome::Ignored,
            BeamStatus::MaybeEvent => {
                if since_last_rise >= self.config.blip_us {
                    self.last_event_start = Some(time);
                }
                self.status = BeamStatus::InEvent;
            }
        }
        Outcome::Transitioned(self.status)
    }

    /// Beam restored at `time`
    pub fn rise(&mut self, time: u32) -> Outcome {
        self.last_rise = time;

        match self.status {
            BeamStatus::NoEvent | BeamStatus::MaybeEvent => Outcome::Ignored,
            BeamStatus::InEvent => {
                let start = self.last_event_start.unwrap_or(time);
                if time.wrapping_sub(start) < self.config.blip_us {
                    self.status = BeamStatus::MaybeEvent;
                    return Outcome::Transitioned(self.status);
                }
                self.status = BeamStatus::NoEvent;
                Outcome::Emitted(OcclusionEvent {
                    sensor: self.id,
                    start,
                    end: time,
                })
            }
            BeamStatus::InReportedEvent => {
                self.status = BeamStatus::NoEvent;
                Outcome::Transitioned(self.status)
            }
        }
    }
}

/// Which edges an interrupt reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeMask {
    pub fall: bool,
    pub rise: bool,
}

impl EdgeMask {
    pub const FALL: Self = Self {
        fall: true,
        rise: false,
    };
    pub const RISE: Self = Self {
        fall: false,
        rise: true,
    };
    pub const BOTH: Self = Self {
        fall: true,
        rise: true,
    };
}

/// Sensor registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A sensor is already registered on this pin
    Duplicate(SensorId),
    /// No free sensor slot
    Full(SensorId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(pin) => write!(f, "sensor on pin {pin} already registered"),
            Self::Full(pin) => write!(f, "no free sensor slot for pin {pin}"),
        }
    }
}

/// Routes raw edges to the sensor owning the pin and forwards the
/// resulting events to a listener.
///
/// The registry is a plain value. Share it with the interrupt handler by
/// placing it behind a `critical_section::Mutex<RefCell<_>>` and handing the
/// handler a reference; there is no process-wide instance.
pub struct SensorRegistry<'a, const N: usize> {
    sensors: Vec<BreakBeamSensor, N>,
    config: DebounceConfig,
    listener: Option<&'a (dyn EventListener + Sync)>,
}

impl<'a, const N: usize> SensorRegistry<'a, N> {
    pub const fn new(config: DebounceConfig) -> Self {
        Self {
            sensors: Vec::new(),
            config,
            listener: None,
        }
    }

    /// Register a sensor on `pin`
    pub fn add(&mut self, pin: SensorId) -> Result<(), RegistryError> {
        if self.sensor(pin).is_some() {
            return Err(RegistryError::Duplicate(pin));
        }
        self.sensors
            .push(BreakBeamSensor::new(pin, self.config))
            .map_err(|_| RegistryError::Full(pin))
    }

    /// Unregister the sensor on `pin`. Returns whether one existed.
    pub fn remove(&mut self, pin: SensorId) -> bool {
        match self.sensors.iter().position(|sensor| sensor.id() == pin) {
            Some(index) => {
                self.sensors.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Set the listener receiving emitted events.
    ///
    /// One listener serves every registered sensor; events tell their beams
    /// apart by [`OcclusionEvent::sensor`].
    pub fn set_listener(&mut self, listener: &'a (dyn EventListener + Sync)) {
        self.listener = Some(listener);
    }

    /// Stop delivering events; emitted events are dropped afterwards
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn sensor(&self, pin: SensorId) -> Option<&BreakBeamSensor> {
        self.sensors.iter().find(|sensor| sensor.id() == pin)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Beam on `pin` broken at `time`. Unknown pins are ignored.
    pub fn on_fall(&mut self, pin: SensorId, time: u32) -> Outcome {
        match self.sensor_mut(pin) {
            Some(sensor) => sensor.fall(time),
            None => Outcome::Ignored,
        }
    }

    /// Beam on `pin` restored at `time`. Unknown pins are ignored.
    pub fn on_rise(&mut self, pin: SensorId, time: u32) -> Outcome {
        let outcome = match self.sensor_mut(pin) {
            Some(sensor) => sensor.rise(time),
            None => return Outcome::Ignored,
        };
        if let Outcome::Emitted(event) = outcome {
            self.emit(event);
        }
        outcome
    }

    /// Handle an interrupt that may report both edges at once.
    ///
    /// The fall is processed before the rise.
    pub fn on_edges(&mut self, pin: SensorId, edges: EdgeMask, time: u32) {
        if edges.fall {
            self.on_fall(pin, time);
        }
        if edges.rise {
            self.on_rise(pin, time);
        }
    }

    fn sensor_mut(&mut self, pin: SensorId) -> Option<&mut BreakBeamSensor> {
        self.sensors.iter_mut().find(|sensor| sensor.id() == pin)
    }

    // Runs in interrupt context: hand off only, logging happens on the
    // consumer side
    fn emit(&self, event: OcclusionEvent) {
        if let Some(listener) = self.listener {
            listener.on_event(event);
        }
    }
}
