//! Interrupt-safe bounded event queue for `no_std` environments.
//!
//! Built on `critical-section` and `heapless::Deque`. Producers (interrupt
//! handlers) append; a single consumer (the frame loop) drains once per
//! frame. Draining takes only the events queued when the drain started, so
//! events arriving mid-drain are left for the next frame.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::sensor::{EventListener, OcclusionEvent};

/// Error returned when trying to push into a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

struct Inner<T, const SIZE: usize> {
    queue: Deque<T, SIZE>,
    dropped: u32,
    consumer_taken: bool,
}

/// A bounded queue shared between interrupt and thread context.
pub struct EventQueue<T, const SIZE: usize> {
    inner: Mutex<RefCell<Inner<T, SIZE>>>,
}

impl<T, const SIZE: usize> EventQueue<T, SIZE> {
    /// Create a new empty queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                queue: Deque::new(),
                dropped: 0,
                consumer_taken: false,
            })),
        }
    }

    /// Get a producer handle. Any number may coexist.
    pub const fn producer(&self) -> Producer<'_, T, SIZE> {
        Producer { queue: self }
    }

    /// Take the consumer handle.
    ///
    /// There is only one consumer per queue: the first call gets it, every
    /// later call returns `None`.
    pub fn consumer(&self) -> Option<Consumer<'_, T, SIZE>> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            if inner.consumer_taken {
                return None;
            }
            inner.consumer_taken = true;
            Some(Consumer { queue: self })
        })
    }

    /// Append a value.
    ///
    /// A full queue rejects the value, counts it as dropped and returns it.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            match inner.queue.push_back(value) {
                Ok(()) => Ok(()),
                Err(value) => {
                    inner.dropped = inner.dropped.wrapping_add(1);
                    Err(TrySendError(value))
                }
            }
        })
    }

    fn try_receive(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().queue.pop_front())
    }

    /// Number of queued values
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().queue.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values rejected because the queue was full
    pub fn dropped(&self) -> u32 {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().dropped)
    }
}

impl<T, const SIZE: usize> Default for EventQueue<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// A producer handle for an [`EventQueue`].
#[derive(Clone, Copy)]
pub struct Producer<'a, T, const SIZE: usize> {
    queue: &'a EventQueue<T, SIZE>,
}

impl<T, const SIZE: usize> Producer<'_, T, SIZE> {
    /// See [`EventQueue::try_send`].
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.queue.try_send(value)
    }
}

impl<const SIZE: usize> EventListener for Producer<'_, OcclusionEvent, SIZE> {
    fn on_event(&self, event: OcclusionEvent) {
        // A full queue already counted the drop
        let _ = self.try_send(event);
    }
}

/// The consumer handle for an [`EventQueue`].
pub struct Consumer<'a, T, const SIZE: usize> {
    queue: &'a EventQueue<T, SIZE>,
}

impl<T, const SIZE: usize> Consumer<'_, T, SIZE> {
    /// Take the oldest value, if any.
    pub fn try_receive(&self) -> Option<T> {
        self.queue.try_receive()
    }

    /// Hand every value queued before this call to `f`, oldest first.
    ///
    /// Each value is popped in its own critical section so producers are
    /// never blocked for the whole drain. Returns the number of values
    /// handled.
    pub fn drain(&self, mut f: impl FnMut(T)) -> usize {
        let pending = self.queue.len();
        let mut handled = 0;
        while handled < pending {
            let Some(value) = self.queue.try_receive() else {
                break;
            };
            f(value);
            handled += 1;
        }
        handled
    }

    /// See [`EventQueue::dropped`].
    pub fn dropped(&self) -> u32 {
        self.queue.dropped()
    }
}
