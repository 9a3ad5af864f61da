//! Polling loop tying the decoder to the gym.
//!
//! Each tick decodes one frame into a copy of the gym's measurement and hands
//! it over, always in that order. The monitor protocol carries no elapsed
//! time, so the session derives `duration` from the wall clock, counting from
//! the first frame that showed distance or strokes.

use chrono::{DateTime, Utc};

use crate::error::GymError;
use crate::gym::{Event, Gym};
use crate::link::ByteSource;
use crate::location::Locator;
use crate::protocol::Protocol;
use crate::storage::Store;
use crate::trace::Trace;

pub struct Session<S: ByteSource, T: Trace, St: Store, L: Locator> {
    protocol: Protocol<S, T>,
    gym: Gym<St, L>,
    epoch: u64,
    started: Option<DateTime<Utc>>,
}

impl<S: ByteSource, T: Trace, St: Store, L: Locator> Session<S, T, St, L> {
    pub fn new(protocol: Protocol<S, T>, gym: Gym<St, L>) -> Self {
        let epoch = gym.epoch();
        Self {
            protocol,
            gym,
            epoch,
            started: None,
        }
    }

    pub fn gym(&self) -> &Gym<St, L> {
        &self.gym
    }

    pub fn gym_mut(&mut self) -> &mut Gym<St, L> {
        &mut self.gym
    }

    pub fn protocol(&self) -> &Protocol<S, T> {
        &self.protocol
    }

    pub fn protocol_mut(&mut self) -> &mut Protocol<S, T> {
        &mut self.protocol
    }

    pub fn tick(&mut self) -> Result<Event, GymError> {
        self.tick_at(Utc::now())
    }

    /// Decode one frame and evaluate it as of `now`.
    ///
    /// A decode failure leaves the gym untouched.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Result<Event, GymError> {
        if self.gym.epoch() != self.epoch {
            // a new selection zeroed the measurement, drop what the decoder carries
            self.protocol.reset();
            self.started = None;
            self.epoch = self.gym.epoch();
        }

        let mut measurement = self.gym.measurement().clone();
        self.protocol.decode(&mut measurement)?;

        if self.started.is_none() && (measurement.distance > 0 || measurement.strokes > 0) {
            self.started = Some(now);
        }
        if let Some(started) = self.started {
            let elapsed = (now - started).num_seconds().max(0);
            let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
            measurement.duration = measurement.duration.max(elapsed);
        }

        self.gym.on_measured(measurement)
    }
}
