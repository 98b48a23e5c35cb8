//! Producers of timed light steps.
//!
//! A [`TimedSequence`] is an iterator that never runs dry. Three producers
//! are provided:
//!
//! - [`LoopingSequence`]: cycles a fixed list of steps forever, in order.
//!   The position is never reset once the sequence is running.
//! - [`EnumCycle`]: every [`LightState`] in bit order, each held for the
//!   same time, repeated forever.
//! - [`RandomSequence`]: uniformly random states and durations. Unbounded
//!   and not restartable.

use core::fmt;
use core::time::Duration;

use heapless::Vec;
use rand::Rng;

use crate::types::{LightState, TimedStep};

/// An endless source of timed steps.
///
/// Implemented for every `Send` iterator over [`TimedStep`]; the scheduler
/// pulls from it on a worker thread.
pub trait TimedSequence: Iterator<Item = TimedStep> + Send {}

impl<T> TimedSequence for T where T: Iterator<Item = TimedStep> + Send {}

/// Sequence validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// No steps provided.
    EmptySequence,

    /// Sequence capacity exceeded.
    CapacityExceeded,

    /// One full loop takes no time, so a worker would spin without pausing.
    ZeroLoopDuration,

    /// Random duration bounds are reversed or both zero.
    InvalidDurationRange,
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::EmptySequence => {
                write!(f, "sequence must have at least one step")
            }
            SequenceError::CapacityExceeded => {
                write!(f, "sequence capacity exceeded")
            }
            SequenceError::ZeroLoopDuration => {
                write!(f, "at least one step must have a non-zero duration")
            }
            SequenceError::InvalidDurationRange => {
                write!(
                    f,
                    "random duration range must satisfy min <= max with a non-zero max"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SequenceError {}

/// A fixed list of steps, repeated forever in order.
///
/// # Type Parameters
/// * `N` - Maximum number of steps this sequence can hold
#[derive(Debug, Clone)]
pub struct LoopingSequence<const N: usize> {
    steps: Vec<TimedStep, N>,
    position: usize,
}

impl<const N: usize> LoopingSequence<N> {
    /// Creates a new sequence builder.
    pub fn builder() -> SequenceBuilder<N> {
        SequenceBuilder::new()
    }

    /// Builds a sequence from a slice of steps.
    ///
    /// # Errors
    /// * `EmptySequence` - The slice is empty
    /// * `CapacityExceeded` - More than `N` steps
    /// * `ZeroLoopDuration` - Every step has zero duration
    pub fn from_steps(steps: &[TimedStep]) -> Result<Self, SequenceError> {
        steps
            .iter()
            .try_fold(SequenceBuilder::new(), |builder, step| {
                builder.step(step.lights, step.duration)
            })?
            .build()
    }

    /// Returns the number of steps in one loop.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns a reference to the step at the given index.
    pub fn get_step(&self, index: usize) -> Option<&TimedStep> {
        self.steps.get(index)
    }

    /// Index of the step the next call to `next()` yields.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total duration of one complete loop through all steps.
    pub fn loop_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }
}

impl<const N: usize> Iterator for LoopingSequence<N> {
    type Item = TimedStep;

    fn next(&mut self) -> Option<TimedStep> {
        let step = *self.steps.get(self.position)?;
        self.position = (self.position + 1) % self.steps.len();
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Builder for constructing validated looping sequences.
#[derive(Debug)]
pub struct SequenceBuilder<const N: usize> {
    steps: Vec<TimedStep, N>,
}

impl<const N: usize> SequenceBuilder<N> {
    /// Creates a new empty sequence builder.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds a step to the sequence.
    ///
    /// # Errors
    /// Returns `CapacityExceeded` if the sequence already holds `N` steps.
    pub fn step(mut self, lights: LightState, duration: Duration) -> Result<Self, SequenceError> {
        self.steps
            .push(TimedStep::new(lights, duration))
            .map_err(|_| SequenceError::CapacityExceeded)?;
        Ok(self)
    }

    /// Builds and validates the sequence.
    ///
    /// # Errors
    /// * `EmptySequence` - No steps were added
    /// * `ZeroLoopDuration` - Every step has zero duration
    pub fn build(self) -> Result<LoopingSequence<N>, SequenceError> {
        if self.steps.is_empty() {
            return Err(SequenceError::EmptySequence);
        }

        if self.steps.iter().all(|step| step.duration.is_zero()) {
            return Err(SequenceError::ZeroLoopDuration);
        }

        Ok(LoopingSequence {
            steps: self.steps,
            position: 0,
        })
    }
}

impl<const N: usize> Default for SequenceBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every light state in bit order, each held for the same duration.
#[derive(Debug, Clone)]
pub struct EnumCycle {
    hold: Duration,
    position: usize,
}

impl EnumCycle {
    /// Creates a cycle holding each state for `hold`.
    ///
    /// # Errors
    /// Returns `ZeroLoopDuration` if `hold` is zero.
    pub fn new(hold: Duration) -> Result<Self, SequenceError> {
        if hold.is_zero() {
            return Err(SequenceError::ZeroLoopDuration);
        }
        Ok(Self { hold, position: 0 })
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }
}

impl Iterator for EnumCycle {
    type Item = TimedStep;

    fn next(&mut self) -> Option<TimedStep> {
        let lights = LightState::ALL_STATES[self.position];
        self.position = (self.position + 1) % LightState::ALL_STATES.len();
        Some(TimedStep::new(lights, self.hold))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Uniformly random states held for uniformly random durations in `[min, max]`.
#[derive(Debug, Clone)]
pub struct RandomSequence<R> {
    rng: R,
    min: Duration,
    max: Duration,
}

impl<R: Rng> RandomSequence<R> {
    /// Creates a random sequence drawing from `rng`.
    ///
    /// # Errors
    /// Returns `InvalidDurationRange` if `min > max` or `max` is zero.
    pub fn with_rng(rng: R, min: Duration, max: Duration) -> Result<Self, SequenceError> {
        if min > max || max.is_zero() {
            return Err(SequenceError::InvalidDurationRange);
        }
        Ok(Self { rng, min, max })
    }

    /// The inclusive duration bounds.
    pub fn duration_range(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }
}

#[cfg(feature = "std")]
impl RandomSequence<rand::rngs::StdRng> {
    /// Creates a random sequence seeded from OS entropy.
    ///
    /// # Errors
    /// Returns `InvalidDurationRange` if `min > max` or `max` is zero.
    pub fn new(min: Duration, max: Duration) -> Result<Self, SequenceError> {
        use rand::SeedableRng;

        Self::with_rng(rand::rngs::StdRng::from_entropy(), min, max)
    }
}

impl<R: Rng> Iterator for RandomSequence<R> {
    type Item = TimedStep;

    fn next(&mut self) -> Option<TimedStep> {
        let lights = LightState::ALL_STATES[self.rng.gen_range(0..LightState::ALL_STATES.len())];
        let duration = if self.min == self.max {
            self.min
        } else {
            let secs = self
                .rng
                .gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
            Duration::from_secs_f64(secs).clamp(self.min, self.max)
        };
        Some(TimedStep::new(lights, duration))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
