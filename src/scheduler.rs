//! Background pacing of a timed sequence.
//!
//! Provides [`SequenceScheduler`], which owns one worker thread pulling steps
//! from a [`TimedSequence`] and holding each for its duration while the mode
//! is active.
//!
//! The hold between steps is not interrupted by [`exit`](Mode::exit): the
//! worker finishes the current hold before it looks at the activation flag
//! again. After a quick exit/enter round trip the scheduler can therefore
//! apply one more step from the old run before noticing anything changed,
//! and after an exit it may write once more while the next mode is already
//! active. Both windows are bounded by the longest step duration in the
//! sequence.

use std::fmt;
use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

use tracing::{debug, trace, warn};

use crate::mode::Mode;
use crate::output::LightOutput;
use crate::sequence::TimedSequence;

/// Errors that can occur while creating a scheduler.
#[derive(Debug)]
pub enum SchedulerError {
    /// The worker thread could not be started.
    Spawn(io::Error),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Spawn(err) => write!(f, "failed to spawn sequence worker: {}", err),
        }
    }
}

impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchedulerError::Spawn(err) => Some(err),
        }
    }
}

/// Activation flag a worker can block on.
#[derive(Debug, Default)]
struct Activation {
    active: Mutex<bool>,
    changed: Condvar,
}

impl Activation {
    fn set(&self, active: bool) {
        let mut guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = active;
        if active {
            self.changed.notify_all();
        }
    }

    fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the flag is set.
    fn wait_active(&self) {
        let guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = self
            .changed
            .wait_while(guard, |active| !*active)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Drives a timed sequence on a dedicated worker thread while active.
///
/// The worker is created with the scheduler and runs until the process
/// exits, whether or not the mode is active. The sequence position is never
/// reset: re-entering resumes where the previous run stopped.
#[derive(Debug)]
pub struct SequenceScheduler {
    name: String,
    activation: Arc<Activation>,
}

impl SequenceScheduler {
    /// Spawns the worker for `sequence`, initially inactive.
    ///
    /// # Errors
    /// Returns `Spawn` if the worker thread cannot be created.
    pub fn spawn<O, S>(name: &str, output: Arc<O>, sequence: S) -> Result<Self, SchedulerError>
    where
        O: LightOutput + Send + Sync + 'static,
        S: TimedSequence + 'static,
    {
        let activation = Arc::new(Activation::default());
        let worker_activation = Arc::clone(&activation);
        let worker_name = name.to_owned();

        thread::Builder::new()
            .name(format!("sequence-{}", name))
            .spawn(move || run_sequence(&worker_name, &worker_activation, &*output, sequence))
            .map_err(SchedulerError::Spawn)?;

        debug!(name, "sequence worker spawned");

        Ok(Self {
            name: name.to_owned(),
            activation,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true between `enter` and `exit`.
    pub fn is_active(&self) -> bool {
        self.activation.is_active()
    }
}

impl Mode for SequenceScheduler {
    fn enter(&mut self) {
        debug!(name = %self.name, "sequence mode entered");
        self.activation.set(true);
    }

    fn exit(&mut self) {
        debug!(name = %self.name, "sequence mode exited");
        self.activation.set(false);
    }
}

fn run_sequence<O, S>(name: &str, activation: &Activation, output: &O, mut sequence: S)
where
    O: LightOutput + ?Sized,
    S: TimedSequence,
{
    loop {
        activation.wait_active();

        let Some(step) = sequence.next() else {
            warn!(name, "sequence ended; worker stopping");
            return;
        };

        trace!(name, lights = %step.lights, duration = ?step.duration, "sequence step");
        output.set(step.lights);
        thread::sleep(step.duration);
    }
}
