//! Behavior modes selected by the controller.

use tracing::debug;

use crate::output::LightOutput;
use crate::types::LightState;

/// A strategy deciding what the fixture shows while it is selected.
///
/// The controller calls `enter` when the mode becomes active and `exit`
/// when it is left. Exactly one mode is between `enter` and `exit` at a time.
pub trait Mode {
    /// Takes ownership of the output.
    fn enter(&mut self);

    /// Releases the output. Background workers must stop writing once this
    /// returns, apart from any step already in progress.
    fn exit(&mut self);
}

#[cfg(feature = "std")]
impl<M: Mode + ?Sized> Mode for std::boxed::Box<M> {
    fn enter(&mut self) {
        (**self).enter();
    }

    fn exit(&mut self) {
        (**self).exit();
    }
}

/// Shows one fixed light state.
#[derive(Debug, Clone)]
pub struct FixedMode<O> {
    output: O,
    lights: LightState,
}

impl<O: LightOutput> FixedMode<O> {
    pub fn new(output: O, lights: LightState) -> Self {
        Self { output, lights }
    }

    pub fn lights(&self) -> LightState {
        self.lights
    }
}

impl<O: LightOutput> Mode for FixedMode<O> {
    fn enter(&mut self) {
        debug!(lights = %self.lights, "fixed mode entered");
        self.output.set(self.lights);
    }

    fn exit(&mut self) {}
}

#[cfg(feature = "std")]
pub use self::traffic::TrafficMode;

#[cfg(feature = "std")]
mod traffic {
    use std::sync::Arc;

    use super::{FixedMode, Mode};
    use crate::output::LightOutput;
    use crate::scheduler::SequenceScheduler;
    use crate::watchdog::NetworkWatchdog;

    /// The closed set of modes a traffic light controller cycles through.
    pub enum TrafficMode<O> {
        /// One fixed light state.
        Fixed(FixedMode<Arc<O>>),
        /// A timed sequence paced by a background worker.
        Sequence(SequenceScheduler),
        /// Network commands with a silence fallback.
        UdpWatchdog(NetworkWatchdog<O>),
    }

    impl<O> TrafficMode<O> {
        /// Short label for logging.
        pub fn kind(&self) -> &'static str {
            match self {
                TrafficMode::Fixed(_) => "fixed",
                TrafficMode::Sequence(_) => "sequence",
                TrafficMode::UdpWatchdog(_) => "udp-watchdog",
            }
        }
    }

    impl<O: LightOutput> Mode for TrafficMode<O> {
        fn enter(&mut self) {
            match self {
                TrafficMode::Fixed(mode) => mode.enter(),
                TrafficMode::Sequence(mode) => mode.enter(),
                TrafficMode::UdpWatchdog(mode) => mode.enter(),
            }
        }

        fn exit(&mut self) {
            match self {
                TrafficMode::Fixed(mode) => mode.exit(),
                TrafficMode::Sequence(mode) => mode.exit(),
                TrafficMode::UdpWatchdog(mode) => mode.exit(),
            }
        }
    }

    impl<O> From<FixedMode<Arc<O>>> for TrafficMode<O> {
        fn from(mode: FixedMode<Arc<O>>) -> Self {
            TrafficMode::Fixed(mode)
        }
    }

    impl<O> From<SequenceScheduler> for TrafficMode<O> {
        fn from(mode: SequenceScheduler) -> Self {
            TrafficMode::Sequence(mode)
        }
    }

    impl<O> From<NetworkWatchdog<O>> for TrafficMode<O> {
        fn from(mode: NetworkWatchdog<O>) -> Self {
            TrafficMode::UdpWatchdog(mode)
        }
    }
}
