//! Fixed configuration for the standard traffic light installation.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::controller::{ControllerError, ModeController};
use crate::mode::{FixedMode, TrafficMode};
use crate::output::LightOutput;
use crate::scheduler::{SchedulerError, SequenceScheduler};
use crate::sequence::{EnumCycle, LoopingSequence, RandomSequence, SequenceError};
use crate::types::LightState;
use crate::watchdog::{NetworkWatchdog, WatchdogError};

/// UDP port the watchdog listens on.
pub const DEFAULT_UDP_PORT: u16 = 2806;

/// Command silence tolerated before falling back to caution.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(16);

/// Hold time for each state in the enum cycle.
pub const ENUM_CYCLE_HOLD: Duration = Duration::from_millis(500);

pub const RANDOM_STEP_MIN: Duration = Duration::from_millis(100);
pub const RANDOM_STEP_MAX: Duration = Duration::from_millis(500);

/// Capacity of the default controller.
pub const MAX_MODES: usize = 8;

/// Capacity of the standard traffic cycle.
pub const TRAFFIC_CYCLE_STEPS: usize = 16;

/// Controller type built by [`default_controller`].
pub type DefaultController<O> = ModeController<TrafficMode<O>, MAX_MODES>;

/// Network watchdog settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// Address the command socket binds to.
    pub bind_addr: SocketAddr,

    /// Silence window before the caution fallback.
    pub update_timeout: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_UDP_PORT)),
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
        }
    }
}

/// Errors that prevent the default mode list from starting.
#[derive(Debug)]
pub enum StartupError {
    Watchdog(WatchdogError),
    Scheduler(SchedulerError),
    Sequence(SequenceError),
    Controller(ControllerError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Watchdog(err) => write!(f, "watchdog mode: {}", err),
            StartupError::Scheduler(err) => write!(f, "sequence mode: {}", err),
            StartupError::Sequence(err) => write!(f, "invalid sequence: {}", err),
            StartupError::Controller(err) => write!(f, "mode controller: {}", err),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Watchdog(err) => Some(err),
            StartupError::Scheduler(err) => Some(err),
            StartupError::Sequence(err) => Some(err),
            StartupError::Controller(err) => Some(err),
        }
    }
}

impl From<WatchdogError> for StartupError {
    fn from(err: WatchdogError) -> Self {
        StartupError::Watchdog(err)
    }
}

impl From<SchedulerError> for StartupError {
    fn from(err: SchedulerError) -> Self {
        StartupError::Scheduler(err)
    }
}

impl From<SequenceError> for StartupError {
    fn from(err: SequenceError) -> Self {
        StartupError::Sequence(err)
    }
}

impl From<ControllerError> for StartupError {
    fn from(err: ControllerError) -> Self {
        StartupError::Controller(err)
    }
}

/// The standard junction cycle: red, red-amber, green, flashing green, amber.
pub fn traffic_cycle() -> Result<LoopingSequence<TRAFFIC_CYCLE_STEPS>, SequenceError> {
    let flash = Duration::from_millis(750);

    LoopingSequence::builder()
        .step(LightState::Red, Duration::from_secs(5))?
        .step(LightState::RedAmber, Duration::from_millis(1500))?
        .step(LightState::Green, Duration::from_secs(5))?
        .step(LightState::Off, flash)?
        .step(LightState::Green, flash)?
        .step(LightState::Off, flash)?
        .step(LightState::Green, flash)?
        .step(LightState::Off, flash)?
        .step(LightState::Green, flash)?
        .step(LightState::Amber, Duration::from_millis(1500))?
        .build()
}

/// Builds the standard mode cycle, in order:
///
/// 1. UDP watchdog
/// 2. random states
/// 3. every state in turn
/// 4. the junction cycle
/// 5. all lights on
/// 6. all lights off
///
/// All worker threads are spawned here. The controller is not started.
///
/// # Errors
/// Fails if the command socket cannot be bound or a worker cannot be spawned.
pub fn default_controller<O>(
    output: Arc<O>,
    watchdog: &WatchdogConfig,
) -> Result<DefaultController<O>, StartupError>
where
    O: LightOutput + Send + Sync + 'static,
{
    let modes: [TrafficMode<O>; 6] = [
        NetworkWatchdog::bind(watchdog, Arc::clone(&output))?.into(),
        SequenceScheduler::spawn(
            "random",
            Arc::clone(&output),
            RandomSequence::new(RANDOM_STEP_MIN, RANDOM_STEP_MAX)?,
        )?
        .into(),
        SequenceScheduler::spawn(
            "enum-cycle",
            Arc::clone(&output),
            EnumCycle::new(ENUM_CYCLE_HOLD)?,
        )?
        .into(),
        SequenceScheduler::spawn("traffic-cycle", Arc::clone(&output), traffic_cycle()?)?.into(),
        FixedMode::new(Arc::clone(&output), LightState::All).into(),
        FixedMode::new(output, LightState::Off).into(),
    ];

    Ok(ModeController::new(modes)?)
}
