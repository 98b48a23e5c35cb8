use core::fmt;

use heapless::Vec;
use tracing::info;

use crate::mode::Mode;

/// Errors that can occur during controller operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// A controller needs at least one mode.
    EmptyModeList,

    /// More modes than the controller can hold.
    CapacityExceeded { capacity: usize },

    /// `advance` was called before `start`.
    NotStarted,

    /// `start` was called twice.
    AlreadyStarted,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::EmptyModeList => {
                write!(f, "mode list must contain at least one mode")
            }
            ControllerError::CapacityExceeded { capacity } => {
                write!(f, "mode list exceeds controller capacity of {}", capacity)
            }
            ControllerError::NotStarted => {
                write!(f, "controller has not been started")
            }
            ControllerError::AlreadyStarted => {
                write!(f, "controller is already started")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControllerError {}

/// Cycles through a fixed list of modes, one step per button press.
///
/// The list order is the cycle order and wraps around. Exactly one mode is
/// active after [`start`](Self::start). On [`advance`](Self::advance) the
/// outgoing mode's `exit` returns before the incoming mode's `enter` begins.
///
/// There is no terminal state; the controller runs until the process ends.
///
/// # Type Parameters
/// * `M` - Mode type (a closed enum, or `Box<dyn Mode>` for open sets)
/// * `N` - Maximum number of modes
pub struct ModeController<M, const N: usize> {
    modes: Vec<M, N>,
    current: usize,
    started: bool,
}

impl<M: Mode, const N: usize> ModeController<M, N> {
    /// Creates a controller over `modes`, in order. No mode is entered yet.
    ///
    /// # Errors
    /// * `EmptyModeList` - `modes` yielded nothing
    /// * `CapacityExceeded` - `modes` yielded more than `N` modes
    pub fn new<I>(modes: I) -> Result<Self, ControllerError>
    where
        I: IntoIterator<Item = M>,
    {
        let mut list = Vec::new();
        for mode in modes {
            list.push(mode)
                .map_err(|_| ControllerError::CapacityExceeded { capacity: N })?;
        }

        if list.is_empty() {
            return Err(ControllerError::EmptyModeList);
        }

        Ok(Self {
            modes: list,
            current: 0,
            started: false,
        })
    }

    /// Enters the first mode.
    ///
    /// # Errors
    /// Returns `AlreadyStarted` on a second call.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.started {
            return Err(ControllerError::AlreadyStarted);
        }

        self.started = true;
        info!(index = self.current, "starting mode controller");
        self.modes[self.current].enter();
        Ok(())
    }

    /// Exits the current mode and enters the next one, wrapping around.
    ///
    /// Returns the index of the newly active mode.
    ///
    /// # Errors
    /// Returns `NotStarted` if called before [`start`](Self::start).
    pub fn advance(&mut self) -> Result<usize, ControllerError> {
        if !self.started {
            return Err(ControllerError::NotStarted);
        }

        self.modes[self.current].exit();
        self.current = (self.current + 1) % self.modes.len();
        info!(index = self.current, "switching mode");
        self.modes[self.current].enter();

        Ok(self.current)
    }

    /// Index of the active mode (or the first mode, before `start`).
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_mode(&self) -> &M {
        &self.modes[self.current]
    }

    /// Number of modes in the cycle.
    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// All modes, in cycle order.
    pub fn modes(&self) -> &[M] {
        &self.modes
    }
}
