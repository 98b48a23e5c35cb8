#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`LightState`**: Which of the red, amber and green channels are lit (a 3-bit mask)
//! - **`LightOutput`**: Trait to implement for your traffic light hardware
//! - **`TimedSequence`**: An endless producer of `(LightState, Duration)` steps
//! - **`Mode`**: What the fixture shows while selected (`enter`/`exit`)
//! - **`FixedMode`**: Shows one state
//! - **`SequenceScheduler`**: Paces a timed sequence on its own worker thread
//! - **`NetworkWatchdog`**: Shows states received over UDP, falling back to caution on silence
//! - **`ModeController`**: Cycles through modes, one step per button press
//!
//! The value types, sequences, wire codec, `FixedMode` and `ModeController`
//! work without `std`. The threaded modes, the GPIO adapter and the default
//! configuration need the `std` feature, which is enabled by default.
//!
//! Worker threads are created with their mode and run until the process exits.

pub mod command;
pub mod controller;
pub mod mode;
pub mod output;
pub mod sequence;
pub mod types;

#[cfg(feature = "std")]
pub mod config;
#[cfg(feature = "std")]
pub mod scheduler;
#[cfg(feature = "std")]
pub mod watchdog;

pub use command::{decode_command, encode_command};
pub use controller::{ControllerError, ModeController};
pub use mode::{FixedMode, Mode};
pub use output::LightOutput;
pub use sequence::{
    EnumCycle, LoopingSequence, RandomSequence, SequenceBuilder, SequenceError, TimedSequence,
};
pub use types::{InvalidLightState, LightState, ParseLightStateError, TimedStep};

#[cfg(feature = "std")]
pub use config::{StartupError, WatchdogConfig, default_controller};
#[cfg(feature = "std")]
pub use mode::TrafficMode;
#[cfg(feature = "std")]
pub use output::TrafficLight;
#[cfg(feature = "std")]
pub use scheduler::{SchedulerError, SequenceScheduler};
#[cfg(feature = "std")]
pub use watchdog::{NetworkWatchdog, WatchdogError};
